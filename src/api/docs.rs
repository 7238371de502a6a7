//! Generated API documentation
//!
//! Builds the OpenAPI 3.0 document served at `/openapi.json` and the
//! Swagger UI page at `/docs`. The document is assembled from the same
//! schema the handlers use, so the two cannot drift independently of the
//! code that defines them.

use serde_json::{json, Value};

use crate::artifact::FEATURE_NAMES;

/// Static Swagger UI page; loads assets from the unpkg CDN and points at
/// the local OpenAPI document
pub(crate) const SWAGGER_UI_PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <title>Wine Quality Prediction API - Docs</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css"/>
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.onload = () => {
      SwaggerUIBundle({ url: "/openapi.json", dom_id: "#swagger-ui" });
    };
  </script>
</body>
</html>
"##;

/// JSON schema fragment for one wine sample
fn sample_schema() -> Value {
    let properties: serde_json::Map<String, Value> = FEATURE_NAMES
        .iter()
        .map(|name| ((*name).to_string(), json!({ "type": "number" })))
        .collect();
    json!({
        "type": "object",
        "required": FEATURE_NAMES,
        "additionalProperties": false,
        "properties": properties,
        "example": {
            "fixed_acidity": 7.4,
            "volatile_acidity": 0.7,
            "citric_acid": 0.0,
            "residual_sugar": 1.9,
            "chlorides": 0.076,
            "free_sulfur_dioxide": 11.0,
            "total_sulfur_dioxide": 34.0,
            "density": 0.9978,
            "pH": 3.51,
            "sulphates": 0.56,
            "alcohol": 9.4
        }
    })
}

/// JSON schema fragment for one prediction result
fn prediction_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "predicted_quality": { "type": "number" },
            "quality_category": {
                "type": "string",
                "enum": ["Poor", "Fair", "Good", "Very Good", "Excellent"]
            },
            "confidence": { "type": "string", "enum": ["High", "Medium"] }
        }
    })
}

/// Build the OpenAPI 3.0 document for the whole service
pub(crate) fn openapi_document() -> Value {
    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Wine Quality Prediction API",
            "description": "A simple API to predict wine quality based on chemical properties",
            "version": env!("CARGO_PKG_VERSION")
        },
        "paths": {
            "/": {
                "get": {
                    "summary": "Service info",
                    "responses": { "200": { "description": "Service banner" } }
                }
            },
            "/health": {
                "get": {
                    "summary": "Readiness probe",
                    "responses": {
                        "200": { "description": "Artifacts loaded, ready to serve" },
                        "503": { "description": "Artifacts not loaded" }
                    }
                }
            },
            "/predict": {
                "post": {
                    "summary": "Score a single wine sample",
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/WineSample" }
                            }
                        }
                    },
                    "responses": {
                        "200": {
                            "description": "Prediction",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Prediction" }
                                }
                            }
                        },
                        "400": { "description": "A field is outside its plausible range" },
                        "422": { "description": "Missing, unknown, or non-numeric field" },
                        "500": { "description": "Inference failed" },
                        "503": { "description": "Artifacts not loaded" }
                    }
                }
            },
            "/predict_batch": {
                "post": {
                    "summary": "Score an ordered list of samples (all-or-nothing)",
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": {
                                    "type": "array",
                                    "items": { "$ref": "#/components/schemas/WineSample" },
                                    "maxItems": super::MAX_BATCH_SIZE
                                }
                            }
                        }
                    },
                    "responses": {
                        "200": {
                            "description": "One result per input, in input order",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": {
                                            "predictions": {
                                                "type": "array",
                                                "items": { "$ref": "#/components/schemas/Prediction" }
                                            },
                                            "count": { "type": "integer" }
                                        }
                                    }
                                }
                            }
                        },
                        "400": { "description": "Empty batch, oversized batch, or invalid item" },
                        "422": { "description": "Malformed batch body" },
                        "500": { "description": "Inference failed" },
                        "503": { "description": "Artifacts not loaded" }
                    }
                }
            },
            "/model_info": {
                "get": {
                    "summary": "Static metadata about the loaded model",
                    "responses": {
                        "200": { "description": "Algorithm, features, and training metrics" },
                        "503": { "description": "Artifacts not loaded" }
                    }
                }
            },
            "/metrics": {
                "get": {
                    "summary": "Prometheus-formatted request metrics",
                    "responses": { "200": { "description": "Metrics in text exposition format" } }
                }
            }
        },
        "components": {
            "schemas": {
                "WineSample": sample_schema(),
                "Prediction": prediction_schema()
            }
        }
    })
}
