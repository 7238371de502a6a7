//! End-to-end serving tests
//!
//! Exercises the full lifecycle: write an artifact directory, load it the way
//! `catar serve` does, and drive the router over HTTP semantics via
//! `tower::ServiceExt::oneshot`.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::util::ServiceExt;

use catar::api::{create_router, AppState};
use catar::artifact::{WineArtifacts, FEATURES_FILE, MODEL_FILE, SCALER_FILE};

fn sample_body() -> String {
    serde_json::json!({
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
    })
    .to_string()
}

fn post(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .expect("request")
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn test_serve_from_artifact_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    WineArtifacts::demo().save(dir.path()).expect("save");

    // Same path the serve command takes: load, wrap, route.
    let artifacts = WineArtifacts::load(dir.path()).expect("load");
    let app = create_router(AppState::new(artifacts));

    let response = app
        .oneshot(post("/predict", sample_body()))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!((body["predicted_quality"].as_f64().expect("score") - 5.7).abs() < 1e-6);
    assert_eq!(body["quality_category"], "Good");
}

#[tokio::test]
async fn test_loaded_and_demo_bundles_agree() {
    let dir = tempfile::tempdir().expect("tempdir");
    WineArtifacts::demo().save(dir.path()).expect("save");
    let loaded = WineArtifacts::load(dir.path()).expect("load");

    let from_disk = create_router(AppState::new(loaded))
        .oneshot(post("/predict", sample_body()))
        .await
        .expect("response");
    let from_demo = create_router(AppState::demo())
        .oneshot(post("/predict", sample_body()))
        .await
        .expect("response");

    assert_eq!(json_body(from_disk).await, json_body(from_demo).await);
}

#[tokio::test]
async fn test_batch_round_trip_preserves_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    WineArtifacts::demo().save(dir.path()).expect("save");
    let artifacts = WineArtifacts::load(dir.path()).expect("load");
    let app = create_router(AppState::new(artifacts));

    let mut items = Vec::new();
    for alcohol in [9.0, 9.4, 11.0, 12.5, 13.0] {
        let mut item: serde_json::Value = serde_json::from_str(&sample_body()).expect("json");
        item["alcohol"] = serde_json::json!(alcohol);
        items.push(item);
    }
    let batch = serde_json::Value::Array(items).to_string();

    let response = app
        .oneshot(post("/predict_batch", batch))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["count"], 5);
    let predictions = body["predictions"].as_array().expect("array");
    assert_eq!(predictions.len(), 5);

    // Low-alcohol samples route to the lower demo leaves; the score must be
    // non-decreasing as only alcohol moves up through the split.
    let scores: Vec<f64> = predictions
        .iter()
        .map(|p| p["predicted_quality"].as_f64().expect("score"))
        .collect();
    for pair in scores.windows(2) {
        assert!(pair[0] <= pair[1], "scores not ordered: {scores:?}");
    }
}

#[test]
fn test_missing_model_file_fails_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    WineArtifacts::demo().save(dir.path()).expect("save");
    std::fs::remove_file(dir.path().join(MODEL_FILE)).expect("remove");

    let err = WineArtifacts::load(dir.path()).expect_err("must fail");
    assert!(err.to_string().contains(MODEL_FILE));
}

#[test]
fn test_corrupt_scaler_fails_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    WineArtifacts::demo().save(dir.path()).expect("save");
    std::fs::write(dir.path().join(SCALER_FILE), b"{\"mean\": []}").expect("corrupt");

    let err = WineArtifacts::load(dir.path()).expect_err("must fail");
    assert!(err.to_string().contains(SCALER_FILE) || err.to_string().contains("scaler"));
}

#[test]
fn test_truncated_feature_list_fails_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    WineArtifacts::demo().save(dir.path()).expect("save");
    std::fs::write(
        dir.path().join(FEATURES_FILE),
        b"[\"alcohol\", \"pH\"]",
    )
    .expect("truncate");

    let err = WineArtifacts::load(dir.path()).expect_err("must fail");
    assert!(err.to_string().contains("feature"));
}

#[tokio::test]
async fn test_health_reflects_artifact_state() {
    let ready = create_router(AppState::demo())
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(ready.status(), StatusCode::OK);

    let not_ready = create_router(AppState::unloaded())
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(not_ready.status(), StatusCode::SERVICE_UNAVAILABLE);
}
