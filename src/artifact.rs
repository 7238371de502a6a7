//! Artifact bundle: model, scaler, and feature-name list
//!
//! The training job serializes three JSON files into one directory:
//!
//! - `model.json` — the random-forest regressor plus training metadata
//! - `scaler.json` — the standard scaler fit on the training split
//! - `feature_names.json` — the feature order the model was trained with
//!
//! The service loads all three exactly once at startup and refuses to serve
//! if any is missing, unparsable, or inconsistent with the others. The
//! feature-name list is the binding contract: request fields are assembled
//! into the input vector in artifact order, never in schema order.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CatarError, Result};
use crate::forest::{
    DecisionTree, ForestMetadata, Hyperparameters, RandomForestRegressor, TrainingMetrics,
    TreeNode,
};
use crate::quality::{round_score, Confidence, QualityCategory};
use crate::scaler::StandardScaler;

/// File name of the model artifact inside the artifact directory
pub const MODEL_FILE: &str = "model.json";
/// File name of the scaler artifact
pub const SCALER_FILE: &str = "scaler.json";
/// File name of the feature-name artifact
pub const FEATURES_FILE: &str = "feature_names.json";

/// The 11 chemical measurements, in canonical schema order
pub const FEATURE_NAMES: [&str; 11] = [
    "fixed_acidity",
    "volatile_acidity",
    "citric_acid",
    "residual_sugar",
    "chlorides",
    "free_sulfur_dioxide",
    "total_sulfur_dioxide",
    "density",
    "pH",
    "sulphates",
    "alcohol",
];

/// Plausible input bounds per feature, taken from the training data's
/// observed ranges. Values outside these are rejected at the API boundary.
const FEATURE_RANGES: [(&str, f32, f32); 11] = [
    ("fixed_acidity", 0.0, 20.0),
    ("volatile_acidity", 0.0, 5.0),
    ("citric_acid", 0.0, 5.0),
    ("residual_sugar", 0.0, 50.0),
    ("chlorides", 0.0, 1.0),
    ("free_sulfur_dioxide", 0.0, 100.0),
    ("total_sulfur_dioxide", 0.0, 500.0),
    ("density", 0.9, 1.1),
    ("pH", 0.0, 14.0),
    ("sulphates", 0.0, 5.0),
    ("alcohol", 0.0, 20.0),
];

/// One wine sample: the 11 measurements the model scores
///
/// All fields are required; unknown fields are rejected so a typoed field
/// name fails loudly instead of silently defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WineSample {
    /// Tartaric acid concentration (g/dm^3)
    pub fixed_acidity: f32,
    /// Acetic acid concentration (g/dm^3)
    pub volatile_acidity: f32,
    /// Citric acid concentration (g/dm^3)
    pub citric_acid: f32,
    /// Sugar remaining after fermentation (g/dm^3)
    pub residual_sugar: f32,
    /// Sodium chloride concentration (g/dm^3)
    pub chlorides: f32,
    /// Free form SO2 (mg/dm^3)
    pub free_sulfur_dioxide: f32,
    /// Total SO2 (mg/dm^3)
    pub total_sulfur_dioxide: f32,
    /// Density (g/cm^3)
    pub density: f32,
    /// Acidity on the pH scale
    #[serde(rename = "pH")]
    pub ph: f32,
    /// Potassium sulphate concentration (g/dm^3)
    pub sulphates: f32,
    /// Alcohol content (% by volume)
    pub alcohol: f32,
}

impl WineSample {
    /// Look up a measurement by its artifact feature name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f32> {
        match name {
            "fixed_acidity" => Some(self.fixed_acidity),
            "volatile_acidity" => Some(self.volatile_acidity),
            "citric_acid" => Some(self.citric_acid),
            "residual_sugar" => Some(self.residual_sugar),
            "chlorides" => Some(self.chlorides),
            "free_sulfur_dioxide" => Some(self.free_sulfur_dioxide),
            "total_sulfur_dioxide" => Some(self.total_sulfur_dioxide),
            "density" => Some(self.density),
            "pH" => Some(self.ph),
            "sulphates" => Some(self.sulphates),
            "alcohol" => Some(self.alcohol),
            _ => None,
        }
    }

    /// Check every measurement against its plausible range
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        for (name, min, max) in FEATURE_RANGES {
            let value = self.get(name).unwrap_or(f32::NAN);
            if !value.is_finite() {
                return Err(CatarError::InvalidInput {
                    reason: format!("{name} must be a finite number"),
                });
            }
            if value < min || value > max {
                return Err(CatarError::InvalidInput {
                    reason: format!("{name} = {value} outside plausible range [{min}, {max}]"),
                });
            }
        }
        Ok(())
    }

    /// Assemble the raw feature vector in artifact order
    ///
    /// # Errors
    ///
    /// Returns `InferenceError` on a feature name the schema does not know;
    /// that indicates a model/schema mismatch, not a client error.
    pub fn to_ordered(&self, names: &[String]) -> Result<Vec<f32>> {
        names
            .iter()
            .map(|name| {
                self.get(name).ok_or_else(|| CatarError::InferenceError {
                    reason: format!("artifact names unknown feature '{name}'"),
                })
            })
            .collect()
    }
}

/// A scored sample: the rounded quality estimate plus derived labels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Quality score rounded to the nearest tenth
    pub score: f32,
    /// Band the score falls into
    pub category: QualityCategory,
    /// Coarse confidence label
    pub confidence: Confidence,
}

/// The immutable trio loaded at startup
///
/// Constructed once, shared behind an `Arc`, never mutated. All cross-artifact
/// invariants (matching feature counts, known feature names) are checked here
/// so request handlers can assume a coherent bundle.
#[derive(Debug, Clone)]
pub struct WineArtifacts {
    model: RandomForestRegressor,
    scaler: StandardScaler,
    feature_names: Vec<String>,
}

impl WineArtifacts {
    /// Assemble a bundle from parts, enforcing cross-artifact invariants
    ///
    /// # Errors
    ///
    /// Returns `FormatError` if any artifact is internally invalid, the
    /// dimensions disagree, or a feature name is unknown or duplicated.
    pub fn new(
        model: RandomForestRegressor,
        scaler: StandardScaler,
        feature_names: Vec<String>,
    ) -> Result<Self> {
        model.validate()?;
        scaler.validate()?;
        if scaler.len() != model.n_features {
            return Err(CatarError::FormatError {
                reason: format!(
                    "scaler covers {} features, model expects {}",
                    scaler.len(),
                    model.n_features
                ),
            });
        }
        if feature_names.len() != model.n_features {
            return Err(CatarError::FormatError {
                reason: format!(
                    "feature list has {} names, model expects {}",
                    feature_names.len(),
                    model.n_features
                ),
            });
        }
        for (i, name) in feature_names.iter().enumerate() {
            if !FEATURE_NAMES.contains(&name.as_str()) {
                return Err(CatarError::FormatError {
                    reason: format!("feature_names[{i}] = '{name}' is not a known measurement"),
                });
            }
            if feature_names[..i].contains(name) {
                return Err(CatarError::FormatError {
                    reason: format!("feature_names[{i}] = '{name}' appears twice"),
                });
            }
        }
        Ok(Self {
            model,
            scaler,
            feature_names,
        })
    }

    /// Load and validate the three artifact files from `dir`
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError` naming the offending file on any read or parse
    /// failure, or `FormatError` if the parsed artifacts are inconsistent.
    pub fn load(dir: &Path) -> Result<Self> {
        let model: RandomForestRegressor = read_json(&dir.join(MODEL_FILE))?;
        let scaler: StandardScaler = read_json(&dir.join(SCALER_FILE))?;
        let feature_names: Vec<String> = read_json(&dir.join(FEATURES_FILE))?;
        Self::new(model, scaler, feature_names)
    }

    /// Write the bundle as three JSON files into `dir`, creating it if needed
    ///
    /// Used by `catar init` and by tests; the training job produces the same
    /// layout.
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError` on any write failure.
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).map_err(|e| CatarError::ArtifactError {
            path: dir.display().to_string(),
            reason: format!("failed to create directory: {e}"),
        })?;
        write_json(&dir.join(MODEL_FILE), &self.model)?;
        write_json(&dir.join(SCALER_FILE), &self.scaler)?;
        write_json(&dir.join(FEATURES_FILE), &self.feature_names)
    }

    /// Built-in demo bundle
    ///
    /// A three-tree forest over standardized red-wine measurements with the
    /// scaler fit on the classic red-wine dataset. Deterministic, tiny, and
    /// good enough to exercise every endpoint; the canonical sample
    /// (7.4, 0.7, 0.0, 1.9, 0.076, 11, 34, 0.9978, 3.51, 0.56, 9.4)
    /// scores 5.7 "Good".
    #[must_use]
    pub fn demo() -> Self {
        let trees = vec![
            DecisionTree {
                nodes: vec![
                    TreeNode::split(10, 0.0, 1, 2),
                    TreeNode::split(1, 1.5, 3, 4),
                    TreeNode::leaf(6.3),
                    TreeNode::leaf(5.4),
                    TreeNode::leaf(5.1),
                ],
            },
            DecisionTree {
                nodes: vec![
                    TreeNode::split(1, 0.5, 1, 2),
                    TreeNode::leaf(6.2),
                    TreeNode::leaf(5.6),
                ],
            },
            DecisionTree {
                nodes: vec![
                    TreeNode::split(9, 0.0, 1, 2),
                    TreeNode::leaf(6.1),
                    TreeNode::leaf(6.4),
                ],
            },
        ];
        let model = RandomForestRegressor {
            trees,
            n_features: 11,
            metadata: ForestMetadata {
                algorithm: "RandomForestRegressor".to_string(),
                target: "wine_quality".to_string(),
                hyperparameters: Hyperparameters {
                    n_estimators: 3,
                    max_depth: Some(2),
                    random_state: Some(42),
                },
                metrics: TrainingMetrics {
                    rmse: 0.56,
                    mae: 0.42,
                    r2: 0.50,
                },
            },
        };
        // Red-wine dataset means and standard deviations
        let scaler = StandardScaler {
            mean: vec![
                8.32, 0.528, 0.271, 2.539, 0.0875, 15.875, 46.468, 0.9967, 3.311, 0.658, 10.423,
            ],
            scale: vec![
                1.741, 0.179, 0.195, 1.410, 0.047, 10.460, 32.895, 0.0019, 0.154, 0.170, 1.066,
            ],
        };
        let feature_names = FEATURE_NAMES.iter().map(|s| (*s).to_string()).collect();
        Self {
            model,
            scaler,
            feature_names,
        }
    }

    /// The feature order the model was trained with
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// The loaded regressor
    #[must_use]
    pub fn model(&self) -> &RandomForestRegressor {
        &self.model
    }

    /// Score one sample: order by artifact names, scale, predict, derive labels
    ///
    /// Range validation is the caller's job (it belongs to the API boundary);
    /// this method only fails on internal inconsistencies.
    ///
    /// # Errors
    ///
    /// Returns `InferenceError` if ordering, scaling, or prediction fails.
    pub fn predict(&self, sample: &WineSample) -> Result<Prediction> {
        let raw = sample.to_ordered(&self.feature_names)?;
        let scaled = self.scaler.transform(&raw)?;
        let score = round_score(self.model.predict(&scaled)?);
        Ok(Prediction {
            score,
            category: QualityCategory::from_score(score),
            confidence: Confidence::from_score(score),
        })
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).map_err(|e| CatarError::ArtifactError {
        path: path.display().to_string(),
        reason: format!("read failed: {e}"),
    })?;
    serde_json::from_slice(&bytes).map_err(|e| CatarError::ArtifactError {
        path: path.display().to_string(),
        reason: format!("parse failed: {e}"),
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value).map_err(|e| CatarError::ArtifactError {
        path: path.display().to_string(),
        reason: format!("serialize failed: {e}"),
    })?;
    fs::write(path, json).map_err(|e| CatarError::ArtifactError {
        path: path.display().to_string(),
        reason: format!("write failed: {e}"),
    })
}
