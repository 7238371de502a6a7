//! Standard scaler applied to raw feature vectors before inference
//!
//! The scaler artifact carries the per-feature mean and scale fit during
//! training. It must be the exact scaler the model was trained against; the
//! only guard we have is structural (matching dimensions, sane values), so
//! loading validates everything it can.

use serde::{Deserialize, Serialize};

use crate::error::{CatarError, Result};

/// Per-feature standardization transform: `(x - mean) / scale`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Per-feature mean fit during training
    pub mean: Vec<f32>,
    /// Per-feature scale (standard deviation) fit during training
    pub scale: Vec<f32>,
}

impl StandardScaler {
    /// Create a scaler, validating its parameters
    ///
    /// # Errors
    ///
    /// Returns `FormatError` if the vectors are empty, differ in length, or
    /// contain non-finite or zero scale entries.
    pub fn new(mean: Vec<f32>, scale: Vec<f32>) -> Result<Self> {
        let scaler = Self { mean, scale };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Validate structural invariants without consuming the scaler
    ///
    /// # Errors
    ///
    /// Returns `FormatError` describing the first violated invariant.
    pub fn validate(&self) -> Result<()> {
        if self.mean.is_empty() {
            return Err(CatarError::FormatError {
                reason: "scaler has no features".to_string(),
            });
        }
        if self.mean.len() != self.scale.len() {
            return Err(CatarError::FormatError {
                reason: format!(
                    "scaler mean length {} != scale length {}",
                    self.mean.len(),
                    self.scale.len()
                ),
            });
        }
        for (i, m) in self.mean.iter().enumerate() {
            if !m.is_finite() {
                return Err(CatarError::FormatError {
                    reason: format!("scaler mean[{i}] is not finite"),
                });
            }
        }
        for (i, s) in self.scale.iter().enumerate() {
            if !s.is_finite() || *s == 0.0 {
                return Err(CatarError::FormatError {
                    reason: format!("scaler scale[{i}] must be finite and non-zero, got {s}"),
                });
            }
        }
        Ok(())
    }

    /// Number of features this scaler was fit on
    #[must_use]
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    /// Whether the scaler covers zero features (never true after validation)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Standardize a raw feature vector
    ///
    /// # Errors
    ///
    /// Returns `InferenceError` if the input length does not match the fit
    /// dimension.
    pub fn transform(&self, features: &[f32]) -> Result<Vec<f32>> {
        if features.len() != self.mean.len() {
            return Err(CatarError::InferenceError {
                reason: format!(
                    "input has {} features, scaler was fit on {}",
                    features.len(),
                    self.mean.len()
                ),
            });
        }
        Ok(features
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }
}
