//! Random-forest regressor inference
//!
//! Loads and evaluates the tree ensemble produced by the offline training job.
//! Trees are stored as flat node arrays in the model artifact:
//!
//! ```text
//! {
//!   "trees": [ { "nodes": [ {feature, threshold, left, right, value, is_leaf}, ... ] }, ... ],
//!   "n_features": 11,
//!   "metadata": { "algorithm", "target", "hyperparameters", "metrics" }
//! }
//! ```
//!
//! Split nodes route `x[feature] <= threshold` to `left`, otherwise `right`;
//! leaf nodes carry the regression value. The ensemble prediction is the mean
//! of all tree outputs. Everything is validated once at load so the request
//! path never indexes out of bounds.

use serde::{Deserialize, Serialize};

use crate::error::{CatarError, Result};

/// One node in a flattened decision tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    /// Feature index tested at this node (ignored for leaves)
    pub feature: u32,
    /// Split threshold (ignored for leaves)
    pub threshold: f32,
    /// Index of the left child, taken when `x[feature] <= threshold`
    pub left: u32,
    /// Index of the right child
    pub right: u32,
    /// Regression output (meaningful only for leaves)
    pub value: f32,
    /// Whether this node is a leaf
    pub is_leaf: bool,
}

impl TreeNode {
    /// Construct a split node
    #[must_use]
    pub fn split(feature: u32, threshold: f32, left: u32, right: u32) -> Self {
        Self {
            feature,
            threshold,
            left,
            right,
            value: 0.0,
            is_leaf: false,
        }
    }

    /// Construct a leaf node
    #[must_use]
    pub fn leaf(value: f32) -> Self {
        Self {
            feature: 0,
            threshold: 0.0,
            left: 0,
            right: 0,
            value,
            is_leaf: true,
        }
    }
}

/// A single regression tree stored as a flat node array rooted at index 0
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Nodes in arbitrary order except that index 0 is the root
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Validate the tree structure against the expected feature count
    ///
    /// # Errors
    ///
    /// Returns `FormatError` if the tree is empty, a child index is out of
    /// bounds, or a split references a feature index >= `n_features`.
    pub fn validate(&self, n_features: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(CatarError::FormatError {
                reason: "tree has no nodes".to_string(),
            });
        }
        let len = self.nodes.len() as u32;
        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_leaf {
                if !node.value.is_finite() {
                    return Err(CatarError::FormatError {
                        reason: format!("leaf {i} has non-finite value"),
                    });
                }
                continue;
            }
            if node.left >= len || node.right >= len {
                return Err(CatarError::FormatError {
                    reason: format!(
                        "node {i} child out of bounds (left={}, right={}, nodes={len})",
                        node.left, node.right
                    ),
                });
            }
            if node.feature as usize >= n_features {
                return Err(CatarError::FormatError {
                    reason: format!(
                        "node {i} splits on feature {} but model has {n_features} features",
                        node.feature
                    ),
                });
            }
            if !node.threshold.is_finite() {
                return Err(CatarError::FormatError {
                    reason: format!("node {i} has non-finite threshold"),
                });
            }
        }
        Ok(())
    }

    /// Evaluate the tree on an already-scaled feature vector
    ///
    /// Traversal is bounded by the node count, so a malformed tree that slips
    /// past validation yields an error instead of looping forever.
    ///
    /// # Errors
    ///
    /// Returns `InferenceError` on an out-of-bounds index or a cycle.
    pub fn predict(&self, features: &[f32]) -> Result<f32> {
        let mut idx = 0usize;
        for _ in 0..=self.nodes.len() {
            let node = self
                .nodes
                .get(idx)
                .ok_or_else(|| CatarError::InferenceError {
                    reason: format!("tree traversal reached invalid node {idx}"),
                })?;
            if node.is_leaf {
                return Ok(node.value);
            }
            let x = features
                .get(node.feature as usize)
                .ok_or_else(|| CatarError::InferenceError {
                    reason: format!("tree split on missing feature {}", node.feature),
                })?;
            idx = if *x <= node.threshold {
                node.left as usize
            } else {
                node.right as usize
            };
        }
        Err(CatarError::InferenceError {
            reason: "tree traversal exceeded node count (cycle?)".to_string(),
        })
    }
}

/// Hyperparameters recorded by the training job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// Number of trees in the ensemble
    pub n_estimators: u32,
    /// Maximum tree depth, if bounded
    pub max_depth: Option<u32>,
    /// Seed used for the train/test split and bootstrap sampling
    pub random_state: Option<u64>,
}

/// Held-out evaluation metrics recorded at training time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingMetrics {
    /// Root mean squared error on the test split
    pub rmse: f32,
    /// Mean absolute error on the test split
    pub mae: f32,
    /// Coefficient of determination on the test split
    pub r2: f32,
}

/// Static facts about the trained model, reported by `/model_info`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestMetadata {
    /// Algorithm name, e.g. "RandomForestRegressor"
    pub algorithm: String,
    /// Target column the model predicts
    pub target: String,
    /// Hyperparameters used for training
    pub hyperparameters: Hyperparameters,
    /// Evaluation metrics from the training run
    pub metrics: TrainingMetrics,
}

/// Tree-ensemble regressor loaded from the model artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    /// The trees; prediction is their mean output
    pub trees: Vec<DecisionTree>,
    /// Input dimension every tree and the scaler must agree on
    pub n_features: usize,
    /// Training-time metadata
    pub metadata: ForestMetadata,
}

impl RandomForestRegressor {
    /// Validate the whole ensemble
    ///
    /// # Errors
    ///
    /// Returns `FormatError` if there are no trees, no features, or any tree
    /// fails structural validation.
    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(CatarError::FormatError {
                reason: "model has no trees".to_string(),
            });
        }
        if self.n_features == 0 {
            return Err(CatarError::FormatError {
                reason: "model declares zero features".to_string(),
            });
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features).map_err(|e| match e {
                CatarError::FormatError { reason } => CatarError::FormatError {
                    reason: format!("tree {i}: {reason}"),
                },
                other => other,
            })?;
        }
        Ok(())
    }

    /// Number of trees in the ensemble
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Predict the quality score for an already-scaled feature vector
    ///
    /// # Errors
    ///
    /// Returns `InferenceError` on a dimension mismatch, a traversal failure,
    /// or a non-finite ensemble output.
    pub fn predict(&self, features: &[f32]) -> Result<f32> {
        if features.len() != self.n_features {
            return Err(CatarError::InferenceError {
                reason: format!(
                    "input has {} features, model expects {}",
                    features.len(),
                    self.n_features
                ),
            });
        }
        let mut sum = 0.0f32;
        for tree in &self.trees {
            sum += tree.predict(features)?;
        }
        let score = sum / self.trees.len() as f32;
        if !score.is_finite() {
            return Err(CatarError::InferenceError {
                reason: "ensemble produced a non-finite score".to_string(),
            });
        }
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: u32, threshold: f32, left_val: f32, right_val: f32) -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode::split(feature, threshold, 1, 2),
                TreeNode::leaf(left_val),
                TreeNode::leaf(right_val),
            ],
        }
    }

    fn metadata() -> ForestMetadata {
        ForestMetadata {
            algorithm: "RandomForestRegressor".to_string(),
            target: "wine_quality".to_string(),
            hyperparameters: Hyperparameters {
                n_estimators: 2,
                max_depth: Some(1),
                random_state: Some(42),
            },
            metrics: TrainingMetrics {
                rmse: 0.5,
                mae: 0.4,
                r2: 0.5,
            },
        }
    }

    #[test]
    fn test_stump_routes_left_and_right() {
        let tree = stump(0, 0.5, 1.0, 2.0);
        assert!((tree.predict(&[0.5]).expect("left") - 1.0).abs() < 1e-6);
        assert!((tree.predict(&[0.6]).expect("right") - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_deep_tree_traversal() {
        // root -> split on f1 -> leaves
        let tree = DecisionTree {
            nodes: vec![
                TreeNode::split(0, 0.0, 1, 2),
                TreeNode::split(1, 1.5, 3, 4),
                TreeNode::leaf(6.3),
                TreeNode::leaf(5.4),
                TreeNode::leaf(5.1),
            ],
        };
        assert!((tree.predict(&[-1.0, 1.0]).expect("deep left") - 5.4).abs() < 1e-6);
        assert!((tree.predict(&[-1.0, 2.0]).expect("deep right") - 5.1).abs() < 1e-6);
        assert!((tree.predict(&[1.0, 0.0]).expect("shallow right") - 6.3).abs() < 1e-6);
    }

    #[test]
    fn test_ensemble_averages_trees() {
        let forest = RandomForestRegressor {
            trees: vec![stump(0, 0.0, 4.0, 6.0), stump(0, 0.0, 5.0, 7.0)],
            n_features: 1,
            metadata: metadata(),
        };
        forest.validate().expect("valid forest");
        assert!((forest.predict(&[-1.0]).expect("predict") - 4.5).abs() < 1e-6);
        assert!((forest.predict(&[1.0]).expect("predict") - 6.5).abs() < 1e-6);
    }

    #[test]
    fn test_empty_forest_rejected() {
        let forest = RandomForestRegressor {
            trees: vec![],
            n_features: 1,
            metadata: metadata(),
        };
        assert!(forest.validate().is_err());
    }

    #[test]
    fn test_out_of_bounds_child_rejected() {
        let tree = DecisionTree {
            nodes: vec![TreeNode::split(0, 0.0, 1, 9)],
        };
        assert!(tree.validate(1).is_err());
    }

    #[test]
    fn test_feature_index_out_of_range_rejected() {
        let tree = stump(5, 0.0, 1.0, 2.0);
        assert!(tree.validate(2).is_err());
    }

    #[test]
    fn test_cycle_detected_at_predict() {
        // Node 0 points back at itself; validation can't see it but predict
        // must terminate with an error.
        let tree = DecisionTree {
            nodes: vec![TreeNode::split(0, 0.0, 0, 0), TreeNode::leaf(1.0)],
        };
        assert!(tree.predict(&[-1.0]).is_err());
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let forest = RandomForestRegressor {
            trees: vec![stump(0, 0.0, 1.0, 2.0)],
            n_features: 1,
            metadata: metadata(),
        };
        assert!(forest.predict(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_non_finite_leaf_rejected() {
        let tree = DecisionTree {
            nodes: vec![TreeNode::leaf(f32::NAN)],
        };
        assert!(tree.validate(1).is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let forest = RandomForestRegressor {
            trees: vec![stump(0, 0.5, 4.5, 6.5)],
            n_features: 1,
            metadata: metadata(),
        };
        let json = serde_json::to_string(&forest).expect("serialize");
        let back: RandomForestRegressor = serde_json::from_str(&json).expect("deserialize");
        back.validate().expect("valid after round trip");
        assert_eq!(back.n_trees(), 1);
        assert_eq!(back.metadata.algorithm, "RandomForestRegressor");
    }
}
