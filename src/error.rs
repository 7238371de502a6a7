//! Error types for catar
//!
//! A single crate-wide error enum keeps the taxonomy small:
//! artifact problems are fatal at startup, input problems map to
//! client errors at the API boundary, inference problems map to
//! server errors and never abort the process.

use thiserror::Error;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum CatarError {
    /// An artifact file could not be read or parsed
    #[error("artifact error ({path}): {reason}")]
    ArtifactError {
        /// Path of the offending artifact file
        path: String,
        /// What went wrong
        reason: String,
    },

    /// An artifact parsed but its contents are structurally invalid
    #[error("format error: {reason}")]
    FormatError {
        /// What constraint was violated
        reason: String,
    },

    /// Client-supplied input failed validation
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// Which field or constraint failed
        reason: String,
    },

    /// Inference produced an unusable result
    #[error("inference error: {reason}")]
    InferenceError {
        /// What went wrong during scaling or prediction
        reason: String,
    },

    /// The HTTP server could not start or stopped unexpectedly
    #[error("server error: {reason}")]
    ServerError {
        /// Bind or serve failure detail
        reason: String,
    },
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, CatarError>;
