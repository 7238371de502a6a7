//! # Catar
//!
//! Catar (Spanish: "to taste, to sample") is a wine-quality inference server.
//! An offline training job fits a random-forest regressor and a standard
//! scaler on chemical measurements; catar loads the serialized artifacts once
//! at startup and serves predictions over a small REST API.
//!
//! ## Architecture
//!
//! ```text
//! training job (offline)          catar (this crate)
//! ┌──────────────────┐   files   ┌───────────────────────────────┐
//! │ fit forest+scaler├──────────▶│ load artifacts (fail fast)    │
//! │ record metrics   │           │   └─ WineArtifacts (Arc, ro)  │
//! └──────────────────┘           │ axum router                   │
//!                                │   /predict  /predict_batch    │
//!                                │   /health   /model_info       │
//!                                │   /metrics  /docs             │
//!                                └───────────────────────────────┘
//! ```
//!
//! Artifacts are immutable after load; every request is independent, so the
//! whole request path is lock-free.
//!
//! ## Example
//!
//! ```rust
//! use catar::artifact::{WineArtifacts, WineSample};
//!
//! let artifacts = WineArtifacts::demo();
//! let sample = WineSample {
//!     fixed_acidity: 7.4,
//!     volatile_acidity: 0.7,
//!     citric_acid: 0.0,
//!     residual_sugar: 1.9,
//!     chlorides: 0.076,
//!     free_sulfur_dioxide: 11.0,
//!     total_sulfur_dioxide: 34.0,
//!     density: 0.9978,
//!     ph: 3.51,
//!     sulphates: 0.56,
//!     alcohol: 9.4,
//! };
//! let prediction = artifacts.predict(&sample).unwrap();
//! assert_eq!(prediction.category.as_str(), "Good");
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)] // score-to-tenths conversions are bounded
#![allow(clippy::cast_precision_loss)] // usize -> f64 for metrics is acceptable
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)] // error conditions documented where non-obvious
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::float_cmp)] // exact comparisons appear only in tests

pub mod api;
pub mod artifact;
pub mod error;
pub mod forest;
pub mod metrics;
pub mod quality;
pub mod scaler;

pub use error::{CatarError, Result};
