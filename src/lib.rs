//! Purchase Prediction Library
//!
//! Loads a pretrained buy/no-buy classifier and its fitted feature scaler
//! once per process, then turns (age, salary) requests into a class plus a
//! confidence score.

pub mod config;
pub mod console;
pub mod error;
pub mod feature_extractor;
pub mod metrics;
pub mod models;
pub mod types;

pub use config::AppConfig;
pub use error::{ArtifactKind, PredictionError};
pub use feature_extractor::FeatureExtractor;
pub use models::inference::{Classifier, InferenceContext};
pub use models::loader::{ArtifactLoader, Readiness};
pub use types::{features::FeatureVector, prediction::Prediction, prediction::PurchaseClass};
