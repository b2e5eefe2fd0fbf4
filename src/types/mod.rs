//! Type definitions for the prediction session

pub mod features;
pub mod prediction;

pub use features::FeatureVector;
pub use prediction::{Prediction, PurchaseClass};
