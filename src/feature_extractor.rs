//! Feature extraction for the purchase classifier.
//!
//! Produces the raw input row in the column order the scaler and the
//! network were fitted with: age first, then estimated salary.

use crate::types::features::FeatureVector;

/// Column names of the fitted feature order
pub const FEATURE_NAMES: [&str; FeatureVector::LEN] = ["Age", "EstimatedSalary"];

/// Turns a request's feature vector into the ordered model input row.
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract the raw (unscaled) row
    pub fn extract(&self, features: &FeatureVector) -> Vec<f64> {
        vec![features.age as f64, features.salary]
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        FEATURE_NAMES.len()
    }

    /// Get feature names, in extraction order
    pub fn feature_names(&self) -> &'static [&'static str] {
        &FEATURE_NAMES
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}
