//! Raw model input for a single prediction request

use serde::{Deserialize, Serialize};

/// The (age, salary) pair submitted by the user.
///
/// Range constraints (age in [18, 100], salary >= 0) are enforced by the
/// input front-end before a `FeatureVector` is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Age in years
    pub age: u32,

    /// Estimated yearly salary
    pub salary: f64,
}

impl FeatureVector {
    /// Number of features, in the order the scaler was fitted with
    pub const LEN: usize = 2;

    pub fn new(age: u32, salary: f64) -> Self {
        Self { age, salary }
    }
}
