//! Prediction result data structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed decision threshold: probabilities strictly above it are class 1
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Discrete purchase decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseClass {
    /// Class 0
    WillNotBuy,
    /// Class 1
    WillBuy,
}

impl PurchaseClass {
    /// Threshold a positive-class probability
    pub fn from_probability(probability: f64) -> Self {
        if probability > DECISION_THRESHOLD {
            PurchaseClass::WillBuy
        } else {
            PurchaseClass::WillNotBuy
        }
    }

    /// Numeric label (0 or 1)
    pub fn label(&self) -> u8 {
        match self {
            PurchaseClass::WillNotBuy => 0,
            PurchaseClass::WillBuy => 1,
        }
    }
}

impl fmt::Display for PurchaseClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PurchaseClass::WillNotBuy => f.write_str("will not buy"),
            PurchaseClass::WillBuy => f.write_str("will buy"),
        }
    }
}

/// Outcome of a single successful prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Chosen class
    pub class: PurchaseClass,

    /// Raw classifier output: probability of class 1
    pub probability: f64,

    /// Probability mass of the chosen class, always in [0.5, 1.0]
    pub confidence: f64,
}

impl Prediction {
    /// Derive class and confidence from the classifier's output
    pub fn from_probability(probability: f64) -> Self {
        let class = PurchaseClass::from_probability(probability);
        let confidence = match class {
            PurchaseClass::WillBuy => probability,
            PurchaseClass::WillNotBuy => 1.0 - probability,
        };

        Self {
            class,
            probability,
            confidence,
        }
    }

    /// Confidence as a percentage string with two decimals, e.g. `73.00%`
    pub fn confidence_percent(&self) -> String {
        format!("{:.2}%", self.confidence * 100.0)
    }
}
