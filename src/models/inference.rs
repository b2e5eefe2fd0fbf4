//! Inference service: scale, score, decide

use crate::config::ArtifactsConfig;
use crate::error::PredictionError;
use crate::feature_extractor::FeatureExtractor;
use crate::models::loader::{ArtifactLoader, LoadedArtifacts};
use crate::models::scaler::StandardScaler;
use crate::types::features::FeatureVector;
use crate::types::prediction::Prediction;
use anyhow::Result;
use tracing::{debug, error, warn};

/// A trained model mapping a normalized feature row to P(will buy)
pub trait Classifier: Send + Sync {
    /// Model name for log lines
    fn name(&self) -> &str;

    /// Positive-class probability for one normalized row
    fn predict_proba(&self, features: &[f32]) -> Result<f64>;
}

enum ContextState {
    Ready {
        scaler: StandardScaler,
        classifier: Box<dyn Classifier>,
    },
    NotReady {
        reasons: Vec<String>,
    },
}

/// Immutable inference context, built once at startup and shared by reference.
///
/// Holds either both artifacts or the reasons they are unavailable.
pub struct InferenceContext {
    state: ContextState,
    extractor: FeatureExtractor,
}

impl InferenceContext {
    /// Create a ready context from already-loaded artifacts
    pub fn new(scaler: StandardScaler, classifier: Box<dyn Classifier>) -> Self {
        Self {
            state: ContextState::Ready { scaler, classifier },
            extractor: FeatureExtractor::new(),
        }
    }

    /// Create a context that refuses every prediction
    pub fn not_ready(reasons: Vec<String>) -> Self {
        Self {
            state: ContextState::NotReady { reasons },
            extractor: FeatureExtractor::new(),
        }
    }

    /// Build from the loader's output; ready only when both artifacts loaded
    pub fn from_artifacts(artifacts: LoadedArtifacts) -> Self {
        let LoadedArtifacts {
            readiness,
            scaler,
            classifier,
        } = artifacts;

        match (readiness.is_ready(), scaler, classifier) {
            (true, Some(scaler), Some(classifier)) => Self::new(scaler, classifier),
            _ => Self::not_ready(readiness.reasons()),
        }
    }

    /// Load the configured artifacts and build a context from them
    pub fn load(config: &ArtifactsConfig) -> Self {
        Self::from_artifacts(ArtifactLoader::new(config).load())
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ContextState::Ready { .. })
    }

    /// Reasons predictions are refused; empty when ready
    pub fn not_ready_reasons(&self) -> &[String] {
        match &self.state {
            ContextState::Ready { .. } => &[],
            ContextState::NotReady { reasons } => reasons,
        }
    }

    /// Run one prediction.
    ///
    /// Fails with `NotReady` before touching any artifact when the pair is not
    /// loaded, and with `Inference` when scaling or scoring fails.
    pub fn predict(&self, features: &FeatureVector) -> Result<Prediction, PredictionError> {
        let (scaler, classifier) = match &self.state {
            ContextState::Ready { scaler, classifier } => (scaler, classifier.as_ref()),
            ContextState::NotReady { reasons } => {
                warn!(reasons = ?reasons, "Prediction requested before artifacts are ready");
                return Err(PredictionError::NotReady {
                    reasons: reasons.clone(),
                });
            }
        };

        let row = self.extractor.extract(features);

        let scaled = scaler.transform(&row).map_err(|e| {
            error!(kind = "scaling", error = %format!("{:#}", e), "Prediction failed");
            PredictionError::inference("scaling", &e)
        })?;
        let scaled: Vec<f32> = scaled.iter().map(|&v| v as f32).collect();

        let probability = classifier.predict_proba(&scaled).map_err(|e| {
            error!(
                model = %classifier.name(),
                kind = "scoring",
                error = %format!("{:#}", e),
                "Prediction failed"
            );
            PredictionError::inference("scoring", &e)
        })?;

        if !(0.0..=1.0).contains(&probability) {
            error!(
                model = %classifier.name(),
                kind = "invalid_probability",
                probability = probability,
                "Prediction failed"
            );
            return Err(PredictionError::Inference {
                kind: "invalid_probability".to_string(),
                message: format!("classifier returned {} outside [0, 1]", probability),
            });
        }

        let prediction = Prediction::from_probability(probability);

        debug!(
            age = features.age,
            salary = features.salary,
            scaled = ?scaled,
            probability = probability,
            class = prediction.class.label(),
            confidence = prediction.confidence,
            "Prediction complete"
        );

        Ok(prediction)
    }
}
