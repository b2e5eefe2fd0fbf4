//! Error taxonomy surfaced to the session front-end

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which of the two required artifacts an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Model,
    Scaler,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Model => "model",
            ArtifactKind::Scaler => "scaler",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by the artifact loader and the inference service.
///
/// None of these are fatal: the session reports them and keeps accepting input.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PredictionError {
    /// One or both artifact files are absent
    #[error(
        "model or scaler not found; expected model at {} and scaler at {}",
        model_path.display(),
        scaler_path.display()
    )]
    ArtifactNotFound {
        model_path: PathBuf,
        scaler_path: PathBuf,
    },

    /// An artifact file exists but could not be deserialized
    #[error("failed to load {artifact}: {kind}: {message}")]
    ArtifactLoad {
        artifact: ArtifactKind,
        kind: String,
        message: String,
    },

    /// Scaling or scoring failed for a single request
    #[error("prediction failed: {kind}: {message}")]
    Inference { kind: String, message: String },

    /// A prediction was requested before both artifacts were loaded
    #[error("model or scaler is not ready: {}", reasons.join("; "))]
    NotReady { reasons: Vec<String> },
}

impl PredictionError {
    /// Short category label used in log lines
    pub fn kind(&self) -> &str {
        match self {
            PredictionError::ArtifactNotFound { .. } => "artifact_not_found",
            PredictionError::ArtifactLoad { kind, .. } => kind,
            PredictionError::Inference { kind, .. } => kind,
            PredictionError::NotReady { .. } => "not_ready",
        }
    }

    pub(crate) fn inference(kind: &str, err: &anyhow::Error) -> Self {
        PredictionError::Inference {
            kind: kind.to_string(),
            message: format!("{:#}", err),
        }
    }
}

/// Classifies an error chain into the category reported alongside its message,
/// using `fallback` when no known root cause is found
pub(crate) fn error_kind(err: &anyhow::Error, fallback: &'static str) -> &'static str {
    for cause in err.chain() {
        if cause.is::<std::io::Error>() {
            return "io";
        }
        if cause.is::<serde_json::Error>() {
            return "json";
        }
    }
    fallback
}
