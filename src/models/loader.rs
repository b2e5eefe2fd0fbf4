//! Artifact loader: ONNX classifier session plus fitted scaler

use crate::config::ArtifactsConfig;
use crate::error::{error_kind, ArtifactKind, PredictionError};
use crate::feature_extractor::FeatureExtractor;
use crate::models::inference::Classifier;
use crate::models::scaler::StandardScaler;
use anyhow::{Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Loaded ONNX classifier with metadata
pub struct LoadedModel {
    /// Model name
    pub name: String,
    /// ONNX Runtime session; running it needs exclusive access
    session: Mutex<Session>,
    /// Input name for the model
    pub input_name: String,
    /// Output name for probabilities
    pub output_name: String,
}

impl fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModel")
            .field("name", &self.name)
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .finish_non_exhaustive()
    }
}

impl Classifier for LoadedModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict_proba(&self, features: &[f32]) -> Result<f64> {
        use ort::value::Tensor;

        // Prepare input tensor - shape [1, num_features]
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor = Tensor::from_array((shape, features.to_vec()))
            .context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .with_context(|| format!("Failed to run model {}", self.name))?;

        let output = outputs
            .get(self.output_name.as_str())
            .with_context(|| format!("Model produced no output named {}", self.output_name))?;

        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .context("Model output is not a float tensor")?;
        let dims: Vec<i64> = shape.iter().copied().collect();

        let probability = probability_from_tensor(&dims, data)?;
        debug!(model = %self.name, probability = probability, "Extracted from tensor");

        Ok(probability)
    }
}

/// Extract the positive-class probability from the first row of an output tensor.
///
/// Sigmoid heads give `[batch, 1]`; two-class softmax heads give `[batch, 2]`,
/// in which case column 1 is the positive class.
pub fn probability_from_tensor(dims: &[i64], data: &[f32]) -> Result<f64> {
    let columns = match dims {
        [_, columns] => *columns,
        [columns] => *columns,
        _ => anyhow::bail!("unexpected output shape {:?}", dims),
    };

    let value = match columns {
        1 => data.first(),
        2 => data.get(1),
        _ => anyhow::bail!("expected 1 or 2 output columns, got shape {:?}", dims),
    };

    value
        .map(|&v| v as f64)
        .with_context(|| format!("output tensor of shape {:?} holds no data", dims))
}

/// Loader for ONNX models
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with specified number of threads
    pub fn with_threads(onnx_threads: usize) -> Self {
        Self { onnx_threads }
    }

    /// Load a single ONNX model from file
    pub fn load_model<P: AsRef<Path>>(&self, path: P, name: &str) -> Result<LoadedModel> {
        let path = path.as_ref();

        info!(model = %name, path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model from {:?}", path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .context("Model declares no inputs")?;

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob") || o.name.contains("output"))
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .context("Model declares no outputs")?;

        info!(
            model = %name,
            input = %input_name,
            output = %output_name,
            "Model loaded successfully"
        );

        Ok(LoadedModel {
            name: name.to_string(),
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }
}

/// Load outcome of one artifact
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactState {
    Loaded,
    /// File absent at the expected path
    Missing,
    /// Not attempted because the other artifact of the pair is missing
    Skipped,
    /// File present but deserialization failed
    Failed { kind: String, message: String },
}

/// Per-artifact diagnostics, with the absolute path that was checked
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactReport {
    pub artifact: ArtifactKind,
    pub path: PathBuf,
    pub state: ArtifactState,
}

impl ArtifactReport {
    pub fn is_loaded(&self) -> bool {
        self.state == ArtifactState::Loaded
    }

    /// Human-readable one-line status
    pub fn describe(&self) -> String {
        match &self.state {
            ArtifactState::Loaded => format!("{}: loaded from {}", self.artifact, self.path.display()),
            ArtifactState::Missing => format!("{}: not found at {}", self.artifact, self.path.display()),
            ArtifactState::Skipped => format!(
                "{}: not loaded because its pair is incomplete ({})",
                self.artifact,
                self.path.display()
            ),
            ArtifactState::Failed { kind, message } => {
                format!("{}: failed to load ({}: {})", self.artifact, kind, message)
            }
        }
    }
}

/// Readiness of the artifact pair. Inference needs both loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Readiness {
    pub model: ArtifactReport,
    pub scaler: ArtifactReport,
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        self.model.is_loaded() && self.scaler.is_loaded()
    }

    /// Why the pair is not ready; empty when ready
    pub fn reasons(&self) -> Vec<String> {
        [&self.model, &self.scaler]
            .into_iter()
            .filter(|report| !report.is_loaded())
            .map(ArtifactReport::describe)
            .collect()
    }

    /// Typed errors behind a not-ready state.
    ///
    /// Missing files yield a single `ArtifactNotFound` for the pair; each failed
    /// deserialization yields its own `ArtifactLoad`.
    pub fn errors(&self) -> Vec<PredictionError> {
        let mut errors = Vec::new();

        if self.model.state == ArtifactState::Missing || self.scaler.state == ArtifactState::Missing {
            errors.push(PredictionError::ArtifactNotFound {
                model_path: self.model.path.clone(),
                scaler_path: self.scaler.path.clone(),
            });
        }

        for report in [&self.model, &self.scaler] {
            if let ArtifactState::Failed { kind, message } = &report.state {
                errors.push(PredictionError::ArtifactLoad {
                    artifact: report.artifact,
                    kind: kind.clone(),
                    message: message.clone(),
                });
            }
        }

        errors
    }
}

/// Everything the loader produced, ready to be turned into an inference context
pub struct LoadedArtifacts {
    pub readiness: Readiness,
    pub scaler: Option<StandardScaler>,
    pub classifier: Option<Box<dyn Classifier>>,
}

/// Locates and loads the classifier/scaler pair
pub struct ArtifactLoader {
    model_path: PathBuf,
    scaler_path: PathBuf,
    model_loader: ModelLoader,
}

impl ArtifactLoader {
    /// Create a loader for the configured paths
    pub fn new(config: &ArtifactsConfig) -> Self {
        Self {
            model_path: config.model_path.clone(),
            scaler_path: config.scaler_path.clone(),
            model_loader: ModelLoader::with_threads(config.onnx_threads),
        }
    }

    /// Check both paths, then load each artifact independently.
    ///
    /// Never fails: every problem is logged and recorded in the returned readiness.
    pub fn load(&self) -> LoadedArtifacts {
        let model_path = absolute_path(&self.model_path);
        let scaler_path = absolute_path(&self.scaler_path);

        let model_exists = model_path.is_file();
        let scaler_exists = scaler_path.is_file();

        if !(model_exists && scaler_exists) {
            let state_of = |exists: bool| {
                if exists {
                    ArtifactState::Skipped
                } else {
                    ArtifactState::Missing
                }
            };

            error!(
                model_path = %model_path.display(),
                model_exists = model_exists,
                scaler_path = %scaler_path.display(),
                scaler_exists = scaler_exists,
                "Model or scaler not found"
            );

            return LoadedArtifacts {
                readiness: Readiness {
                    model: ArtifactReport {
                        artifact: ArtifactKind::Model,
                        path: model_path,
                        state: state_of(model_exists),
                    },
                    scaler: ArtifactReport {
                        artifact: ArtifactKind::Scaler,
                        path: scaler_path,
                        state: state_of(scaler_exists),
                    },
                },
                scaler: None,
                classifier: None,
            };
        }

        let (classifier, model_state) = match self.model_loader.load_model(&model_path, "purchase_classifier") {
            Ok(model) => (Some(Box::new(model) as Box<dyn Classifier>), ArtifactState::Loaded),
            Err(e) => (None, failed(ArtifactKind::Model, &e, "onnx")),
        };

        info!(path = %scaler_path.display(), "Loading scaler");
        let extractor = FeatureExtractor::new();
        let scaler = StandardScaler::load(&scaler_path).and_then(|scaler| {
            scaler.check_feature_order(extractor.feature_names())?;
            Ok(scaler)
        });
        let (scaler, scaler_state) = match scaler {
            Ok(scaler) => {
                info!(features = scaler.feature_count(), "Scaler loaded successfully");
                (Some(scaler), ArtifactState::Loaded)
            }
            Err(e) => (None, failed(ArtifactKind::Scaler, &e, "invalid_artifact")),
        };

        let readiness = Readiness {
            model: ArtifactReport {
                artifact: ArtifactKind::Model,
                path: model_path,
                state: model_state,
            },
            scaler: ArtifactReport {
                artifact: ArtifactKind::Scaler,
                path: scaler_path,
                state: scaler_state,
            },
        };

        if readiness.is_ready() {
            info!("Model and scaler loaded");
        } else {
            warn!(reasons = ?readiness.reasons(), "Artifacts not ready; predictions disabled");
        }

        LoadedArtifacts {
            readiness,
            scaler,
            classifier,
        }
    }
}

fn failed(artifact: ArtifactKind, err: &anyhow::Error, fallback_kind: &'static str) -> ArtifactState {
    let kind = error_kind(err, fallback_kind);
    error!(artifact = %artifact, kind = kind, error = %format!("{:#}", err), "Failed to load artifact");
    ArtifactState::Failed {
        kind: kind.to_string(),
        message: format!("{:#}", err),
    }
}

/// Resolve against the working directory so operators see where files were expected
fn absolute_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
