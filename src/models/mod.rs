//! Artifact loading and inference components

pub mod inference;
pub mod loader;
pub mod scaler;

pub use inference::{Classifier, InferenceContext};
pub use loader::{ArtifactLoader, ModelLoader};
pub use scaler::StandardScaler;
