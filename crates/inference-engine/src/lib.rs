//! Prediction Engine
//!
//! Loads pre-trained scaling transforms and models once, then turns raw
//! input records into predictions: encode, assemble, scale, predict.

mod artifact;
mod engine;
mod linear;
mod model;
mod onnx;
mod scaler;

pub use artifact::{describe_artifact, load_model, load_scaler, ArtifactSummary, ModelArtifact, ScalerArtifact};
pub use engine::{InferenceEngine, InferenceResult, PredictError};
pub use linear::{LinearClassifier, LinearRegression, LogisticRegression};
pub use model::{Prediction, Predictor, Task};
pub use onnx::OnnxModel;
pub use scaler::{MinMaxScaler, Scaler, StandardScaler};

use thiserror::Error;

/// Errors raised while loading or invoking a model or scaler
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("Failed to load artifact {path}: {reason}")]
    ArtifactLoad { path: String, reason: String },
    #[error("Model invocation failed: {0}")]
    ModelInvocation(String),
    #[error("Invalid input shape: expected {expected} features, got {actual}")]
    InvalidInputShape { expected: usize, actual: usize },
}

pub(crate) fn check_width(expected: usize, features: &[f64]) -> Result<(), InferenceError> {
    if features.len() == expected {
        Ok(())
    } else {
        Err(InferenceError::InvalidInputShape {
            expected,
            actual: features.len(),
        })
    }
}
