//! Model Capability

use crate::InferenceError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of output a model produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    /// Single continuous value
    Regression,
    /// Discrete class label, optionally with a positive-class probability
    Classification,
}

impl Task {
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Regression => "regression",
            Task::Classification => "classification",
        }
    }
}

/// Prediction result returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "task")]
pub enum Prediction {
    Regression {
        value: f64,
    },
    Classification {
        label: i64,
        /// Probability of the positive class, when the model provides one
        probability: Option<f64>,
    },
}

impl Prediction {
    pub fn task(&self) -> Task {
        match self {
            Prediction::Regression { .. } => Task::Regression,
            Prediction::Classification { .. } => Task::Classification,
        }
    }
}

/// A trained model that maps an ordered feature vector to an output.
///
/// `predict` returns the regression value or the class label as a number.
pub trait Predictor: Send + Sync + fmt::Debug {
    fn task(&self) -> Task;

    /// Expected input length, if the backend knows it
    fn width(&self) -> Option<usize>;

    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError>;

    /// Probability of the positive class, for classifiers that support it
    fn predict_proba(&self, _features: &[f64]) -> Result<Option<f64>, InferenceError> {
        Ok(None)
    }

    /// Output and positive-class probability together. Backends that produce
    /// both in one evaluation override this.
    fn score(&self, features: &[f64]) -> Result<(f64, Option<f64>), InferenceError> {
        Ok((self.predict(features)?, self.predict_proba(features)?))
    }
}
