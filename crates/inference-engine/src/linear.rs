//! Linear Model Backends
//!
//! Coefficients exported from a fitted linear model, stored as JSON.

use crate::model::{Predictor, Task};
use crate::{check_width, InferenceError};
use serde::{Deserialize, Serialize};

fn decision(coef: &[f64], intercept: f64, features: &[f64]) -> Result<f64, InferenceError> {
    check_width(coef.len(), features)?;
    let value = coef.iter().zip(features).map(|(w, x)| w * x).sum::<f64>() + intercept;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InferenceError::ModelInvocation(format!("decision value is not finite ({value})")))
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn default_threshold() -> f64 {
    0.5
}

/// Ordinary least squares regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    #[serde(alias = "coef_")]
    pub coef: Vec<f64>,
    #[serde(alias = "intercept_")]
    pub intercept: f64,
}

impl Predictor for LinearRegression {
    fn task(&self) -> Task {
        Task::Regression
    }

    fn width(&self) -> Option<usize> {
        Some(self.coef.len())
    }

    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError> {
        decision(&self.coef, self.intercept, features)
    }
}

/// Binary logistic regression; label 1 is the positive class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    #[serde(alias = "coef_")]
    pub coef: Vec<f64>,
    #[serde(alias = "intercept_")]
    pub intercept: f64,
    /// Minimum positive-class probability for label 1
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Predictor for LogisticRegression {
    fn task(&self) -> Task {
        Task::Classification
    }

    fn width(&self) -> Option<usize> {
        Some(self.coef.len())
    }

    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError> {
        let p = sigmoid(decision(&self.coef, self.intercept, features)?);
        Ok(if p >= self.threshold { 1.0 } else { 0.0 })
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Option<f64>, InferenceError> {
        decision(&self.coef, self.intercept, features).map(|z| Some(sigmoid(z)))
    }
}

/// Linear classifier without calibrated probabilities (e.g. a linear SVM)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearClassifier {
    #[serde(alias = "coef_")]
    pub coef: Vec<f64>,
    #[serde(alias = "intercept_")]
    pub intercept: f64,
}

impl Predictor for LinearClassifier {
    fn task(&self) -> Task {
        Task::Classification
    }

    fn width(&self) -> Option<usize> {
        Some(self.coef.len())
    }

    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError> {
        let z = decision(&self.coef, self.intercept, features)?;
        Ok(if z > 0.0 { 1.0 } else { 0.0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_regression() {
        let model = LinearRegression {
            coef: vec![2.0, -1.0],
            intercept: 0.5,
        };
        assert_eq!(model.predict(&[3.0, 1.0]).unwrap(), 5.5);
        assert_eq!(model.predict_proba(&[3.0, 1.0]).unwrap(), None);
    }

    #[test]
    fn test_wrong_width_is_rejected() {
        let model = LinearRegression {
            coef: vec![1.0, 1.0, 1.0],
            intercept: 0.0,
        };
        assert_eq!(
            model.predict(&[1.0]).unwrap_err(),
            InferenceError::InvalidInputShape { expected: 3, actual: 1 }
        );
    }

    #[test]
    fn test_logistic_label_and_probability() {
        let model = LogisticRegression {
            coef: vec![1.0],
            intercept: 0.0,
            threshold: 0.5,
        };

        assert_eq!(model.predict(&[2.0]).unwrap(), 1.0);
        assert_eq!(model.predict(&[-2.0]).unwrap(), 0.0);

        let p = model.predict_proba(&[0.0]).unwrap().unwrap();
        assert!((p - 0.5).abs() < 1e-12);

        let p = model.predict_proba(&[2.0]).unwrap().unwrap();
        assert!((p - 0.880797).abs() < 1e-6);
    }

    #[test]
    fn test_sigmoid_is_stable_for_large_inputs() {
        assert_eq!(sigmoid(1000.0), 1.0);
        assert_eq!(sigmoid(-1000.0), 0.0);
    }

    #[test]
    fn test_linear_classifier_has_no_probability() {
        let model = LinearClassifier {
            coef: vec![1.0, 1.0],
            intercept: -1.0,
        };
        assert_eq!(model.predict(&[1.0, 1.0]).unwrap(), 1.0);
        assert_eq!(model.predict(&[0.5, 0.5]).unwrap(), 0.0);
        assert_eq!(model.predict_proba(&[1.0, 1.0]).unwrap(), None);
    }

    #[test]
    fn test_threshold_defaults_when_absent() {
        let model: LogisticRegression = serde_json::from_str(r#"{"coef_": [0.1], "intercept_": -0.2}"#).unwrap();
        assert_eq!(model.threshold, 0.5);
    }
}
