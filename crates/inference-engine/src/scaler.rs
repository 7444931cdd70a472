//! Feature Scaling Transforms
//!
//! Fitted parameters are loaded from an artifact; nothing is updated at
//! prediction time.

use crate::{check_width, InferenceError};
use serde::{Deserialize, Serialize};

/// Deterministic per-feature transform applied before the model call
pub trait Scaler: Send + Sync {
    /// Number of features the transform was fitted on
    fn width(&self) -> usize;

    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError>;
}

/// Z-score scaling: `(x - mean) / scale`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    #[serde(alias = "mean_")]
    pub mean: Vec<f64>,
    #[serde(alias = "scale_")]
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, String> {
        let scaler = Self { mean, scale };
        scaler.check()?;
        Ok(scaler)
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        if self.mean.len() != self.scale.len() {
            return Err(format!(
                "mean has {} entries but scale has {}",
                self.mean.len(),
                self.scale.len()
            ));
        }
        if self.mean.iter().chain(&self.scale).any(|v| !v.is_finite()) {
            return Err("parameters must be finite".to_string());
        }
        Ok(())
    }
}

impl Scaler for StandardScaler {
    fn width(&self) -> usize {
        self.mean.len()
    }

    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_width(self.width(), features)?;
        Ok(features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| {
                // Constant features were fitted with a zero scale
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (x - mean) / scale
            })
            .collect())
    }
}

/// Min-max scaling: `x * scale + min`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    #[serde(alias = "min_")]
    pub min: Vec<f64>,
    #[serde(alias = "scale_")]
    pub scale: Vec<f64>,
}

impl MinMaxScaler {
    /// Fit parameters mapping `[data_min, data_max]` onto `[0, 1]`
    pub fn from_bounds(data_min: &[f64], data_max: &[f64]) -> Result<Self, String> {
        if data_min.len() != data_max.len() {
            return Err("bounds have different lengths".to_string());
        }
        let scale: Vec<f64> = data_min
            .iter()
            .zip(data_max)
            .map(|(lo, hi)| {
                let range = hi - lo;
                if range == 0.0 {
                    1.0
                } else {
                    1.0 / range
                }
            })
            .collect();
        let min = data_min.iter().zip(&scale).map(|(lo, s)| -lo * s).collect();
        let scaler = Self { min, scale };
        scaler.check()?;
        Ok(scaler)
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        if self.min.len() != self.scale.len() {
            return Err(format!(
                "min has {} entries but scale has {}",
                self.min.len(),
                self.scale.len()
            ));
        }
        if self.min.iter().chain(&self.scale).any(|v| !v.is_finite()) {
            return Err("parameters must be finite".to_string());
        }
        Ok(())
    }
}

impl Scaler for MinMaxScaler {
    fn width(&self) -> usize {
        self.min.len()
    }

    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_width(self.width(), features)?;
        Ok(features
            .iter()
            .zip(self.scale.iter().zip(&self.min))
            .map(|(x, (scale, min))| x * scale + min)
            .collect())
    }
}
