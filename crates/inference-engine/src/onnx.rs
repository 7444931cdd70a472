//! ONNX Model Backend using tract

use crate::model::{Predictor, Task};
use crate::{check_width, InferenceError};
use std::fmt;
use std::path::Path;
use tract_onnx::prelude::*;
use tracing::{debug, info};

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Model exported to ONNX, taking a `[1, width]` f32 input.
///
/// Regressors read output 0. Classifiers read the label from output 0 and,
/// when present, the class probability matrix from output 1 (export
/// without a ZipMap so it stays a plain tensor).
pub struct OnnxModel {
    path: String,
    task: Task,
    width: usize,
    plan: OnnxPlan,
}

impl OnnxModel {
    /// Load and optimize the model for a fixed input width
    pub fn load(path: impl AsRef<Path>, task: Task, width: usize) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        let load_error = |e: TractError| InferenceError::ArtifactLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, width]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(load_error)?;

        info!("Loaded ONNX {} model from {} (width {})", task.as_str(), path.display(), width);
        Ok(Self {
            path: path.display().to_string(),
            task,
            width,
            plan,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn run(&self, features: &[f64]) -> Result<TVec<TValue>, InferenceError> {
        check_width(self.width, features)?;
        let input: Tensor = tract_ndarray::Array2::from_shape_vec(
            (1, self.width),
            features.iter().map(|&v| v as f32).collect(),
        )
        .map_err(|e| InferenceError::ModelInvocation(e.to_string()))?
        .into();

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::ModelInvocation(e.to_string()))?;
        debug!("ONNX model produced {} outputs", outputs.len());
        Ok(outputs)
    }
}

fn output_values(outputs: &TVec<TValue>, index: usize) -> Result<Vec<f64>, InferenceError> {
    let output = outputs
        .get(index)
        .ok_or_else(|| InferenceError::ModelInvocation(format!("model has no output {index}")))?;
    let values = output
        .cast_to::<f64>()
        .and_then(|tensor| tensor.as_slice::<f64>().map(|s| s.to_vec()))
        .map_err(|e| InferenceError::ModelInvocation(e.to_string()))?;
    if values.is_empty() {
        return Err(InferenceError::ModelInvocation(format!("output {index} is empty")));
    }
    Ok(values)
}

impl Predictor for OnnxModel {
    fn task(&self) -> Task {
        self.task
    }

    fn width(&self) -> Option<usize> {
        Some(self.width)
    }

    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError> {
        let outputs = self.run(features)?;
        Ok(output_values(&outputs, 0)?[0])
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Option<f64>, InferenceError> {
        if self.task != Task::Classification {
            return Ok(None);
        }
        let outputs = self.run(features)?;
        positive_probability(&outputs)
    }

    fn score(&self, features: &[f64]) -> Result<(f64, Option<f64>), InferenceError> {
        let outputs = self.run(features)?;
        let output = output_values(&outputs, 0)?[0];
        let probability = match self.task {
            Task::Classification => positive_probability(&outputs)?,
            Task::Regression => None,
        };
        Ok((output, probability))
    }
}

fn positive_probability(outputs: &TVec<TValue>) -> Result<Option<f64>, InferenceError> {
    if outputs.len() < 2 {
        return Ok(None);
    }
    let probabilities = output_values(outputs, 1)?;
    // Column 1 is the positive class; a single column is already P(1)
    Ok(Some(probabilities.get(1).copied().unwrap_or(probabilities[0])))
}

impl fmt::Debug for OnnxModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnnxModel")
            .field("path", &self.path)
            .field("task", &self.task)
            .field("width", &self.width)
            .finish_non_exhaustive()
    }
}
