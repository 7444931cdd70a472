//! Artifact Loading
//!
//! Models and scalers are stored as JSON documents tagged by `kind`, or as
//! `.onnx` files for models.

use crate::linear::{LinearClassifier, LinearRegression, LogisticRegression};
use crate::model::{Predictor, Task};
use crate::onnx::OnnxModel;
use crate::scaler::{MinMaxScaler, Scaler, StandardScaler};
use crate::InferenceError;
use feature_engine::FeatureSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tract_onnx::prelude::Framework;
use tracing::info;

/// Serialized model parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    LinearRegression(LinearRegression),
    LogisticRegression(LogisticRegression),
    LinearClassifier(LinearClassifier),
}

impl ModelArtifact {
    pub fn task(&self) -> Task {
        match self {
            ModelArtifact::LinearRegression(_) => Task::Regression,
            ModelArtifact::LogisticRegression(_) | ModelArtifact::LinearClassifier(_) => Task::Classification,
        }
    }

    pub fn into_predictor(self) -> Arc<dyn Predictor> {
        match self {
            ModelArtifact::LinearRegression(m) => Arc::new(m),
            ModelArtifact::LogisticRegression(m) => Arc::new(m),
            ModelArtifact::LinearClassifier(m) => Arc::new(m),
        }
    }
}

/// Serialized scaler parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerArtifact {
    Standard(StandardScaler),
    MinMax(MinMaxScaler),
}

impl ScalerArtifact {
    /// Check parameter consistency and build the transform
    pub fn into_scaler(self) -> Result<Arc<dyn Scaler>, String> {
        match self {
            ScalerArtifact::Standard(s) => {
                s.check()?;
                Ok(Arc::new(s))
            }
            ScalerArtifact::MinMax(s) => {
                s.check()?;
                Ok(Arc::new(s))
            }
        }
    }
}

/// What an artifact file turned out to contain
#[derive(Debug)]
pub enum ArtifactSummary {
    Schema(FeatureSchema),
    Scaler(ScalerArtifact),
    Model(ModelArtifact),
    Onnx {
        inputs: usize,
        outputs: usize,
        nodes: usize,
    },
}

fn load_error(path: &Path, reason: impl ToString) -> InferenceError {
    InferenceError::ArtifactLoad {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn read_json(path: &Path) -> Result<Value, InferenceError> {
    let text = std::fs::read_to_string(path).map_err(|e| load_error(path, e))?;
    serde_json::from_str(&text).map_err(|e| load_error(path, e))
}

fn is_onnx(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("onnx"))
}

/// Load a model for the given task and input width
pub fn load_model(path: impl AsRef<Path>, task: Task, width: usize) -> Result<Arc<dyn Predictor>, InferenceError> {
    let path = path.as_ref();
    if is_onnx(path) {
        return Ok(Arc::new(OnnxModel::load(path, task, width)?));
    }

    let artifact: ModelArtifact = serde_json::from_value(read_json(path)?).map_err(|e| load_error(path, e))?;
    if artifact.task() != task {
        return Err(load_error(
            path,
            format!("expected a {} model, found {}", task.as_str(), artifact.task().as_str()),
        ));
    }

    let model = artifact.into_predictor();
    if let Some(model_width) = model.width() {
        if model_width != width {
            return Err(load_error(
                path,
                format!("model expects {model_width} features, schema has {width}"),
            ));
        }
    }

    info!("Loaded {} model from {}", task.as_str(), path.display());
    Ok(model)
}

/// Load a scaling transform
pub fn load_scaler(path: impl AsRef<Path>) -> Result<Arc<dyn Scaler>, InferenceError> {
    let path = path.as_ref();
    let artifact: ScalerArtifact = serde_json::from_value(read_json(path)?).map_err(|e| load_error(path, e))?;
    let scaler = artifact.into_scaler().map_err(|e| load_error(path, e))?;
    info!("Loaded scaler from {} (width {})", path.display(), scaler.width());
    Ok(scaler)
}

/// Load any supported artifact and report what it is
pub fn describe_artifact(path: impl AsRef<Path>) -> Result<ArtifactSummary, InferenceError> {
    let path = path.as_ref();
    if is_onnx(path) {
        let model = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(|e| load_error(path, e))?;
        let inputs = model.input_outlets().map_err(|e| load_error(path, e))?.len();
        let outputs = model.output_outlets().map_err(|e| load_error(path, e))?.len();
        return Ok(ArtifactSummary::Onnx {
            inputs,
            outputs,
            nodes: model.nodes().len(),
        });
    }

    let value = read_json(path)?;
    if value.is_array() {
        return serde_json::from_value(value)
            .map(ArtifactSummary::Schema)
            .map_err(|e| load_error(path, e));
    }

    let scaler_err = match serde_json::from_value::<ScalerArtifact>(value.clone()) {
        Ok(scaler) => return Ok(ArtifactSummary::Scaler(scaler)),
        Err(e) => e,
    };
    match serde_json::from_value::<ModelArtifact>(value) {
        Ok(model) => Ok(ArtifactSummary::Model(model)),
        Err(model_err) => Err(load_error(
            path,
            format!("not a scaler ({scaler_err}) nor a model ({model_err})"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn json_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_linear_regression() {
        let file = json_file(r#"{"kind": "linear_regression", "coef": [1.0, 2.0], "intercept": 3.0}"#);
        let model = load_model(file.path(), Task::Regression, 2).unwrap();
        assert_eq!(model.predict(&[1.0, 1.0]).unwrap(), 6.0);
    }

    #[test]
    fn test_task_mismatch_is_rejected() {
        let file = json_file(r#"{"kind": "linear_regression", "coef": [1.0], "intercept": 0.0}"#);
        let err = load_model(file.path(), Task::Classification, 1).unwrap_err();
        assert!(matches!(err, InferenceError::ArtifactLoad { .. }));
    }

    #[test]
    fn test_width_mismatch_is_rejected() {
        let file = json_file(r#"{"kind": "logistic_regression", "coef": [1.0, 1.0], "intercept": 0.0}"#);
        let err = load_model(file.path(), Task::Classification, 13).unwrap_err();
        assert!(err.to_string().contains("model expects 2 features, schema has 13"));
    }

    #[test]
    fn test_load_scaler_accepts_fitted_attribute_names() {
        let file = json_file(r#"{"kind": "standard", "mean_": [1.0], "scale_": [2.0]}"#);
        let scaler = load_scaler(file.path()).unwrap();
        assert_eq!(scaler.transform(&[5.0]).unwrap(), vec![2.0]);
    }

    #[test]
    fn test_inconsistent_scaler_is_rejected() {
        let file = json_file(r#"{"kind": "min_max", "min": [0.0, 1.0], "scale": [1.0]}"#);
        assert!(load_scaler(file.path()).is_err());
    }

    #[test]
    fn test_describe_detects_each_kind() {
        let schema = json_file(r#"["age", "sex"]"#);
        assert!(matches!(describe_artifact(schema.path()).unwrap(), ArtifactSummary::Schema(s) if s.len() == 2));

        let scaler = json_file(r#"{"kind": "standard", "mean": [0.0], "scale": [1.0]}"#);
        assert!(matches!(describe_artifact(scaler.path()).unwrap(), ArtifactSummary::Scaler(_)));

        let model = json_file(r#"{"kind": "linear_classifier", "coef": [0.5], "intercept": 0.0}"#);
        assert!(matches!(describe_artifact(model.path()).unwrap(), ArtifactSummary::Model(_)));

        let junk = json_file(r#"{"kind": "random_forest"}"#);
        assert!(describe_artifact(junk.path()).is_err());
    }

    #[test]
    fn test_bundled_artifacts_load() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../artifacts");

        let schema = FeatureSchema::load(root.join("manufacturing/feature_columns.json")).unwrap();
        let scaler = load_scaler(root.join("manufacturing/scaler.json")).unwrap();
        assert_eq!(scaler.width(), schema.len());
        load_model(root.join("manufacturing/model.json"), Task::Regression, schema.len()).unwrap();

        let schema = FeatureSchema::load(root.join("heart/feature_order.json")).unwrap();
        load_model(root.join("heart/model.json"), Task::Classification, schema.len()).unwrap();
    }

    #[test]
    fn test_onnx_model_loads_by_extension() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/classifier.onnx");
        let model = load_model(&path, Task::Classification, 2).unwrap();
        assert_eq!(model.width(), Some(2));
        assert_eq!(model.predict(&[1.0, 0.0]).unwrap(), 1.0);

        match describe_artifact(&path).unwrap() {
            ArtifactSummary::Onnx { inputs, outputs, .. } => {
                assert_eq!(inputs, 1);
                assert_eq!(outputs, 2);
            }
            other => panic!("unexpected summary {other:?}"),
        }
    }
}
