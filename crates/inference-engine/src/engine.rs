//! Inference Engine Implementation

use crate::model::{Prediction, Predictor, Task};
use crate::scaler::Scaler;
use crate::InferenceError;
use data_validator::{Encoders, ValidationError};
use feature_engine::{FeatureAssembler, FeatureError, FeatureVector, RawRecord};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

/// Any failure turning a raw record into a prediction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error(transparent)]
    Features(#[from] FeatureError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl PredictError {
    /// Whether the caller can fix this by changing the input
    pub fn is_client_error(&self) -> bool {
        match self {
            PredictError::Features(e) => e.is_client_error(),
            PredictError::Validation(_) => true,
            PredictError::Inference(_) => false,
        }
    }
}

/// Result of inference operation
#[derive(Debug, Clone)]
pub struct InferenceResult {
    /// The prediction
    pub prediction: Prediction,
    /// The assembled, unscaled feature vector that was scored
    pub features: FeatureVector,
    /// Inference latency in milliseconds
    pub latency_ms: f64,
}

/// Everything needed to score one deployed model. Immutable after construction.
pub struct InferenceEngine {
    name: String,
    encoders: Encoders,
    assembler: FeatureAssembler,
    scaler: Option<Arc<dyn Scaler>>,
    model: Arc<dyn Predictor>,
}

impl InferenceEngine {
    /// Create an engine, checking that scaler and model agree with the schema width
    pub fn new(
        name: impl Into<String>,
        encoders: Encoders,
        assembler: FeatureAssembler,
        scaler: Option<Arc<dyn Scaler>>,
        model: Arc<dyn Predictor>,
    ) -> Result<Self, InferenceError> {
        let name = name.into();
        let width = assembler.schema().len();

        if let Some(scaler) = &scaler {
            if scaler.width() != width {
                return Err(InferenceError::InvalidInputShape {
                    expected: width,
                    actual: scaler.width(),
                });
            }
        }
        if let Some(model_width) = model.width() {
            if model_width != width {
                return Err(InferenceError::InvalidInputShape {
                    expected: width,
                    actual: model_width,
                });
            }
        }

        info!(
            "Creating inference engine {}: {} model, {} features, scaler={}",
            name,
            model.task().as_str(),
            width,
            scaler.is_some()
        );

        Ok(Self {
            name,
            encoders,
            assembler,
            scaler,
            model,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn task(&self) -> Task {
        self.model.task()
    }

    pub fn assembler(&self) -> &FeatureAssembler {
        &self.assembler
    }

    pub fn encoders(&self) -> &Encoders {
        &self.encoders
    }

    pub fn has_scaler(&self) -> bool {
        self.scaler.is_some()
    }

    /// Encode labels, validate, derive and assemble, without calling the model
    pub fn prepare(&self, mut record: RawRecord) -> Result<FeatureVector, PredictError> {
        self.encoders.encode(&mut record)?;
        Ok(self.assembler.assemble_record(record)?)
    }

    /// Run the full pipeline on a raw record
    pub fn predict(&self, record: RawRecord) -> Result<InferenceResult, PredictError> {
        let start = Instant::now();
        let features = self.prepare(record)?;
        let prediction = self.predict_vector(&features)?;
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        debug!("{}: inference completed in {:.3}ms", self.name, latency_ms);
        Ok(InferenceResult {
            prediction,
            features,
            latency_ms,
        })
    }

    /// Scale (if configured) and score an already assembled vector
    pub fn predict_vector(&self, features: &FeatureVector) -> Result<Prediction, InferenceError> {
        let scaled;
        let input = match &self.scaler {
            Some(scaler) => {
                scaled = scaler.transform(features.values())?;
                scaled.as_slice()
            }
            None => features.values(),
        };

        let (output, probability) = match self.model.task() {
            Task::Regression => (self.model.predict(input)?, None),
            Task::Classification => self.model.score(input)?,
        };
        if !output.is_finite() {
            return Err(InferenceError::ModelInvocation(format!("model returned {output}")));
        }

        match self.model.task() {
            Task::Regression => Ok(Prediction::Regression { value: output }),
            Task::Classification => {
                if let Some(p) = probability {
                    if !(0.0..=1.0).contains(&p) {
                        return Err(InferenceError::ModelInvocation(format!(
                            "probability {p} is outside [0, 1]"
                        )));
                    }
                }
                Ok(Prediction::Classification {
                    label: output.round() as i64,
                    probability,
                })
            }
        }
    }
}

impl fmt::Debug for InferenceEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceEngine")
            .field("name", &self.name)
            .field("task", &self.task())
            .field("features", &self.assembler.schema().len())
            .field("scaler", &self.scaler.is_some())
            .finish()
    }
}
