//! JSON prediction endpoint

use super::record_prediction;
use crate::demos::DemoKind;
use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use feature_engine::RawRecord;
use inference_engine::Prediction;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Response body for `POST /{demo}/predict`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PredictionResponse {
    Regression { predicted_value: f64 },
    Classification { prediction: i64, probability: Option<f64> },
}

impl From<Prediction> for PredictionResponse {
    fn from(prediction: Prediction) -> Self {
        match prediction {
            Prediction::Regression { value } => PredictionResponse::Regression {
                predicted_value: round2(value),
            },
            Prediction::Classification { label, probability } => PredictionResponse::Classification {
                prediction: label,
                probability,
            },
        }
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Accept a flat field map or one wrapped as `{"data": {...}}`
fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.len() == 1 && map.get("data").is_some_and(Value::is_object) => {
            map.remove("data").unwrap_or_default()
        }
        other => other,
    }
}

/// Score one JSON record
pub async fn predict_handler(
    State(state): State<Arc<AppState>>,
    Path(demo): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let kind: DemoKind = demo.parse()?;
    let service = state.service(kind)?;
    let Json(body) = body.map_err(|e| ApiError::MalformedBody(e.body_text()))?;

    let record = RawRecord::from_json(unwrap_envelope(body))?;
    match service.engine.predict(record) {
        Ok(result) => {
            record_prediction(kind, "api", Ok(result.latency_ms));
            info!("{} prediction {:?} in {:.3}ms", kind, result.prediction, result.latency_ms);
            Ok(Json(result.prediction.into()))
        }
        Err(e) => {
            let err = ApiError::from(e);
            record_prediction(kind, "api", Err(err.kind()));
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_is_unwrapped() {
        let body = json!({"data": {"age": 55}});
        assert_eq!(unwrap_envelope(body), json!({"age": 55}));

        let flat = json!({"age": 55, "data": 1});
        assert_eq!(unwrap_envelope(flat.clone()), flat);
    }

    #[test]
    fn test_regression_response_is_rounded() {
        let response = PredictionResponse::from(Prediction::Regression { value: 31.23456 });
        assert_eq!(serde_json::to_value(response).unwrap(), json!({"predicted_value": 31.23}));
    }

    #[test]
    fn test_classification_response_shape() {
        let response = PredictionResponse::from(Prediction::Classification {
            label: 1,
            probability: None,
        });
        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({"prediction": 1, "probability": null})
        );
    }
}
