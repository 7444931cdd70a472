//! API Route Handlers

pub mod forms;
pub mod predict;
mod render;

use crate::demos::DemoKind;
use metrics::{counter, histogram};

/// Count a prediction attempt and record its latency when it succeeded
pub(crate) fn record_prediction(demo: DemoKind, source: &'static str, outcome: Result<f64, &'static str>) {
    match outcome {
        Ok(latency_ms) => {
            counter!("predictions_total", "demo" => demo.as_str(), "source" => source, "outcome" => "ok").increment(1);
            histogram!("prediction_latency_ms", "demo" => demo.as_str()).record(latency_ms);
        }
        Err(kind) => {
            counter!("predictions_total", "demo" => demo.as_str(), "source" => source, "outcome" => kind).increment(1);
        }
    }
}
