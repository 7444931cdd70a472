//! Interactive HTML forms

use super::record_prediction;
use super::render::{render_page, FormMode, Outcome};
use crate::demos::{format_number, DemoKind, DemoService};
use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use feature_engine::RawRecord;
use inference_engine::Prediction;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Blank form with default values
pub async fn form_page(State(state): State<Arc<AppState>>, Path(demo): Path<String>) -> Response {
    let service = match demo.parse().and_then(|kind: DemoKind| state.service(kind)) {
        Ok(service) => service,
        Err(e) => return e.into_response(),
    };
    page_response(
        StatusCode::OK,
        render_page(&service.definition, &HashMap::new(), FormMode::Local, None),
    )
}

/// Score a submitted form and render the result in the same page
pub async fn form_submit(
    State(state): State<Arc<AppState>>,
    Path(demo): Path<String>,
    Form(mut params): Form<HashMap<String, String>>,
) -> Response {
    let service = match demo.parse().and_then(|kind: DemoKind| state.service(kind)) {
        Ok(service) => service,
        Err(e) => return e.into_response(),
    };

    let mode = params.remove("mode");
    let mode = match mode.as_deref() {
        None | Some("local") => FormMode::Local,
        Some("api") if service.definition.remote_mode => FormMode::Api,
        Some(other) => {
            let err = ApiError::MalformedBody(format!("unsupported mode {other:?}"));
            return error_page(service, &params, FormMode::Local, err);
        }
    };

    match score(&state, service, &params, mode).await {
        Ok(prediction) => {
            let message = describe(service, &prediction);
            let page = render_page(&service.definition, &params, mode, Some(&Outcome::Success(message)));
            page_response(StatusCode::OK, page)
        }
        Err(e) => error_page(service, &params, mode, e),
    }
}

async fn score(
    state: &AppState,
    service: &DemoService,
    params: &HashMap<String, String>,
    mode: FormMode,
) -> Result<Prediction, ApiError> {
    let kind = service.kind();
    let source = mode.as_str();
    let start = Instant::now();

    // Empty inputs count as missing
    let record: RawRecord = params
        .iter()
        .map(|(name, value)| (name.as_str(), value.trim()))
        .filter(|(_, value)| !value.is_empty())
        .collect();

    if let Err(errors) = service.validator.validate(&record).into_result() {
        let err = ApiError::OutOfRange(errors);
        record_prediction(kind, source, Err(err.kind()));
        return Err(err);
    }

    let result = match mode {
        FormMode::Local => service.engine.predict(record).map(|r| r.prediction).map_err(ApiError::from),
        FormMode::Api => match &state.remote {
            Some(remote) => match service.engine.prepare(record) {
                Ok(features) => remote.classify(&features).await,
                Err(e) => Err(e.into()),
            },
            None => Err(ApiError::Remote("no remote prediction API is configured".to_string())),
        },
    };

    match &result {
        Ok(prediction) => {
            let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
            record_prediction(kind, source, Ok(latency_ms));
            info!("{} form prediction ({}) {:?} in {:.3}ms", kind, source, prediction, latency_ms);
        }
        Err(e) => record_prediction(kind, source, Err(e.kind())),
    }
    result
}

fn describe(service: &DemoService, prediction: &Prediction) -> String {
    match prediction {
        Prediction::Regression { value } => {
            let value = format_number(super::predict::round2(*value));
            match service.definition.unit {
                Some(unit) => format!("Predicted Output: {value} {unit}"),
                None => format!("Predicted Output: {value}"),
            }
        }
        Prediction::Classification {
            label,
            probability: Some(p),
        } => format!("Prediction: {label} (probability {p:.2})"),
        Prediction::Classification { label, probability: None } => format!("Prediction: {label}"),
    }
}

fn error_page(service: &DemoService, params: &HashMap<String, String>, mode: FormMode, err: ApiError) -> Response {
    err.log();
    let status = err.status();
    let message = match status {
        StatusCode::BAD_GATEWAY => format!("API call failed: {err}"),
        _ => format!("Prediction Error: {err}"),
    };
    let page = render_page(&service.definition, params, mode, Some(&Outcome::Failure(message)));
    page_response(status, page)
}

fn page_response(status: StatusCode, page: Result<String, ApiError>) -> Response {
    match page {
        Ok(page) => (status, Html(page)).into_response(),
        Err(e) => e.into_response(),
    }
}
