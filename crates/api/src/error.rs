//! API Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use data_validator::ValidationError;
use feature_engine::FeatureError;
use inference_engine::{InferenceError, PredictError};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn, Level};

/// Failures while starting the server
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Failed to load {demo} demo: {source}")]
    Demo { demo: String, source: PredictError },

    #[error("Invalid log level {0:?}")]
    LogLevel(String),

    #[error("Failed to install {what}: {reason}")]
    Install { what: &'static str, reason: String },

    #[error("Invalid rate limit settings: per_second and burst_size must be non-zero")]
    RateLimit,

    #[error("Invalid remote URL {url}: {reason}")]
    RemoteUrl { url: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    pub(crate) fn demo(demo: &str, source: impl Into<PredictError>) -> Self {
        ServerError::Demo {
            demo: demo.to_string(),
            source: source.into(),
        }
    }
}

/// Failures while serving a request
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Predict(#[from] PredictError),

    #[error("{}", out_of_range_message(.0))]
    OutOfRange(Vec<ValidationError>),

    #[error("Demo {0:?} is not available")]
    DemoUnavailable(String),

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Remote prediction failed: {0}")]
    Remote(String),

    #[error("Failed to render page: {0}")]
    Render(String),
}

fn out_of_range_message(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

impl From<FeatureError> for ApiError {
    fn from(e: FeatureError) -> Self {
        ApiError::Predict(e.into())
    }
}

impl From<InferenceError> for ApiError {
    fn from(e: InferenceError) -> Self {
        ApiError::Predict(e.into())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Predict(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Predict(_) | ApiError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::OutOfRange(_) | ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::DemoUnavailable(_) => StatusCode::NOT_FOUND,
            ApiError::Remote(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Machine-readable error kind for the response body
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Predict(PredictError::Features(e)) => match e {
                FeatureError::MissingFields(_) => "missing_fields",
                FeatureError::TypeConversion { .. } => "type_conversion",
                FeatureError::MalformedRecord(_) => "malformed_record",
                FeatureError::Derivation { .. } => "derivation_failed",
                FeatureError::InvalidSchema(_) | FeatureError::Io { .. } => "internal",
            },
            ApiError::Predict(PredictError::Validation(e)) => match e {
                ValidationError::OutOfRange { .. } => "out_of_range",
                ValidationError::UnknownCategory { .. } => "unknown_category",
                ValidationError::InvalidFormat(_) => "invalid_format",
            },
            ApiError::Predict(PredictError::Inference(_)) => "model_error",
            ApiError::OutOfRange(_) => "out_of_range",
            ApiError::DemoUnavailable(_) => "demo_unavailable",
            ApiError::MalformedBody(_) => "malformed_body",
            ApiError::Remote(_) => "remote_error",
            ApiError::Render(_) => "render_error",
        }
    }

    pub fn missing_fields(&self) -> Option<&[String]> {
        match self {
            ApiError::Predict(PredictError::Features(FeatureError::MissingFields(fields))) => Some(fields),
            _ => None,
        }
    }

    /// Level matching who is at fault. A derivation failure still answers
    /// 500 but comes from the submitted values, so it is only a warning.
    pub(crate) fn log_level(&self) -> Level {
        match self {
            ApiError::Predict(PredictError::Features(FeatureError::Derivation { .. })) => Level::WARN,
            _ if self.status().is_server_error() => Level::ERROR,
            _ => Level::WARN,
        }
    }

    pub(crate) fn log(&self) {
        if self.log_level() == Level::ERROR {
            error!("{} ({})", self, self.kind());
        } else {
            warn!("{} ({})", self, self.kind());
        }
    }
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_fields: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
            missing_fields: self.missing_fields().map(<[String]>::to_vec),
        };
        (self.status(), Json(body)).into_response()
    }
}
