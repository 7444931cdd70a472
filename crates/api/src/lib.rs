//! Prediction API Server
//!
//! JSON prediction endpoints and HTML forms for the manufacturing output
//! regressor and the heart disease classifier.

pub mod client;
pub mod demos;
pub mod error;
pub mod rate_limit;
pub mod routes;
pub mod settings;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use client::RemoteClient;
use demos::{DemoKind, DemoService};
use error::{ApiError, ServerError};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use settings::{LoggingSettings, Settings};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_governor::GovernorLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Application state shared across handlers. Built once, never mutated.
pub struct AppState {
    pub version: String,
    pub start_time: Instant,
    pub manufacturing: Option<DemoService>,
    pub heart: Option<DemoService>,
    /// Prediction API the heart form calls in API mode
    pub remote: Option<RemoteClient>,
    pub metrics: Option<PrometheusHandle>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// State with no demos loaded
    pub fn new() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
            manufacturing: None,
            heart: None,
            remote: None,
            metrics: None,
        }
    }

    pub fn with_service(mut self, service: DemoService) -> Self {
        match service.kind() {
            DemoKind::Manufacturing => self.manufacturing = Some(service),
            DemoKind::Heart => self.heart = Some(service),
        }
        self
    }

    pub fn with_remote(mut self, remote: RemoteClient) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Load every enabled demo; any artifact problem fails startup
    pub fn from_settings(settings: &Settings) -> Result<Self, ServerError> {
        let mut state = Self::new();
        for (kind, demo) in [
            (DemoKind::Manufacturing, &settings.manufacturing),
            (DemoKind::Heart, &settings.heart),
        ] {
            if demo.enabled {
                state = state.with_service(DemoService::load(kind, demo)?);
            } else {
                info!("{} demo disabled", kind);
            }
        }

        if let Some(url) = &settings.remote.heart_url {
            let remote = RemoteClient::new(url, Duration::from_secs(settings.remote.timeout_secs))?;
            info!("Heart form API mode forwards to {}", remote.url());
            state = state.with_remote(remote);
        }
        Ok(state)
    }

    /// Loaded service for a demo, or 404 when it is not configured
    pub fn service(&self, kind: DemoKind) -> Result<&DemoService, ApiError> {
        let service = match kind {
            DemoKind::Manufacturing => self.manufacturing.as_ref(),
            DemoKind::Heart => self.heart.as_ref(),
        };
        service.ok_or_else(|| ApiError::DemoUnavailable(kind.as_str().to_string()))
    }

    pub fn services(&self) -> impl Iterator<Item = &DemoService> {
        self.manufacturing.iter().chain(self.heart.iter())
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("version", &self.version)
            .field("manufacturing", &self.manufacturing)
            .field("heart", &self.heart)
            .field("remote", &self.remote)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

/// Per-demo health entry
#[derive(Debug, Serialize)]
pub struct DemoHealth {
    pub demo: DemoKind,
    pub task: &'static str,
    pub features: usize,
    pub required_inputs: Vec<String>,
    pub scaled: bool,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub demos: Vec<DemoHealth>,
    pub remote_api: Option<String>,
}

#[derive(Debug, Serialize)]
struct RootResponse {
    message: String,
    demos: Vec<DemoKind>,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/:demo/predict", post(routes::predict::predict_handler))
        .route(
            "/:demo/form",
            get(routes::forms::form_page).post(routes::forms::form_submit),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(RootResponse {
        message: "Prediction API is running. POST a record to /{demo}/predict or open /{demo}/form.".to_string(),
        demos: state.services().map(DemoService::kind).collect(),
    })
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let demos = state
        .services()
        .map(|service| DemoHealth {
            demo: service.kind(),
            task: service.engine.task().as_str(),
            features: service.engine.assembler().schema().len(),
            required_inputs: service.engine.assembler().required_inputs().to_vec(),
            scaled: service.engine.has_scaler(),
        })
        .collect();

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        demos,
        remote_api: state.remote.as_ref().map(|r| r.url().to_string()),
    })
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics are disabled".to_string()),
    }
}

/// Initialize logging
pub fn init_logging(settings: &LoggingSettings) -> Result<(), ServerError> {
    let level: Level = settings
        .level
        .parse()
        .map_err(|_| ServerError::LogLevel(settings.level.clone()))?;

    let builder = FmtSubscriber::builder().with_max_level(level).with_target(true);
    let result = if settings.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    result.map_err(|e| ServerError::Install {
        what: "tracing subscriber",
        reason: e.to_string(),
    })
}

/// Install the global Prometheus recorder
pub fn init_metrics() -> Result<PrometheusHandle, ServerError> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServerError::Install {
            what: "metrics recorder",
            reason: e.to_string(),
        })
}

/// Load artifacts and serve until the listener fails
pub async fn run_server(settings: Settings) -> Result<(), ServerError> {
    let mut state = AppState::from_settings(&settings)?;
    if settings.metrics.enabled {
        state = state.with_metrics(init_metrics()?);
    }

    let mut app = create_router(Arc::new(state));
    if settings.server.cors_permissive {
        app = app.layer(CorsLayer::permissive());
    }
    if settings.rate_limit.enabled {
        let config = rate_limit::create_governor_config(&settings.rate_limit).ok_or(ServerError::RateLimit)?;
        info!(
            "Rate limiting: 1 request per {}s, burst {}",
            settings.rate_limit.per_second, settings.rate_limit.burst_size
        );
        app = app.layer(GovernorLayer { config });
    }

    info!("Starting API server on {}", settings.server.addr);
    let listener = tokio::net::TcpListener::bind(&settings.server.addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
