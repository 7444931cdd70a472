//! Server Configuration
//!
//! Layered with the `config` crate: built-in defaults, `config/default.toml`
//! if present, an optional file given on the command line, then
//! `CAPSTONE__SECTION__KEY` environment variables.

use crate::rate_limit::RateLimitConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub metrics: MetricsSettings,
    pub rate_limit: RateLimitConfig,
    pub remote: RemoteSettings,
    pub manufacturing: DemoSettings,
    pub heart: DemoSettings,
}

impl Settings {
    /// Load settings, with `path` taking precedence over `config/default.toml`
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        builder
            .add_source(config::Environment::with_prefix("CAPSTONE").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Listen address
    pub addr: String,
    /// Allow cross-origin browser callers
    pub cors_permissive: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
            cors_permissive: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Maximum level: trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsSettings {
    /// Install the Prometheus recorder and serve `/metrics`
    pub enabled: bool,
}

/// Where the heart disease form sends requests in API mode
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// Prediction endpoint of a running heart disease API
    pub heart_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            heart_url: None,
            timeout_secs: 5,
        }
    }
}

/// Artifact locations for one demo
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoSettings {
    pub enabled: bool,
    /// JSON array of feature names in training order
    pub schema_path: PathBuf,
    pub model_path: PathBuf,
    pub scaler_path: Option<PathBuf>,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            schema_path: PathBuf::new(),
            model_path: PathBuf::new(),
            scaler_path: None,
        }
    }
}

impl DemoSettings {
    /// Enabled settings for artifacts under `dir`
    pub fn from_dir(dir: impl AsRef<Path>, schema: &str, model: &str, scaler: Option<&str>) -> Self {
        let dir = dir.as_ref();
        Self {
            enabled: true,
            schema_path: dir.join(schema),
            model_path: dir.join(model),
            scaler_path: scaler.map(|s| dir.join(s)),
        }
    }
}
