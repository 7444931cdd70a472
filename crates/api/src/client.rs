//! Remote Prediction Client
//!
//! Forwards an assembled feature vector to another prediction API, the way
//! the heart disease form does in API mode.

use crate::error::{ApiError, ServerError};
use feature_engine::FeatureVector;
use inference_engine::Prediction;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Request body: assembled features under a `data` key
#[derive(Debug, Serialize)]
struct RemoteRequest<'a> {
    data: &'a FeatureVector,
}

/// Classification response of a prediction API
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteClassification {
    pub prediction: i64,
    #[serde(default)]
    pub probability: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    url: String,
}

impl RemoteClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ServerError> {
        let url = url.into();
        reqwest::Url::parse(&url).map_err(|e| ServerError::RemoteUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServerError::RemoteUrl {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self { http, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST the features and read back a classification
    pub async fn classify(&self, features: &FeatureVector) -> Result<Prediction, ApiError> {
        debug!("Forwarding {} features to {}", features.len(), self.url);

        let response = self
            .http
            .post(&self.url)
            .json(&RemoteRequest { data: features })
            .send()
            .await
            .map_err(|e| remote_error(&self.url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Remote prediction API returned {}: {}", status, body);
            return Err(ApiError::Remote(format!("{} returned {}: {}", self.url, status, body)));
        }

        let result: RemoteClassification = response.json().await.map_err(|e| remote_error(&self.url, e))?;
        Ok(Prediction::Classification {
            label: result.prediction,
            probability: result.probability,
        })
    }
}

fn remote_error(url: &str, e: reqwest::Error) -> ApiError {
    let reason = if e.is_timeout() {
        "request timed out".to_string()
    } else {
        e.to_string()
    };
    warn!("Remote prediction API {} failed: {}", url, reason);
    ApiError::Remote(format!("{url}: {reason}"))
}
