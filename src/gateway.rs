//! Classification gateway — talks to the external prediction service.
//!
//! The dialogue hands over one resolved cluster per topic; the gateway
//! renames topics to the backend's field names, POSTs them as
//! `{"clusters": {...}}` and parses `predicted_type`, `confidence` and
//! `description` out of the reply.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::GatewayConfig;
use crate::dialogue::evidence::ResolvedEvidence;
use crate::error::GatewayError;

/// Request body sent to the prediction endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassificationRequest {
    /// Backend field name → cluster tag.
    pub clusters: BTreeMap<String, String>,
}

impl ClassificationRequest {
    pub fn from_resolved(resolved: &ResolvedEvidence) -> Self {
        Self {
            clusters: resolved
                .iter()
                .map(|t| (t.field_name.clone(), t.tag.clone()))
                .collect(),
        }
    }
}

/// Classification returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    pub predicted_type: String,
    /// Percentage, 0–100.
    pub confidence: f64,
    pub description: String,
}

/// Anything that can turn resolved clusters into a prediction.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, request: &ClassificationRequest) -> Result<Prediction, GatewayError>;
}

/// Classifier backed by the HTTP prediction service.
pub struct HttpClassifier {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpClassifier {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::ConnectionFailed {
                reason: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            endpoint: config.endpoint(),
            timeout: config.timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn transport_error(&self, e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::Timeout {
                after: self.timeout,
            }
        } else {
            GatewayError::ConnectionFailed {
                reason: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, request: &ClassificationRequest) -> Result<Prediction, GatewayError> {
        tracing::info!(endpoint = %self.endpoint, clusters = ?request.clusters, "Requesting classification");

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %body, "Classifier returned an error status");
            return Err(GatewayError::ConnectionFailed {
                reason: format!("backend returned {status}"),
            });
        }

        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;
        let prediction = parse_prediction(&body)?;
        tracing::info!(
            predicted_type = %prediction.predicted_type,
            confidence = prediction.confidence,
            "Classification received"
        );
        Ok(prediction)
    }
}

/// Reply as it comes off the wire; every field is checked before use.
#[derive(Debug, Deserialize)]
struct RawPrediction {
    predicted_type: Option<String>,
    confidence: Option<f64>,
    description: Option<String>,
}

/// Parse and validate a prediction body.
pub fn parse_prediction(body: &[u8]) -> Result<Prediction, GatewayError> {
    let raw: RawPrediction =
        serde_json::from_slice(body).map_err(|e| GatewayError::MalformedResponse {
            reason: e.to_string(),
        })?;

    let missing = |field: &str| GatewayError::MalformedResponse {
        reason: format!("missing field `{field}`"),
    };
    let predicted_type = raw.predicted_type.ok_or_else(|| missing("predicted_type"))?;
    let confidence = raw.confidence.ok_or_else(|| missing("confidence"))?;
    let description = raw.description.ok_or_else(|| missing("description"))?;

    if !confidence.is_finite() || !(0.0..=100.0).contains(&confidence) {
        return Err(GatewayError::MalformedResponse {
            reason: format!("confidence {confidence} outside 0–100"),
        });
    }

    Ok(Prediction {
        predicted_type,
        confidence,
        description,
    })
}
