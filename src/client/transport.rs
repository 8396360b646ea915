//! Submission transports
//!
//! The controller talks to a [`SubmissionTransport`]; which one is used is
//! decided once, from configuration, by [`select_transport`].

use crate::models::{FormKind, SubmissionResult};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Public endpoint of the default email relay service
pub const DEFAULT_RELAY_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Http,
    Relay,
    Simulated,
}

/// Successful delivery of a submission record
#[derive(Debug, Clone, PartialEq)]
pub struct TransportReceipt {
    pub result: SubmissionResult,
    pub via: TransportKind,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Network response was not ok ({0})")]
    Status(u16),

    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("submission refused: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait SubmissionTransport: Send + Sync {
    async fn submit(&self, form: FormKind, record: &Value) -> Result<TransportReceipt, TransportError>;

    fn kind(&self) -> TransportKind;
}

pub type DynSubmissionTransport = Arc<dyn SubmissionTransport>;

// =============================================================================
// Configuration
// =============================================================================

/// Third-party email relay credentials
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub api_url: String,
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Base URL of the form API, e.g. `https://beehive-lodge.fr/api`
    pub endpoint: Option<String>,
    pub relay: Option<RelayConfig>,
    pub request_timeout: Duration,
    pub simulated_delay: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            relay: None,
            request_timeout: Duration::from_secs(15),
            simulated_delay: Duration::from_secs(2),
        }
    }
}

/// Pick the transport: form API if configured, else the email relay, else
/// the development simulation.
pub fn select_transport(config: &TransportConfig) -> Result<DynSubmissionTransport, TransportError> {
    if let Some(ref endpoint) = config.endpoint {
        return Ok(Arc::new(HttpTransport::new(endpoint, config.request_timeout)?));
    }
    if let Some(ref relay) = config.relay {
        return Ok(Arc::new(RelayTransport::new(relay.clone(), config.request_timeout)?));
    }
    tracing::warn!("No form endpoint or relay configured, submissions are simulated");
    Ok(Arc::new(SimulatedTransport::new(config.simulated_delay)))
}

// =============================================================================
// Implementations
// =============================================================================

/// POSTs the record as JSON to `<endpoint>/<form>`
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SubmissionTransport for HttpTransport {
    async fn submit(&self, form: FormKind, record: &Value) -> Result<TransportReceipt, TransportError> {
        let url = format!("{}/{}", self.endpoint, form.path());
        let response = self.client.post(&url).json(record).send().await?;

        if !response.status().is_success() {
            return Err(TransportError::Status(response.status().as_u16()));
        }

        let bytes = response.bytes().await?;
        let result: SubmissionResult = serde_json::from_slice(&bytes)?;
        if !result.success {
            return Err(TransportError::Rejected(result.message));
        }

        Ok(TransportReceipt {
            result,
            via: TransportKind::Http,
        })
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Http
    }
}

#[derive(Serialize)]
struct RelayRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a Value,
}

/// Hands the record to a third-party email relay as template parameters
#[derive(Clone)]
pub struct RelayTransport {
    client: reqwest::Client,
    config: RelayConfig,
}

impl RelayTransport {
    pub fn new(config: RelayConfig, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl SubmissionTransport for RelayTransport {
    async fn submit(&self, _form: FormKind, record: &Value) -> Result<TransportReceipt, TransportError> {
        let body = RelayRequest {
            service_id: &self.config.service_id,
            template_id: &self.config.template_id,
            user_id: &self.config.public_key,
            template_params: record,
        };
        let response = self.client.post(&self.config.api_url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(TransportError::Status(response.status().as_u16()));
        }

        Ok(TransportReceipt {
            result: SubmissionResult {
                success: true,
                message: "Message envoyé avec succès".to_string(),
                booking_id: None,
                timestamp: None,
            },
            via: TransportKind::Relay,
        })
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Relay
    }
}

/// Development fallback: always succeeds after a fixed delay
#[derive(Debug, Clone)]
pub struct SimulatedTransport {
    delay: Duration,
}

impl SimulatedTransport {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl SubmissionTransport for SimulatedTransport {
    async fn submit(&self, form: FormKind, _record: &Value) -> Result<TransportReceipt, TransportError> {
        tracing::debug!(form = form.path(), "Simulating submission");
        tokio::time::sleep(self.delay).await;
        Ok(TransportReceipt {
            result: SubmissionResult {
                success: true,
                message: "Message envoyé avec succès".to_string(),
                booking_id: None,
                timestamp: None,
            },
            via: TransportKind::Simulated,
        })
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Simulated
    }
}
