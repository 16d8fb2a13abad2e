//! HTTP client for the remote assistant service
//!
//! Wire contract: `POST /chat` with `{"message": "<utterance>"}`, answered
//! by `{"status": "success", "response": "<reply>", "timestamp": ...}`.
//! A non-`success` status and a transport failure are treated identically:
//! both map to [`SolaceError::NetworkError`]. There is no automatic retry;
//! a failed call surfaces once and the user resubmits.

use crate::{Result, SolaceError};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default assistant service address
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Configuration for the assistant client
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the assistant service
    pub base_url: String,

    /// Optional request timeout. `None` means the transport decides; a call
    /// that never settles leaves the turn pending indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set a request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Request body for `POST /chat`
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

/// Response body from `POST /chat`
///
/// Error responses carry `status` and an `error` field but no `response`;
/// extra fields such as `read_receipt` are ignored.
#[derive(Debug, Deserialize)]
pub struct ChatReply {
    pub status: String,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Response body from `GET /health`
#[derive(Debug, Deserialize)]
struct HealthReply {
    status: String,
}

/// A successful assistant reply, with the server timestamp when one parsed
#[derive(Debug, Clone)]
pub struct AssistantReply {
    pub text: String,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Client for the remote assistant service
pub struct AssistantClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl AssistantClient {
    /// Create a new client
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(format!("solace/{}", env!("CARGO_PKG_VERSION")));

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| SolaceError::ConfigError(format!("Failed to initialize HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Send one user utterance and await the assistant's reply
    pub async fn send(&self, utterance: &str) -> Result<AssistantReply> {
        let url = self.url("chat");
        debug!("Sending utterance to {}", url);

        let response = self
            .http
            .post(&url)
            .json(&ChatRequest { message: utterance })
            .send()
            .await
            .map_err(|e| SolaceError::NetworkError(format!("Request failed: {}", e)))?;

        let reply: ChatReply = response
            .json()
            .await
            .map_err(|e| SolaceError::NetworkError(format!("Invalid response body: {}", e)))?;

        if reply.status != "success" {
            return Err(SolaceError::NetworkError(format!(
                "Assistant returned status '{}'",
                reply.status
            )));
        }

        let timestamp = reply.timestamp.as_deref().and_then(parse_server_timestamp);

        Ok(AssistantReply {
            text: reply.response,
            timestamp,
        })
    }

    /// Probe `GET /health`. Failure is informational, never fatal.
    pub async fn check_health(&self) -> Result<()> {
        let url = self.url("health");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| SolaceError::NetworkError(format!("Health check failed: {}", e)))?;

        let health: HealthReply = response
            .json()
            .await
            .map_err(|e| SolaceError::NetworkError(format!("Invalid health response: {}", e)))?;

        if health.status != "healthy" {
            return Err(SolaceError::NetworkError(format!(
                "Service reported status '{}'",
                health.status
            )));
        }

        Ok(())
    }
}

/// Parse the server timestamp, accepting RFC 3339 and the service's
/// `YYYY-MM-DD HH:MM:SS` format. Unparseable values fall back to the local
/// completion time upstream.
fn parse_server_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = raw.parse::<DateTime<Utc>>() {
        return Some(ts);
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
