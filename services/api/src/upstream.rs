//! Outbound HTTP clients for the services the gateway fronts.
//!
//! - [`RobotClient`] talks to the robot-control service (gestures, LEDs, camera).
//! - [`ConvaiClient`] talks to the ElevenLabs Conversational AI API.

use axum::http::StatusCode;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The request never produced a response (connection refused, timeout, ...).
    #[error("Upstream unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),
    #[error("Upstream returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("Upstream response could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("Upstream response is missing '{0}'")]
    MissingField(&'static str),
}

/// Builds the shared HTTP client used for all upstream calls.
pub fn http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder().timeout(timeout).build()
}

async fn send_json(request: RequestBuilder) -> Result<Value, UpstreamError> {
    let response = request.send().await.map_err(UpstreamError::Unreachable)?;
    let status = response.status();
    if !status.is_success() {
        let status =
            StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.text().await.unwrap_or_default();
        return Err(UpstreamError::Status { status, body });
    }
    response.json().await.map_err(UpstreamError::Decode)
}

/// Client for the robot-control HTTP service.
#[derive(Clone, Debug)]
pub struct RobotClient {
    client: Client,
    base_url: String,
}

impl RobotClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issues a body-less `POST` to `path` and returns the JSON reply.
    pub async fn post(&self, path: &str) -> Result<Value, UpstreamError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "POST to robot service");
        send_json(self.client.post(url)).await
    }

    pub async fn get(&self, path: &str) -> Result<Value, UpstreamError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "GET from robot service");
        send_json(self.client.get(url)).await
    }
}

/// Client for the ElevenLabs Conversational AI API.
#[derive(Clone, Debug)]
pub struct ConvaiClient {
    client: Client,
    base_url: String,
}

impl ConvaiClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Fetches a short-lived signed conversation URL for `agent_id`.
    pub async fn get_signed_url(&self, agent_id: &str, api_key: &str) -> Result<String, UpstreamError> {
        let url = format!("{}/v1/convai/conversation/get-signed-url", self.base_url);
        debug!(%agent_id, "Requesting signed conversation URL");
        let request = self
            .client
            .get(url)
            .query(&[("agent_id", agent_id)])
            .header("xi-api-key", api_key);
        let body = send_json(request).await?;
        body.get("signed_url")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(UpstreamError::MissingField("signed_url"))
    }
}
