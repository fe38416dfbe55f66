//! Client for the proxy gateway's HTTP API.
//!
//! The session controller depends on the [`Gateway`] trait. [`HttpGateway`] is
//! the implementation that talks to a running gateway over HTTP.

use crate::robot::{Gesture, LedAction, Mode, MovementAction};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Gateway request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Gateway returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Failed to get signed URL")]
    MissingSignedUrl,
}

/// A signed conversation URL issued for one agent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrl {
    pub signed_url: String,
    pub mode: Mode,
}

#[derive(Deserialize)]
struct SignedUrlBody {
    #[serde(rename = "signedUrl")]
    signed_url: Option<String>,
    mode: Option<Mode>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Operations the session controller needs from the gateway.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn signed_url(&self, mode: Mode) -> Result<SignedUrl, GatewayError>;

    async fn gesture(&self, gesture: Gesture) -> Result<Value, GatewayError>;

    async fn led(&self, action: LedAction) -> Result<Value, GatewayError>;

    async fn movement(&self, action: MovementAction) -> Result<Value, GatewayError>;

    async fn detect_character(&self) -> Result<Value, GatewayError>;
}

/// A [`Gateway`] backed by the gateway's REST endpoints.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    /// Creates a client for the gateway served at `base_url` (e.g. `http://localhost:3000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    async fn call(&self, method: Method, path: &str) -> Result<Value, GatewayError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "Calling gateway");
        let response = self.client.request(method, &url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error)
                .unwrap_or(text);
            return Err(GatewayError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn signed_url(&self, mode: Mode) -> Result<SignedUrl, GatewayError> {
        let value = self
            .call(Method::GET, &format!("/api/signed-url?mode={mode}"))
            .await?;
        let body: SignedUrlBody =
            serde_json::from_value(value).map_err(|_| GatewayError::MissingSignedUrl)?;
        let signed_url = body
            .signed_url
            .filter(|url| !url.is_empty())
            .ok_or(GatewayError::MissingSignedUrl)?;
        Ok(SignedUrl {
            signed_url,
            mode: body.mode.unwrap_or(mode),
        })
    }

    async fn gesture(&self, gesture: Gesture) -> Result<Value, GatewayError> {
        self.call(Method::POST, &format!("/api/robot/gesture/{gesture}"))
            .await
    }

    async fn led(&self, action: LedAction) -> Result<Value, GatewayError> {
        self.call(Method::POST, &format!("/api/robot/led/{action}")).await
    }

    async fn movement(&self, action: MovementAction) -> Result<Value, GatewayError> {
        self.call(Method::POST, &format!("/api/robot/movement/{action}"))
            .await
    }

    async fn detect_character(&self) -> Result<Value, GatewayError> {
        self.call(Method::POST, "/api/robot/camera/detect-character")
            .await
    }
}
