//! API Models
//!
//! Request and response bodies of the gateway, annotated for OpenAPI
//! generation with `utoipa`.

use avatar_core::robot::Mode;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Body of every error response.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    #[schema(example = "Invalid gesture action")]
    pub error: String,
}

#[derive(Deserialize, IntoParams, Debug, Default)]
#[into_params(parameter_in = Query)]
pub struct SignedUrlQuery {
    /// Which agent to connect to: `talk` or `guess` (default).
    #[param(example = "guess")]
    pub mode: Option<String>,
}

/// A signed conversation URL and the mode it was issued for.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlResponse {
    #[schema(example = "wss://api.elevenlabs.io/v1/convai/conversation?agent_id=...&conversation_signature=...")]
    pub signed_url: String,
    #[schema(value_type = String, example = "guess")]
    pub mode: Mode,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
}
