//! Axum Handlers for the Proxy Gateway
//!
//! Each handler validates its input, forwards a single request to an upstream
//! service, and relays the result. Nothing is retried or cached.

use axum::{
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use avatar_core::robot::{Gesture, LedAction, Mode, MovementAction};
use serde_json::Value;
use std::{str::FromStr, sync::Arc};
use tracing::{error, info, warn};

use crate::{
    models::{ErrorResponse, HealthResponse, SignedUrlQuery, SignedUrlResponse},
    state::AppState,
    upstream::{RobotClient, UpstreamError},
};

pub const ROBOT_UNREACHABLE: &str = "Failed to connect to robot";
pub const SIGNED_URL_FAILED: &str = "Failed to get signed URL";
pub const INTERNAL_ERROR: &str = "Internal server error";

pub enum ApiError {
    BadRequest(String),
    /// A required secret or identifier is not configured.
    Configuration(String),
    /// The upstream answered, but not with success.
    Upstream { status: StatusCode, message: String },
    /// The upstream could not be reached.
    Unavailable(String),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Configuration(message) => {
                error!("Configuration error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
            ApiError::Upstream { status, message } => (status, message),
            ApiError::Unavailable(message) => (StatusCode::SERVICE_UNAVAILABLE, message),
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_string())
            }
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::InternalServerError(err.into())
    }
}

/// Parses an action path segment, answering 400 for anything off the allow-list.
fn parse_action<A: FromStr>(raw: &str, kind: &str) -> Result<A, ApiError> {
    raw.parse().map_err(|_| {
        warn!(action = %raw, kind, "Rejected invalid robot action");
        ApiError::BadRequest(format!("Invalid {} action", kind))
    })
}

/// Turns an extractor rejection into a JSON 400.
fn bad_request(rejection: impl std::fmt::Display) -> ApiError {
    warn!(%rejection, "Rejected malformed request");
    ApiError::BadRequest(rejection.to_string())
}

/// Forwards a robot command, relaying the upstream status on failure.
///
/// `label` is the name used in the user-facing failure message.
async fn forward_action(
    robot: &RobotClient,
    kind: &str,
    label: &str,
    action: &str,
) -> Result<Json<Value>, ApiError> {
    match robot.post(&format!("/{}/{}", kind, action)).await {
        Ok(data) => {
            info!(kind, action, "Robot action completed");
            Ok(Json(data))
        }
        Err(UpstreamError::Status { status, body }) => {
            warn!(kind, action, %status, %body, "Robot service rejected action");
            Err(ApiError::Upstream {
                status,
                message: format!("Failed to trigger {} {}", label, action),
            })
        }
        Err(UpstreamError::Unreachable(err)) => {
            error!(kind, action, error = %err, "Robot service unreachable");
            Err(ApiError::Unavailable(ROBOT_UNREACHABLE.to_string()))
        }
        Err(err) => Err(err.into()),
    }
}

/// Ask the robot's camera which character it sees.
#[utoipa::path(
    post,
    path = "/api/robot/camera/detect-character",
    responses(
        (status = 200, description = "Detection result from the robot service", body = Object),
        (status = 503, description = "Robot service unreachable", body = ErrorResponse)
    )
)]
pub async fn detect_character(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    match state.robot.post("/camera/detect-character").await {
        Ok(data) => Ok(Json(data)),
        Err(UpstreamError::Status { status, body }) => {
            warn!(%status, %body, "Character detection failed");
            Err(ApiError::Upstream {
                status,
                message: body,
            })
        }
        Err(err) => {
            error!(error = %err, "Robot API error");
            Err(ApiError::Unavailable(ROBOT_UNREACHABLE.to_string()))
        }
    }
}

/// Make the robot nod (`yes`) or shake (`no`).
#[utoipa::path(
    post,
    path = "/api/robot/gesture/{action}",
    responses(
        (status = 200, description = "Gesture performed", body = Object),
        (status = 400, description = "Invalid gesture action", body = ErrorResponse),
        (status = 503, description = "Robot service unreachable", body = ErrorResponse)
    ),
    params(
        ("action" = String, Path, description = "One of `yes`, `no`")
    )
)]
pub async fn gesture(
    State(state): State<Arc<AppState>>,
    action: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(action) = action.map_err(bad_request)?;
    let gesture: Gesture = parse_action(&action, "gesture")?;
    forward_action(&state.robot, "gesture", "gesture", gesture.as_str()).await
}

/// Switch the LED strip `on`, `off`, or `blink` it.
#[utoipa::path(
    post,
    path = "/api/robot/led/{action}",
    responses(
        (status = 200, description = "LED updated", body = Object),
        (status = 400, description = "Invalid LED action", body = ErrorResponse),
        (status = 503, description = "Robot service unreachable", body = ErrorResponse)
    ),
    params(
        ("action" = String, Path, description = "One of `on`, `off`, `blink`")
    )
)]
pub async fn led(
    State(state): State<Arc<AppState>>,
    action: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(action) = action.map_err(bad_request)?;
    let led: LedAction = parse_action(&action, "LED")?;
    forward_action(&state.robot, "led", "LED", led.as_str()).await
}

/// Move the camera servo.
#[utoipa::path(
    post,
    path = "/api/robot/movement/{action}",
    responses(
        (status = 200, description = "Movement performed", body = Object),
        (status = 400, description = "Invalid movement action", body = ErrorResponse),
        (status = 503, description = "Robot service unreachable", body = ErrorResponse)
    ),
    params(
        ("action" = String, Path, description = "One of `scan`, `left`, `right`, `center`")
    )
)]
pub async fn movement(
    State(state): State<Arc<AppState>>,
    action: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(action) = action.map_err(bad_request)?;
    let movement: MovementAction = parse_action(&action, "movement")?;
    forward_action(&state.robot, "movement", "movement", movement.as_str()).await
}

/// Report whether the robot service is online.
#[utoipa::path(
    get,
    path = "/api/robot/status",
    responses(
        (status = 200, description = "Status document of the robot service", body = Object),
        (status = 503, description = "Robot service unreachable", body = ErrorResponse)
    )
)]
pub async fn robot_status(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    match state.robot.get("/").await {
        Ok(data) => Ok(Json(data)),
        Err(UpstreamError::Status { status, body }) => {
            warn!(%status, %body, "Robot status check failed");
            Err(ApiError::Upstream {
                status,
                message: "Failed to query robot status".to_string(),
            })
        }
        Err(UpstreamError::Unreachable(err)) => {
            error!(error = %err, "Robot service unreachable");
            Err(ApiError::Unavailable(ROBOT_UNREACHABLE.to_string()))
        }
        Err(err) => Err(err.into()),
    }
}

/// Issue a signed conversation URL for the agent that serves `mode`.
#[utoipa::path(
    get,
    path = "/api/signed-url",
    params(SignedUrlQuery),
    responses(
        (status = 200, description = "Signed URL issued", body = SignedUrlResponse),
        (status = 400, description = "Unknown mode", body = ErrorResponse),
        (status = 500, description = "Missing configuration or provider failure", body = ErrorResponse)
    )
)]
pub async fn signed_url(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SignedUrlQuery>, QueryRejection>,
) -> Result<Json<SignedUrlResponse>, ApiError> {
    let Query(query) = query.map_err(bad_request)?;
    let mode = match query.mode.as_deref() {
        None | Some("") => Mode::default(),
        Some(raw) => raw
            .parse::<Mode>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
    };

    let agent_id = state
        .config
        .agent_id(mode)
        .map_err(|e| ApiError::Configuration(e.to_string()))?;
    let api_key = state
        .config
        .api_key()
        .map_err(|e| ApiError::Configuration(e.to_string()))?;

    match state.convai.get_signed_url(agent_id, api_key).await {
        Ok(signed_url) => {
            info!(%mode, "Issued signed conversation URL");
            Ok(Json(SignedUrlResponse { signed_url, mode }))
        }
        Err(err @ (UpstreamError::Status { .. } | UpstreamError::MissingField(_))) => {
            error!(%mode, error = %err, "ElevenLabs API error");
            Err(ApiError::Upstream {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: SIGNED_URL_FAILED.to_string(),
            })
        }
        Err(err) => {
            error!(%mode, error = %err, "Signed URL logic error");
            Err(err.into())
        }
    }
}

/// Liveness of the gateway itself.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Gateway is up", body = HealthResponse)
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
