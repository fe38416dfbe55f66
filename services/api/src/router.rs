//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the gateway, including
//! the proxy endpoints and the OpenAPI documentation.

use crate::{
    handlers,
    models::{ErrorResponse, HealthResponse, SignedUrlResponse},
    state::AppState,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::detect_character,
        handlers::gesture,
        handlers::led,
        handlers::movement,
        handlers::robot_status,
        handlers::signed_url,
        handlers::health,
    ),
    components(
        schemas(ErrorResponse, SignedUrlResponse, HealthResponse)
    ),
    tags(
        (name = "Avatar Gateway", description = "Proxy endpoints for the robot avatar")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route(
            "/api/robot/camera/detect-character",
            post(handlers::detect_character),
        )
        .route("/api/robot/gesture/{action}", post(handlers::gesture))
        .route("/api/robot/led/{action}", post(handlers::led))
        .route("/api/robot/movement/{action}", post(handlers::movement))
        .route("/api/robot/status", get(handlers::robot_status))
        .route("/api/signed-url", get(handlers::signed_url))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(handlers::health))
        .merge(api_router)
}
