//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the configuration
//! and the clients for the upstream services.

use crate::{
    config::Config,
    upstream::{ConvaiClient, RobotClient, http_client},
};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub robot: RobotClient,
    pub convai: ConvaiClient,
}

impl AppState {
    /// Builds the upstream clients described by `config`.
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let client = http_client(config.upstream_timeout)?;
        Ok(Self {
            robot: RobotClient::new(client.clone(), config.robot_service_url.clone()),
            convai: ConvaiClient::new(client, config.elevenlabs_api_url.clone()),
            config: Arc::new(config),
        })
    }
}
