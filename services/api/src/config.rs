use avatar_core::robot::Mode;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

pub const DEFAULT_ROBOT_SERVICE_URL: &str = "http://localhost:8000";
pub const DEFAULT_ELEVENLABS_API_URL: &str = "https://api.elevenlabs.io";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
///
/// Secrets are optional here; handlers that need them report their absence
/// per request instead of refusing to start.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub robot_service_url: String,
    pub elevenlabs_api_url: String,
    pub elevenlabs_api_key: Option<String>,
    pub agent_id_talk: Option<String>,
    pub agent_id_guess: Option<String>,
    pub upstream_timeout: Duration,
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 3000)),
            robot_service_url: DEFAULT_ROBOT_SERVICE_URL.to_string(),
            elevenlabs_api_url: DEFAULT_ELEVENLABS_API_URL.to_string(),
            elevenlabs_api_key: None,
            agent_id_talk: None,
            agent_id_guess: None,
            upstream_timeout: Duration::from_secs(30),
            log_level: Level::INFO,
        }
    }
}

/// Reads a variable, treating an empty value as unset.
fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str = var("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let robot_service_url = var("ROBOT_SERVICE_URL")
            .or_else(|| var("FASTAPI_URL"))
            .unwrap_or_else(|| DEFAULT_ROBOT_SERVICE_URL.to_string());
        let elevenlabs_api_url =
            var("ELEVENLABS_API_URL").unwrap_or_else(|| DEFAULT_ELEVENLABS_API_URL.to_string());
        for (name, url) in [
            ("ROBOT_SERVICE_URL", &robot_service_url),
            ("ELEVENLABS_API_URL", &elevenlabs_api_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidValue(
                    name.to_string(),
                    format!("'{}' is not an http(s) URL", url),
                ));
            }
        }

        let upstream_timeout = match var("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map(Duration::from_secs).map_err(|_| {
                ConfigError::InvalidValue(
                    "UPSTREAM_TIMEOUT_SECS".to_string(),
                    format!("'{}' is not a number of seconds", raw),
                )
            })?,
            None => Duration::from_secs(30),
        };

        let log_level_str = var("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bind_address,
            robot_service_url: robot_service_url.trim_end_matches('/').to_string(),
            elevenlabs_api_url: elevenlabs_api_url.trim_end_matches('/').to_string(),
            elevenlabs_api_key: var("ELEVENLABS_API_KEY"),
            agent_id_talk: var("NEXT_PUBLIC_AGENT_ID_TALK"),
            agent_id_guess: var("NEXT_PUBLIC_AGENT_ID_GUESS"),
            upstream_timeout,
            log_level,
        })
    }

    /// The agent identifier configured for `mode`.
    pub fn agent_id(&self, mode: Mode) -> Result<&str, ConfigError> {
        let (value, name) = match mode {
            Mode::Talk => (&self.agent_id_talk, "NEXT_PUBLIC_AGENT_ID_TALK"),
            Mode::Guess => (&self.agent_id_guess, "NEXT_PUBLIC_AGENT_ID_GUESS"),
        };
        value
            .as_deref()
            .ok_or_else(|| ConfigError::MissingVar(format!("{} (agent ID for mode '{}')", name, mode)))
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.elevenlabs_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingVar("ELEVENLABS_API_KEY".to_string()))
    }
}
