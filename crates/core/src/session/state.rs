use crate::robot::Mode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of the connection to the voice agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "disconnected"),
            ConnectionStatus::Connecting => write!(f, "connecting"),
            ConnectionStatus::Connected => write!(f, "connected"),
        }
    }
}

/// Facial expression shown by the avatar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    #[default]
    Neutral,
    Happy,
    Thinking,
    Sad,
}

/// Everything the avatar screen knows about the current conversation.
///
/// `mode` is only ever `Some` while the status is `Connecting` or `Connected`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SessionState {
    pub status: ConnectionStatus,
    pub mode: Option<Mode>,
    pub emotion: Emotion,
    pub error_message: Option<String>,
    /// Last speaking flag reported by the conversation client.
    pub is_speaking: bool,
    /// A stop arrived mid-handshake and runs once the handshake resolves.
    pub stop_pending: bool,
    pub lipsync_error: Option<String>,
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        self.status == ConnectionStatus::Disconnected
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    /// Resets to the idle state, keeping the recorded error messages.
    pub(crate) fn disconnect(&mut self, emotion: Emotion) {
        self.status = ConnectionStatus::Disconnected;
        self.mode = None;
        self.emotion = emotion;
        self.is_speaking = false;
        self.stop_pending = false;
    }
}
