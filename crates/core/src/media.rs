//! Capabilities for microphone access and lip-sync capture.
//!
//! Both are provided by the host platform. The session controller only needs
//! to ask for them and to know whether they succeeded.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaError {
    #[error("Microphone permission denied: {0}")]
    PermissionDenied(String),
    #[error("Audio device unavailable: {0}")]
    DeviceUnavailable(String),
}

/// Where lip-sync capture reads audio from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioSource {
    /// The system audio output, which carries the agent's voice.
    System,
    Microphone,
}

/// Mouth shape reported by the lip-sync extractor.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Viseme {
    #[default]
    #[serde(rename = "sil")]
    Sil,
    PP,
    FF,
    TH,
    DD,
    #[serde(rename = "kk")]
    Kk,
    CH,
    SS,
    #[serde(rename = "nn")]
    Nn,
    RR,
    #[serde(rename = "aa")]
    Aa,
    E,
    I,
    O,
    U,
}

/// Grants access to the user's microphone so the agent can hear them.
#[async_trait]
pub trait MicrophoneAccess: Send + Sync {
    async fn request(&self) -> Result<(), MediaError>;
}

/// Extracts visemes from an audio stream to animate the avatar's mouth.
#[async_trait]
pub trait LipsyncCapture: Send + Sync {
    async fn start(&self, source: AudioSource) -> Result<(), MediaError>;

    async fn stop(&self);

    fn is_active(&self) -> bool;

    /// The most recent viseme, or `None` when nothing has been captured yet.
    fn viseme(&self) -> Option<Viseme>;
}
