//! Binds session state to the face renderer and the status overlay.

use crate::media::{LipsyncCapture, Viseme};
use crate::session::{ConnectionStatus, Emotion, SessionState};
use serde::Serialize;

/// Face size used before the viewport is known.
pub const DEFAULT_FACE_SIZE: u32 = 300;

/// Share of the smaller viewport dimension the face occupies.
const FACE_SCALE: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Side length of the square face for this viewport.
    pub fn face_size(&self) -> u32 {
        (f64::from(self.width.min(self.height)) * FACE_SCALE).floor() as u32
    }
}

/// Everything the talking-face component is rendered with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayProps {
    pub viseme: Option<Viseme>,
    pub emotion: Emotion,
    /// Animate the mouth while capture is running or the agent is speaking.
    pub is_active: bool,
    pub size: u32,
}

impl DisplayProps {
    pub fn derive(
        state: &SessionState,
        lipsync: &dyn LipsyncCapture,
        viewport: Option<Viewport>,
    ) -> Self {
        Self {
            viseme: lipsync.viseme(),
            emotion: state.emotion,
            is_active: lipsync.is_active() || state.is_speaking,
            size: viewport.map_or(DEFAULT_FACE_SIZE, |v| v.face_size()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Green,
    Yellow,
    Red,
}

/// The small connection badge in the corner of the screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusIndicator {
    pub label: &'static str,
    pub tone: Tone,
    pub error: Option<String>,
    pub lipsync_error: Option<String>,
    pub show_retry: bool,
}

impl From<&SessionState> for StatusIndicator {
    fn from(state: &SessionState) -> Self {
        let (label, tone) = match state.status {
            ConnectionStatus::Connected => ("● Connected", Tone::Green),
            ConnectionStatus::Connecting => ("○ Connecting...", Tone::Yellow),
            ConnectionStatus::Disconnected => ("○ Disconnected", Tone::Red),
        };
        Self {
            label,
            tone,
            error: state.error_message.clone().filter(|m| !m.is_empty()),
            lipsync_error: state
                .lipsync_error
                .as_ref()
                .map(|e| format!("Lipsync: {e}")),
            show_retry: state.status == ConnectionStatus::Disconnected,
        }
    }
}
