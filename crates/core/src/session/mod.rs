//! The avatar's conversation session.
//!
//! State changes are computed by the pure [`transition`] function; the
//! [`SessionController`] feeds it events and runs the resulting effects.

mod controller;
mod state;
mod transition;

pub use controller::{
    AUTO_START_DELAY, Capabilities, EventSink, SessionController, SessionError, StartOutcome,
    ToolError,
};
pub use state::{ConnectionStatus, Emotion, SessionState};
pub use transition::{Effect, SessionEvent, Transition, transition};
