//! Pure state transitions for the session controller.
//!
//! `transition` never performs I/O. It returns the next state together with
//! the side effects the driver has to run.

use super::state::{ConnectionStatus, Emotion, SessionState};
use crate::robot::Mode;

/// Everything that can happen to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The user (or the auto-start timer) asked for a session.
    Start(Mode),
    /// A step of the start sequence failed.
    StartFailed(String),
    /// The conversation client finished its handshake.
    Connected,
    /// The conversation client closed the session.
    Disconnected,
    /// The conversation client reported an error.
    Error(String),
    /// A message arrived from the agent.
    Message(String),
    /// The agent started or stopped emitting audio.
    SpeakingChanged(bool),
    /// Lip-sync capture could not be started.
    LipsyncFailed(String),
    /// The user ended the session.
    Stop,
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    EndSession,
    StopLipsync,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: SessionState,
    pub effects: Vec<Effect>,
    /// False when the event was ignored in the current state.
    pub applied: bool,
}

impl Transition {
    fn to(state: SessionState) -> Self {
        Self {
            state,
            effects: Vec::new(),
            applied: true,
        }
    }

    fn ignored(state: &SessionState) -> Self {
        Self {
            state: state.clone(),
            effects: Vec::new(),
            applied: false,
        }
    }

    fn with_effects(mut self, effects: &[Effect]) -> Self {
        self.effects.extend_from_slice(effects);
        self
    }
}

fn speaking_emotion(is_speaking: bool) -> Emotion {
    if is_speaking {
        Emotion::Happy
    } else {
        Emotion::Thinking
    }
}

/// Computes the state that follows `event`.
pub fn transition(state: &SessionState, event: SessionEvent) -> Transition {
    let mut next = state.clone();
    match event {
        SessionEvent::Start(mode) => {
            if !state.is_idle() {
                return Transition::ignored(state);
            }
            next.status = ConnectionStatus::Connecting;
            next.mode = Some(mode);
            next.emotion = Emotion::Thinking;
            next.error_message = None;
            next.lipsync_error = None;
            next.is_speaking = false;
            next.stop_pending = false;
            Transition::to(next)
        }
        SessionEvent::StartFailed(message) => match state.status {
            ConnectionStatus::Connecting if state.stop_pending => {
                next.disconnect(Emotion::Neutral);
                Transition::to(next)
            }
            ConnectionStatus::Connecting | ConnectionStatus::Disconnected => {
                next.disconnect(Emotion::Sad);
                next.error_message = Some(message);
                Transition::to(next)
            }
            // The client connected before reporting the failure.
            ConnectionStatus::Connected => {
                next.disconnect(Emotion::Sad);
                next.error_message = Some(message);
                Transition::to(next).with_effects(&[Effect::EndSession, Effect::StopLipsync])
            }
        },
        SessionEvent::Connected => {
            if state.status != ConnectionStatus::Connecting {
                return Transition::ignored(state);
            }
            if state.stop_pending {
                next.disconnect(Emotion::Neutral);
                return Transition::to(next).with_effects(&[Effect::EndSession, Effect::StopLipsync]);
            }
            next.status = ConnectionStatus::Connected;
            next.emotion = Emotion::Happy;
            Transition::to(next)
        }
        SessionEvent::Disconnected => {
            if state.is_idle() {
                return Transition::ignored(state);
            }
            next.disconnect(Emotion::Neutral);
            Transition::to(next).with_effects(&[Effect::StopLipsync])
        }
        SessionEvent::Error(message) => {
            next.emotion = Emotion::Sad;
            next.error_message = Some(message);
            Transition::to(next)
        }
        SessionEvent::Message(_) => Transition::ignored(state),
        SessionEvent::SpeakingChanged(is_speaking) => {
            if state.is_idle() {
                return Transition::ignored(state);
            }
            next.is_speaking = is_speaking;
            if state.is_connected() {
                next.emotion = speaking_emotion(is_speaking);
            }
            Transition::to(next)
        }
        SessionEvent::LipsyncFailed(message) => {
            next.lipsync_error = Some(message);
            Transition::to(next)
        }
        SessionEvent::Stop => match state.status {
            ConnectionStatus::Disconnected => Transition::ignored(state),
            ConnectionStatus::Connecting => {
                next.stop_pending = true;
                Transition::to(next)
            }
            ConnectionStatus::Connected => {
                next.disconnect(Emotion::Neutral);
                next.error_message = None;
                Transition::to(next).with_effects(&[Effect::EndSession, Effect::StopLipsync])
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(state: &SessionState, events: impl IntoIterator<Item = SessionEvent>) -> SessionState {
        events
            .into_iter()
            .fold(state.clone(), |s, event| transition(&s, event).state)
    }

    fn connected(mode: Mode) -> SessionState {
        run(
            &SessionState::default(),
            [SessionEvent::Start(mode), SessionEvent::Connected],
        )
    }

    #[test]
    fn test_start_enters_connecting() {
        let t = transition(&SessionState::default(), SessionEvent::Start(Mode::Guess));
        assert!(t.applied);
        assert_eq!(t.state.status, ConnectionStatus::Connecting);
        assert_eq!(t.state.mode, Some(Mode::Guess));
        assert_eq!(t.state.emotion, Emotion::Thinking);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_start_is_ignored_while_active() {
        let connecting = transition(&SessionState::default(), SessionEvent::Start(Mode::Guess)).state;
        let t = transition(&connecting, SessionEvent::Start(Mode::Talk));
        assert!(!t.applied);
        assert_eq!(t.state.mode, Some(Mode::Guess));

        let t = transition(&connected(Mode::Talk), SessionEvent::Start(Mode::Guess));
        assert!(!t.applied);
    }

    #[test]
    fn test_start_clears_previous_error() {
        let failed = run(
            &SessionState::default(),
            [
                SessionEvent::Start(Mode::Guess),
                SessionEvent::StartFailed("denied".into()),
            ],
        );
        assert_eq!(failed.error_message.as_deref(), Some("denied"));
        let retried = transition(&failed, SessionEvent::Start(Mode::Guess)).state;
        assert_eq!(retried.error_message, None);
    }

    #[test]
    fn test_start_failure_is_sad_and_clears_mode() {
        let state = run(
            &SessionState::default(),
            [
                SessionEvent::Start(Mode::Talk),
                SessionEvent::StartFailed("Permission denied".into()),
            ],
        );
        assert_eq!(state.status, ConnectionStatus::Disconnected);
        assert_eq!(state.mode, None);
        assert_eq!(state.emotion, Emotion::Sad);
        assert_eq!(state.error_message.as_deref(), Some("Permission denied"));
    }

    #[test]
    fn test_connect_is_happy() {
        let state = connected(Mode::Guess);
        assert_eq!(state.status, ConnectionStatus::Connected);
        assert_eq!(state.emotion, Emotion::Happy);
        assert_eq!(state.mode, Some(Mode::Guess));
    }

    #[test]
    fn test_connect_outside_handshake_is_ignored() {
        let t = transition(&SessionState::default(), SessionEvent::Connected);
        assert!(!t.applied);
        assert_eq!(t.state, SessionState::default());
    }

    #[test]
    fn test_error_then_disconnect_keeps_message() {
        let state = run(
            &connected(Mode::Guess),
            [
                SessionEvent::Error("socket closed".into()),
                SessionEvent::Disconnected,
            ],
        );
        assert_eq!(state.status, ConnectionStatus::Disconnected);
        assert_eq!(state.mode, None);
        assert_eq!(state.emotion, Emotion::Neutral);
        assert_eq!(state.error_message.as_deref(), Some("socket closed"));
    }

    #[test]
    fn test_remote_disconnect_stops_lipsync() {
        let t = transition(&connected(Mode::Guess), SessionEvent::Disconnected);
        assert_eq!(t.state.status, ConnectionStatus::Disconnected);
        assert_eq!(t.effects, vec![Effect::StopLipsync]);
    }

    #[test]
    fn test_disconnect_while_idle_keeps_failure_visible() {
        let failed = run(
            &SessionState::default(),
            [
                SessionEvent::Start(Mode::Guess),
                SessionEvent::StartFailed("denied".into()),
            ],
        );
        let t = transition(&failed, SessionEvent::Disconnected);
        assert!(!t.applied);
        assert_eq!(t.state.emotion, Emotion::Sad);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_start_failure_after_connect_ends_session() {
        let t = transition(&connected(Mode::Guess), SessionEvent::StartFailed("late failure".into()));
        assert_eq!(t.state.status, ConnectionStatus::Disconnected);
        assert_eq!(t.state.mode, None);
        assert_eq!(t.state.emotion, Emotion::Sad);
        assert_eq!(t.state.error_message.as_deref(), Some("late failure"));
        assert_eq!(t.effects, vec![Effect::EndSession, Effect::StopLipsync]);
    }

    #[test]
    fn test_start_failure_after_remote_disconnect_is_recorded() {
        let state = run(
            &SessionState::default(),
            [
                SessionEvent::Start(Mode::Talk),
                SessionEvent::Disconnected,
                SessionEvent::StartFailed("closed during handshake".into()),
            ],
        );
        assert_eq!(state.status, ConnectionStatus::Disconnected);
        assert_eq!(state.emotion, Emotion::Sad);
        assert_eq!(state.error_message.as_deref(), Some("closed during handshake"));
    }

    #[test]
    fn test_speaking_ignored_while_idle() {
        let idle = run(&connected(Mode::Talk), [SessionEvent::Disconnected]);
        let t = transition(&idle, SessionEvent::SpeakingChanged(true));
        assert!(!t.applied);
        assert!(!t.state.is_speaking);
    }

    #[test]
    fn test_error_alone_does_not_change_status() {
        let state = transition(&connected(Mode::Talk), SessionEvent::Error("x".into())).state;
        assert_eq!(state.status, ConnectionStatus::Connected);
        assert_eq!(state.emotion, Emotion::Sad);
    }

    #[test]
    fn test_speaking_drives_emotion_while_connected() {
        let mut state = connected(Mode::Talk);
        let mut seen = Vec::new();
        for speaking in [false, true, false] {
            state = transition(&state, SessionEvent::SpeakingChanged(speaking)).state;
            seen.push(state.emotion);
        }
        assert_eq!(seen, vec![Emotion::Thinking, Emotion::Happy, Emotion::Thinking]);
    }

    #[test]
    fn test_speaking_ignored_for_emotion_while_connecting() {
        let connecting = transition(&SessionState::default(), SessionEvent::Start(Mode::Talk)).state;
        let state = transition(&connecting, SessionEvent::SpeakingChanged(true)).state;
        assert_eq!(state.emotion, Emotion::Thinking);
        assert!(state.is_speaking);
    }

    #[test]
    fn test_message_changes_nothing() {
        let state = connected(Mode::Guess);
        let t = transition(&state, SessionEvent::Message("hello".into()));
        assert!(!t.applied);
        assert_eq!(t.state, state);
    }

    #[test]
    fn test_stop_while_connected_ends_session() {
        let t = transition(&connected(Mode::Guess), SessionEvent::Stop);
        assert_eq!(t.state.status, ConnectionStatus::Disconnected);
        assert_eq!(t.state.mode, None);
        assert_eq!(t.state.emotion, Emotion::Neutral);
        assert_eq!(t.effects, vec![Effect::EndSession, Effect::StopLipsync]);
    }

    #[test]
    fn test_stop_while_idle_is_noop() {
        let t = transition(&SessionState::default(), SessionEvent::Stop);
        assert!(!t.applied);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_stop_during_handshake_is_queued_until_connect() {
        let connecting = transition(&SessionState::default(), SessionEvent::Start(Mode::Guess)).state;
        let queued = transition(&connecting, SessionEvent::Stop);
        assert!(queued.effects.is_empty());
        assert_eq!(queued.state.status, ConnectionStatus::Connecting);
        assert!(queued.state.stop_pending);

        let t = transition(&queued.state, SessionEvent::Connected);
        assert_eq!(t.state.status, ConnectionStatus::Disconnected);
        assert_eq!(t.state.emotion, Emotion::Neutral);
        assert!(!t.state.stop_pending);
        assert_eq!(t.effects, vec![Effect::EndSession, Effect::StopLipsync]);
    }

    #[test]
    fn test_stop_during_handshake_then_failure_is_quiet() {
        let state = run(
            &SessionState::default(),
            [
                SessionEvent::Start(Mode::Guess),
                SessionEvent::Stop,
                SessionEvent::StartFailed("boom".into()),
            ],
        );
        assert_eq!(state.status, ConnectionStatus::Disconnected);
        assert_eq!(state.emotion, Emotion::Neutral);
        assert_eq!(state.error_message, None);
    }

    #[test]
    fn test_mode_only_set_while_active() {
        let events = [
            SessionEvent::Start(Mode::Guess),
            SessionEvent::Connected,
            SessionEvent::SpeakingChanged(true),
            SessionEvent::Error("e".into()),
            SessionEvent::Disconnected,
            SessionEvent::Start(Mode::Talk),
            SessionEvent::StartFailed("f".into()),
            SessionEvent::Stop,
        ];
        let mut state = SessionState::default();
        for event in events {
            state = transition(&state, event).state;
            if state.is_idle() {
                assert_eq!(state.mode, None);
            } else {
                assert!(state.mode.is_some());
            }
        }
    }

    #[test]
    fn test_lipsync_failure_is_recorded_without_leaving_session() {
        let state = transition(
            &connected(Mode::Talk),
            SessionEvent::LipsyncFailed("no loopback device".into()),
        )
        .state;
        assert!(state.is_connected());
        assert_eq!(state.lipsync_error.as_deref(), Some("no loopback device"));
    }
}
