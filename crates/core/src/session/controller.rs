//! Drives the session state machine against the injected capabilities.

use super::state::SessionState;
use super::transition::{Effect, SessionEvent, Transition, transition};
use crate::{
    conversation::{ConversationClient, ConversationError, SessionConfig},
    display::{DisplayProps, Viewport},
    gateway_client::{Gateway, GatewayError},
    media::{AudioSource, LipsyncCapture, MediaError, MicrophoneAccess},
    robot::{ClientTool, Mode},
};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// How long the screen waits after mounting before starting a session.
pub const AUTO_START_DELAY: Duration = Duration::from_millis(500);

/// Why a session attempt failed. The `Display` text is what the user sees.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Microphone(#[from] MediaError),
    #[error(transparent)]
    SignedUrl(#[from] GatewayError),
    #[error(transparent)]
    Conversation(#[from] ConversationError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown client tool '{0}'")]
    Unknown(String),
    #[error("Client tool '{0}' is not registered for the current session")]
    NotRegistered(&'static str),
    #[error("Session controller is no longer running")]
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A session was already starting or active, so nothing happened.
    AlreadyActive,
}

/// The external services a session depends on.
#[derive(Clone)]
pub struct Capabilities {
    pub conversation: Arc<dyn ConversationClient>,
    pub lipsync: Arc<dyn LipsyncCapture>,
    pub microphone: Arc<dyn MicrophoneAccess>,
    pub gateway: Arc<dyn Gateway>,
}

struct Inner {
    caps: Capabilities,
    state: watch::Sender<SessionState>,
    last_mode: Mutex<Mode>,
}

impl Inner {
    /// Applies one event atomically and publishes the new state if it changed.
    fn apply(&self, event: SessionEvent) -> Transition {
        let mut outcome = None;
        self.state.send_if_modified(|state| {
            let t = transition(state, event);
            let changed = t.applied && t.state != *state;
            if t.applied {
                *state = t.state.clone();
            }
            outcome = Some(t);
            changed
        });
        outcome.unwrap_or_else(|| Transition {
            state: self.state.borrow().clone(),
            effects: Vec::new(),
            applied: false,
        })
    }

    async fn run_effects(&self, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::EndSession => {
                    if let Err(e) = self.caps.conversation.end_session().await {
                        warn!(error = %e, "Failed to end conversation session");
                    }
                }
                Effect::StopLipsync => self.caps.lipsync.stop().await,
            }
        }
    }

    fn dispatch_tool(&self, tool: ClientTool) -> Result<(), ToolError> {
        let handle = tokio::runtime::Handle::try_current().map_err(|_| ToolError::Unavailable)?;
        let gateway = self.caps.gateway.clone();
        let gesture = tool.gesture();
        info!(tool = tool.name(), %gesture, "Dispatching client tool");
        handle.spawn(async move {
            match gateway.gesture(gesture).await {
                Ok(response) => debug!(%gesture, ?response, "Robot gesture completed"),
                Err(e) => warn!(%gesture, error = %e, "Robot gesture failed"),
            }
        });
        Ok(())
    }
}

/// Owns the avatar's session state and runs the start/stop protocol.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

impl SessionController {
    pub fn new(caps: Capabilities) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            inner: Arc::new(Inner {
                caps,
                state,
                last_mode: Mutex::new(Mode::default()),
            }),
        }
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// The handle external clients use to report callbacks.
    pub fn event_sink(&self) -> EventSink {
        EventSink {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Starts a conversation in `mode` unless one is already starting or active.
    ///
    /// Failures are recorded on the session state and also returned.
    pub async fn start(&self, mode: Mode) -> Result<StartOutcome, SessionError> {
        *self
            .inner
            .last_mode
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = mode;

        if !self.inner.apply(SessionEvent::Start(mode)).applied {
            debug!(%mode, "Session already starting or active; ignoring start");
            return Ok(StartOutcome::AlreadyActive);
        }
        info!(%mode, "Starting conversation session");

        if let Err(e) = self.open(mode).await {
            error!(%mode, error = %e, "Failed to start session");
            let t = self.inner.apply(SessionEvent::StartFailed(e.to_string()));
            self.inner.run_effects(&t.effects).await;
            return Err(e);
        }

        // A stop queued during the handshake may already have ended the session.
        if self.state().is_idle() {
            return Ok(StartOutcome::Started);
        }
        if let Err(e) = self.inner.caps.lipsync.start(AudioSource::System).await {
            warn!(error = %e, "System audio capture failed, avatar will not lip sync");
            self.inner.apply(SessionEvent::LipsyncFailed(e.to_string()));
        } else if self.state().is_idle() {
            debug!("Session ended while lip-sync was starting; stopping capture");
            self.inner.caps.lipsync.stop().await;
        }
        Ok(StartOutcome::Started)
    }

    async fn open(&self, mode: Mode) -> Result<(), SessionError> {
        self.inner.caps.microphone.request().await?;
        let signed = self.inner.caps.gateway.signed_url(mode).await?;
        debug!(mode = %signed.mode, "Received signed URL");
        let config = SessionConfig {
            signed_url: signed.signed_url,
            client_tools: mode.client_tools().to_vec(),
        };
        self.inner
            .caps
            .conversation
            .start_session(config, self.event_sink())
            .await?;
        Ok(())
    }

    /// Starts again with the most recently requested mode.
    pub async fn retry(&self) -> Result<StartOutcome, SessionError> {
        let mode = *self
            .inner
            .last_mode
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        info!(%mode, "Retrying connection");
        self.start(mode).await
    }

    /// Waits `delay`, then starts a session in `mode`.
    pub async fn auto_start(&self, mode: Mode, delay: Duration) -> Result<StartOutcome, SessionError> {
        tokio::time::sleep(delay).await;
        self.start(mode).await
    }

    /// Ends the session. A stop issued mid-handshake runs once the handshake resolves.
    pub async fn stop(&self) {
        let t = self.inner.apply(SessionEvent::Stop);
        if !t.applied {
            if self.inner.caps.lipsync.is_active() {
                info!("No active session; stopping leftover lip-sync capture");
                self.inner.caps.lipsync.stop().await;
            } else {
                debug!("No active session to stop");
            }
            return;
        }
        if t.effects.is_empty() {
            info!("Stop requested during handshake; deferring until it resolves");
            return;
        }
        info!("Stopping conversation session");
        self.inner.run_effects(&t.effects).await;
    }

    /// Inputs for the face renderer at the given viewport.
    pub fn display_props(&self, viewport: Option<Viewport>) -> DisplayProps {
        DisplayProps::derive(&self.state(), self.inner.caps.lipsync.as_ref(), viewport)
    }
}

/// Callback surface handed to the [`ConversationClient`].
///
/// Holds a weak reference, so a sink outliving its controller turns into a no-op.
#[derive(Clone)]
pub struct EventSink {
    inner: Weak<Inner>,
}

impl EventSink {
    fn emit(&self, event: SessionEvent) {
        let Some(inner) = self.inner.upgrade() else {
            debug!(?event, "Dropping event for a finished controller");
            return;
        };
        let t = inner.apply(event);
        if t.effects.is_empty() {
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { inner.run_effects(&t.effects).await });
            }
            Err(_) => warn!(effects = ?t.effects, "No async runtime; skipping session effects"),
        }
    }

    pub fn connected(&self) {
        info!("Connected to voice agent");
        self.emit(SessionEvent::Connected);
    }

    pub fn disconnected(&self) {
        info!("Disconnected from voice agent");
        self.emit(SessionEvent::Disconnected);
    }

    pub fn message(&self, message: impl Into<String>) {
        let message = message.into();
        debug!(%message, "Agent message");
        self.emit(SessionEvent::Message(message));
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        error!(%message, "Voice agent error");
        self.emit(SessionEvent::Error(message));
    }

    pub fn speaking_changed(&self, is_speaking: bool) {
        self.emit(SessionEvent::SpeakingChanged(is_speaking));
    }

    /// Runs the client tool called `name` without waiting for its result.
    pub fn invoke_tool(&self, name: &str) -> Result<(), ToolError> {
        let inner = self.inner.upgrade().ok_or(ToolError::Unavailable)?;
        let tool: ClientTool = name
            .parse()
            .map_err(|_| ToolError::Unknown(name.to_string()))?;
        let registered = inner
            .state
            .borrow()
            .mode
            .is_some_and(|mode| mode.client_tools().contains(&tool));
        if !registered {
            warn!(tool = tool.name(), "Agent invoked a tool that is not registered");
            return Err(ToolError::NotRegistered(tool.name()));
        }
        inner.dispatch_tool(tool)
    }
}
