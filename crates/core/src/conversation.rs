//! The seam to the external voice-agent client.

use crate::robot::ClientTool;
use crate::session::EventSink;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversationError {
    #[error("Failed to open conversation: {0}")]
    Open(String),
    #[error("Failed to end conversation: {0}")]
    End(String),
}

/// Parameters for opening a conversation with the voice agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub signed_url: String,
    /// Tools the agent may invoke through [`EventSink::invoke_tool`].
    pub client_tools: Vec<ClientTool>,
}

/// A client that streams a conversation with a hosted voice agent.
///
/// Implementations report lifecycle callbacks (connect, disconnect, message,
/// error, speaking changes, tool calls) through the [`EventSink`] they are
/// handed when the session opens.
#[async_trait]
pub trait ConversationClient: Send + Sync {
    async fn start_session(
        &self,
        config: SessionConfig,
        events: EventSink,
    ) -> Result<(), ConversationError>;

    async fn end_session(&self) -> Result<(), ConversationError>;
}
