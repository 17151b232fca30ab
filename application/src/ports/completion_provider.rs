//! Completion Provider port
//!
//! Defines the interface for obtaining model replies, either in one blocking
//! call or as an incremental stream.

use async_trait::async_trait;
use chatservice_domain::{Chat, Role, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during provider operations
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Provider returned an empty reply")]
    EmptyResponse,

    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("Timeout")]
    Timeout,

    #[error("Stream ended without a completion signal")]
    TransportClosed,
}

/// One role/content pair of the window sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

/// A completion request projected from a chat.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<PromptMessage>,
    pub temperature: f32,
    pub top_p: f32,
    pub n: u32,
    pub stop: Vec<String>,
    pub max_tokens: u32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
}

impl CompletionRequest {
    /// Project the chat's current window, in window order, together with its
    /// sampling configuration.
    pub fn from_chat(chat: &Chat) -> Self {
        let config = chat.config();
        Self {
            model: chat.model().name().to_string(),
            messages: chat
                .messages()
                .iter()
                .map(|m| PromptMessage {
                    role: m.role(),
                    content: m.content().to_string(),
                })
                .collect(),
            temperature: config.temperature(),
            top_p: config.top_p(),
            n: config.candidate_count(),
            stop: config.stop_sequences().to_vec(),
            max_tokens: config.max_reply_tokens(),
            presence_penalty: config.presence_penalty(),
            frequency_penalty: config.frequency_penalty(),
        }
    }
}

/// Handle for receiving streaming events from a provider.
///
/// Wraps an `mpsc::Receiver<StreamEvent>`. Dropping the handle closes the
/// channel, which tells the producing side to stop and release its upstream
/// connection.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Receive the next event, or `None` once the producer is gone.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }
}

/// Gateway to a language model
///
/// This port defines how the application layer obtains completions.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Obtain one complete reply.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;

    /// Obtain an incremental reply.
    ///
    /// The stream yields `Delta` events and ends with `Done` or `Error`.
    /// Default implementation calls `complete()` and replays the result as a
    /// single delta, so providers without streaming support still work.
    async fn complete_stream(
        &self,
        request: &CompletionRequest,
    ) -> Result<StreamHandle, ProviderError> {
        let reply = self.complete(request).await?;
        let (tx, rx) = mpsc::channel(2);
        // Capacity 2 holds both events; a dropped receiver is fine
        let _ = tx.send(StreamEvent::Delta(reply)).await;
        let _ = tx.send(StreamEvent::Done).await;
        Ok(StreamHandle::new(rx))
    }
}
