//! Port for the chat transcript log.
//!
//! [`ConversationLogger`] records what happened to each chat (creation,
//! evictions, completed and cancelled replies) as machine-readable records.
//! Diagnostic output goes through `tracing` instead.

use chatservice_domain::ChatId;
use serde_json::Value;

/// A single transcript record.
#[derive(Debug, Clone)]
pub struct ConversationEvent {
    /// Event type, e.g. "chat_created" or "stream_cancelled".
    pub event_type: &'static str,
    /// Chat the event belongs to.
    pub chat_id: ChatId,
    /// Event-specific fields.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, chat_id: ChatId, payload: Value) -> Self {
        Self {
            event_type,
            chat_id,
            payload,
        }
    }
}

/// Sink for transcript records.
///
/// `log` is synchronous and infallible; a failed write must not fail the
/// request that produced the event.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// Discards every event.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
