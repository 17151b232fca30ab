//! Chat Store port
//!
//! Defines how the application layer persists chats.

use async_trait::async_trait;
use chatservice_domain::{Chat, ChatId};
use thiserror::Error;

/// Errors that can occur during chat store operations
///
/// `NotFound` is the only variant that means "this chat does not exist".
/// Every other variant is a genuine failure and must never be read as absence.
#[derive(Error, Debug)]
pub enum ChatStoreError {
    #[error("Chat not found: {0}")]
    NotFound(ChatId),

    #[error("Chat already exists: {0}")]
    AlreadyExists(ChatId),

    #[error("Corrupted chat record {id}: {reason}")]
    Corrupted { id: String, reason: String },

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl ChatStoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ChatStoreError::NotFound(_))
    }
}

/// Persistence for chats
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Persist a newly created chat.
    async fn create(&self, chat: &Chat) -> Result<(), ChatStoreError>;

    /// Load a chat, failing with [`ChatStoreError::NotFound`] when absent.
    async fn find_by_id(&self, id: ChatId) -> Result<Chat, ChatStoreError>;

    /// Overwrite the stored state of an existing chat.
    async fn save(&self, chat: &Chat) -> Result<(), ChatStoreError>;
}
