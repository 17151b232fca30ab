//! Domain error types

use thiserror::Error;

/// Errors raised by the token counting capability
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizerError {
    #[error("Unsupported model for token counting: {0}")]
    UnsupportedModel(String),
}

/// Domain-level errors
///
/// Every variant is a validation failure: it is raised before any external
/// call is made and is never worth retrying as-is.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Invalid chat status: {0}")]
    InvalidStatus(String),

    #[error("Invalid chat id: {0}")]
    InvalidChatId(String),

    #[error("Message content is empty")]
    EmptyContent,

    #[error("user_id is empty")]
    EmptyUserId,

    #[error("Initial system message is missing")]
    MissingInitialSystemMessage,

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Invalid temperature {0}: must be within [0, 2]")]
    InvalidTemperature(f32),

    #[error("Invalid top_p {0}: must be within [0, 1]")]
    InvalidTopP(f32),

    #[error("Invalid candidate count: must be at least 1")]
    InvalidCandidateCount,

    #[error("Invalid {name} {value}: must be within [-2, 2]")]
    InvalidPenalty { name: &'static str, value: f32 },

    #[error("Chat is closed, no more messages allowed")]
    ChatClosed,

    #[error("Message needs {tokens} tokens but the model window holds only {max_tokens}")]
    MessageTooLarge { tokens: usize, max_tokens: usize },

    #[error("Chat {chat_id} does not belong to user {user_id}")]
    ChatOwnershipMismatch { chat_id: String, user_id: String },

    #[error("Corrupted chat state: {0}")]
    CorruptedChat(String),

    #[error("Token counting failed: {0}")]
    Tokenizer(#[from] TokenizerError),
}
