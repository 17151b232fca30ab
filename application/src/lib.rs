//! Application layer for chatservice
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{CompletionConfig, StreamParams};
pub use ports::{
    chat_store::{ChatStore, ChatStoreError},
    completion_provider::{
        CompletionProvider, CompletionRequest, PromptMessage, ProviderError, StreamHandle,
    },
    completion_sink::{CompletionSink, FanOutSink, SinkError},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
};
pub use use_cases::chat_completion::ChatCompletionUseCase;
pub use use_cases::chat_completion_stream::ChatCompletionStreamUseCase;
pub use use_cases::resolve_chat::ChatLoader;
pub use use_cases::types::{
    ChatCompletionError, ChatCompletionInput, ChatCompletionOutput, ErrorKind,
};
