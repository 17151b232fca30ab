//! Infrastructure layer for chatservice
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod providers;
pub mod repository;
pub mod tokenizer;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileChatConfig, FileConfig, FileLoggingConfig,
    FileProviderConfig, FileStorageConfig, FileStreamConfig, FileTokenizerConfig, StorageBackend,
};
pub use logging::JsonlConversationLogger;
pub use providers::{OpenAiConfig, OpenAiProvider};
pub use repository::{InMemoryChatStore, JsonFileChatStore};
pub use tokenizer::ApproxTokenCounter;
