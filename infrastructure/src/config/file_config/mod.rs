//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Each section converts into the application type it configures.

mod chat;
mod logging;
mod provider;
mod storage;
mod stream;
mod tokenizer;

pub use chat::FileChatConfig;
pub use logging::FileLoggingConfig;
pub use provider::FileProviderConfig;
pub use storage::{FileStorageConfig, StorageBackend};
pub use stream::FileStreamConfig;
pub use tokenizer::FileTokenizerConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("chat.model cannot be empty")]
    EmptyModelName,

    #[error("chat.model_max_tokens cannot be 0")]
    ZeroModelMaxTokens,

    #[error("chat.initial_system_message cannot be empty")]
    EmptyInitialSystemMessage,

    #[error("provider.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("stream.buffer cannot be 0")]
    ZeroStreamBuffer,

    #[error("storage.path cannot be blank when the file backend is selected")]
    BlankStoragePath,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Model and sampling settings for new chats
    pub chat: FileChatConfig,
    /// Completion API settings
    pub provider: FileProviderConfig,
    /// Chat persistence
    pub storage: FileStorageConfig,
    /// Streaming delivery
    pub stream: FileStreamConfig,
    /// Token counting
    pub tokenizer: FileTokenizerConfig,
    /// Log destinations
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Check values that would only fail later, at request time.
    ///
    /// Sampling ranges are left to chat construction, which reports them
    /// against the request that used them.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.chat.model.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName);
        }
        if self.chat.model_max_tokens == 0 {
            return Err(ConfigValidationError::ZeroModelMaxTokens);
        }
        if self.chat.initial_system_message.is_empty() {
            return Err(ConfigValidationError::EmptyInitialSystemMessage);
        }
        if self.provider.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if self.stream.buffer == 0 {
            return Err(ConfigValidationError::ZeroStreamBuffer);
        }
        if self.storage.backend == StorageBackend::File
            && self
                .storage
                .path
                .as_ref()
                .is_some_and(|p| p.as_os_str().to_string_lossy().trim().is_empty())
        {
            return Err(ConfigValidationError::BlankStoragePath);
        }
        Ok(())
    }
}
