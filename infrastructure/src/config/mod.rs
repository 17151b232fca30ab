//! Configuration file loading for chatservice
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CHATSERVICE_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./chatservice.toml` or `./.chatservice.toml`
//! 4. Global: `$XDG_CONFIG_HOME/chatservice/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileChatConfig, FileConfig, FileLoggingConfig, FileProviderConfig,
    FileStorageConfig, FileStreamConfig, FileTokenizerConfig, StorageBackend,
};
pub use loader::ConfigLoader;
