//! Storage configuration from TOML (`[storage]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Chats live for the lifetime of the process.
    Memory,
    /// One JSON file per chat.
    #[default]
    File,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    pub backend: StorageBackend,
    /// Directory for the file backend.
    pub path: Option<PathBuf>,
}

impl FileStorageConfig {
    /// Directory used by the file backend: the configured path, or
    /// `<data_dir>/chatservice/chats`.
    pub fn chats_dir(&self) -> Option<PathBuf> {
        self.path
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("chatservice").join("chats")))
    }
}
