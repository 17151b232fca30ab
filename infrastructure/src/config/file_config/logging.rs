//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Diagnostic log file. Logs go to stderr when unset.
    pub file: Option<PathBuf>,
    /// JSONL transcript of chat events.
    pub conversation_log: Option<PathBuf>,
}
