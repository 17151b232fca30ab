//! Tokenizer configuration from TOML (`[tokenizer]` section)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTokenizerConfig {
    /// Estimate tokens for models outside the known families instead of
    /// rejecting them.
    pub allow_unknown_models: bool,
}
