//! Chat configuration from TOML (`[chat]` section)

use chatservice_application::CompletionConfig;
use chatservice_application::config::completion_config::{
    DEFAULT_MODEL, DEFAULT_MODEL_MAX_TOKENS, DEFAULT_SYSTEM_MESSAGE,
};
use serde::{Deserialize, Serialize};

/// Model and sampling settings used when a new chat is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChatConfig {
    pub model: String,
    /// Context window of `model`, in tokens.
    pub model_max_tokens: usize,
    pub temperature: f32,
    pub top_p: f32,
    /// Number of candidate replies requested.
    pub n: u32,
    pub stop: Vec<String>,
    /// Reply length limit sent to the provider.
    pub max_tokens: u32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
    pub initial_system_message: String,
}

impl Default for FileChatConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            model_max_tokens: DEFAULT_MODEL_MAX_TOKENS,
            temperature: 1.0,
            top_p: 1.0,
            n: 1,
            stop: Vec::new(),
            max_tokens: 1024,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
            initial_system_message: DEFAULT_SYSTEM_MESSAGE.to_string(),
        }
    }
}

impl FileChatConfig {
    pub fn to_completion_config(&self) -> CompletionConfig {
        CompletionConfig {
            model: self.model.clone(),
            model_max_tokens: self.model_max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
            candidate_count: self.n,
            stop_sequences: self.stop.clone(),
            max_reply_tokens: self.max_tokens,
            presence_penalty: self.presence_penalty,
            frequency_penalty: self.frequency_penalty,
            initial_system_message: self.initial_system_message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_application_defaults() {
        assert_eq!(
            FileChatConfig::default().to_completion_config(),
            CompletionConfig::default()
        );
    }

    #[test]
    fn test_renamed_fields_are_mapped() {
        let config = FileChatConfig {
            n: 2,
            stop: vec!["###".to_string()],
            max_tokens: 256,
            ..FileChatConfig::default()
        };
        let completion = config.to_completion_config();
        assert_eq!(completion.candidate_count, 2);
        assert_eq!(completion.stop_sequences, vec!["###".to_string()]);
        assert_eq!(completion.max_reply_tokens, 256);
    }
}
