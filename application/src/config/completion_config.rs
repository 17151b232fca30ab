//! Per-request completion configuration.
//!
//! [`CompletionConfig`] is what a caller supplies alongside a message. It is
//! only consulted when a new chat has to be created; an existing chat keeps
//! the configuration it was created with.

use chatservice_domain::{ChatConfig, DomainError, ModelDescriptor};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MODEL_MAX_TOKENS: usize = 128_000;
pub const DEFAULT_SYSTEM_MESSAGE: &str = "You are a helpful assistant.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionConfig {
    pub model: String,
    /// Context window of `model`, in tokens.
    pub model_max_tokens: usize,
    pub temperature: f32,
    pub top_p: f32,
    pub candidate_count: u32,
    pub stop_sequences: Vec<String>,
    pub max_reply_tokens: u32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
    pub initial_system_message: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            model_max_tokens: DEFAULT_MODEL_MAX_TOKENS,
            temperature: 1.0,
            top_p: 1.0,
            candidate_count: 1,
            stop_sequences: Vec::new(),
            max_reply_tokens: 1024,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
            initial_system_message: DEFAULT_SYSTEM_MESSAGE.to_string(),
        }
    }
}

impl CompletionConfig {
    // ==================== Builder Methods ====================

    pub fn with_model(mut self, model: impl Into<String>, max_tokens: usize) -> Self {
        self.model = model.into();
        self.model_max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn with_initial_system_message(mut self, message: impl Into<String>) -> Self {
        self.initial_system_message = message.into();
        self
    }

    // ==================== Conversions ====================

    pub fn model_descriptor(&self) -> Result<ModelDescriptor, DomainError> {
        ModelDescriptor::new(self.model.clone(), self.model_max_tokens)
    }

    /// Build the chat configuration for `model`. Range checks happen when the
    /// chat is constructed.
    pub fn chat_config(&self, model: ModelDescriptor) -> ChatConfig {
        ChatConfig::new(model)
            .with_temperature(self.temperature)
            .with_top_p(self.top_p)
            .with_candidate_count(self.candidate_count)
            .with_stop_sequences(self.stop_sequences.clone())
            .with_max_reply_tokens(self.max_reply_tokens)
            .with_presence_penalty(self.presence_penalty)
            .with_frequency_penalty(self.frequency_penalty)
    }
}
