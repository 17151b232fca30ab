//! Chat sampling configuration value object

use crate::core::error::DomainError;
use crate::core::model::ModelDescriptor;

/// Sampling parameters a chat sends with every completion (Value Object)
///
/// Validated once when the owning [`Chat`](super::entities::Chat) is
/// constructed and immutable for the chat's lifetime. A request with a
/// different configuration needs a new chat.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    model: ModelDescriptor,
    temperature: f32,
    top_p: f32,
    candidate_count: u32,
    stop_sequences: Vec<String>,
    max_reply_tokens: u32,
    presence_penalty: f32,
    frequency_penalty: f32,
}

impl ChatConfig {
    /// Provider defaults: temperature 1, top_p 1, one candidate, no stop
    /// sequences, 1024 reply tokens, no penalties.
    pub fn new(model: ModelDescriptor) -> Self {
        Self {
            model,
            temperature: 1.0,
            top_p: 1.0,
            candidate_count: 1,
            stop_sequences: Vec::new(),
            max_reply_tokens: 1024,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn with_candidate_count(mut self, n: u32) -> Self {
        self.candidate_count = n;
        self
    }

    pub fn with_stop_sequences(mut self, stop: Vec<String>) -> Self {
        self.stop_sequences = stop;
        self
    }

    pub fn with_max_reply_tokens(mut self, max: u32) -> Self {
        self.max_reply_tokens = max;
        self
    }

    pub fn with_presence_penalty(mut self, penalty: f32) -> Self {
        self.presence_penalty = penalty;
        self
    }

    pub fn with_frequency_penalty(mut self, penalty: f32) -> Self {
        self.frequency_penalty = penalty;
        self
    }

    // ==================== Accessors ====================

    pub fn model(&self) -> &ModelDescriptor {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn top_p(&self) -> f32 {
        self.top_p
    }

    pub fn candidate_count(&self) -> u32 {
        self.candidate_count
    }

    pub fn stop_sequences(&self) -> &[String] {
        &self.stop_sequences
    }

    pub fn max_reply_tokens(&self) -> u32 {
        self.max_reply_tokens
    }

    pub fn presence_penalty(&self) -> f32 {
        self.presence_penalty
    }

    pub fn frequency_penalty(&self) -> f32 {
        self.frequency_penalty
    }

    // ==================== Validation ====================

    /// Check every parameter range, reporting the first violation.
    ///
    /// NaN fails every range check.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(DomainError::InvalidTemperature(self.temperature));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(DomainError::InvalidTopP(self.top_p));
        }
        if self.candidate_count == 0 {
            return Err(DomainError::InvalidCandidateCount);
        }
        for (name, value) in [
            ("presence_penalty", self.presence_penalty),
            ("frequency_penalty", self.frequency_penalty),
        ] {
            if !(-2.0..=2.0).contains(&value) {
                return Err(DomainError::InvalidPenalty { name, value });
            }
        }
        Ok(())
    }
}
