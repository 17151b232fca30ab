//! Character-ratio token estimation.

use chatservice_domain::{TokenCounter, TokenizerError};

const DEFAULT_CHARS_PER_TOKEN: f64 = 4.0;

/// Model families with a known characters-per-token ratio.
const FAMILIES: &[(&str, f64)] = &[
    ("gpt-", 4.0),
    ("chatgpt-", 4.0),
    ("o1", 4.0),
    ("o3", 4.0),
    ("o4", 4.0),
    ("claude-", 3.5),
    ("gemini-", 4.0),
    ("llama", 4.0),
    ("mistral", 4.0),
];

/// Estimates tokens as `ceil(chars / ratio)` for the model's family.
///
/// Non-empty text always costs at least one token.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxTokenCounter {
    allow_unknown_models: bool,
}

impl ApproxTokenCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Estimate unknown models with the default ratio instead of failing.
    pub fn with_allow_unknown_models(mut self, allow: bool) -> Self {
        self.allow_unknown_models = allow;
        self
    }

    fn chars_per_token(&self, model: &str) -> Option<f64> {
        let model = model.to_ascii_lowercase();
        FAMILIES
            .iter()
            .find(|(prefix, _)| model.starts_with(prefix))
            .map(|(_, ratio)| *ratio)
            .or(self.allow_unknown_models.then_some(DEFAULT_CHARS_PER_TOKEN))
    }
}

impl TokenCounter for ApproxTokenCounter {
    fn count(&self, text: &str, model: &str) -> Result<usize, TokenizerError> {
        let ratio = self
            .chars_per_token(model)
            .ok_or_else(|| TokenizerError::UnsupportedModel(model.to_string()))?;

        let chars = text.chars().count();
        if chars == 0 {
            return Ok(0);
        }
        Ok(((chars as f64 / ratio).ceil() as usize).max(1))
    }
}
