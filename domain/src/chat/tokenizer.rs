//! Token counting capability.
//!
//! The tokenizer algorithm itself lives outside the domain. Messages only need
//! to know how many tokens their content costs for the model that will consume
//! it, so the capability is expressed as a trait and injected at construction.

use crate::core::error::TokenizerError;

/// Counts the tokens `text` costs for the model named `model`.
///
/// Implementations live in the infrastructure layer.
pub trait TokenCounter: Send + Sync {
    /// Count tokens, failing with [`TokenizerError::UnsupportedModel`] when
    /// the model has no known encoding.
    fn count(&self, text: &str, model: &str) -> Result<usize, TokenizerError>;
}

/// Counts one token per whitespace-separated word.
///
/// Deterministic and model-agnostic, which makes token budgets in tests easy
/// to reason about.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenCounter;

impl TokenCounter for WordTokenCounter {
    fn count(&self, text: &str, _model: &str) -> Result<usize, TokenizerError> {
        Ok(text.split_whitespace().count())
    }
}
