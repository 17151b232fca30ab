//! Model descriptor value object

use super::error::DomainError;

/// Identity and context capacity of a language model (Value Object)
///
/// Immutable once constructed. Each chat owns its own descriptor value;
/// there is no registry of known models.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelDescriptor {
    name: String,
    max_tokens: usize,
}

impl ModelDescriptor {
    /// Create a descriptor, rejecting an empty name or a zero-sized window.
    pub fn new(name: impl Into<String>, max_tokens: usize) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::InvalidModel("model name is empty".to_string()));
        }
        if max_tokens == 0 {
            return Err(DomainError::InvalidModel(format!(
                "{}: max_tokens must be greater than 0",
                name
            )));
        }
        Ok(Self { name, max_tokens })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total number of tokens the model accepts in its context window.
    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }
}

impl std::fmt::Display for ModelDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} tokens)", self.name, self.max_tokens)
    }
}
