//! Conversation message entity

use super::tokenizer::TokenCounter;
use crate::core::error::DomainError;
use crate::core::model::ModelDescriptor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(DomainError::InvalidRole(other.to_string())),
        }
    }
}

/// One turn in a conversation (Entity)
///
/// Created once and immutable afterwards. The token cost is computed at
/// construction against the model that will consume the message and is never
/// recomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    id: Uuid,
    role: Role,
    content: String,
    token_count: usize,
    model: String,
    created_at: DateTime<Utc>,
}

/// Persisted fields of a [`Message`], used to rehydrate stored history.
#[derive(Debug, Clone)]
pub struct MessageParts {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub token_count: usize,
    pub model: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a message, counting its tokens for `model`.
    pub fn new(
        role: Role,
        content: impl Into<String>,
        model: &ModelDescriptor,
        counter: &dyn TokenCounter,
    ) -> Result<Self, DomainError> {
        let content = content.into();
        if content.is_empty() {
            return Err(DomainError::EmptyContent);
        }
        let token_count = counter.count(&content, model.name())?;

        Ok(Self {
            id: Uuid::new_v4(),
            role,
            content,
            token_count,
            model: model.name().to_string(),
            created_at: Utc::now(),
        })
    }

    pub fn system(
        content: impl Into<String>,
        model: &ModelDescriptor,
        counter: &dyn TokenCounter,
    ) -> Result<Self, DomainError> {
        Self::new(Role::System, content, model, counter)
    }

    pub fn user(
        content: impl Into<String>,
        model: &ModelDescriptor,
        counter: &dyn TokenCounter,
    ) -> Result<Self, DomainError> {
        Self::new(Role::User, content, model, counter)
    }

    pub fn assistant(
        content: impl Into<String>,
        model: &ModelDescriptor,
        counter: &dyn TokenCounter,
    ) -> Result<Self, DomainError> {
        Self::new(Role::Assistant, content, model, counter)
    }

    /// Rehydrate a stored message without recounting its tokens.
    pub fn restore(parts: MessageParts) -> Result<Self, DomainError> {
        if parts.content.is_empty() {
            return Err(DomainError::EmptyContent);
        }
        Ok(Self {
            id: parts.id,
            role: parts.role,
            content: parts.content,
            token_count: parts.token_count,
            model: parts.model,
            created_at: parts.created_at,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn token_count(&self) -> usize {
        self.token_count
    }

    /// Name of the model the token count was computed against.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Split into persisted fields.
    pub fn to_parts(&self) -> MessageParts {
        MessageParts {
            id: self.id,
            role: self.role,
            content: self.content.clone(),
            token_count: self.token_count,
            model: self.model.clone(),
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::tokenizer::WordTokenCounter;
    use crate::core::error::TokenizerError;

    struct RejectingCounter;

    impl TokenCounter for RejectingCounter {
        fn count(&self, _text: &str, model: &str) -> Result<usize, TokenizerError> {
            Err(TokenizerError::UnsupportedModel(model.to_string()))
        }
    }

    fn model() -> ModelDescriptor {
        ModelDescriptor::new("gpt-4", 100).unwrap()
    }

    #[test]
    fn test_new_message_counts_tokens() {
        let msg = Message::user("hello there world", &model(), &WordTokenCounter).unwrap();
        assert_eq!(msg.role(), Role::User);
        assert_eq!(msg.content(), "hello there world");
        assert_eq!(msg.token_count(), 3);
        assert_eq!(msg.model(), "gpt-4");
    }

    #[test]
    fn test_empty_content_rejected() {
        assert_eq!(
            Message::user("", &model(), &WordTokenCounter),
            Err(DomainError::EmptyContent)
        );
    }

    #[test]
    fn test_tokenizer_failure_surfaces() {
        let result = Message::system("be helpful", &model(), &RejectingCounter);
        assert!(matches!(
            result,
            Err(DomainError::Tokenizer(TokenizerError::UnsupportedModel(m))) if m == "gpt-4"
        ));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Message::user("a", &model(), &WordTokenCounter).unwrap();
        let b = Message::user("a", &model(), &WordTokenCounter).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("assistant".parse::<Role>().unwrap(), Role::Assistant);
        assert_eq!(
            "tool".parse::<Role>(),
            Err(DomainError::InvalidRole("tool".to_string()))
        );
        assert_eq!(Role::System.to_string(), "system");
    }

    #[test]
    fn test_restore_keeps_token_count() {
        let original = Message::assistant("one two", &model(), &WordTokenCounter).unwrap();
        let mut parts = original.to_parts();
        parts.token_count = 42;
        let restored = Message::restore(parts).unwrap();
        assert_eq!(restored.id(), original.id());
        assert_eq!(restored.token_count(), 42);
    }
}
