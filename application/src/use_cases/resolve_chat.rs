//! Resolve Chat use case
//!
//! Finds the chat a request refers to, or creates a new one.
//!
//! Only a store `NotFound` leads to creation. Any other store failure is
//! returned as is: treating a failed lookup as absence would silently fork
//! the conversation.

use crate::config::CompletionConfig;
use crate::ports::chat_store::{ChatStore, ChatStoreError};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::use_cases::types::ChatCompletionError;
use chatservice_domain::{Chat, ChatId, DomainError, Message, TokenCounter};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

pub struct ChatLoader {
    store: Arc<dyn ChatStore>,
    counter: Arc<dyn TokenCounter>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl ChatLoader {
    pub fn new(store: Arc<dyn ChatStore>, counter: Arc<dyn TokenCounter>) -> Self {
        Self {
            store,
            counter,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Load `chat_id` for `user_id`, creating a chat from `config` when the
    /// id is empty or unknown.
    pub async fn resolve_or_create(
        &self,
        chat_id: &str,
        user_id: &str,
        config: &CompletionConfig,
    ) -> Result<Chat, ChatCompletionError> {
        let chat_id = chat_id.trim();
        if chat_id.is_empty() {
            return self.create(user_id, config).await;
        }

        let id = ChatId::parse(chat_id)
            .map_err(|e| ChatCompletionError::validation("resolve_chat", e))?;

        match self.store.find_by_id(id).await {
            Ok(chat) => {
                if chat.user_id() != user_id {
                    return Err(ChatCompletionError::validation(
                        "resolve_chat",
                        DomainError::ChatOwnershipMismatch {
                            chat_id: id.to_string(),
                            user_id: user_id.to_string(),
                        },
                    ));
                }
                debug!(chat_id = %id, messages = chat.message_count(), "Resolved existing chat");
                Ok(chat)
            }
            Err(ChatStoreError::NotFound(_)) => {
                info!(requested = %id, "Chat not found, starting a new one");
                self.create(user_id, config).await
            }
            Err(e) => Err(ChatCompletionError::persistence("resolve_chat", e)),
        }
    }

    async fn create(
        &self,
        user_id: &str,
        config: &CompletionConfig,
    ) -> Result<Chat, ChatCompletionError> {
        let invalid = |e| ChatCompletionError::validation("create_chat", e);

        let model = config.model_descriptor().map_err(invalid)?;
        let system = Message::system(
            config.initial_system_message.as_str(),
            &model,
            self.counter.as_ref(),
        )
        .map_err(invalid)?;
        let chat = Chat::new(user_id, system, config.chat_config(model)).map_err(invalid)?;

        self.store
            .create(&chat)
            .await
            .map_err(|e| ChatCompletionError::persistence("create_chat", e))?;

        info!(chat_id = %chat.id(), model = chat.model().name(), "Created chat");
        self.conversation_logger.log(ConversationEvent::new(
            "chat_created",
            chat.id(),
            json!({
                "user_id": chat.user_id(),
                "model": chat.model().name(),
                "max_tokens": chat.model().max_tokens(),
                "token_usage": chat.token_usage(),
            }),
        ));
        Ok(chat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{MockStore, RecordingLogger};
    use crate::use_cases::types::ErrorKind;
    use chatservice_domain::WordTokenCounter;

    fn loader(store: Arc<MockStore>) -> ChatLoader {
        ChatLoader::new(store, Arc::new(WordTokenCounter))
    }

    #[tokio::test]
    async fn empty_id_creates_exactly_one_chat() {
        let store = Arc::new(MockStore::default());
        let logger = Arc::new(RecordingLogger::default());
        let loader = loader(store.clone()).with_conversation_logger(logger.clone());

        let chat = loader
            .resolve_or_create("", "alice", &CompletionConfig::default())
            .await
            .unwrap();

        assert_eq!(store.creates(), 1);
        assert_eq!(store.finds(), 0);
        assert_eq!(chat.user_id(), "alice");
        assert_eq!(chat.message_count(), 1);
        assert!(store.get(chat.id()).is_some());
        assert_eq!(logger.event_types(), vec!["chat_created"]);
    }

    #[tokio::test]
    async fn unknown_id_creates_a_fresh_chat() {
        let store = Arc::new(MockStore::default());
        let requested = ChatId::generate();

        let chat = loader(store.clone())
            .resolve_or_create(&requested.to_string(), "alice", &CompletionConfig::default())
            .await
            .unwrap();

        assert_eq!(store.finds(), 1);
        assert_eq!(store.creates(), 1);
        assert_ne!(chat.id(), requested);
    }

    #[tokio::test]
    async fn lookup_failure_propagates_without_create() {
        let store = Arc::new(MockStore::failing_find());

        let err = loader(store.clone())
            .resolve_or_create(
                &ChatId::generate().to_string(),
                "alice",
                &CompletionConfig::default(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert_eq!(err.operation(), Some("resolve_chat"));
        assert_eq!(store.creates(), 0);
    }

    #[tokio::test]
    async fn existing_chat_is_returned_unchanged() {
        let store = Arc::new(MockStore::default());
        let loader = loader(store.clone());
        let created = loader
            .resolve_or_create("", "alice", &CompletionConfig::default())
            .await
            .unwrap();

        let other_config = CompletionConfig::default().with_model("gpt-4", 8192);
        let found = loader
            .resolve_or_create(&created.id().to_string(), "alice", &other_config)
            .await
            .unwrap();

        assert_eq!(found.id(), created.id());
        assert_eq!(found.model().name(), created.model().name());
        assert_eq!(store.creates(), 1);
    }

    #[tokio::test]
    async fn malformed_id_is_rejected_before_lookup() {
        let store = Arc::new(MockStore::default());

        let err = loader(store.clone())
            .resolve_or_create("not-a-uuid", "alice", &CompletionConfig::default())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(store.finds(), 0);
        assert_eq!(store.creates(), 0);
    }

    #[tokio::test]
    async fn other_users_chat_is_rejected() {
        let store = Arc::new(MockStore::default());
        let loader = loader(store.clone());
        let chat = loader
            .resolve_or_create("", "alice", &CompletionConfig::default())
            .await
            .unwrap();

        let err = loader
            .resolve_or_create(&chat.id().to_string(), "mallory", &CompletionConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ChatCompletionError::Validation {
                source: DomainError::ChatOwnershipMismatch { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn invalid_config_fails_before_create() {
        let store = Arc::new(MockStore::default());
        let config = CompletionConfig::default().with_temperature(3.5);

        let err = loader(store.clone())
            .resolve_or_create("", "alice", &config)
            .await
            .unwrap_err();

        assert_eq!(err.operation(), Some("create_chat"));
        assert_eq!(store.creates(), 0);
    }
}
