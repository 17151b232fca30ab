//! In-memory chat store.

use async_trait::async_trait;
use chatservice_application::{ChatStore, ChatStoreError};
use chatservice_domain::{Chat, ChatId};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Chats kept for the lifetime of the process.
#[derive(Default)]
pub struct InMemoryChatStore {
    chats: RwLock<HashMap<ChatId, Chat>>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.chats.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.chats.read().await.is_empty()
    }
}

#[async_trait]
impl ChatStore for InMemoryChatStore {
    async fn create(&self, chat: &Chat) -> Result<(), ChatStoreError> {
        let mut chats = self.chats.write().await;
        if chats.contains_key(&chat.id()) {
            return Err(ChatStoreError::AlreadyExists(chat.id()));
        }
        chats.insert(chat.id(), chat.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ChatId) -> Result<Chat, ChatStoreError> {
        self.chats
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(ChatStoreError::NotFound(id))
    }

    async fn save(&self, chat: &Chat) -> Result<(), ChatStoreError> {
        let mut chats = self.chats.write().await;
        match chats.get_mut(&chat.id()) {
            Some(stored) => {
                *stored = chat.clone();
                Ok(())
            }
            None => Err(ChatStoreError::NotFound(chat.id())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatservice_domain::{ChatConfig, Message, ModelDescriptor, WordTokenCounter};

    fn chat() -> Chat {
        let model = ModelDescriptor::new("gpt-4", 100).unwrap();
        let system = Message::system("be brief", &model, &WordTokenCounter).unwrap();
        Chat::new("alice", system, ChatConfig::new(model)).unwrap()
    }

    #[tokio::test]
    async fn test_create_then_find() {
        let store = InMemoryChatStore::new();
        let chat = chat();
        store.create(&chat).await.unwrap();

        let found = store.find_by_id(chat.id()).await.unwrap();
        assert_eq!(found.id(), chat.id());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_create_is_rejected() {
        let store = InMemoryChatStore::new();
        let chat = chat();
        store.create(&chat).await.unwrap();

        let err = store.create(&chat).await.unwrap_err();
        assert!(matches!(err, ChatStoreError::AlreadyExists(id) if id == chat.id()));
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let store = InMemoryChatStore::new();
        let err = store.find_by_id(ChatId::generate()).await.unwrap_err();
        assert!(err.is_not_found());

        let err = store.save(&chat()).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_save_replaces_state() {
        let store = InMemoryChatStore::new();
        let mut chat = chat();
        store.create(&chat).await.unwrap();

        let model = chat.model().clone();
        chat.add_message(Message::user("hello", &model, &WordTokenCounter).unwrap())
            .unwrap();
        store.save(&chat).await.unwrap();

        assert_eq!(store.find_by_id(chat.id()).await.unwrap().message_count(), 2);
    }
}
