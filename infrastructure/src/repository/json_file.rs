//! JSON file chat store.
//!
//! One `<chat_id>.json` file per chat. Each write goes to its own uniquely
//! named temporary sibling and is then moved into place, so a reader never
//! observes a half-written chat and concurrent writers never share a temp file.

use super::record::StoredChat;
use async_trait::async_trait;
use chatservice_application::{ChatStore, ChatStoreError};
use chatservice_domain::{Chat, ChatId};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

pub struct JsonFileChatStore {
    dir: PathBuf,
}

impl JsonFileChatStore {
    /// Store chats under `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn chat_path(&self, id: ChatId) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    async fn exists(&self, id: ChatId) -> Result<bool, ChatStoreError> {
        tokio::fs::try_exists(self.chat_path(id))
            .await
            .map_err(|e| ChatStoreError::Backend(format!("checking chat {}: {}", id, e)))
    }

    /// Write the encoded chat to a fresh temp file in the store directory.
    async fn write_temp(&self, chat: &Chat) -> Result<PathBuf, ChatStoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| write_error(chat.id(), e))?;

        let json = serde_json::to_vec_pretty(&StoredChat::from(chat))
            .map_err(|e| ChatStoreError::Backend(format!("encoding chat {}: {}", chat.id(), e)))?;

        let tmp = self
            .dir
            .join(format!(".{}.{}.json.tmp", chat.id(), Uuid::new_v4()));
        if let Err(e) = tokio::fs::write(&tmp, json).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(write_error(chat.id(), e));
        }
        Ok(tmp)
    }

    /// Replace the chat file with the current state.
    async fn write(&self, chat: &Chat) -> Result<(), ChatStoreError> {
        let tmp = self.write_temp(chat).await?;
        let path = self.chat_path(chat.id());
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(write_error(chat.id(), e));
        }

        debug!(chat_id = %chat.id(), path = %path.display(), "Wrote chat");
        Ok(())
    }

    /// Publish a new chat file without replacing an existing one.
    ///
    /// Linking the temp file to the final name fails if that name is taken,
    /// so two concurrent creates cannot both succeed.
    async fn write_new(&self, chat: &Chat) -> Result<(), ChatStoreError> {
        let tmp = self.write_temp(chat).await?;
        let path = self.chat_path(chat.id());
        let linked = tokio::fs::hard_link(&tmp, &path).await;
        let _ = tokio::fs::remove_file(&tmp).await;

        match linked {
            Ok(()) => {
                debug!(chat_id = %chat.id(), path = %path.display(), "Created chat");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(ChatStoreError::AlreadyExists(chat.id()))
            }
            Err(e) => Err(write_error(chat.id(), e)),
        }
    }
}

fn write_error(id: ChatId, e: std::io::Error) -> ChatStoreError {
    ChatStoreError::Backend(format!("writing chat {}: {}", id, e))
}

#[async_trait]
impl ChatStore for JsonFileChatStore {
    async fn create(&self, chat: &Chat) -> Result<(), ChatStoreError> {
        self.write_new(chat).await
    }

    async fn find_by_id(&self, id: ChatId) -> Result<Chat, ChatStoreError> {
        let bytes = match tokio::fs::read(self.chat_path(id)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(ChatStoreError::NotFound(id)),
            Err(e) => {
                return Err(ChatStoreError::Backend(format!(
                    "reading chat {}: {}",
                    id, e
                )));
            }
        };

        let corrupted = |reason: String| ChatStoreError::Corrupted {
            id: id.to_string(),
            reason,
        };
        let stored: StoredChat =
            serde_json::from_slice(&bytes).map_err(|e| corrupted(e.to_string()))?;
        if stored.id != id {
            return Err(corrupted(format!("file holds chat {}", stored.id)));
        }
        stored.into_chat().map_err(|e| corrupted(e.to_string()))
    }

    async fn save(&self, chat: &Chat) -> Result<(), ChatStoreError> {
        if !self.exists(chat.id()).await? {
            return Err(ChatStoreError::NotFound(chat.id()));
        }
        self.write(chat).await
    }
}
