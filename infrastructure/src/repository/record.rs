//! On-disk representation of a chat.

use chatservice_domain::{
    Chat, ChatConfig, ChatId, ChatParts, ChatStatus, DomainError, Message, MessageParts,
    ModelDescriptor, Role,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub token_count: usize,
    pub model: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Message> for StoredMessage {
    fn from(message: &Message) -> Self {
        let parts = message.to_parts();
        Self {
            id: parts.id,
            role: parts.role,
            content: parts.content,
            token_count: parts.token_count,
            model: parts.model,
            created_at: parts.created_at,
        }
    }
}

impl StoredMessage {
    fn into_message(self) -> Result<Message, DomainError> {
        Message::restore(MessageParts {
            id: self.id,
            role: self.role,
            content: self.content,
            token_count: self.token_count,
            model: self.model,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredConfig {
    pub model: String,
    pub model_max_tokens: usize,
    pub temperature: f32,
    pub top_p: f32,
    pub candidate_count: u32,
    #[serde(default)]
    pub stop_sequences: Vec<String>,
    pub max_reply_tokens: u32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
}

impl From<&ChatConfig> for StoredConfig {
    fn from(config: &ChatConfig) -> Self {
        Self {
            model: config.model().name().to_string(),
            model_max_tokens: config.model().max_tokens(),
            temperature: config.temperature(),
            top_p: config.top_p(),
            candidate_count: config.candidate_count(),
            stop_sequences: config.stop_sequences().to_vec(),
            max_reply_tokens: config.max_reply_tokens(),
            presence_penalty: config.presence_penalty(),
            frequency_penalty: config.frequency_penalty(),
        }
    }
}

impl StoredConfig {
    fn into_config(self) -> Result<ChatConfig, DomainError> {
        let model = ModelDescriptor::new(self.model, self.model_max_tokens)?;
        Ok(ChatConfig::new(model)
            .with_temperature(self.temperature)
            .with_top_p(self.top_p)
            .with_candidate_count(self.candidate_count)
            .with_stop_sequences(self.stop_sequences)
            .with_max_reply_tokens(self.max_reply_tokens)
            .with_presence_penalty(self.presence_penalty)
            .with_frequency_penalty(self.frequency_penalty))
    }
}

/// A chat as written to storage.
///
/// `token_usage` is not stored; it is recomputed on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChat {
    pub id: ChatId,
    pub user_id: String,
    pub status: ChatStatus,
    pub initial_system_message: StoredMessage,
    pub messages: Vec<StoredMessage>,
    #[serde(default)]
    pub erased_messages: Vec<StoredMessage>,
    pub config: StoredConfig,
}

impl From<&Chat> for StoredChat {
    fn from(chat: &Chat) -> Self {
        Self {
            id: chat.id(),
            user_id: chat.user_id().to_string(),
            status: chat.status(),
            initial_system_message: chat.initial_system_message().into(),
            messages: chat.messages().iter().map(StoredMessage::from).collect(),
            erased_messages: chat
                .erased_messages()
                .iter()
                .map(StoredMessage::from)
                .collect(),
            config: chat.config().into(),
        }
    }
}

impl StoredChat {
    pub fn into_chat(self) -> Result<Chat, DomainError> {
        let messages = self
            .messages
            .into_iter()
            .map(StoredMessage::into_message)
            .collect::<Result<Vec<_>, _>>()?;
        let erased_messages = self
            .erased_messages
            .into_iter()
            .map(StoredMessage::into_message)
            .collect::<Result<Vec<_>, _>>()?;

        Chat::restore(ChatParts {
            id: self.id,
            user_id: self.user_id,
            status: self.status,
            initial_system_message: self.initial_system_message.into_message()?,
            messages,
            erased_messages,
            config: self.config.into_config()?,
        })
    }
}
