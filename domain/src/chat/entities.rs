//! Chat domain entities

use super::config::ChatConfig;
use super::message::{Message, Role};
use crate::core::error::DomainError;
use crate::core::model::ModelDescriptor;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(Uuid);

impl ChatId {
    /// Generates a new random ChatId.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a textual id, rejecting anything that is not a UUID.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| DomainError::InvalidChatId(s.to_string()))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for ChatId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::str::FromStr for ChatId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatStatus {
    Active,
    Closed,
}

impl ChatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatStatus::Active => "active",
            ChatStatus::Closed => "closed",
        }
    }
}

impl std::fmt::Display for ChatStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ChatStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ChatStatus::Active),
            "closed" => Ok(ChatStatus::Closed),
            other => Err(DomainError::InvalidStatus(other.to_string())),
        }
    }
}

/// Result of a successful [`Chat::add_message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddOutcome {
    /// Number of messages moved from the window into the erased log.
    pub evicted: usize,
}

/// Persisted state of a [`Chat`], used to rehydrate it from storage.
#[derive(Debug, Clone)]
pub struct ChatParts {
    pub id: ChatId,
    pub user_id: String,
    pub status: ChatStatus,
    pub initial_system_message: Message,
    pub messages: Vec<Message>,
    pub erased_messages: Vec<Message>,
    pub config: ChatConfig,
}

/// A conversation with a token-budgeted message window (Entity)
///
/// `messages` is the window sent to the model; its total token cost never
/// exceeds the model capacity. Messages pushed out of the window move, in
/// order, to `erased_messages`, which is append-only and never sent to the
/// model again.
///
/// The only mutation path for the window is [`add_message`](Self::add_message).
#[derive(Debug, Clone)]
pub struct Chat {
    id: ChatId,
    user_id: String,
    status: ChatStatus,
    initial_system_message: Message,
    messages: Vec<Message>,
    erased_messages: Vec<Message>,
    token_usage: usize,
    config: ChatConfig,
}

impl Chat {
    /// Create an active chat whose window starts with `initial_system_message`.
    pub fn new(
        user_id: impl Into<String>,
        initial_system_message: Message,
        config: ChatConfig,
    ) -> Result<Self, DomainError> {
        let user_id = user_id.into();
        Self::validate_header(&user_id, &initial_system_message, &config)?;

        let mut chat = Self {
            id: ChatId::generate(),
            user_id,
            status: ChatStatus::Active,
            initial_system_message: initial_system_message.clone(),
            messages: Vec::new(),
            erased_messages: Vec::new(),
            token_usage: 0,
            config,
        };
        chat.add_message(initial_system_message)?;
        Ok(chat)
    }

    /// Rehydrate a stored chat.
    ///
    /// `token_usage` is recomputed from the window rather than trusted.
    pub fn restore(parts: ChatParts) -> Result<Self, DomainError> {
        Self::validate_header(&parts.user_id, &parts.initial_system_message, &parts.config)?;

        if parts.status == ChatStatus::Active && parts.messages.is_empty() {
            return Err(DomainError::CorruptedChat(format!(
                "active chat {} has an empty message window",
                parts.id
            )));
        }

        let mut chat = Self {
            id: parts.id,
            user_id: parts.user_id,
            status: parts.status,
            initial_system_message: parts.initial_system_message,
            messages: parts.messages,
            erased_messages: parts.erased_messages,
            token_usage: 0,
            config: parts.config,
        };
        chat.refresh_token_usage();

        if chat.token_usage > chat.model().max_tokens() {
            return Err(DomainError::CorruptedChat(format!(
                "chat {} uses {} tokens, model window is {}",
                chat.id,
                chat.token_usage,
                chat.model().max_tokens()
            )));
        }
        Ok(chat)
    }

    fn validate_header(
        user_id: &str,
        initial_system_message: &Message,
        config: &ChatConfig,
    ) -> Result<(), DomainError> {
        if user_id.trim().is_empty() {
            return Err(DomainError::EmptyUserId);
        }
        if initial_system_message.role() != Role::System {
            return Err(DomainError::MissingInitialSystemMessage);
        }
        config.validate()
    }

    /// Append a message, evicting the oldest messages until it fits.
    ///
    /// Eviction always takes index 0 of the window and never the incoming
    /// message. The system message is not protected. A message that alone
    /// exceeds the model capacity is rejected and nothing changes.
    pub fn add_message(&mut self, message: Message) -> Result<AddOutcome, DomainError> {
        if self.status == ChatStatus::Closed {
            return Err(DomainError::ChatClosed);
        }

        let max_tokens = self.config.model().max_tokens();
        let cost = message.token_count();
        if cost > max_tokens {
            return Err(DomainError::MessageTooLarge {
                tokens: cost,
                max_tokens,
            });
        }

        // cost <= max_tokens, so freeing `needed` never exhausts the window
        let needed = (self.token_usage + cost).saturating_sub(max_tokens);
        let mut freed = 0;
        let evicted = self
            .messages
            .iter()
            .take_while(|m| {
                let take = freed < needed;
                freed += m.token_count();
                take
            })
            .count();

        self.erased_messages.extend(self.messages.drain(..evicted));
        self.messages.push(message);
        self.refresh_token_usage();

        Ok(AddOutcome { evicted })
    }

    /// Mark the chat closed. Further appends fail.
    pub fn close(&mut self) {
        self.status = ChatStatus::Closed;
    }

    fn refresh_token_usage(&mut self) {
        self.token_usage = self.messages.iter().map(Message::token_count).sum();
    }

    // ==================== Accessors ====================

    pub fn id(&self) -> ChatId {
        self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn status(&self) -> ChatStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == ChatStatus::Active
    }

    /// The system message the chat was created with, even once evicted.
    pub fn initial_system_message(&self) -> &Message {
        &self.initial_system_message
    }

    /// The current window, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Evicted messages in eviction order.
    pub fn erased_messages(&self) -> &[Message] {
        &self.erased_messages
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Sum of token counts over the current window.
    pub fn token_usage(&self) -> usize {
        self.token_usage
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn model(&self) -> &ModelDescriptor {
        self.config.model()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::tokenizer::{TokenCounter, WordTokenCounter};
    use crate::core::error::TokenizerError;

    /// Counts tokens as the leading integer of the content ("45 ..." costs 45).
    struct PrefixCounter;

    impl TokenCounter for PrefixCounter {
        fn count(&self, text: &str, _model: &str) -> Result<usize, TokenizerError> {
            Ok(text
                .split_whitespace()
                .next()
                .and_then(|t| t.parse().ok())
                .unwrap_or(0))
        }
    }

    fn model(max_tokens: usize) -> ModelDescriptor {
        ModelDescriptor::new("test-model", max_tokens).unwrap()
    }

    fn msg(role: Role, tokens: usize, max_tokens: usize) -> Message {
        Message::new(
            role,
            format!("{} tokens", tokens),
            &model(max_tokens),
            &PrefixCounter,
        )
        .unwrap()
    }

    fn chat(max_tokens: usize, system_tokens: usize) -> Chat {
        Chat::new(
            "user-1",
            msg(Role::System, system_tokens, max_tokens),
            ChatConfig::new(model(max_tokens)),
        )
        .unwrap()
    }

    fn assert_usage_consistent(chat: &Chat) {
        let sum: usize = chat.messages().iter().map(|m| m.token_count()).sum();
        assert_eq!(chat.token_usage(), sum);
    }

    // ==================== Construction ====================

    #[test]
    fn test_new_chat_holds_system_message() {
        let chat = chat(100, 10);
        assert!(chat.is_active());
        assert_eq!(chat.message_count(), 1);
        assert_eq!(chat.messages()[0].role(), Role::System);
        assert_eq!(chat.token_usage(), 10);
        assert_eq!(chat.initial_system_message().id(), chat.messages()[0].id());
        assert!(chat.erased_messages().is_empty());
    }

    #[test]
    fn test_empty_user_id_rejected() {
        let result = Chat::new("", msg(Role::System, 1, 10), ChatConfig::new(model(10)));
        assert!(matches!(result, Err(DomainError::EmptyUserId)));
    }

    #[test]
    fn test_non_system_initial_message_rejected() {
        let result = Chat::new("u", msg(Role::User, 1, 10), ChatConfig::new(model(10)));
        assert!(matches!(
            result,
            Err(DomainError::MissingInitialSystemMessage)
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = Chat::new(
            "u",
            msg(Role::System, 1, 10),
            ChatConfig::new(model(10)).with_temperature(3.0),
        );
        assert!(matches!(result, Err(DomainError::InvalidTemperature(_))));

        let result = Chat::new(
            "u",
            msg(Role::System, 1, 10),
            ChatConfig::new(model(10)).with_top_p(-0.5),
        );
        assert!(matches!(result, Err(DomainError::InvalidTopP(_))));
    }

    #[test]
    fn test_oversized_system_message_rejected() {
        let result = Chat::new("u", msg(Role::System, 11, 10), ChatConfig::new(model(10)));
        assert!(matches!(
            result,
            Err(DomainError::MessageTooLarge {
                tokens: 11,
                max_tokens: 10
            })
        ));
    }

    // ==================== Eviction ====================

    #[test]
    fn test_add_within_budget_keeps_everything() {
        let mut chat = chat(100, 10);
        let outcome = chat.add_message(msg(Role::User, 20, 100)).unwrap();
        assert_eq!(outcome.evicted, 0);
        assert_eq!(chat.message_count(), 2);
        assert_eq!(chat.token_usage(), 30);
    }

    #[test]
    fn test_exact_fit_does_not_evict() {
        let mut chat = chat(50, 10);
        let outcome = chat.add_message(msg(Role::User, 40, 50)).unwrap();
        assert_eq!(outcome.evicted, 0);
        assert_eq!(chat.token_usage(), 50);
    }

    #[test]
    fn test_system_message_evicted_when_window_overflows() {
        // 10 + 45 = 55 > 50
        let mut chat = chat(50, 10);
        let system_id = chat.messages()[0].id();

        let outcome = chat.add_message(msg(Role::User, 45, 50)).unwrap();

        assert_eq!(outcome.evicted, 1);
        assert_eq!(chat.message_count(), 1);
        assert_eq!(chat.messages()[0].role(), Role::User);
        assert_eq!(chat.token_usage(), 45);
        assert_eq!(chat.erased_messages().len(), 1);
        assert_eq!(chat.erased_messages()[0].id(), system_id);
        assert_eq!(chat.initial_system_message().id(), system_id);
    }

    #[test]
    fn test_eviction_takes_oldest_first_and_preserves_order() {
        let mut chat = chat(30, 5);
        let a = msg(Role::User, 10, 30);
        let b = msg(Role::Assistant, 10, 30);
        let (a_id, b_id) = (a.id(), b.id());
        chat.add_message(a).unwrap();
        chat.add_message(b).unwrap();
        assert_eq!(chat.token_usage(), 25);

        // needs 20 free: evicts system (5) and a (10), b (10) stays
        let c = msg(Role::User, 20, 30);
        let c_id = c.id();
        let outcome = chat.add_message(c).unwrap();
        assert_eq!(outcome.evicted, 2);

        let window: Vec<_> = chat.messages().iter().map(|m| m.id()).collect();
        assert_eq!(window, vec![b_id, c_id]);

        let erased: Vec<_> = chat.erased_messages().iter().map(|m| m.role()).collect();
        assert_eq!(erased, vec![Role::System, Role::User]);
        assert_eq!(chat.erased_messages()[1].id(), a_id);
        assert_usage_consistent(&chat);
    }

    #[test]
    fn test_erased_log_is_append_only() {
        let mut chat = chat(20, 5);
        let mut seen = Vec::new();
        for i in 0..10 {
            chat.add_message(msg(Role::User, 5 + i % 3, 20)).unwrap();
            let erased: Vec<_> = chat.erased_messages().iter().map(|m| m.id()).collect();
            assert!(erased.starts_with(&seen));
            seen = erased;
            assert_usage_consistent(&chat);
            assert!(chat.token_usage() <= 20);
            assert!(chat.message_count() >= 1);
        }
    }

    #[test]
    fn test_message_too_large_leaves_chat_untouched() {
        let mut chat = chat(50, 10);
        let result = chat.add_message(msg(Role::User, 51, 100));
        assert!(matches!(
            result,
            Err(DomainError::MessageTooLarge {
                tokens: 51,
                max_tokens: 50
            })
        ));
        assert_eq!(chat.message_count(), 1);
        assert_eq!(chat.token_usage(), 10);
        assert!(chat.erased_messages().is_empty());
    }

    #[test]
    fn test_message_filling_whole_window_evicts_everything_else() {
        let mut chat = chat(50, 10);
        chat.add_message(msg(Role::User, 20, 50)).unwrap();
        let outcome = chat.add_message(msg(Role::Assistant, 50, 50)).unwrap();
        assert_eq!(outcome.evicted, 2);
        assert_eq!(chat.message_count(), 1);
        assert_eq!(chat.token_usage(), 50);
    }

    #[test]
    fn test_zero_cost_messages_never_evict() {
        let mut chat = chat(10, 10);
        let outcome = chat.add_message(msg(Role::User, 0, 10)).unwrap();
        assert_eq!(outcome.evicted, 0);
        assert_eq!(chat.message_count(), 2);
    }

    // ==================== Status ====================

    #[test]
    fn test_closed_chat_rejects_messages() {
        let mut chat = chat(100, 10);
        chat.close();
        let before_usage = chat.token_usage();

        let result = chat.add_message(msg(Role::User, 1, 100));

        assert!(matches!(result, Err(DomainError::ChatClosed)));
        assert_eq!(chat.message_count(), 1);
        assert_eq!(chat.token_usage(), before_usage);
        assert_eq!(chat.status(), ChatStatus::Closed);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("closed".parse::<ChatStatus>().unwrap(), ChatStatus::Closed);
        assert!(matches!(
            "archived".parse::<ChatStatus>(),
            Err(DomainError::InvalidStatus(_))
        ));
    }

    // ==================== Identifiers ====================

    #[test]
    fn test_chat_id_parsing() {
        let id = ChatId::generate();
        assert_eq!(ChatId::parse(&id.to_string()).unwrap(), id);
        assert!(matches!(
            ChatId::parse("not-a-uuid"),
            Err(DomainError::InvalidChatId(_))
        ));
    }

    // ==================== Restore ====================

    fn parts_of(chat: &Chat) -> ChatParts {
        ChatParts {
            id: chat.id(),
            user_id: chat.user_id().to_string(),
            status: chat.status(),
            initial_system_message: chat.initial_system_message().clone(),
            messages: chat.messages().to_vec(),
            erased_messages: chat.erased_messages().to_vec(),
            config: chat.config().clone(),
        }
    }

    #[test]
    fn test_restore_recomputes_usage() {
        let mut original = chat(50, 10);
        original.add_message(msg(Role::User, 45, 50)).unwrap();

        let restored = Chat::restore(parts_of(&original)).unwrap();
        assert_eq!(restored.id(), original.id());
        assert_eq!(restored.token_usage(), 45);
        assert_eq!(restored.erased_messages().len(), 1);
    }

    #[test]
    fn test_restore_rejects_empty_active_window() {
        let mut parts = parts_of(&chat(50, 10));
        parts.messages.clear();
        assert!(matches!(
            Chat::restore(parts),
            Err(DomainError::CorruptedChat(_))
        ));
    }

    #[test]
    fn test_restore_rejects_overfull_window() {
        let mut parts = parts_of(&chat(50, 10));
        parts.messages.push(msg(Role::User, 45, 100));
        assert!(matches!(
            Chat::restore(parts),
            Err(DomainError::CorruptedChat(_))
        ));
    }

    #[test]
    fn test_word_counter_chat_roundtrip() {
        let model = model(8);
        let system = Message::system("you are terse", &model, &WordTokenCounter).unwrap();
        let mut chat = Chat::new("u", system, ChatConfig::new(model.clone())).unwrap();
        let user = Message::user("what is rust exactly", &model, &WordTokenCounter).unwrap();
        chat.add_message(user).unwrap();
        assert_eq!(chat.token_usage(), 7);
        let reply = Message::assistant("a language", &model, &WordTokenCounter).unwrap();
        chat.add_message(reply).unwrap();
        assert_eq!(chat.token_usage(), 6);
        assert_eq!(chat.erased_messages().len(), 1);
    }
}
