//! Domain layer for chatservice
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Chat
//!
//! A chat is one linear conversation owned by a user. It keeps the most
//! recent messages inside the model's context window:
//!
//! - **Window**: the messages sent to the model, oldest first
//! - **Eviction**: when a new message does not fit, the oldest messages move
//!   to an append-only erased log until it does
//!
//! ## Message
//!
//! A turn with a role and a token cost computed once, against the model that
//! will read it.

pub mod chat;
pub mod core;

// Re-export commonly used types
pub use chat::{
    config::ChatConfig,
    entities::{AddOutcome, Chat, ChatId, ChatParts, ChatStatus},
    message::{Message, MessageParts, Role},
    stream::StreamEvent,
    tokenizer::{TokenCounter, WordTokenCounter},
};
pub use core::{
    error::{DomainError, TokenizerError},
    model::ModelDescriptor,
};
