//! Chat domain.
//!
//! - [`entities::Chat`]: a conversation with a token-budgeted message window
//! - [`message::Message`]: a single turn within a chat
//! - [`config::ChatConfig`]: sampling parameters fixed at chat creation
//! - [`tokenizer::TokenCounter`]: token counting capability
//! - [`stream::StreamEvent`]: incremental completion events

pub mod config;
pub mod entities;
pub mod message;
pub mod stream;
pub mod tokenizer;
