//! Use cases (application services)
//!
//! - [`chat_completion`]: one blocking completion per request
//! - [`chat_completion_stream`]: incremental completion with cumulative snapshots
//! - [`resolve_chat`]: find or create the chat a request refers to

pub mod chat_completion;
pub mod chat_completion_stream;
pub mod resolve_chat;
pub(crate) mod shared;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;
