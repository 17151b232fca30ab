//! Application-level configuration.
//!
//! - [`CompletionConfig`]: model and sampling settings for new chats
//! - [`StreamParams`]: delivery behavior of the streaming executor

pub mod completion_config;
pub mod stream_params;

pub use completion_config::CompletionConfig;
pub use stream_params::StreamParams;
