//! Completion provider adapters.

pub mod openai;

pub use openai::{OpenAiConfig, OpenAiProvider};
