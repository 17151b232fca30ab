//! OpenAI-compatible chat completions provider
//!
//! Works with any server exposing `/v1/chat/completions`, blocking or with
//! server-sent events.

mod adapter;
mod sse;
mod types;

pub use adapter::{OpenAiConfig, OpenAiProvider};
