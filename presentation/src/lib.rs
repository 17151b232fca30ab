//! Presentation layer for chatservice
//!
//! This crate contains CLI definitions, output formatters,
//! streamed reply rendering, and the interactive chat interface.

pub mod chat;
pub mod cli;
pub mod output;

// Re-export commonly used types
pub use chat::{ChatRepl, ChatRunner};
pub use cli::commands::{Cli, OutputFormat};
pub use output::console::ConsoleFormatter;
pub use output::stream_printer::StreamPrinter;
