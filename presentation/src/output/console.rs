//! Console output formatter for chat replies

use chatservice_application::{ChatCompletionError, ChatCompletionOutput, ErrorKind};
use colored::Colorize;

/// Formats replies and errors for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Reply text followed by a dimmed line naming the chat.
    pub fn format_reply(output: &ChatCompletionOutput) -> String {
        format!("{}\n\n{}", output.content, Self::chat_footer(output))
    }

    /// Footer printed after a reply that was already streamed to the terminal.
    pub fn chat_footer(output: &ChatCompletionOutput) -> String {
        format!("{} {}", "chat:".dimmed(), output.chat_id.to_string().dimmed())
    }

    /// Format as JSON
    pub fn format_json(output: &ChatCompletionOutput) -> String {
        serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn format_error(error: &ChatCompletionError) -> String {
        let label = match error.kind() {
            ErrorKind::Validation => "Invalid request:",
            ErrorKind::Persistence => "Storage error:",
            ErrorKind::Provider => "Model error:",
            ErrorKind::Cancelled => "Cancelled:",
            ErrorKind::Delivery => "Output error:",
        };
        format!("{} {}", label.red().bold(), error)
    }
}
