//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for replies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Reply text followed by the chat id
    #[default]
    Text,
    /// `{chat_id, user_id, content}` as JSON
    Json,
}

/// CLI arguments for chatservice
#[derive(Parser, Debug)]
#[command(name = "chatservice")]
#[command(author, version, about = "Chat with a language model, keeping history within its context window")]
#[command(long_about = r#"
chatservice sends a message to a chat and prints the model's reply.

Each chat keeps its most recent messages within the model's context window;
older messages are moved out of the window as the conversation grows.

Configuration files are loaded from (in priority order):
1. CHATSERVICE_<SECTION>__<KEY>             Environment
2. --config <path>                          Explicit config file
3. ./chatservice.toml                       Project-level config
4. ~/.config/chatservice/config.toml        Global config

Example:
  chatservice "What is a borrow checker?"
  chatservice --stream --chat-id 5f0c... "And lifetimes?"
  chatservice --interactive
"#)]
pub struct Cli {
    /// The message to send (not required in interactive mode)
    pub message: Option<String>,

    /// Stream the reply as it is generated
    #[arg(short, long)]
    pub stream: bool,

    /// Continue an existing chat
    #[arg(long, value_name = "ID")]
    pub chat_id: Option<String>,

    /// User that owns the chat (defaults to $USER)
    #[arg(short, long, value_name = "ID")]
    pub user: Option<String>,

    /// Model for new chats, overriding the configuration
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Start an interactive chat
    #[arg(short, long)]
    pub interactive: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Chat owner: `--user`, then `$USER`, then "anonymous".
    pub fn resolve_user(&self) -> String {
        self.user
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| "anonymous".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_streaming_continuation() {
        let cli = Cli::parse_from([
            "chatservice",
            "--stream",
            "--chat-id",
            "abc",
            "-u",
            "alice",
            "hello there",
        ]);
        assert!(cli.stream);
        assert_eq!(cli.chat_id.as_deref(), Some("abc"));
        assert_eq!(cli.message.as_deref(), Some("hello there"));
        assert_eq!(cli.resolve_user(), "alice");
        assert_eq!(cli.output, OutputFormat::Text);
    }

    #[test]
    fn test_parse_json_and_verbosity() {
        let cli = Cli::parse_from(["chatservice", "-o", "json", "-vv", "--no-config", "hi"]);
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.verbose, 2);
        assert!(cli.no_config);
    }
}
