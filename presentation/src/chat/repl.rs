//! REPL (Read-Eval-Print Loop) for interactive chat

use super::runner::ChatRunner;
use crate::output::console::ConsoleFormatter;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::path::PathBuf;

const HISTORY_CAPACITY: usize = 1000;

/// What a slash command asks the loop to do.
#[derive(Debug, PartialEq, Eq)]
enum CommandOutcome {
    Continue,
    Exit,
}

/// Interactive chat REPL
///
/// Every turn after the first continues the chat the first one created,
/// until `/new` starts over.
pub struct ChatRepl {
    runner: ChatRunner,
    user_id: String,
    chat_id: String,
    history_path: Option<PathBuf>,
}

impl ChatRepl {
    pub fn new(runner: ChatRunner, user_id: impl Into<String>) -> Self {
        Self {
            runner,
            user_id: user_id.into(),
            chat_id: String::new(),
            history_path: dirs::data_dir().map(|p| p.join("chatservice").join("history.txt")),
        }
    }

    /// Resume an existing chat instead of starting a new one
    pub fn with_chat_id(mut self, chat_id: Option<String>) -> Self {
        self.chat_id = chat_id.unwrap_or_default();
        self
    }

    pub fn with_history_path(mut self, path: Option<PathBuf>) -> Self {
        self.history_path = path;
        self
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> std::io::Result<()> {
        let mut line_editor = Reedline::create();
        if let Some(path) = &self.history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Ok(history) = FileBackedHistory::with_file(HISTORY_CAPACITY, path.clone()) {
                line_editor = line_editor.with_history(Box::new(history));
            }
        }
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic(">>>".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            match line_editor.read_line(&prompt)? {
                Signal::Success(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('/') {
                        if self.handle_command(line) == CommandOutcome::Exit {
                            break;
                        }
                        continue;
                    }

                    self.process_message(line).await;
                }
                Signal::CtrlC => {
                    println!("^C");
                    continue;
                }
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
            }
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│            chatservice - Chat Mode          │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Model: {}", self.runner.config().model);
        if !self.chat_id.is_empty() {
            println!("Chat:  {}", self.chat_id);
        }
        println!();
        self.print_help();
    }

    fn print_help(&self) {
        println!("Commands:");
        println!("  /help, /h, /?     - Show this help");
        println!("  /id               - Show the current chat id");
        println!("  /new              - Start a new chat");
        println!("  /quit, /exit, /q  - Exit chat");
        println!();
    }

    /// Handle slash commands
    fn handle_command(&mut self, cmd: &str) -> CommandOutcome {
        match cmd {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                CommandOutcome::Exit
            }
            "/help" | "/h" | "/?" => {
                println!();
                self.print_help();
                CommandOutcome::Continue
            }
            "/id" => {
                if self.chat_id.is_empty() {
                    println!("No chat yet; the next message starts one.");
                } else {
                    println!("{}", self.chat_id);
                }
                CommandOutcome::Continue
            }
            "/new" => {
                self.chat_id.clear();
                println!("Starting a new chat.");
                CommandOutcome::Continue
            }
            _ => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                CommandOutcome::Continue
            }
        }
    }

    async fn process_message(&mut self, message: &str) {
        println!();
        match self
            .runner
            .run_turn(&self.chat_id, &self.user_id, message)
            .await
        {
            Ok(output) => self.chat_id = output.chat_id.to_string(),
            Err(e) => eprintln!("{}", ConsoleFormatter::format_error(&e)),
        }
        println!();
    }
}
