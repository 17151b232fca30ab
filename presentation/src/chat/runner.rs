//! Runs a single chat turn, blocking or streamed.

use crate::cli::commands::OutputFormat;
use crate::output::console::ConsoleFormatter;
use crate::output::stream_printer::StreamPrinter;
use chatservice_application::{
    ChatCompletionError, ChatCompletionInput, ChatCompletionOutput, ChatCompletionStreamUseCase,
    ChatCompletionUseCase, CompletionConfig,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const DEFAULT_STREAM_BUFFER: usize = 32;

/// Dispatches user messages to the blocking or streaming executor and
/// renders the result.
///
/// Ctrl-C during a turn cancels that turn only.
pub struct ChatRunner {
    sync: Arc<ChatCompletionUseCase>,
    stream: Arc<ChatCompletionStreamUseCase>,
    config: CompletionConfig,
    format: OutputFormat,
    streaming: bool,
    stream_buffer: usize,
}

impl ChatRunner {
    pub fn new(
        sync: Arc<ChatCompletionUseCase>,
        stream: Arc<ChatCompletionStreamUseCase>,
        config: CompletionConfig,
    ) -> Self {
        Self {
            sync,
            stream,
            config,
            format: OutputFormat::Text,
            streaming: false,
            stream_buffer: DEFAULT_STREAM_BUFFER,
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// Snapshots buffered between the executor and the terminal.
    pub fn with_stream_buffer(mut self, buffer: usize) -> Self {
        self.stream_buffer = buffer.max(1);
        self
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    /// Run one turn and print the reply. An empty `chat_id` starts a new chat.
    pub async fn run_turn(
        &self,
        chat_id: &str,
        user_id: &str,
        message: &str,
    ) -> Result<ChatCompletionOutput, ChatCompletionError> {
        let input =
            ChatCompletionInput::new(chat_id, user_id, message, self.config.clone());

        let cancellation = CancellationToken::new();
        let interrupt = spawn_interrupt_watch(cancellation.clone());

        let result = if self.streaming {
            self.stream_turn(input, &cancellation).await
        } else {
            let output = self.sync.execute_with_cancellation(input, &cancellation).await;
            if let Ok(output) = &output {
                self.print_reply(output);
            }
            output
        };

        interrupt.abort();
        result
    }

    async fn stream_turn(
        &self,
        input: ChatCompletionInput,
        cancellation: &CancellationToken,
    ) -> Result<ChatCompletionOutput, ChatCompletionError> {
        let (tx, rx) = mpsc::channel(self.stream_buffer);
        let printer = match self.format {
            OutputFormat::Text => tokio::spawn(StreamPrinter::new().run(rx, std::io::stdout())),
            // JSON output carries only the final reply
            OutputFormat::Json => tokio::spawn(drain(rx)),
        };

        let result = self.stream.execute(input, &tx, cancellation).await;
        drop(tx);
        let printed = printer.await.unwrap_or_default();
        debug!(printed = printed.len(), "Stream printer finished");

        if let Ok(output) = &result {
            match self.format {
                OutputFormat::Text => {
                    if !printed.is_empty() {
                        println!();
                    }
                    println!();
                    println!("{}", ConsoleFormatter::chat_footer(output));
                }
                OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(output)),
            }
        } else if !printed.is_empty() {
            println!();
        }
        result
    }

    fn print_reply(&self, output: &ChatCompletionOutput) {
        match self.format {
            OutputFormat::Text => println!("{}", ConsoleFormatter::format_reply(output)),
            OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(output)),
        }
    }
}

async fn drain(mut rx: mpsc::Receiver<ChatCompletionOutput>) -> String {
    let mut last = String::new();
    while let Some(snapshot) = rx.recv().await {
        last = snapshot.content;
    }
    last
}

fn spawn_interrupt_watch(cancellation: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupt received, cancelling turn");
            cancellation.cancel();
        }
    })
}
