//! CLI entrypoint for chatservice
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use chatservice_application::{
    ChatCompletionStreamUseCase, ChatCompletionUseCase, ChatStore, ConversationLogger,
};
use chatservice_domain::TokenCounter;
use chatservice_infrastructure::{
    ApproxTokenCounter, ConfigLoader, FileConfig, InMemoryChatStore, JsonFileChatStore,
    JsonlConversationLogger, OpenAiConfig, OpenAiProvider, StorageBackend,
};
use chatservice_presentation::{ChatRepl, ChatRunner, Cli, ConsoleFormatter};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?
    };
    config.validate().context("Invalid configuration")?;

    let _log_guard = init_tracing(cli.verbose, &config)?;
    info!("Starting chatservice");

    // === Dependency Injection ===
    let counter: Arc<dyn TokenCounter> = Arc::new(
        ApproxTokenCounter::new().with_allow_unknown_models(config.tokenizer.allow_unknown_models),
    );
    let store = build_store(&config)?;

    let api_key = config.provider.resolve_api_key();
    if api_key.is_none() {
        warn!(
            env = %config.provider.api_key_env,
            "No API key configured; requests are sent unauthenticated"
        );
    }
    let provider = Arc::new(OpenAiProvider::new(OpenAiConfig {
        base_url: config.provider.base_url.clone(),
        api_key,
        timeout: Duration::from_secs(config.provider.timeout_seconds),
        stream_buffer: config.stream.buffer,
    })?);

    let mut sync = ChatCompletionUseCase::new(store.clone(), provider.clone(), counter.clone());
    let mut stream = ChatCompletionStreamUseCase::new(store, provider, counter)
        .with_params(config.stream.to_stream_params());
    if let Some(path) = &config.logging.conversation_log
        && let Some(logger) = JsonlConversationLogger::new(path)
    {
        info!("Conversation log: {}", logger.path().display());
        let logger: Arc<dyn ConversationLogger> = Arc::new(logger);
        sync = sync.with_conversation_logger(logger.clone());
        stream = stream.with_conversation_logger(logger);
    }

    let mut completion = config.chat.to_completion_config();
    if let Some(model) = &cli.model {
        let max_tokens = completion.model_max_tokens;
        completion = completion.with_model(model.clone(), max_tokens);
    }

    let runner = ChatRunner::new(Arc::new(sync), Arc::new(stream), completion)
        .with_format(cli.output)
        .with_streaming(cli.stream)
        .with_stream_buffer(config.stream.buffer);
    let user_id = cli.resolve_user();

    if cli.interactive {
        let mut repl = ChatRepl::new(runner, user_id).with_chat_id(cli.chat_id.clone());
        repl.run().await?;
        return Ok(());
    }

    let message = match &cli.message {
        Some(m) => m.clone(),
        None => bail!("A message is required. Use --interactive for chat mode."),
    };

    let chat_id = cli.chat_id.clone().unwrap_or_default();
    if let Err(e) = runner.run_turn(&chat_id, &user_id, &message).await {
        eprintln!("{}", ConsoleFormatter::format_error(&e));
        std::process::exit(1);
    }

    Ok(())
}

/// Console logging by verbosity, plus an optional log file.
///
/// The returned guard must live until exit so buffered file output is flushed.
fn init_tracing(verbose: u8, config: &FileConfig) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let Some(path) = &config.logging.file else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(level))
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("logging.file has no file name: {}", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    // The file records at least info even when the console stays quiet.
    let file_level = if verbose == 0 { "info" } else { level };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(file_level))
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

fn build_store(config: &FileConfig) -> Result<Arc<dyn ChatStore>> {
    match config.storage.backend {
        StorageBackend::Memory => Ok(Arc::new(InMemoryChatStore::new())),
        StorageBackend::File => {
            let dir = config
                .storage
                .chats_dir()
                .context("No data directory available; set storage.path")?;
            info!("Chat storage: {}", dir.display());
            Ok(Arc::new(JsonFileChatStore::new(dir)))
        }
    }
}
