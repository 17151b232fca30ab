//! Chat Completion use case (streaming)
//!
//! Same flow as [`ChatCompletionUseCase`](super::chat_completion::ChatCompletionUseCase),
//! but the reply arrives as deltas. After every delta the text accumulated so
//! far is published to the caller's [`CompletionSink`] as a cumulative
//! snapshot, in arrival order.
//!
//! # Backpressure and cancellation
//!
//! Publishing blocks until the sink accepts the snapshot; nothing is dropped
//! or coalesced. Every wait (provider and sink) races the request's
//! cancellation token, and an optional publish timeout bounds a stalled
//! consumer. Any abort drops the provider stream, which releases the upstream
//! connection, and skips the save.

use crate::config::StreamParams;
use crate::ports::chat_store::ChatStore;
use crate::ports::completion_provider::{
    CompletionProvider, CompletionRequest, ProviderError, StreamHandle,
};
use crate::ports::completion_sink::CompletionSink;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::use_cases::resolve_chat::ChatLoader;
use crate::use_cases::shared::{append_message, check_cancelled};
use crate::use_cases::types::{ChatCompletionError, ChatCompletionInput, ChatCompletionOutput};
use chatservice_domain::{Chat, Role, StreamEvent, TokenCounter};
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct ChatCompletionStreamUseCase {
    store: Arc<dyn ChatStore>,
    provider: Arc<dyn CompletionProvider>,
    counter: Arc<dyn TokenCounter>,
    conversation_logger: Arc<dyn ConversationLogger>,
    params: StreamParams,
}

impl ChatCompletionStreamUseCase {
    pub fn new(
        store: Arc<dyn ChatStore>,
        provider: Arc<dyn CompletionProvider>,
        counter: Arc<dyn TokenCounter>,
    ) -> Self {
        Self {
            store,
            provider,
            counter,
            conversation_logger: Arc::new(NoConversationLogger),
            params: StreamParams::default(),
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn with_params(mut self, params: StreamParams) -> Self {
        self.params = params;
        self
    }

    /// Run one streaming completion.
    ///
    /// The sink is borrowed for the duration of the call and never closed
    /// here. Returns the final reply once the chat has been saved.
    pub async fn execute(
        &self,
        input: ChatCompletionInput,
        sink: &dyn CompletionSink,
        cancellation: &CancellationToken,
    ) -> Result<ChatCompletionOutput, ChatCompletionError> {
        let loader = ChatLoader::new(self.store.clone(), self.counter.clone())
            .with_conversation_logger(self.conversation_logger.clone());
        let mut chat = loader
            .resolve_or_create(&input.chat_id, &input.user_id, &input.config)
            .await?;

        append_message(
            &mut chat,
            Role::User,
            &input.user_message,
            self.counter.as_ref(),
            self.conversation_logger.as_ref(),
            "add_user_message",
        )?;

        let mut snapshots = 0usize;
        let reply = match self
            .stream_reply(&chat, sink, cancellation, &mut snapshots)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                if e.is_cancelled() {
                    info!(chat_id = %chat.id(), snapshots, "Stream cancelled");
                    self.conversation_logger.log(ConversationEvent::new(
                        "stream_cancelled",
                        chat.id(),
                        json!({ "user_id": chat.user_id(), "snapshots": snapshots }),
                    ));
                } else {
                    warn!(chat_id = %chat.id(), snapshots, error = %e, "Stream aborted");
                }
                return Err(e);
            }
        };

        append_message(
            &mut chat,
            Role::Assistant,
            &reply,
            self.counter.as_ref(),
            self.conversation_logger.as_ref(),
            "add_assistant_message",
        )?;

        check_cancelled(cancellation)?;
        self.store
            .save(&chat)
            .await
            .map_err(|e| ChatCompletionError::persistence("save_chat", e))?;

        info!(
            chat_id = %chat.id(),
            snapshots,
            token_usage = chat.token_usage(),
            "Streamed completion saved"
        );
        self.conversation_logger.log(ConversationEvent::new(
            "stream_completion",
            chat.id(),
            json!({
                "user_id": chat.user_id(),
                "user_message": input.user_message,
                "reply": reply,
                "snapshots": snapshots,
                "token_usage": chat.token_usage(),
            }),
        ));

        Ok(ChatCompletionOutput {
            chat_id: chat.id(),
            user_id: chat.user_id().to_string(),
            content: reply,
        })
    }

    /// Drain the provider stream into a reply, publishing a snapshot per
    /// delta. The stream handle is dropped on every return path.
    async fn stream_reply(
        &self,
        chat: &Chat,
        sink: &dyn CompletionSink,
        cancellation: &CancellationToken,
        snapshots: &mut usize,
    ) -> Result<String, ChatCompletionError> {
        check_cancelled(cancellation)?;
        let request = CompletionRequest::from_chat(chat);
        let mut handle: StreamHandle = tokio::select! {
            biased;
            _ = cancellation.cancelled() => return Err(ChatCompletionError::Cancelled),
            handle = self.provider.complete_stream(&request) => {
                handle.map_err(|e| ChatCompletionError::provider("complete_stream", e))?
            }
        };

        let mut reply = String::new();
        loop {
            let event = tokio::select! {
                biased;
                _ = cancellation.cancelled() => return Err(ChatCompletionError::Cancelled),
                event = handle.next_event() => event,
            };

            match event {
                Some(StreamEvent::Delta(text)) => {
                    if text.is_empty() {
                        continue;
                    }
                    reply.push_str(&text);
                    *snapshots += 1;
                    let snapshot = ChatCompletionOutput {
                        chat_id: chat.id(),
                        user_id: chat.user_id().to_string(),
                        content: reply.clone(),
                    };
                    self.publish(sink, snapshot, cancellation).await?;
                }
                Some(StreamEvent::Done) => break,
                Some(StreamEvent::Error(message)) => {
                    return Err(ChatCompletionError::provider(
                        "receive_delta",
                        ProviderError::StreamError(message),
                    ));
                }
                None => {
                    return Err(ChatCompletionError::provider(
                        "receive_delta",
                        ProviderError::TransportClosed,
                    ));
                }
            }
        }
        drop(handle);

        debug!(chat_id = %chat.id(), snapshots = *snapshots, "Stream finished");
        if reply.is_empty() {
            return Err(ChatCompletionError::provider(
                "complete_stream",
                ProviderError::EmptyResponse,
            ));
        }
        Ok(reply)
    }

    async fn publish(
        &self,
        sink: &dyn CompletionSink,
        snapshot: ChatCompletionOutput,
        cancellation: &CancellationToken,
    ) -> Result<(), ChatCompletionError> {
        let delivery = async {
            match self.params.publish_timeout {
                Some(timeout) => match tokio::time::timeout(timeout, sink.publish(snapshot)).await
                {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(_)) => Err(ChatCompletionError::SinkClosed),
                    Err(_) => Err(ChatCompletionError::SinkStalled { timeout }),
                },
                None => sink
                    .publish(snapshot)
                    .await
                    .map_err(|_| ChatCompletionError::SinkClosed),
            }
        };

        tokio::select! {
            biased;
            _ = cancellation.cancelled() => Err(ChatCompletionError::Cancelled),
            result = delivery => result,
        }
    }
}
