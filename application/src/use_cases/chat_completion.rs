//! Chat Completion use case (blocking)
//!
//! Adds the user's message to the chat, asks the provider for one complete
//! reply, adds the reply and persists the chat. The save is the single commit
//! point: a request that fails earlier leaves the stored chat untouched.

use crate::ports::chat_store::ChatStore;
use crate::ports::completion_provider::{CompletionProvider, CompletionRequest, ProviderError};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::use_cases::resolve_chat::ChatLoader;
use crate::use_cases::shared::{append_message, check_cancelled};
use crate::use_cases::types::{ChatCompletionError, ChatCompletionInput, ChatCompletionOutput};
use chatservice_domain::{Role, TokenCounter};
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct ChatCompletionUseCase {
    store: Arc<dyn ChatStore>,
    provider: Arc<dyn CompletionProvider>,
    counter: Arc<dyn TokenCounter>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl ChatCompletionUseCase {
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
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub async fn execute(
        &self,
        input: ChatCompletionInput,
    ) -> Result<ChatCompletionOutput, ChatCompletionError> {
        self.execute_with_cancellation(input, &CancellationToken::new())
            .await
    }

    pub async fn execute_with_cancellation(
        &self,
        input: ChatCompletionInput,
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

        check_cancelled(cancellation)?;
        let request = CompletionRequest::from_chat(&chat);
        let reply = tokio::select! {
            biased;
            _ = cancellation.cancelled() => return Err(ChatCompletionError::Cancelled),
            reply = self.provider.complete(&request) => {
                reply.map_err(|e| ChatCompletionError::provider("complete", e))?
            }
        };
        if reply.is_empty() {
            return Err(ChatCompletionError::provider(
                "complete",
                ProviderError::EmptyResponse,
            ));
        }

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
            token_usage = chat.token_usage(),
            messages = chat.message_count(),
            "Completion saved"
        );
        self.conversation_logger.log(ConversationEvent::new(
            "completion",
            chat.id(),
            json!({
                "user_id": chat.user_id(),
                "user_message": input.user_message,
                "reply": reply,
                "token_usage": chat.token_usage(),
            }),
        ));

        Ok(ChatCompletionOutput {
            chat_id: chat.id(),
            user_id: chat.user_id().to_string(),
            content: reply,
        })
    }
}
