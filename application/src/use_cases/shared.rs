//! Shared utilities for the completion use cases.

use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::use_cases::types::ChatCompletionError;
use chatservice_domain::{Chat, Message, Role, TokenCounter};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Check if cancellation has been requested.
pub(crate) fn check_cancelled(token: &CancellationToken) -> Result<(), ChatCompletionError> {
    if token.is_cancelled() {
        return Err(ChatCompletionError::Cancelled);
    }
    Ok(())
}

/// Build a message against the chat's own model and add it, recording any
/// eviction it caused.
pub(crate) fn append_message(
    chat: &mut Chat,
    role: Role,
    content: &str,
    counter: &dyn TokenCounter,
    logger: &dyn ConversationLogger,
    operation: &'static str,
) -> Result<(), ChatCompletionError> {
    let message = Message::new(role, content, chat.model(), counter)
        .map_err(|e| ChatCompletionError::validation(operation, e))?;
    let outcome = chat
        .add_message(message)
        .map_err(|e| ChatCompletionError::validation(operation, e))?;

    if outcome.evicted > 0 {
        debug!(
            chat_id = %chat.id(),
            evicted = outcome.evicted,
            token_usage = chat.token_usage(),
            "Evicted messages from window"
        );
        logger.log(ConversationEvent::new(
            "messages_evicted",
            chat.id(),
            json!({
                "role": role.as_str(),
                "evicted": outcome.evicted,
                "erased_total": chat.erased_messages().len(),
                "token_usage": chat.token_usage(),
            }),
        ));
    }
    Ok(())
}
