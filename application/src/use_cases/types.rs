//! Request, response and error types shared by the completion use cases.

use crate::config::CompletionConfig;
use crate::ports::chat_store::ChatStoreError;
use crate::ports::completion_provider::ProviderError;
use chatservice_domain::{ChatId, DomainError};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Input for both completion executors.
#[derive(Debug, Clone)]
pub struct ChatCompletionInput {
    /// Chat to continue; empty starts a new chat.
    pub chat_id: String,
    /// Already authenticated caller.
    pub user_id: String,
    pub user_message: String,
    pub config: CompletionConfig,
}

impl ChatCompletionInput {
    pub fn new(
        chat_id: impl Into<String>,
        user_id: impl Into<String>,
        user_message: impl Into<String>,
        config: CompletionConfig,
    ) -> Self {
        Self {
            chat_id: chat_id.into(),
            user_id: user_id.into(),
            user_message: user_message.into(),
            config,
        }
    }
}

/// A reply, or during streaming the reply generated so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatCompletionOutput {
    pub chat_id: ChatId,
    pub user_id: String,
    pub content: String,
}

/// Coarse classification of [`ChatCompletionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Persistence,
    Provider,
    Cancelled,
    Delivery,
}

/// Errors surfaced by the completion executors
///
/// Each wrapped failure names the step that produced it. Nothing is committed
/// unless the final save succeeded.
#[derive(Error, Debug)]
pub enum ChatCompletionError {
    #[error("Validation failed during {operation}: {source}")]
    Validation {
        operation: &'static str,
        #[source]
        source: DomainError,
    },

    #[error("Persistence failed during {operation}: {source}")]
    Persistence {
        operation: &'static str,
        #[source]
        source: ChatStoreError,
    },

    #[error("Provider failed during {operation}: {source}")]
    Provider {
        operation: &'static str,
        #[source]
        source: ProviderError,
    },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Completion consumer disconnected")]
    SinkClosed,

    #[error("Completion consumer stalled for more than {timeout:?}")]
    SinkStalled { timeout: Duration },
}

impl ChatCompletionError {
    pub(crate) fn validation(operation: &'static str, source: DomainError) -> Self {
        Self::Validation { operation, source }
    }

    pub(crate) fn persistence(operation: &'static str, source: ChatStoreError) -> Self {
        Self::Persistence { operation, source }
    }

    pub(crate) fn provider(operation: &'static str, source: ProviderError) -> Self {
        Self::Provider { operation, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Persistence { .. } => ErrorKind::Persistence,
            Self::Provider { .. } => ErrorKind::Provider,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::SinkClosed | Self::SinkStalled { .. } => ErrorKind::Delivery,
        }
    }

    /// Step that failed, when the error wraps a collaborator failure.
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Self::Validation { operation, .. }
            | Self::Persistence { operation, .. }
            | Self::Provider { operation, .. } => Some(*operation),
            _ => None,
        }
    }

    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
