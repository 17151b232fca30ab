//! Completion Sink port
//!
//! Per-request delivery of streaming snapshots. Each streaming completion is
//! given its own sink, so consumers of different requests never share a
//! channel.

use crate::use_cases::types::ChatCompletionOutput;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{Mutex, mpsc};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("Completion consumer is gone")]
    Closed,
}

/// Receives cumulative snapshots of a reply as it is produced.
///
/// `publish` may wait while the consumer is behind; callers decide how long
/// they are willing to wait.
#[async_trait]
pub trait CompletionSink: Send + Sync {
    async fn publish(&self, output: ChatCompletionOutput) -> Result<(), SinkError>;
}

#[async_trait]
impl CompletionSink for mpsc::Sender<ChatCompletionOutput> {
    async fn publish(&self, output: ChatCompletionOutput) -> Result<(), SinkError> {
        self.send(output).await.map_err(|_| SinkError::Closed)
    }
}

/// Delivers every snapshot to all current subscribers.
///
/// Subscribers that hang up are pruned on the next publish. Publishing fails
/// only once no subscriber is left. An abandoned publish (timeout or
/// cancellation) leaves every subscriber registered.
#[derive(Default)]
pub struct FanOutSink {
    subscribers: Mutex<Vec<mpsc::Sender<ChatCompletionOutput>>>,
}

impl FanOutSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber with its own bounded buffer.
    pub async fn subscribe(&self, buffer: usize) -> mpsc::Receiver<ChatCompletionOutput> {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        self.subscribers.lock().await.push(tx);
        rx
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.lock().await.len()
    }
}

#[async_trait]
impl CompletionSink for FanOutSink {
    async fn publish(&self, output: ChatCompletionOutput) -> Result<(), SinkError> {
        let mut subscribers = self.subscribers.lock().await;
        let mut any_closed = false;
        for tx in subscribers.iter() {
            if tx.send(output.clone()).await.is_err() {
                any_closed = true;
            }
        }
        // Only prune once every send has returned; a dropped publish removes nothing.
        if any_closed {
            subscribers.retain(|tx| !tx.is_closed());
        }

        if subscribers.is_empty() {
            return Err(SinkError::Closed);
        }
        Ok(())
    }
}
