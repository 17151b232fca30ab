//! Hand-written collaborators for use case tests.

use crate::ports::chat_store::{ChatStore, ChatStoreError};
use crate::ports::completion_provider::{
    CompletionProvider, CompletionRequest, ProviderError, StreamHandle,
};
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use async_trait::async_trait;
use chatservice_domain::{Chat, ChatId, StreamEvent};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

// ==================== Store ====================

#[derive(Default)]
pub struct MockStore {
    chats: Mutex<HashMap<ChatId, Chat>>,
    pub fail_find: bool,
    pub fail_save: bool,
    pub create_calls: AtomicUsize,
    pub find_calls: AtomicUsize,
    pub save_calls: AtomicUsize,
}

impl MockStore {
    pub fn failing_find() -> Self {
        Self {
            fail_find: true,
            ..Self::default()
        }
    }

    pub fn failing_save() -> Self {
        Self {
            fail_save: true,
            ..Self::default()
        }
    }

    pub fn insert(&self, chat: Chat) {
        self.chats.lock().unwrap().insert(chat.id(), chat);
    }

    pub fn get(&self, id: ChatId) -> Option<Chat> {
        self.chats.lock().unwrap().get(&id).cloned()
    }

    pub fn creates(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn finds(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatStore for MockStore {
    async fn create(&self, chat: &Chat) -> Result<(), ChatStoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.insert(chat.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ChatId) -> Result<Chat, ChatStoreError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_find {
            return Err(ChatStoreError::Backend("connection reset".to_string()));
        }
        self.get(id).ok_or(ChatStoreError::NotFound(id))
    }

    async fn save(&self, chat: &Chat) -> Result<(), ChatStoreError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_save {
            return Err(ChatStoreError::Backend("disk full".to_string()));
        }
        self.insert(chat.clone());
        Ok(())
    }
}

// ==================== Provider ====================

/// How a scripted stream ends after its events are sent.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// Drop the sender.
    Close,
    /// Keep the sender until the handle is dropped.
    HoldOpen,
}

pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    stream: Mutex<Option<(Vec<StreamEvent>, StreamEnd)>>,
    pump: Mutex<Option<JoinHandle<()>>>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn replying(replies: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            stream: Mutex::new(None),
            pump: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn streaming(events: Vec<StreamEvent>, end: StreamEnd) -> Self {
        let provider = Self::replying(Vec::new());
        *provider.stream.lock().unwrap() = Some((events, end));
        provider
    }

    pub fn deltas(parts: &[&str]) -> Self {
        let mut events: Vec<StreamEvent> = parts
            .iter()
            .map(|p| StreamEvent::Delta(p.to_string()))
            .collect();
        events.push(StreamEvent::Done);
        Self::streaming(events, StreamEnd::Close)
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Wait for the stream producer to finish. It only finishes once the
    /// handle has been dropped or every event was consumed.
    pub async fn join_pump(&self) {
        let pump = self.pump.lock().unwrap().take();
        if let Some(pump) = pump {
            pump.await.unwrap();
        }
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ProviderError::EmptyResponse))
    }

    async fn complete_stream(
        &self,
        request: &CompletionRequest,
    ) -> Result<StreamHandle, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        let (events, end) = self
            .stream
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| ProviderError::StreamError("no stream scripted".to_string()))?;

        let (tx, rx) = mpsc::channel(1);
        let pump = tokio::spawn(async move {
            for event in events {
                if tx.send(event).await.is_err() {
                    return;
                }
            }
            if end == StreamEnd::HoldOpen {
                tx.closed().await;
            }
        });
        *self.pump.lock().unwrap() = Some(pump);
        Ok(StreamHandle::new(rx))
    }
}

// ==================== Logger ====================

#[derive(Default)]
pub struct RecordingLogger {
    pub events: Mutex<Vec<ConversationEvent>>,
}

impl RecordingLogger {
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event_type)
            .collect()
    }
}

impl ConversationLogger for RecordingLogger {
    fn log(&self, event: ConversationEvent) {
        self.events.lock().unwrap().push(event);
    }
}
