//! Server-sent events decoding for streamed completions.

use super::types::ChatCompletionChunk;
use chatservice_domain::StreamEvent;
use futures::{Stream, StreamExt};
use std::fmt::Display;
use tokio::sync::mpsc;
use tracing::debug;

/// Splits a byte stream into SSE `data:` payloads.
///
/// Lines are only decoded once complete, so multi-byte characters split
/// across network chunks survive.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// Feed bytes, returning every `data:` payload completed by them.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(data) = Self::data(&line) {
                payloads.push(data);
            }
        }
        payloads
    }

    /// Payload of an unterminated last line, if any.
    pub fn finish(&mut self) -> Option<String> {
        let line = std::mem::take(&mut self.buffer);
        Self::data(&line)
    }

    fn data(line: &[u8]) -> Option<String> {
        let line = String::from_utf8_lossy(line);
        let line = line.trim_end_matches(['\r', '\n']);
        // Blank lines separate events; ':' starts a comment
        let data = line.strip_prefix("data:")?;
        Some(data.strip_prefix(' ').unwrap_or(data).to_string())
    }
}

/// What a single `data:` payload means.
#[derive(Debug, PartialEq, Eq)]
pub enum Frame {
    Delta(String),
    Done,
    Skip,
    Error(String),
}

pub fn parse_frame(data: &str) -> Frame {
    if data.trim() == "[DONE]" {
        return Frame::Done;
    }

    match serde_json::from_str::<ChatCompletionChunk>(data) {
        Ok(chunk) => {
            if let Some(error) = chunk.error {
                return Frame::Error(error.message);
            }
            chunk
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.delta.content)
                .filter(|text| !text.is_empty())
                .map(Frame::Delta)
                .unwrap_or(Frame::Skip)
        }
        Err(e) => Frame::Error(format!("unparsable stream chunk: {}", e)),
    }
}

/// Forward a response body into `tx` until it ends, fails, or the receiver
/// is dropped.
///
/// Returning drops `body`, which releases the HTTP connection.
pub async fn pump<S, B, E>(body: S, tx: mpsc::Sender<StreamEvent>)
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let mut body = Box::pin(body);
    let mut decoder = SseDecoder::default();

    loop {
        let chunk = tokio::select! {
            biased;
            _ = tx.closed() => {
                debug!("Stream consumer dropped, closing upstream");
                return;
            }
            chunk = body.next() => chunk,
        };

        let payloads = match chunk {
            Some(Ok(bytes)) => decoder.push(bytes.as_ref()),
            Some(Err(e)) => {
                let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                return;
            }
            None => {
                for data in decoder.finish() {
                    if !forward(&tx, parse_frame(&data)).await {
                        return;
                    }
                }
                let _ = tx.send(StreamEvent::Done).await;
                return;
            }
        };

        for data in payloads {
            if !forward(&tx, parse_frame(&data)).await {
                return;
            }
        }
    }
}

/// Send one frame; `false` means the pump should stop.
async fn forward(tx: &mpsc::Sender<StreamEvent>, frame: Frame) -> bool {
    let event = match frame {
        Frame::Skip => return true,
        Frame::Delta(text) => StreamEvent::Delta(text),
        Frame::Done => {
            let _ = tx.send(StreamEvent::Done).await;
            return false;
        }
        Frame::Error(message) => {
            let _ = tx.send(StreamEvent::Error(message)).await;
            return false;
        }
    };
    tx.send(event).await.is_ok()
}
