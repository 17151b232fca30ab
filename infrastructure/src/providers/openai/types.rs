//! Wire types for the OpenAI-compatible chat completions API.

use chatservice_application::CompletionRequest;
use serde::{Deserialize, Serialize};

// ─── Request ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ChatCompletionBody<'a> {
    pub model: &'a str,
    pub messages: Vec<WireMessage<'a>>,
    pub temperature: f32,
    pub top_p: f32,
    pub n: u32,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub stop: &'a [String],
    pub max_tokens: u32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub struct WireMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

impl<'a> ChatCompletionBody<'a> {
    pub fn new(request: &'a CompletionRequest, stream: bool) -> Self {
        Self {
            model: &request.model,
            messages: request
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            temperature: request.temperature,
            top_p: request.top_p,
            n: request.n,
            stop: &request.stop,
            max_tokens: request.max_tokens,
            presence_penalty: request.presence_penalty,
            frequency_penalty: request.frequency_penalty,
            stream,
        }
    }
}

// ─── Responses ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ResponseChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseChoice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

/// Error envelope: `{"error": {"message": ...}}`.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ApiError,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatservice_application::PromptMessage;
    use chatservice_domain::Role;

    fn request(stop: Vec<String>) -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4".to_string(),
            messages: vec![
                PromptMessage {
                    role: Role::System,
                    content: "be brief".to_string(),
                },
                PromptMessage {
                    role: Role::User,
                    content: "hi".to_string(),
                },
            ],
            temperature: 0.5,
            top_p: 1.0,
            n: 1,
            stop,
            max_tokens: 64,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
        }
    }

    #[test]
    fn test_body_serialization() {
        let request = request(Vec::new());
        let body = serde_json::to_value(ChatCompletionBody::new(&request, true)).unwrap();

        assert_eq!(body["model"], "gpt-4");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert_eq!(body["max_tokens"], 64);
        assert_eq!(body["stream"], true);
        assert!(body.get("stop").is_none());
    }

    #[test]
    fn test_stop_sequences_are_sent_when_present() {
        let request = request(vec!["END".to_string()]);
        let body = serde_json::to_value(ChatCompletionBody::new(&request, false)).unwrap();
        assert_eq!(body["stop"], serde_json::json!(["END"]));
    }

    #[test]
    fn test_chunk_without_content() {
        let chunk: ChatCompletionChunk =
            serde_json::from_str(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#).unwrap();
        assert!(chunk.choices[0].delta.content.is_none());
    }
}
