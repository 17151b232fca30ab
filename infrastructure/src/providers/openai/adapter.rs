//! OpenAI-compatible completion provider.

use super::sse::pump;
use super::types::{ChatCompletionBody, ChatCompletionResponse, ErrorEnvelope};
use async_trait::async_trait;
use chatservice_application::{
    CompletionProvider, CompletionRequest, ProviderError, StreamHandle,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

const COMPLETIONS_PATH: &str = "/v1/chat/completions";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`OpenAiProvider`].
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Total time allowed for a blocking completion.
    pub timeout: Duration,
    /// Events buffered between the HTTP reader and the stream consumer.
    pub stream_buffer: usize,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: None,
            timeout: Duration::from_secs(120),
            stream_buffer: 32,
        }
    }
}

/// Talks to `/v1/chat/completions`.
///
/// Streaming responses are read by a spawned task that stops as soon as the
/// returned [`StreamHandle`] is dropped.
pub struct OpenAiProvider {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
    stream_buffer: usize,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", config.base_url.trim_end_matches('/'), COMPLETIONS_PATH),
            api_key: config.api_key,
            timeout: config.timeout,
            stream_buffer: config.stream_buffer.max(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn post(&self, request: &CompletionRequest, stream: bool) -> RequestBuilder {
        let mut builder = self
            .client
            .post(&self.endpoint)
            .json(&ChatCompletionBody::new(request, stream));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        builder
    }

    async fn check_status(response: Response) -> Result<Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(map_status(status, &body))
    }
}

fn map_send_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout
    } else if e.is_connect() {
        ProviderError::ConnectionError(e.to_string())
    } else {
        ProviderError::RequestFailed(e.to_string())
    }
}

/// Map a non-success status to a provider error, preferring the API's own
/// error message over the raw body.
pub(crate) fn map_status(status: StatusCode, body: &str) -> ProviderError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    match status.as_u16() {
        401 | 403 => ProviderError::Authentication(message),
        404 => ProviderError::ModelNotAvailable(message),
        429 => ProviderError::RateLimited(message),
        code => ProviderError::RequestFailed(format!("HTTP {}: {}", code, message)),
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        debug!(model = %request.model, messages = request.messages.len(), "Sending completion");

        let response = self
            .post(request, false)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(map_send_error)?;
        let response = Self::check_status(response).await?;

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(ProviderError::EmptyResponse)
    }

    async fn complete_stream(
        &self,
        request: &CompletionRequest,
    ) -> Result<StreamHandle, ProviderError> {
        debug!(model = %request.model, messages = request.messages.len(), "Opening completion stream");

        let response = self
            .post(request, true)
            .send()
            .await
            .map_err(map_send_error)?;
        let response = Self::check_status(response).await?;

        let (tx, rx) = mpsc::channel(self.stream_buffer);
        tokio::spawn(pump(response.bytes_stream(), tx));
        Ok(StreamHandle::new(rx))
    }
}
