use crate::error::ChatError;
use crate::models::{
    ChatOptions, ChatResponse, CompletionRequest, CompletionResponse, ResponseFormat, StreamChunk,
    StreamEvent,
};
use reqwest::header;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::mpsc;
use validator::Validate;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const STREAM_CHANNEL_CAPACITY: usize = 32;

/// Explicit client configuration. There is no process-wide state; every
/// client owns its own base URL, credentials and defaults.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl ChatConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    config: ChatConfig,
}

impl ChatClient {
    pub fn new(config: ChatConfig) -> Result<Self, ChatError> {
        // The timeout covers the whole request; a stalled upstream call is
        // cancelled rather than left hanging.
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ChatError::from)?;

        Ok(Self { http, config })
    }

    /// Single non-streaming completion, first choice only.
    #[tracing::instrument(skip(self, options))]
    pub async fn chat(&self, options: &ChatOptions) -> Result<ChatResponse, ChatError> {
        let request = self.build_request(options, false, None)?;
        let response = self.send(&request).await?;

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatError::MalformedResponse(e.to_string()))?;

        Self::first_choice(completion)
    }

    /// Completion constrained by a strict JSON schema; the returned content
    /// is parsed into `T`. Parse failure surfaces the raw content so the
    /// caller can log or salvage it.
    #[tracing::instrument(skip(self, options, schema))]
    pub async fn chat_with_schema<T: DeserializeOwned>(
        &self,
        options: &ChatOptions,
        schema_name: &str,
        schema: serde_json::Value,
    ) -> Result<T, ChatError> {
        let format = ResponseFormat::json_schema(schema_name, schema);
        let request = self.build_request(options, false, Some(format))?;
        let response = self.send(&request).await?;

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatError::MalformedResponse(e.to_string()))?;

        let chat = Self::first_choice(completion)?;
        serde_json::from_str(&chat.content)
            .map_err(|_| ChatError::SchemaValidation { raw: chat.content })
    }

    /// Streaming completion. The returned [`ChatStream`] is a finite,
    /// single-consumer sequence of deltas; dropping it aborts the request.
    #[tracing::instrument(skip(self, options))]
    pub async fn chat_stream(&self, options: &ChatOptions) -> Result<ChatStream, ChatError> {
        let request = self.build_request(options, true, None)?;
        let mut response = self.send(&request).await?;

        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            let mut buffer = String::new();
            loop {
                match response.chunk().await {
                    Ok(Some(bytes)) => {
                        buffer.push_str(&String::from_utf8_lossy(&bytes));
                        while let Some(pos) = buffer.find('\n') {
                            let line = buffer[..pos].trim_end_matches('\r').to_string();
                            buffer.drain(..=pos);

                            if let Some(chunk) = parse_sse_line(&line) {
                                let done = chunk.is_complete;
                                if tx.send(Ok(chunk)).await.is_err() {
                                    return; // consumer went away
                                }
                                if done {
                                    return;
                                }
                            }
                        }
                    }
                    Ok(None) => {
                        // Upstream closed without a [DONE] marker
                        let _ = tx
                            .send(Ok(StreamChunk { is_complete: true, ..Default::default() }))
                            .await;
                        return;
                    }
                    Err(err) => {
                        let _ = tx.send(Err(ChatError::from(err))).await;
                        return;
                    }
                }
            }
        });

        Ok(ChatStream { rx })
    }

    fn build_request<'a>(
        &'a self,
        options: &'a ChatOptions,
        stream: bool,
        response_format: Option<ResponseFormat>,
    ) -> Result<CompletionRequest<'a>, ChatError> {
        options
            .validate()
            .map_err(|e| ChatError::InvalidOptions(e.to_string()))?;

        Ok(CompletionRequest {
            model: options.model.as_deref().unwrap_or(&self.config.model),
            messages: &options.messages,
            stream,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            top_p: options.top_p,
            response_format,
        })
    }

    async fn send(&self, request: &CompletionRequest<'_>) -> Result<reqwest::Response, ChatError> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        let body = response.text().await.unwrap_or_default();

        tracing::warn!(status = status.as_u16(), "chat completion request failed");
        Err(ChatError::from_status(status, retry_after, &body))
    }

    fn first_choice(completion: CompletionResponse) -> Result<ChatResponse, ChatError> {
        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ChatError::MalformedResponse("completion contained no choices".into()))?;

        Ok(ChatResponse {
            id: completion.id,
            content: choice.message.content.unwrap_or_default(),
            model: completion.model,
            finish_reason: choice.finish_reason,
            usage: completion.usage,
        })
    }
}

/// Finite stream of completion deltas. At most one consumer; not
/// restartable once exhausted.
pub struct ChatStream {
    rx: mpsc::Receiver<Result<StreamChunk, ChatError>>,
}

impl ChatStream {
    /// Next delta, or `None` once the stream is exhausted.
    pub async fn next(&mut self) -> Option<Result<StreamChunk, ChatError>> {
        self.rx.recv().await
    }
}

/// Decodes one SSE line. Returns `None` for non-data lines and for
/// malformed payloads, which the stream skips silently.
fn parse_sse_line(line: &str) -> Option<StreamChunk> {
    let data = line.strip_prefix("data: ")?;

    if data.trim() == "[DONE]" {
        return Some(StreamChunk {
            content: None,
            finish_reason: None,
            is_complete: true,
        });
    }

    let event: StreamEvent = serde_json::from_str(data).ok()?;
    let choice = event.choices.into_iter().next()?;

    Some(StreamChunk {
        content: choice.delta.content,
        finish_reason: choice.finish_reason,
        is_complete: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChatMessage;

    #[test]
    fn test_parse_sse_done_marker() {
        let chunk = parse_sse_line("data: [DONE]").unwrap();
        assert!(chunk.is_complete);
        assert_eq!(chunk.content, None);
    }

    #[test]
    fn test_parse_sse_content_delta() {
        let line = r#"data: {"choices":[{"delta":{"content":"Hel"},"finish_reason":null}]}"#;
        let chunk = parse_sse_line(line).unwrap();
        assert_eq!(chunk.content.as_deref(), Some("Hel"));
        assert_eq!(chunk.finish_reason, None);
        assert!(!chunk.is_complete);
    }

    #[test]
    fn test_parse_sse_finish_reason() {
        let line = r#"data: {"choices":[{"delta":{},"finish_reason":"stop"}]}"#;
        let chunk = parse_sse_line(line).unwrap();
        assert_eq!(chunk.content, None);
        assert_eq!(chunk.finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn test_parse_sse_skips_malformed_and_non_data_lines() {
        assert!(parse_sse_line("data: {not json").is_none());
        assert!(parse_sse_line(": keep-alive").is_none());
        assert!(parse_sse_line("").is_none());
        assert!(parse_sse_line("event: ping").is_none());
    }

    #[test]
    fn test_build_request_uses_configured_model_default() {
        let client = ChatClient::new(ChatConfig::new("key", "default/model")).unwrap();
        let options = ChatOptions {
            messages: vec![ChatMessage::user("Hi")],
            ..Default::default()
        };
        let request = client.build_request(&options, false, None).unwrap();
        assert_eq!(request.model, "default/model");

        let options = ChatOptions {
            model: Some("other/model".into()),
            ..options
        };
        let request = client.build_request(&options, true, None).unwrap();
        assert_eq!(request.model, "other/model");
        assert!(request.stream);
    }

    #[test]
    fn test_build_request_rejects_invalid_options() {
        let client = ChatClient::new(ChatConfig::new("key", "default/model")).unwrap();
        let options = ChatOptions::default();
        assert!(matches!(
            client.build_request(&options, false, None),
            Err(ChatError::InvalidOptions(_))
        ));
    }
}
