use crate::config::LlmConfig;
use crate::error::{AskDbError, Result};
use crate::llm::model::{ChatChunk, ChatRequest, Message};
use async_trait::async_trait;
use futures::StreamExt;

/// receives each generated fragment as soon as it arrives
pub type TokenSink<'a> = &'a (dyn Fn(&str) + Send + Sync);

/// a chat-completion service that streams its answer
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// stream a completion for `messages`, forwarding fragments to `on_token`,
    /// and return the full text
    async fn stream_completion(
        &self,
        messages: Vec<Message>,
        on_token: TokenSink<'_>,
    ) -> Result<String>;

    fn name(&self) -> &str;
}

/// a decoded server-sent event payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Data(String),
    Done,
}

/// incremental decoder for `data:` lines of an event stream
///
/// network chunks may end anywhere, including inside a multi-byte character,
/// so bytes are buffered until a full line is available.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(event) = Self::decode_line(&line) {
                events.push(event);
            }
        }
        events
    }

    /// flush a trailing line that was not newline-terminated
    pub fn finish(&mut self) -> Option<StreamEvent> {
        let line = std::mem::take(&mut self.buffer);
        Self::decode_line(&line)
    }

    fn decode_line(line: &[u8]) -> Option<StreamEvent> {
        let line = String::from_utf8_lossy(line);
        let line = line.trim_end_matches(['\r', '\n']);
        let payload = line.strip_prefix("data:")?.trim_start();

        if payload == "[DONE]" {
            Some(StreamEvent::Done)
        } else if payload.is_empty() {
            None
        } else {
            Some(StreamEvent::Data(payload.to_string()))
        }
    }
}

/// client for openai-compatible `/chat/completions` endpoints
pub struct OpenAiChatClient {
    config: LlmConfig,
    client: reqwest::Client,
}

impl OpenAiChatClient {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn request(&self, messages: Vec<Message>) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: self.config.temperature,
            stream: true,
        }
    }
}

/// apply one decoded event; returns false once the stream is finished
fn apply_event(event: StreamEvent, text: &mut String, on_token: TokenSink<'_>) -> Result<bool> {
    match event {
        StreamEvent::Done => Ok(false),
        StreamEvent::Data(payload) => {
            let chunk: ChatChunk = serde_json::from_str(&payload).map_err(|e| {
                AskDbError::Llm(format!("malformed stream chunk: {}", e))
            })?;
            if let Some(message) = chunk.error_message() {
                return Err(AskDbError::Llm(format!("server reported an error: {}", message)));
            }
            if let Some(token) = chunk.content() {
                on_token(token);
                text.push_str(token);
            }
            Ok(true)
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiChatClient {
    #[tracing::instrument(
        skip(self, messages, on_token),
        fields(llm.model = %self.config.model, message_count = messages.len())
    )]
    async fn stream_completion(
        &self,
        messages: Vec<Message>,
        on_token: TokenSink<'_>,
    ) -> Result<String> {
        let url = self.config.completions_url();
        tracing::debug!("requesting completion from {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&self.request(messages))
            .send()
            .await
            .map_err(|e| AskDbError::Llm(format!("{} unreachable: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let truncated: String = body.chars().take(200).collect();
            return Err(AskDbError::Llm(format!("http {}: {}", status, truncated)));
        }

        let mut stream = response.bytes_stream();
        let mut decoder = SseDecoder::default();
        let mut text = String::new();

        'read: while let Some(chunk) = stream.next().await {
            for event in decoder.feed(&chunk?) {
                if !apply_event(event, &mut text, on_token)? {
                    break 'read;
                }
            }
        }
        if let Some(event) = decoder.finish() {
            apply_event(event, &mut text, on_token)?;
        }

        tracing::info!(generated_len = text.len(), "completion streamed");
        Ok(text)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
