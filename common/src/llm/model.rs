use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// body of a chat-completion request
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub stream: bool,
}

/// one streamed chunk of a chat completion
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    /// set when the server reports a failure mid-stream
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: Delta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatChunk {
    /// text carried by the first choice, if any
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.delta.content.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// message of an in-stream error payload, either `{"message": ..}` or a bare string
    pub fn error_message(&self) -> Option<String> {
        let error = self.error.as_ref().filter(|e| !e.is_null())?;
        let message = match error {
            serde_json::Value::String(s) => s.clone(),
            other => other
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| other.to_string()),
        };
        Some(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let msg = Message::user("test");
        assert_eq!(msg.role, MessageRole::User);
        assert_eq!(msg.content, "test");
    }

    #[test]
    fn test_chat_request_wire_format() {
        let request = ChatRequest {
            model: "sql".to_string(),
            messages: vec![Message::user("how many stores?")],
            temperature: 0.5,
            stream: true,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "sql",
                "messages": [{"role": "user", "content": "how many stores?"}],
                "temperature": 0.5,
                "stream": true
            })
        );
    }

    #[test]
    fn test_chunk_content() {
        let chunk: ChatChunk = serde_json::from_str(
            r#"{"id":"x","object":"chat.completion.chunk","choices":[{"index":0,"delta":{"content":"SELECT"},"finish_reason":null}]}"#,
        )
        .unwrap();
        assert_eq!(chunk.content(), Some("SELECT"));

        let role_only: ChatChunk =
            serde_json::from_str(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#).unwrap();
        assert_eq!(role_only.content(), None);

        let finished: ChatChunk =
            serde_json::from_str(r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#).unwrap();
        assert_eq!(finished.choices[0].finish_reason.as_deref(), Some("stop"));
        assert_eq!(finished.error_message(), None);
    }

    #[test]
    fn test_chunk_error_message() {
        let structured: ChatChunk = serde_json::from_str(
            r#"{"error":{"message":"model not loaded","type":"invalid_request_error"}}"#,
        )
        .unwrap();
        assert!(structured.choices.is_empty());
        assert_eq!(structured.error_message().as_deref(), Some("model not loaded"));

        let bare: ChatChunk = serde_json::from_str(r#"{"error":"context length exceeded"}"#).unwrap();
        assert_eq!(bare.error_message().as_deref(), Some("context length exceeded"));

        let unnamed: ChatChunk = serde_json::from_str(r#"{"error":{"code":500}}"#).unwrap();
        assert_eq!(unnamed.error_message().as_deref(), Some(r#"{"code":500}"#));
    }
}
