pub mod client;
pub mod model;

pub use client::{CompletionClient, OpenAiChatClient, SseDecoder, StreamEvent, TokenSink};
pub use model::{ChatChunk, ChatRequest, Message, MessageRole};
