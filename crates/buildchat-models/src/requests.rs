use serde::{Deserialize, Serialize};

use crate::types::WireMessage;

/// Streaming chat-completions request sent to the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub temperature: f32,
    pub max_completion_tokens: u32,
    pub top_p: f32,
    pub stream: bool,
    /// Always serialized, `null` when unset
    pub stop: Option<Vec<String>>,
}

/// Body of `POST /api/groq-chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyRequest {
    pub messages: Vec<WireMessage>,
}
