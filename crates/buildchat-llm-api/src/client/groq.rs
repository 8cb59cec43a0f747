use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use buildchat_models::{ChatRequest, WireMessage};
use crate::client::{ChatUpstream, ChunkStream, UpstreamError};
use crate::config::UpstreamConfig;
use crate::sse::content_stream;

/// Streaming client for Groq and other OpenAI-compatible providers
pub struct GroqClient {
    config: UpstreamConfig,
    client: reqwest::Client,
}

impl GroqClient {
    pub fn new(config: UpstreamConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn build_request(&self, messages: Vec<WireMessage>) -> ChatRequest {
        let options = &self.config.options;
        ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: options.temperature,
            max_completion_tokens: options.max_completion_tokens,
            top_p: options.top_p,
            stream: true,
            stop: options.stop.clone(),
        }
    }
}

#[async_trait]
impl ChatUpstream for GroqClient {
    async fn stream_chat(&self, messages: Vec<WireMessage>) -> Result<ChunkStream, UpstreamError> {
        let request = self.build_request(messages);
        let api_key = self.config.api_key.as_deref();

        if self.config.log_requests {
            // Debug aid only; never fail the turn over it
            if let Err(e) = buildchat_logging::log_request_to_file(&self.config.api_url, &request, api_key) {
                tracing::warn!(error = %e, "failed to write request log");
            }
        }

        let mut builder = self
            .client
            .post(&self.config.api_url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "text/event-stream")
            .json(&request);
        if let Some(key) = api_key {
            builder = builder.bearer_auth(key);
        }

        tracing::debug!(
            url = %self.config.api_url,
            model = %request.model,
            messages = request.messages.len(),
            "opening upstream stream"
        );

        let response = builder.send().await.map_err(UpstreamError::Connect)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            return Err(UpstreamError::Status { status, body });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if !content_type.contains("text/event-stream") {
            return Err(UpstreamError::NotStreaming { content_type });
        }

        let bytes = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(UpstreamError::Transport));
        Ok(content_stream(bytes).boxed())
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
