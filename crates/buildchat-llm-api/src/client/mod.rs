use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

use buildchat_models::WireMessage;

pub mod groq;

/// Text deltas in arrival order; an `Err` item ends the stream
pub type ChunkStream = BoxStream<'static, Result<String, UpstreamError>>;

/// Failures talking to the provider
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("failed to reach upstream provider: {0}")]
    Connect(#[source] reqwest::Error),

    #[error("upstream provider returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("upstream provider returned a non-stream response (content-type: {content_type:?})")]
    NotStreaming { content_type: String },

    #[error("upstream stream interrupted: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("upstream provider reported an error mid-stream: {0}")]
    Provider(String),
}

impl UpstreamError {
    /// Short, client-safe classification. Never includes provider bodies.
    pub fn summary(&self) -> String {
        match self {
            UpstreamError::Connect(_) => "could not connect to upstream provider".to_string(),
            UpstreamError::Status { status, .. } => format!("upstream provider returned status {}", status.as_u16()),
            UpstreamError::NotStreaming { .. } => "upstream provider returned a non-stream response".to_string(),
            UpstreamError::Transport(_) => "upstream stream interrupted".to_string(),
            UpstreamError::Provider(_) => "upstream provider reported an error".to_string(),
        }
    }
}

/// A provider that can stream a chat completion
#[async_trait]
pub trait ChatUpstream: Send + Sync {
    /// Open a streaming completion for `messages`, forwarded as given.
    ///
    /// Resolves once the provider has accepted the request; errors before
    /// that point are returned here, errors after it arrive in the stream.
    async fn stream_chat(&self, messages: Vec<WireMessage>) -> Result<ChunkStream, UpstreamError>;

    /// Model name sent upstream
    fn model(&self) -> &str;
}
