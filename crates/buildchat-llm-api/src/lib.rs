//! # buildchat-llm-api
//!
//! Streaming access to a hosted chat-completions provider.
//!
//! The proxy only ever needs one thing from the provider: a stream of text
//! deltas for a conversation. That contract is the [`ChatUpstream`] trait;
//! [`GroqClient`] implements it against any OpenAI-compatible endpoint that
//! answers `stream: true` requests with server-sent events.
//!
//! ## Example
//!
//! ```rust,no_run
//! use buildchat_llm_api::{ChatUpstream, GroqClient, UpstreamConfig};
//! use buildchat_models::WireMessage;
//! use futures::StreamExt;
//!
//! # async fn run() -> Result<(), buildchat_llm_api::UpstreamError> {
//! let client = GroqClient::new(UpstreamConfig::from_env());
//! let mut stream = client.stream_chat(vec![WireMessage::user("hello")]).await?;
//! while let Some(delta) = stream.next().await {
//!     print!("{}", delta?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod sse;


// Re-export commonly used types
pub use client::{
    ChatUpstream,
    ChunkStream,
    UpstreamError,
    groq::GroqClient,
};

pub use config::{
    CompletionOptions,
    UpstreamConfig,
    GROQ_API_URL,
    DEFAULT_MODEL,
    API_KEY_ENV,
    normalize_api_url,
};

pub use sse::{SseDecoder, SseEvent, content_stream};
