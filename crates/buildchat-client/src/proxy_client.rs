use futures_util::StreamExt;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use buildchat_models::{ErrorBody, ProxyRequest, WireMessage};

use crate::session::{Session, TurnSummary};
use crate::turn::AssistantTurn;

/// Route of the chat proxy
pub const CHAT_PATH: &str = "/api/groq-chat";

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response
    #[error("request to chat proxy failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The proxy answered with a non-2xx status
    #[error("chat proxy returned {status}: {}", .body.error)]
    Rejected { status: u16, body: ErrorBody },
}

/// HTTP client for the streaming chat proxy
#[derive(Debug, Clone)]
pub struct ChatProxyClient {
    endpoint: String,
    client: reqwest::Client,
}

impl ChatProxyClient {
    /// `base_url` is either the server root or the full proxy URL
    pub fn new(base_url: &str) -> Self {
        let endpoint = if base_url.contains("/api/") {
            base_url.to_string()
        } else {
            format!("{}{}", base_url.trim_end_matches('/'), CHAT_PATH)
        };
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send `user_text` as the next turn of `session` and record the reply.
    ///
    /// A reply that breaks off mid-stream is still `Ok`: its summary carries
    /// the `Failed` state and the partial text. On `Err` the user message is
    /// taken back out of the session.
    pub async fn send(
        &self,
        session: &mut Session,
        user_text: &str,
        cancel: &CancellationToken,
        on_delta: impl FnMut(&str),
    ) -> Result<TurnSummary, ClientError> {
        let messages = session.begin_turn(user_text);
        match self.stream_turn(&messages, cancel, on_delta).await {
            Ok(turn) => Ok(session.finish_turn(&turn)),
            Err(e) => {
                session.abandon_turn();
                Err(e)
            }
        }
    }

    /// Post `messages` and consume the streamed reply
    pub async fn stream_turn(
        &self,
        messages: &[WireMessage],
        cancel: &CancellationToken,
        mut on_delta: impl FnMut(&str),
    ) -> Result<AssistantTurn, ClientError> {
        let request = ProxyRequest {
            messages: messages.to_vec(),
        };

        let response = tokio::select! {
            _ = cancel.cancelled() => {
                let mut turn = AssistantTurn::new();
                turn.cancel();
                return Ok(turn);
            }
            response = self.client.post(&self.endpoint).json(&request).send() => response?,
        };

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body = serde_json::from_str::<ErrorBody>(&text)
                .unwrap_or_else(|_| ErrorBody::new(text));
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let mut turn = AssistantTurn::new();
        turn.start();

        let mut stream = Box::pin(response.bytes_stream());
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!(chunks = turn.chunks(), "turn cancelled");
                    turn.cancel();
                    break;
                }
                next = stream.next() => match next {
                    Some(Ok(bytes)) => {
                        let delta = turn.push_bytes(&bytes);
                        if !delta.is_empty() {
                            on_delta(delta);
                        }
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "reply stream interrupted");
                        turn.fail(format!("stream interrupted: {}", e));
                        break;
                    }
                    None => {
                        turn.complete();
                        break;
                    }
                },
            }
        }

        Ok(turn)
    }
}
