use async_stream::stream;
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderName},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use futures::StreamExt;
use serde_json::Value;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use buildchat_client::CHAT_PATH;
use buildchat_llm_api::{ChatUpstream, UpstreamError};
use buildchat_models::WireMessage;

use crate::web::error::AppError;

/// Application state shared across routes
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<dyn ChatUpstream>,
}

impl AppState {
    pub fn new(upstream: Arc<dyn ChatUpstream>) -> Self {
        Self { upstream }
    }
}

/// Create router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(CHAT_PATH, post(chat_proxy).fallback(method_not_allowed))
        .route("/health", get(health))
        .with_state(state)
}

/// GET /health
async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// POST /api/groq-chat - relay a streamed completion as plain text
async fn chat_proxy(State(state): State<AppState>, body: Bytes) -> Result<Response, AppError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("chat_proxy", %request_id);

    async move {
        let messages = parse_messages(&body)?;
        tracing::info!(
            messages = messages.len(),
            model = state.upstream.model(),
            "forwarding conversation upstream"
        );

        let upstream = state.upstream.stream_chat(messages).await?;
        let body = Body::from_stream(relay(upstream, request_id));

        let headers = [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CACHE_CONTROL, "no-cache".to_string()),
            (HeaderName::from_static("x-request-id"), request_id.to_string()),
        ];
        Ok::<Response, AppError>((headers, body).into_response())
    }
    .instrument(span)
    .await
}

/// Pass deltas through untouched; the first error ends the body.
///
/// hyper drops the connection as soon as the body yields an error, along with
/// anything it buffered but had not written yet. The error is therefore held
/// back for one poll, so the headers and every delta already relayed reach
/// the socket and the client sees truncated output rather than no response.
fn relay(
    mut upstream: buildchat_llm_api::ChunkStream,
    request_id: Uuid,
) -> impl futures::Stream<Item = Result<String, UpstreamError>> + Send + 'static {
    stream! {
        let mut chunks = 0usize;
        let mut bytes = 0usize;
        let mut failed = false;
        while let Some(item) = upstream.next().await {
            match item {
                Ok(delta) => {
                    chunks += 1;
                    bytes += delta.len();
                    yield Ok(delta);
                }
                Err(e) => {
                    tracing::error!(%request_id, chunks, error = %e, "upstream failed mid-stream, truncating response");
                    failed = true;
                    tokio::task::yield_now().await;
                    yield Err(e);
                    break;
                }
            }
        }
        if !failed {
            tracing::info!(%request_id, chunks, bytes, "relay complete");
        }
    }
}

/// Validate the request body into the conversation to forward.
///
/// Shape errors (no JSON, no `messages` array) carry no details; problems
/// with individual messages say which one.
pub fn parse_messages(body: &[u8]) -> Result<Vec<WireMessage>, AppError> {
    let payload: Value = serde_json::from_slice(body).map_err(|_| AppError::InvalidMessages { details: None })?;

    let items = payload
        .get("messages")
        .and_then(Value::as_array)
        .ok_or(AppError::InvalidMessages { details: None })?;

    if items.is_empty() {
        return Err(AppError::invalid("messages must not be empty"));
    }

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value::<WireMessage>(item.clone())
                .map_err(|e| AppError::invalid(format!("messages[{}]: {}", i, e)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildchat_models::Role;

    fn details(result: Result<Vec<WireMessage>, AppError>) -> Option<String> {
        match result {
            Err(AppError::InvalidMessages { details }) => details,
            other => panic!("expected InvalidMessages, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_keeps_order() {
        let messages = parse_messages(
            br#"{"messages":[{"role":"system","content":"s"},{"role":"user","content":"u"},{"role":"assistant","content":"a"}]}"#,
        )
        .unwrap();
        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
    }

    #[test]
    fn test_shape_errors_have_no_details() {
        assert_eq!(details(parse_messages(b"")), None);
        assert_eq!(details(parse_messages(b"not json")), None);
        assert_eq!(details(parse_messages(br#"{"prompt":"hi"}"#)), None);
        assert_eq!(details(parse_messages(br#"{"messages":"hi"}"#)), None);
        assert_eq!(details(parse_messages(br#"[1,2]"#)), None);
    }

    #[test]
    fn test_message_errors_name_the_index() {
        let d = details(parse_messages(
            br#"{"messages":[{"role":"user","content":"ok"},{"role":"tool","content":"x"}]}"#,
        ))
        .unwrap();
        assert!(d.starts_with("messages[1]"), "{}", d);
    }

    #[test]
    fn test_empty_list_rejected() {
        assert_eq!(
            details(parse_messages(br#"{"messages":[]}"#)).as_deref(),
            Some("messages must not be empty")
        );
    }
}
