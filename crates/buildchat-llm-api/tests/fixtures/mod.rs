use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const COMPLETIONS_PATH: &str = "/openai/v1/chat/completions";

/// Render text deltas as an OpenAI-compatible SSE body
pub fn sse_body(deltas: &[&str]) -> String {
    let mut body = String::new();
    for (i, delta) in deltas.iter().enumerate() {
        let event = json!({
            "id": "chatcmpl-test",
            "object": "chat.completion.chunk",
            "model": "compound-beta",
            "choices": [{
                "index": 0,
                "delta": if i == 0 { json!({ "role": "assistant", "content": delta }) } else { json!({ "content": delta }) },
                "finish_reason": null
            }]
        });
        body.push_str(&format!("data: {}\n\n", event));
    }
    body.push_str("data: {\"id\":\"chatcmpl-test\",\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n");
    body.push_str("data: [DONE]\n\n");
    body
}

/// Mock provider for streaming completion tests
pub struct StreamMockServer {
    server: MockServer,
}

impl StreamMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Full completions URL for this server
    pub fn completions_url(&self) -> String {
        format!("{}{}", self.server.uri(), COMPLETIONS_PATH)
    }

    /// Answer every completion request with `deltas` as an SSE stream
    pub async fn mock_stream(&self, deltas: &[&str]) {
        Mock::given(method("POST"))
            .and(path(COMPLETIONS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_raw(sse_body(deltas), "text/event-stream"))
            .mount(&self.server)
            .await;
    }

    /// Reject every completion request with `status`
    pub async fn mock_error(&self, status: u16, message: &str) {
        Mock::given(method("POST"))
            .and(path(COMPLETIONS_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": { "message": message, "type": "invalid_request_error" }
            })))
            .mount(&self.server)
            .await;
    }

    /// Answer with a plain JSON completion even though streaming was requested
    pub async fn mock_non_stream(&self, content: &str) {
        Mock::given(method("POST"))
            .and(path(COMPLETIONS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-test",
                "object": "chat.completion",
                "choices": [{
                    "index": 0,
                    "message": { "role": "assistant", "content": content },
                    "finish_reason": "stop"
                }]
            })))
            .mount(&self.server)
            .await;
    }

    /// Bodies of every request received so far, parsed as JSON
    pub async fn request_bodies(&self) -> Vec<serde_json::Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| serde_json::from_slice(&r.body).expect("request body is JSON"))
            .collect()
    }
}
