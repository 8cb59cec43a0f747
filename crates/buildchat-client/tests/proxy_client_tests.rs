use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use buildchat_client::{ChatProxyClient, ClientError, Session, TurnState, CHAT_PATH};
use buildchat_models::ErrorBody;

const REPLY: &str = "Here's a start:\n\n```jsx App.jsx\nexport default function App() {\n  return <h1>Todo</h1>;\n}\n```\n\n```css\nh1 { color: rebeccapurple; }\n```\n";

#[tokio::test]
async fn test_send_streams_reply_and_updates_files() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .and(body_json(json!({
            "messages": [{ "role": "user", "content": "build a todo app" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(REPLY, "text/plain; charset=utf-8"))
        .expect(1)
        .mount(&server)
        .await;

    let client = ChatProxyClient::new(&server.uri());
    let mut session = Session::new();
    let mut live = String::new();

    let summary = client
        .send(&mut session, "build a todo app", &CancellationToken::new(), |delta| live.push_str(delta))
        .await
        .unwrap();

    assert_eq!(summary.state, TurnState::Complete);
    assert_eq!(live, REPLY);
    assert_eq!(summary.text, REPLY);
    assert_eq!(summary.updated_files, vec!["App.jsx".to_string(), "styles.css".to_string()]);
    assert_eq!(
        session.files().get("App.jsx").unwrap().content,
        "export default function App() {\n  return <h1>Todo</h1>;\n}"
    );
    // untouched placeholder
    assert!(session.files().get("script.js").unwrap().content.contains("Ready to build!"));
    assert_eq!(session.messages().len(), 2);
}

#[tokio::test]
async fn test_second_turn_sends_full_history() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .and(body_json(json!({
            "messages": [
                { "role": "user", "content": "hi" },
                { "role": "assistant", "content": "hello!" },
                { "role": "user", "content": "again" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw("second", "text/plain"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_raw("hello!", "text/plain"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let client = ChatProxyClient::new(&server.uri());
    let mut session = Session::new();
    let cancel = CancellationToken::new();

    client.send(&mut session, "hi", &cancel, |_| {}).await.unwrap();
    let summary = client.send(&mut session, "again", &cancel, |_| {}).await.unwrap();
    assert_eq!(summary.text, "second");
}

#[tokio::test]
async fn test_rejection_carries_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "Upstream provider error",
            "details": "upstream provider returned status 401"
        })))
        .mount(&server)
        .await;

    let client = ChatProxyClient::new(&server.uri());
    let mut session = Session::new();
    let result = client.send(&mut session, "hi", &CancellationToken::new(), |_| {}).await;

    match result {
        Err(ClientError::Rejected { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, ErrorBody::new("Upstream provider error").with_details("upstream provider returned status 401"));
        }
        other => panic!("expected rejection, got {:?}", other),
    }
    // no reply, so the question is not left dangling in the history
    assert!(session.messages().is_empty());
}

#[tokio::test]
async fn test_cancel_before_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("late", "text/plain").set_delay(std::time::Duration::from_secs(5)))
        .mount(&server)
        .await;

    let client = ChatProxyClient::new(&server.uri());
    let mut session = Session::new();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let summary = client.send(&mut session, "hi", &cancel, |_| {}).await.unwrap();
    assert_eq!(summary.state, TurnState::Failed("cancelled".to_string()));
    assert!(session.messages().is_empty());
}
