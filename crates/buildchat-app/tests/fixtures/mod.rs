#![allow(dead_code)]

use async_trait::async_trait;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::StreamExt;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use buildchat::{WebServer, WebServerConfig};
use buildchat_llm_api::{ChatUpstream, ChunkStream, UpstreamConfig, UpstreamError};
use buildchat_models::WireMessage;

pub type DeltaSender = UnboundedSender<Result<String, UpstreamError>>;

/// Upstream whose deltas are pushed by the test, one stream per instance
pub struct ChannelUpstream {
    receiver: Mutex<Option<UnboundedReceiver<Result<String, UpstreamError>>>>,
}

impl ChannelUpstream {
    pub fn new() -> (Arc<Self>, DeltaSender) {
        let (tx, rx) = mpsc::unbounded();
        let upstream = Arc::new(Self {
            receiver: Mutex::new(Some(rx)),
        });
        (upstream, tx)
    }
}

#[async_trait]
impl ChatUpstream for ChannelUpstream {
    async fn stream_chat(&self, _messages: Vec<WireMessage>) -> Result<ChunkStream, UpstreamError> {
        match self.receiver.lock().unwrap().take() {
            Some(rx) => Ok(rx.boxed()),
            None => Err(UpstreamError::Provider("stream already taken".to_string())),
        }
    }

    fn model(&self) -> &str {
        "channel"
    }
}

/// Run `upstream` behind a real server on an ephemeral port
pub async fn serve_upstream(upstream: Arc<dyn ChatUpstream>) -> (SocketAddr, oneshot::Sender<()>) {
    let config = WebServerConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        web_dir: None,
        upstream: UpstreamConfig::new(None),
    };
    spawn(WebServer::with_upstream(config, upstream)).await
}

/// Run `server` on an ephemeral port until the returned sender fires
pub async fn spawn(server: WebServer) -> (SocketAddr, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        server
            .serve(listener, async move {
                let _ = stop_rx.await;
            })
            .await
            .unwrap();
    });

    (addr, stop_tx)
}
