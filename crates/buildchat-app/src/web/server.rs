use anyhow::Result;
use axum::Router;
use colored::Colorize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use buildchat_client::CHAT_PATH;
use buildchat_llm_api::{ChatUpstream, GroqClient, UpstreamConfig};

use crate::web::routes::{self, AppState};

/// Web server configuration
pub struct WebServerConfig {
    pub bind_addr: SocketAddr,
    pub web_dir: Option<PathBuf>,
    pub upstream: UpstreamConfig,
}

/// Web server instance
pub struct WebServer {
    config: WebServerConfig,
    upstream: Arc<dyn ChatUpstream>,
}

/// Router plus the layers every deployment gets
pub fn build_app(state: AppState, web_dir: Option<&Path>) -> Router {
    let mut app = routes::create_router(state);

    // Serve static files if web_dir is provided
    if let Some(web_dir) = web_dir {
        if web_dir.exists() {
            tracing::info!(dir = %web_dir.display(), "serving static files");
            app = app.fallback_service(ServeDir::new(web_dir));
        } else {
            tracing::warn!(dir = %web_dir.display(), "web directory does not exist, not serving static files");
        }
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    app.layer(cors).layer(TraceLayer::new_for_http())
}

impl WebServer {
    /// Create a server talking to the configured provider
    pub fn new(config: WebServerConfig) -> Self {
        let upstream: Arc<dyn ChatUpstream> = Arc::new(GroqClient::new(config.upstream.clone()));
        Self::with_upstream(config, upstream)
    }

    /// Create a server with a caller-supplied provider
    pub fn with_upstream(config: WebServerConfig, upstream: Arc<dyn ChatUpstream>) -> Self {
        Self { config, upstream }
    }

    /// Bind the configured address and serve until ctrl-c / SIGTERM
    pub async fn start(self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        let app = build_app(AppState::new(self.upstream.clone()), self.config.web_dir.as_deref());

        println!("{}", format!("🌐 Chat proxy listening on http://{}", addr).bright_cyan().bold());
        println!("   Proxy endpoint: http://{}{}", addr, CHAT_PATH);
        println!(
            "{}",
            format!("   Upstream: {} (model {})", self.config.upstream.api_url, self.upstream.model()).bright_black()
        );
        if self.config.upstream.api_key.is_none() {
            println!("{}", "   ⚠️  No GROQ_API_KEY set, upstream calls will be rejected".yellow());
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install ctrl-c handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received, draining connections");
}
