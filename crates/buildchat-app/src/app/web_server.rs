use anyhow::Result;

use crate::cli::ServeArgs;
use crate::config::ServerConfig;
use crate::web::server::{WebServer, WebServerConfig};

/// Run the proxy server
pub async fn run_web_server(args: &ServeArgs) -> Result<()> {
    let config = ServerConfig::from_args(args)?;

    tracing::info!(
        bind = %config.bind_addr,
        api_url = %config.upstream.api_url,
        model = %config.upstream.model,
        log_requests = config.upstream.log_requests,
        "starting chat proxy"
    );

    let server = WebServer::new(WebServerConfig {
        bind_addr: config.bind_addr,
        web_dir: config.web_dir,
        upstream: config.upstream,
    });
    server.start().await?;

    Ok(())
}
