use anyhow::{bail, Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

use buildchat_llm_api::{CompletionOptions, UpstreamConfig};

use crate::cli::ServeArgs;

/// Everything the proxy server needs at startup
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub web_dir: Option<PathBuf>,
    pub upstream: UpstreamConfig,
}

impl ServerConfig {
    /// Validate the serve flags and assemble the upstream configuration
    pub fn from_args(args: &ServeArgs) -> Result<Self> {
        let bind_addr: SocketAddr = format!("{}:{}", args.bind, args.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", args.bind, args.port))?;

        if !(0.0..=2.0).contains(&args.temperature) {
            bail!("--temperature must be between 0 and 2, got {}", args.temperature);
        }
        if !(0.0..=1.0).contains(&args.top_p) {
            bail!("--top-p must be between 0 and 1, got {}", args.top_p);
        }
        if args.max_completion_tokens == 0 {
            bail!("--max-completion-tokens must be greater than 0");
        }

        let api_key = args
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string);

        let mut upstream = UpstreamConfig::new(api_key)
            .with_api_url(&args.api_url)
            .with_model(args.model.clone())
            .with_options(CompletionOptions {
                temperature: args.temperature,
                max_completion_tokens: args.max_completion_tokens,
                top_p: args.top_p,
                stop: None,
            });
        upstream.log_requests = args.log_requests;

        Ok(Self {
            bind_addr,
            web_dir: args.web_dir.clone(),
            upstream,
        })
    }
}
