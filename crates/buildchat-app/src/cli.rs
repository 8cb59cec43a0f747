use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use buildchat_llm_api::{DEFAULT_MODEL, GROQ_API_URL};

#[derive(Parser, Debug)]
#[command(author, version, about = "Streaming chat proxy for the AI app builder", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server options used when no subcommand is given
    #[command(flatten)]
    pub serve: ServeArgs,

    /// Enable verbose debug output (debug-level logs, request details)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "BUILDCHAT_LOG_JSON")]
    pub log_json: bool,
}

impl Cli {
    /// The subcommand to run; a bare invocation serves
    pub fn resolved_command(&self) -> Commands {
        match &self.command {
            Some(command) => command.clone(),
            None => Commands::Serve(self.serve.clone()),
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the chat proxy server (default)
    Serve(ServeArgs),

    /// Chat with a running proxy from the terminal
    Chat(ChatArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1", env = "BUILDCHAT_BIND")]
    pub bind: String,

    /// Port to listen on
    #[arg(long, default_value_t = 3000, env = "BUILDCHAT_PORT")]
    pub port: u16,

    /// Chat-completions URL, or the provider's base URL
    #[arg(long, value_name = "URL", default_value = GROQ_API_URL, env = "BUILDCHAT_API_URL")]
    pub api_url: String,

    /// Provider API key
    #[arg(long, value_name = "KEY", env = "GROQ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model requested upstream
    #[arg(long, value_name = "MODEL", default_value = DEFAULT_MODEL, env = "BUILDCHAT_MODEL")]
    pub model: String,

    #[arg(long, default_value_t = 1.0)]
    pub temperature: f32,

    #[arg(long, default_value_t = 1024)]
    pub max_completion_tokens: u32,

    #[arg(long, default_value_t = 1.0)]
    pub top_p: f32,

    /// Directory of static files served at `/`
    #[arg(long, value_name = "PATH", env = "BUILDCHAT_WEB_DIR")]
    pub web_dir: Option<PathBuf>,

    /// Write every upstream request to ~/.buildchat/logs (API key masked)
    #[arg(long, env = "BUILDCHAT_LOG_REQUESTS")]
    pub log_requests: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ChatArgs {
    /// Proxy server root or full proxy URL
    #[arg(long, default_value = "http://127.0.0.1:3000", env = "BUILDCHAT_URL")]
    pub url: String,

    /// Send the conversation without the builder system prompt
    #[arg(long)]
    pub no_system_prompt: bool,
}
