use anyhow::Result;
use clap::Parser;

use buildchat::app::{run_chat_repl, run_web_server};
use buildchat::{Cli, Commands};
use buildchat_logging::{init_tracing, LogFormat};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let command = cli.resolved_command();
    let default_filter = match (&command, cli.verbose) {
        (_, true) => "debug",
        // keep the REPL's terminal output free of info logs
        (Commands::Chat(_), false) => "warn",
        (Commands::Serve(_), false) => "info",
    };
    let format = if cli.log_json { LogFormat::Json } else { LogFormat::Pretty };
    init_tracing(default_filter, format);

    match command {
        Commands::Serve(args) => run_web_server(&args).await,
        Commands::Chat(args) => run_chat_repl(&args).await,
    }
}
