// Logging module - tracing setup and upstream request logging
pub mod request_logger;

use std::path::PathBuf;
use anyhow::{Context, Result};

// Re-export request logging functions
pub use request_logger::{
    log_request_to_file,
    write_request_log,
    mask_api_key,
};

/// Output format for the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` is used, falling back
/// to `info` if it does not parse.
pub fn init_tracing(default_filter: &str, format: LogFormat) {
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match default_filter.parse::<tracing_subscriber::EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: '{}' is not a valid tracing filter ({}); falling back to 'info'",
                    default_filter, e
                );
                tracing_subscriber::EnvFilter::new("info")
            }
        },
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true);

    // A second init (tests, embedding) is not an error worth dying for
    let result = match format {
        LogFormat::Json => subscriber.json().try_init(),
        LogFormat::Pretty => subscriber.try_init(),
    };
    if let Err(e) = result {
        eprintln!("WARN: tracing subscriber already installed: {}", e);
    }
}

/// Get or create the base buildchat directory (~/.buildchat)
pub fn get_buildchat_dir() -> Result<PathBuf> {
    let home_dir = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .context("Failed to get home directory")?;

    let dir = PathBuf::from(home_dir).join(".buildchat");

    if !dir.exists() {
        std::fs::create_dir_all(&dir)
            .context("Failed to create buildchat directory")?;
    }

    Ok(dir)
}

/// Get or create the logs directory (~/.buildchat/logs)
pub fn get_logs_dir() -> Result<PathBuf> {
    let logs_dir = get_buildchat_dir()?.join("logs");

    if !logs_dir.exists() {
        std::fs::create_dir_all(&logs_dir)
            .context("Failed to create logs directory")?;
    }

    Ok(logs_dir)
}
