use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

use buildchat_models::ChatRequest;
use crate::get_logs_dir;

/// Mask an API key for logs, keeping only a short prefix
pub fn mask_api_key(api_key: Option<&str>) -> String {
    match api_key {
        None => "<none>".to_string(),
        Some(key) if key.chars().count() <= 12 => "***".to_string(),
        Some(key) => format!("{}***", key.chars().take(8).collect::<String>()),
    }
}

/// Log an upstream request to `~/.buildchat/logs` for persistent debugging
pub fn log_request_to_file(url: &str, request: &ChatRequest, api_key: Option<&str>) -> Result<PathBuf> {
    let logs_dir = get_logs_dir()?;
    let path = write_request_log(&logs_dir, url, request, api_key)?;
    tracing::debug!(path = %path.display(), "upstream request logged");
    Ok(path)
}

/// Write a request log file into `dir`, returning its path
pub fn write_request_log(dir: &Path, url: &str, request: &ChatRequest, api_key: Option<&str>) -> Result<PathBuf> {
    let now = Utc::now();

    // Millisecond timestamps keep back-to-back turns in separate files
    let model_name = request.model.replace('/', "-");
    let filename = format!("req-{}-{}.txt", now.timestamp_millis(), model_name);
    let file_path = dir.join(filename);

    let mut log_content = String::new();
    log_content.push_str("HTTP REQUEST LOG\n");
    log_content.push_str("================\n\n");
    log_content.push_str(&format!("Timestamp: {}\n", now.to_rfc3339()));
    log_content.push_str(&format!("Model: {}\n\n", request.model));

    // Parse URL to show host and port
    if let Ok(parsed_url) = reqwest::Url::parse(url) {
        log_content.push_str(&format!("URL: {}\n", url));
        log_content.push_str(&format!("Host: {}\n", parsed_url.host_str().unwrap_or("unknown")));
        log_content.push_str(&format!("Port: {}\n",
            parsed_url.port().map(|p| p.to_string()).unwrap_or_else(||
                if parsed_url.scheme() == "https" { "443 (default)".to_string() } else { "80 (default)".to_string() }
            )
        ));
        log_content.push_str(&format!("Scheme: {}\n\n", parsed_url.scheme()));
    } else {
        log_content.push_str(&format!("URL: {}\n\n", url));
    }

    log_content.push_str("Headers:\n");
    log_content.push_str("  Content-Type: application/json\n");
    log_content.push_str(&format!("  Authorization: Bearer {}\n\n", mask_api_key(api_key)));

    log_content.push_str("Request Body:\n");
    match serde_json::to_string_pretty(request) {
        Ok(json) => {
            log_content.push_str(&json);
            log_content.push('\n');
        }
        Err(e) => {
            log_content.push_str(&format!("Error serializing request: {}\n", e));
        }
    }

    fs::write(&file_path, log_content)
        .with_context(|| format!("Failed to write request log to {}", file_path.display()))?;

    Ok(file_path)
}
