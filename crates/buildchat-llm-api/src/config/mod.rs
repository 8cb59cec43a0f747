use std::env;

/// Default Groq API URL
pub const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Default model for builder conversations
pub const DEFAULT_MODEL: &str = "compound-beta";

/// Environment variable holding the provider key
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Sampling parameters sent with every completion
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_completion_tokens: u32,
    pub top_p: f32,
    pub stop: Option<Vec<String>>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            max_completion_tokens: 1024,
            top_p: 1.0,
            stop: None,
        }
    }
}

/// Everything needed to reach the provider
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Full chat-completions URL (already normalized)
    pub api_url: String,

    /// Bearer token; when absent the provider rejects the call
    pub api_key: Option<String>,

    pub model: String,

    pub options: CompletionOptions,

    /// Write each outgoing request to ~/.buildchat/logs
    pub log_requests: bool,
}

impl UpstreamConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_url: GROQ_API_URL.to_string(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
            options: CompletionOptions::default(),
            log_requests: false,
        }
    }

    /// Defaults plus the key from `GROQ_API_KEY`. Empty values count as unset.
    pub fn from_env() -> Self {
        let api_key = env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty());
        Self::new(api_key)
    }

    pub fn with_api_url(mut self, url: &str) -> Self {
        self.api_url = normalize_api_url(url);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }
}

/// Normalize API URL by ensuring it has the correct path for OpenAI-compatible endpoints
pub fn normalize_api_url(url: &str) -> String {
    // If URL already contains a path with "completions", use it as-is
    if url.contains("/completions") || url.contains("/chat") {
        return url.to_string();
    }

    if url.ends_with('/') {
        format!("{}v1/chat/completions", url)
    } else {
        format!("{}/v1/chat/completions", url)
    }
}
