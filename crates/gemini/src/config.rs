/// Default Gemini REST base URL.
pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Image-capable model used for edits and variations.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Gemini client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key. `None` leaves the gateway reporting itself unconfigured.
    pub api_key: Option<String>,
    /// REST base URL, without trailing slash.
    pub api_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GeminiConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default                                            |
    /// |-----------------------|----------------------------------------------------|
    /// | `GEMINI_API_KEY`      | value of `API_KEY`, else unset                     |
    /// | `GEMINI_API_URL`      | `https://generativelanguage.googleapis.com/v1beta` |
    /// | `GEMINI_MODEL`        | `gemini-2.5-flash-image`                           |
    /// | `GEMINI_TIMEOUT_SECS` | `120`                                              |
    pub fn from_env() -> Self {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty());

        let api_url = std::env::var("GEMINI_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.into())
            .trim_end_matches('/')
            .to_string();

        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

        let timeout_secs: u64 = std::env::var("GEMINI_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .expect("GEMINI_TIMEOUT_SECS must be a valid u64");

        Self {
            api_key,
            api_url,
            model,
            timeout_secs,
        }
    }

    /// Full `generateContent` endpoint for the configured model.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            self.model
        )
    }
}
