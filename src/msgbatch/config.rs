use crate::error::{BatchError, Result};

pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
pub const BASE_URL_VAR: &str = "ANTHROPIC_BASE_URL";
pub const API_VERSION_VAR: &str = "ANTHROPIC_VERSION";
pub const BETA_VAR: &str = "ANTHROPIC_BETA";
pub const MAX_TOKENS_VAR: &str = "MSGBATCH_MAX_TOKENS";
pub const LIST_LIMIT_VAR: &str = "MSGBATCH_LIST_LIMIT";

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_API_VERSION: &str = "2023-06-01";
pub const DEFAULT_BETA: &str = "message-batches-2024-09-24";
pub const DEFAULT_MAX_TOKENS: u32 = 100;
pub const DEFAULT_LIST_LIMIT: u32 = 20;

/// Runtime configuration, read from the process environment (and `.env`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    pub api_key: String,
    pub base_url: String,
    pub api_version: String,
    pub beta: String,
    /// Default offered when prompting for max tokens
    pub default_max_tokens: u32,
    /// Default offered when listing batches
    pub default_list_limit: u32,
}

impl BatchConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            beta: DEFAULT_BETA.to_string(),
            default_max_tokens: DEFAULT_MAX_TOKENS,
            default_list_limit: DEFAULT_LIST_LIMIT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Loads `.env` if one exists, then reads the environment.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get(API_KEY_VAR).ok_or_else(|| {
            BatchError::Config(format!(
                "API key not found. Please set the {} environment variable.",
                API_KEY_VAR
            ))
        })?;

        let mut config = Self::new(api_key.trim());
        if let Some(url) = get(BASE_URL_VAR) {
            config.base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(version) = get(API_VERSION_VAR) {
            config.api_version = version.trim().to_string();
        }
        if let Some(beta) = get(BETA_VAR) {
            config.beta = beta.trim().to_string();
        }
        if let Some(raw) = get(MAX_TOKENS_VAR) {
            config.default_max_tokens = parse_positive(MAX_TOKENS_VAR, &raw)?;
        }
        if let Some(raw) = get(LIST_LIMIT_VAR) {
            config.default_list_limit = parse_positive(LIST_LIMIT_VAR, &raw)?;
        }
        Ok(config)
    }
}

fn parse_positive(key: &str, raw: &str) -> Result<u32> {
    match raw.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(BatchError::Config(format!(
            "{} must be a positive integer, got '{}'",
            key, raw
        ))),
    }
}
