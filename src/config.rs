use std::path::PathBuf;

use reqwest::Url;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_LOG_FILE: &str = "todo-client.log";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("TODO_API_URL is not a valid url ({value}): {reason}")]
    InvalidUrl { value: String, reason: String },
    #[error("TODO_API_URL must use http or https, got {0}")]
    UnsupportedScheme(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: Url,
    pub token: Option<String>,
    pub log_file: PathBuf,
}

impl ClientConfig {
    /// Reads `TODO_API_URL`, `TODO_API_TOKEN` and `TODO_LOG_FILE` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw = lookup("TODO_API_URL").filter(|v| !v.trim().is_empty()).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let base_url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl { value: raw.clone(), reason: e.to_string() })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(base_url.scheme().to_string()));
        }
        let token = lookup("TODO_API_TOKEN").map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
        let log_file = lookup("TODO_LOG_FILE").filter(|v| !v.is_empty()).unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()).into();
        Ok(Self { base_url, token, log_file })
    }
}
