// Client configuration

use crate::error::ValidationError;
use reqwest::Url;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://services.nextable.com/api/v1";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

pub const TOKEN_ENV: &str = "NEXTABLE_TOKEN";
pub const BASE_URL_ENV: &str = "NEXTABLE_BASE_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_ms: u64,
    // When false requests are built and logged but never sent
    pub enabled: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            enabled: true,
        }
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Reads `NEXTABLE_TOKEN` (required) and `NEXTABLE_BASE_URL` (optional).
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ValidationError> {
        let api_key = lookup(TOKEN_ENV)
            .filter(|v| !v.is_empty())
            .ok_or(ValidationError::MissingField(TOKEN_ENV))?;
        let mut config = Self::new(api_key);
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|v| !v.is_empty()) {
            config.base_url = base_url;
        }
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    // `segment` is percent-encoded as a single path segment, so '/', '?' and '#' stay inside it
    pub fn segment_url(&self, path: &str, segment: &str) -> Result<String, ValidationError> {
        let invalid = || ValidationError::InvalidBaseUrl(self.base_url.clone());
        let mut url = Url::parse(&self.url(path)).map_err(|_| invalid())?;
        url.path_segments_mut().map_err(|_| invalid())?.push(segment);
        Ok(url.to_string())
    }
}
