//! Environment configuration for the weather server.

use std::time::Duration;

use thiserror::Error;

pub const API_KEY_ENV: &str = "WEATHER_API_KEY";
pub const API_URL_ENV: &str = "WEATHER_API_URL";

/// WeatherAPI.com current-conditions endpoint.
pub const DEFAULT_API_URL: &str = "https://api.weatherapi.com/v1/current.json";

/// Bound on one upstream request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("WEATHER_API_KEY is not set")]
    MissingApiKey,

    #[error("invalid WEATHER_API_URL: {0}")]
    InvalidUrl(String),

    #[error("http client: {0}")]
    Client(String),
}

#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub api_key: String,
    pub api_url: reqwest::Url,
    pub timeout: Duration,
}

impl WeatherConfig {
    /// Read the config through `lookup` (normally the process environment).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup(API_KEY_ENV)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let raw_url = lookup(API_URL_ENV)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = reqwest::Url::parse(raw_url.trim())
            .map_err(|e| ConfigError::InvalidUrl(format!("{raw_url}: {e}")))?;

        Ok(Self {
            api_key,
            api_url,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}
