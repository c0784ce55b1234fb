//! Configuration loading from nimbus.toml.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use mcp::ServerConfig;
use runtime::ToolPolicy;
use serde::Deserialize;

/// Environment variable overriding `backend.model`.
pub const MODEL_ENV: &str = "NIMBUS_MODEL";

/// Environment variable overriding `backend.base_url`.
pub const HOST_ENV: &str = "OLLAMA_HOST";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Chat backend configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Ollama endpoint.
    pub base_url: String,

    /// Model to use.
    pub model: String,

    /// Per-request HTTP timeout.
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: runtime::providers::DEFAULT_BASE_URL.to_string(),
            model: "llama3.2".to_string(),
            timeout_secs: runtime::providers::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// Weather tool server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Starting tool policy; the REPL can change it.
    pub policy: ToolPolicy,

    /// Executable of the MCP tool server.
    pub command: String,

    pub args: Vec<String>,

    /// Bound on one whole tool session.
    pub timeout_secs: u64,

    /// Extra environment for the tool server process.
    pub env: HashMap<String, String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            policy: ToolPolicy::Auto,
            command: "nimbus-weather".to_string(),
            args: Vec::new(),
            timeout_secs: runtime::tools::DEFAULT_SESSION_TIMEOUT.as_secs(),
            env: HashMap::new(),
        }
    }
}

impl ToolsConfig {
    /// Process spec for the weather MCP server.
    pub fn server(&self) -> ServerConfig {
        ServerConfig {
            args: self.args.clone(),
            env: self.env.clone(),
            ..ServerConfig::new("weather", &self.command)
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(model) = lookup(MODEL_ENV).filter(|v| !v.trim().is_empty()) {
            self.backend.model = model;
        }
        if let Some(host) = lookup(HOST_ENV).filter(|v| !v.trim().is_empty()) {
            self.backend.base_url = normalize_host(&host);
        }
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.model.trim().is_empty() {
            return Err(ConfigError::Invalid("backend.model must not be empty".into()));
        }
        if self.tools.command.trim().is_empty() {
            return Err(ConfigError::Invalid("tools.command must not be empty".into()));
        }
        Ok(())
    }
}

/// `OLLAMA_HOST` is often given without a scheme (`127.0.0.1:11434`).
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.backend.base_url, "http://localhost:11434");
        assert_eq!(config.backend.model, "llama3.2");
        assert_eq!(config.backend.timeout_secs, 120);
        assert_eq!(config.tools.policy, ToolPolicy::Auto);
        assert_eq!(config.tools.command, "nimbus-weather");
        assert_eq!(config.tools.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn full_file() {
        let config = Config::parse(
            r#"
            [backend]
            base_url = "http://gpu-box:11434"
            model = "qwen2.5"
            timeout_secs = 60

            [tools]
            policy = "off"
            command = "/usr/local/bin/nimbus-weather"
            args = ["--quiet"]
            timeout_secs = 5

            [tools.env]
            WEATHER_API_KEY = "abc123"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.model, "qwen2.5");
        assert_eq!(config.backend.timeout_secs, 60);
        assert_eq!(config.tools.policy, ToolPolicy::Off);

        let server = config.tools.server();
        assert_eq!(server.name, "weather");
        assert_eq!(server.command, "/usr/local/bin/nimbus-weather");
        assert_eq!(server.args, ["--quiet"]);
        assert_eq!(server.env.get("WEATHER_API_KEY").map(String::as_str), Some("abc123"));
    }

    #[test]
    fn unknown_policy_is_a_parse_error() {
        let err = Config::parse("[tools]\npolicy = \"sometimes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn blank_model_is_invalid() {
        let err = Config::parse("[backend]\nmodel = \"  \"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn environment_overrides_file() {
        let env = |key: &str| match key {
            MODEL_ENV => Some("mistral".to_string()),
            HOST_ENV => Some("127.0.0.1:11500/".to_string()),
            _ => None,
        };
        let config = Config::default().with_overrides(env);
        assert_eq!(config.backend.model, "mistral");
        assert_eq!(config.backend.base_url, "http://127.0.0.1:11500");
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let config = Config::default().with_overrides(|_| Some(String::new()));
        assert_eq!(config.backend.model, "llama3.2");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load_or_default("/nonexistent/nimbus.toml").unwrap();
        assert_eq!(config.tools.command, "nimbus-weather");
    }
}
