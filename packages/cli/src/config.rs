use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "scribe.config.json";
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

pub const API_URL_ENV: &str = "SCRIBE_API_URL";
pub const TOKEN_ENV: &str = "SCRIBE_TOKEN";

/// Scribe configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Base URL of the REST API, without a trailing slash
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Token from the last `scribe login`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load config from a directory, then apply environment overrides
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = Self::path(cwd);

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Cannot read {}", config_path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid config in {}", config_path.display()))?
        } else {
            Config::default()
        };

        Ok(config.with_overrides(
            std::env::var(API_URL_ENV).ok(),
            std::env::var(TOKEN_ENV).ok(),
        ))
    }

    /// Write the config back, e.g. after login
    pub fn save(&self, cwd: &str) -> anyhow::Result<PathBuf> {
        let config_path = Self::path(cwd);
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("Cannot write {}", config_path.display()))?;
        Ok(config_path)
    }

    pub fn path(cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME)
    }

    fn with_overrides(mut self, api_url: Option<String>, token: Option<String>) -> Self {
        if let Some(api_url) = api_url.filter(|url| !url.trim().is_empty()) {
            self.api_url = api_url;
        }
        if let Some(token) = token.filter(|token| !token.trim().is_empty()) {
            self.token = Some(token);
        }
        self.api_url = self.api_url.trim_end_matches('/').to_string();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "apiUrl": "https://blog.example.com/api",
            "token": "abc.def.ghi",
            "timeoutSecs": 5
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.api_url, "https://blog.example.com/api");
        assert_eq!(config.token, Some("abc.def.ghi".to_string()));
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_default_config() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.token, None);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default().with_overrides(
            Some("https://staging.example.com/api/".to_string()),
            Some("env.token.sig".to_string()),
        );
        assert_eq!(config.api_url, "https://staging.example.com/api");
        assert_eq!(config.token, Some("env.token.sig".to_string()));

        let blank = Config::default().with_overrides(Some("  ".to_string()), Some(String::new()));
        assert_eq!(blank, Config::default());
    }

    #[test]
    fn test_token_omitted_when_absent() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert!(json.get("token").is_none());
        assert_eq!(json["apiUrl"], DEFAULT_API_URL);
    }
}
