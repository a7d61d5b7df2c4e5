use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::{debug, warn};

use crate::providers::{finnhub, yahoo_news};

pub const API_KEY_ENV: &str = "FINNHUB_API_KEY";
pub const PORT_ENV: &str = "PORT";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct FinnhubProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Default for FinnhubProviderConfig {
    fn default() -> Self {
        FinnhubProviderConfig {
            base_url: finnhub::DEFAULT_BASE_URL.to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct YahooNewsProviderConfig {
    pub base_url: String,
}

impl Default for YahooNewsProviderConfig {
    fn default() -> Self {
        YahooNewsProviderConfig {
            base_url: yahoo_news::DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ProvidersConfig {
    pub finnhub: FinnhubProviderConfig,
    pub yahoo_news: YahooNewsProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub search_ttl_secs: u64,
    pub news_ttl_secs: u64,
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            search_ttl_secs: 600,
            news_ttl_secs: 300,
            max_entries: 10_000,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "0.0.0.0:3000".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub providers: ProvidersConfig,
    pub cache: CacheConfig,
    pub server: ServerConfig,
    pub request_timeout_secs: u64,
    pub data_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            cache: CacheConfig::default(),
            server: ServerConfig::default(),
            request_timeout_secs: 10,
            data_path: None,
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "simplifiedaction", "simplifiedaction")
        .context("Could not determine project directories")
}

/// True when the document holds nothing but comments and separators.
fn is_blank_document(content: &str) -> bool {
    content.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---"
    })
}

impl AppConfig {
    /// Loads the config at the default location. A missing file yields the
    /// defaults.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        Ok(project_dirs()?.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        if is_blank_document(&config_str) {
            debug!("Config file is empty, using defaults");
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Applies `FINNHUB_API_KEY` and `PORT` from the process environment.
    pub fn with_env_overrides(mut self) -> Self {
        self.apply_overrides(
            std::env::var(API_KEY_ENV).ok(),
            std::env::var(PORT_ENV).ok(),
        );
        self
    }

    /// An API key from the environment is used only when the file sets none.
    /// A port replaces the port of `server.bind`.
    pub fn apply_overrides(&mut self, api_key: Option<String>, port: Option<String>) {
        let configured = self
            .providers
            .finnhub
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty());
        if !configured {
            if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
                debug!("Using Finnhub API key from {}", API_KEY_ENV);
                self.providers.finnhub.api_key = Some(key.trim().to_string());
            }
        }

        if let Some(port) = port {
            match port.trim().parse::<u16>() {
                Ok(port) => self.server.bind = replace_port(&self.server.bind, port),
                Err(_) => warn!("Ignoring invalid {} value: {}", PORT_ENV, port),
            }
        }
    }

    pub fn search_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.search_ttl_secs)
    }

    pub fn news_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.news_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn replace_port(bind: &str, port: u16) -> String {
    match bind.rsplit_once(':') {
        Some((host, _)) => format!("{host}:{port}"),
        None if bind.is_empty() => format!("0.0.0.0:{port}"),
        None => format!("{bind}:{port}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
providers:
  finnhub:
    base_url: "http://localhost:9000/api/v1"
    api_key: "abc123"
  yahoo_news:
    base_url: "http://localhost:9001"
cache:
  search_ttl_secs: 60
  news_ttl_secs: 30
  max_entries: 500
server:
  bind: "127.0.0.1:8080"
request_timeout_secs: 3
data_path: "/tmp/simplifiedaction"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(
            config.providers.finnhub.base_url,
            "http://localhost:9000/api/v1"
        );
        assert_eq!(config.providers.finnhub.api_key.as_deref(), Some("abc123"));
        assert_eq!(config.providers.yahoo_news.base_url, "http://localhost:9001");
        assert_eq!(config.search_ttl(), Duration::from_secs(60));
        assert_eq!(config.news_ttl(), Duration::from_secs(30));
        assert_eq!(config.cache.max_entries, 500);
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/simplifiedaction")
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml_str = r#"
providers:
  finnhub:
    api_key: "abc123"
cache:
  news_ttl_secs: 120
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert_eq!(config.providers.finnhub.base_url, finnhub::DEFAULT_BASE_URL);
        assert_eq!(
            config.providers.yahoo_news.base_url,
            yahoo_news::DEFAULT_BASE_URL
        );
        assert_eq!(config.cache.search_ttl_secs, 600);
        assert_eq!(config.cache.news_ttl_secs, 120);
        assert_eq!(config.server.bind, "0.0.0.0:3000");
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn test_empty_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "---\n# nothing configured yet\n").unwrap();

        assert_eq!(AppConfig::load_from_path(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_invalid_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "cache:\n  search_ttl_secs: soon\n").unwrap();

        let err = AppConfig::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_env_key_fills_missing_key_only() {
        let mut config = AppConfig::default();
        config.apply_overrides(Some(" from-env ".to_string()), None);
        assert_eq!(config.providers.finnhub.api_key.as_deref(), Some("from-env"));

        config.apply_overrides(Some("other".to_string()), None);
        assert_eq!(config.providers.finnhub.api_key.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_port_override() {
        let mut config = AppConfig::default();
        config.apply_overrides(None, Some("8081".to_string()));
        assert_eq!(config.server.bind, "0.0.0.0:8081");

        config.apply_overrides(None, Some("not-a-port".to_string()));
        assert_eq!(config.server.bind, "0.0.0.0:8081");

        assert_eq!(replace_port("[::1]:3000", 9000), "[::1]:9000");
        assert_eq!(replace_port("localhost", 9000), "localhost:9000");
    }
}
