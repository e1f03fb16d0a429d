//! Client configuration.
//!
//! Read from `shop.toml` (or `.json`), then overridden from the
//! environment:
//!
//! | Variable | Field |
//! |---|---|
//! | `SHOP_API_BASE_URL` | `api.base_url` |
//! | `SHOP_API_TIMEOUT_SECS` | `api.timeout_secs` |
//! | `SHOP_STORAGE_PATH` | `storage.path` |
//! | `SHOP_LOG_LEVEL` | `log.level` |

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use shop_data::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,
}

/// Where the REST API lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Applied to every request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Session storage. Without a path the session lives in memory only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter directive, e.g. `info` or `shop_data=debug`.
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// When off, notices are dropped instead of logged.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

impl ClientConfig {
    /// Load from a file. `.json` files are read as JSON, anything else as TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if is_json(path) {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(toml::from_str(&content)?)
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `SHOP_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`. Empty values are ignored and so is a
    /// timeout that is not a whole number of seconds.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("SHOP_API_BASE_URL") {
            self.api.base_url = url;
        }
        if let Some(raw) = get("SHOP_API_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) => self.api.timeout_secs = secs,
                Err(_) => warn!(value = %raw, "Ignoring invalid SHOP_API_TIMEOUT_SECS"),
            }
        }
        if let Some(path) = get("SHOP_STORAGE_PATH") {
            self.storage.path = Some(PathBuf::from(path));
        }
        if let Some(level) = get("SHOP_LOG_LEVEL") {
            self.log.level = level;
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}

/// Starting point written by `shop config init`.
pub fn generate_default_config() -> String {
    format!(
        r#"# Storefront client configuration

[api]
base_url = "{base_url}"
timeout_secs = {timeout}

[storage]
# Keep the session between runs
# path = "~/.local/share/shop/session.json"

[log]
level = "info"
format = "human"

[notifications]
enabled = true
"#,
        base_url = DEFAULT_BASE_URL,
        timeout = DEFAULT_TIMEOUT.as_secs()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
        assert!(config.storage.path.is_none());
        assert_eq!(config.log.format, LogFormat::Human);
        assert!(config.notifications.enabled);
    }

    #[test]
    fn test_partial_toml() {
        let config: ClientConfig = toml::from_str(
            r#"
            [api]
            base_url = "http://shop.internal:9000/api"

            [log]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "http://shop.internal:9000/api");
        assert_eq!(config.api.timeout_secs, DEFAULT_TIMEOUT.as_secs());
        assert_eq!(config.log.level, "info");
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn test_generated_config_parses() {
        let config: ClientConfig = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ClientConfig::default();
        config.storage.path = Some(dir.path().join("session.json"));
        config.notifications.enabled = false;

        for name in ["shop.toml", "shop.json"] {
            let path = dir.path().join(name);
            config.save(&path).unwrap();
            assert_eq!(ClientConfig::load(&path).unwrap(), config);
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = ClientConfig::load(Path::new("/nonexistent/shop.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("SHOP_API_BASE_URL", "http://10.0.0.5/api"),
            ("SHOP_API_TIMEOUT_SECS", "30"),
            ("SHOP_LOG_LEVEL", ""),
        ]
        .into_iter()
        .collect();

        let mut config = ClientConfig::default();
        config.apply_env_from(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.api.base_url, "http://10.0.0.5/api");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_bad_timeout_is_ignored() {
        let mut config = ClientConfig::default();
        config.apply_env_from(|k| (k == "SHOP_API_TIMEOUT_SECS").then(|| "soon".to_string()));
        assert_eq!(config.api.timeout_secs, DEFAULT_TIMEOUT.as_secs());
    }
}
