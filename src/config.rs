//! Configuration module
//!
//! `AppConfig` is read from a TOML file. Every field has a default and a
//! missing file yields the defaults, so a bare binary starts against a local
//! SQLite database.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [database]
//! url = "sqlite://./onion-rates.db?mode=rwc"
//!
//! [admin]
//! username = "admin"
//! password = "change-me"
//! token = "long-random-string"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::database::DatabaseConfig;
use crate::interfaces::StreamSettings;

pub const CONFIG_ENV: &str = "ONION_RATES_CONFIG";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub logging: LoggingConfig,
    pub admin: AdminConfig,
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds to wait for in-flight requests after a shutdown signal
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout: 30,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        let defaults = DatabaseConfig::default();
        Self {
            url: defaults.url,
            max_connections: defaults.max_connections,
            connect_timeout_secs: defaults.connect_timeout.as_secs(),
        }
    }
}

impl From<&DatabaseSection> for DatabaseConfig {
    fn from(section: &DatabaseSection) -> Self {
        DatabaseConfig {
            url: section.url.clone(),
            max_connections: section.max_connections.max(1),
            connect_timeout: Duration::from_secs(section.connect_timeout_secs.max(1)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` wins when set
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
    /// Shared admin token. Generated at startup when empty.
    pub token: String,
    /// Development only
    pub auth_disabled: bool,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: String::new(),
            token: String::new(),
            auth_disabled: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub keepalive_secs: u64,
    /// Events queued per stream before new ones are dropped
    pub subscriber_buffer: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            keepalive_secs: 30,
            subscriber_buffer: crate::application::events::DEFAULT_SUBSCRIBER_BUFFER,
        }
    }
}

impl From<&NotificationConfig> for StreamSettings {
    fn from(cfg: &NotificationConfig) -> Self {
        StreamSettings {
            keepalive: Duration::from_secs(cfg.keepalive_secs.max(1)),
            subscriber_buffer: cfg.subscriber_buffer.max(1),
        }
    }
}

impl AppConfig {
    /// Load from `path`. A missing file is not an error; `DATABASE_URL`
    /// overrides `database.url` either way.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        config.apply_env(std::env::var(DATABASE_URL_ENV).ok());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    fn apply_env(&mut self, database_url: Option<String>) {
        if let Some(url) = database_url.filter(|u| !u.trim().is_empty()) {
            self.database.url = url;
        }
    }
}

/// `$ONION_RATES_CONFIG`, else `<config dir>/onion-rates/config.toml`,
/// else `./config.toml`.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    dirs_next::config_dir()
        .map(|dir| dir.join("onion-rates").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = AppConfig::from_toml("").unwrap();
        assert_eq!(cfg.server.address(), "0.0.0.0:8080");
        assert_eq!(cfg.database.url, "sqlite://./onion-rates.db?mode=rwc");
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.notifications.keepalive_secs, 30);
        assert!(!cfg.admin.auth_disabled);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            [server]
            port = 9090

            [admin]
            token = "abc"

            [notifications]
            subscriber_buffer = 0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.admin.token, "abc");
        assert_eq!(cfg.admin.username, "admin");
        assert_eq!(StreamSettings::from(&cfg.notifications).subscriber_buffer, 1);
    }

    #[test]
    fn database_url_env_overrides_file() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(Some("sqlite::memory:".to_string()));
        assert_eq!(cfg.database.url, "sqlite::memory:");
        cfg.apply_env(Some("  ".to_string()));
        assert_eq!(cfg.database.url, "sqlite::memory:");
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let path = std::env::temp_dir().join("onion-rates-does-not-exist.toml");
        assert!(AppConfig::load(&path).is_ok());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let path = std::env::temp_dir().join(format!("onion-rates-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[server\nport = ").unwrap();
        let err = AppConfig::load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
