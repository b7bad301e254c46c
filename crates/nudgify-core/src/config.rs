//! Configuration for the bot and the reminder sweep.
//!
//! 読み込み順: デフォルト → TOML ファイル（任意）→ 環境変数
//!
//! | 環境変数 | 上書き先 |
//! |---|---|
//! | `TELEGRAM_TOKEN` / `BOT_TOKEN` | `telegram.token` |
//! | `NUDGIFY_DATA_FILE` | `store.path` |
//! | `NUDGIFY_TIMEZONE` | `reminder.timezone` |
//! | `PORT` | `keepalive.port` |

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ports::ReminderZone;

pub const DEFAULT_DATA_FILE: &str = "assignments.json";
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_KEEPALIVE_PORT: u16 = 10000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {message}")]
    Toml { path: PathBuf, message: String },

    #[error("TELEGRAM_TOKEN or BOT_TOKEN not found in environment variables")]
    MissingToken,

    #[error("{0}")]
    InvalidTimezone(String),

    #[error("invalid PORT value '{0}'")]
    InvalidPort(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub telegram: TelegramConfig,
    pub reminder: ReminderConfig,
    pub keepalive: KeepAliveConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// タスクを保存する JSON ファイル
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATA_FILE),
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub token: String,
    pub api_base: String,
    /// getUpdates の long polling 秒数
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            poll_timeout_secs: 30,
        }
    }
}

// token をログに出さない
impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.token.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("TelegramConfig")
            .field("token", &token)
            .field("api_base", &self.api_base)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    /// IANA のタイムゾーン名（例: `Asia/Kolkata`）。未指定ならホストのローカル時刻。
    pub timezone: Option<String>,
}

impl ReminderConfig {
    pub fn zone(&self) -> Result<ReminderZone, ConfigError> {
        match self.timezone.as_deref() {
            None => Ok(ReminderZone::Local),
            Some(name) => name.parse().map_err(ConfigError::InvalidTimezone),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeepAliveConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "0.0.0.0".to_string(),
            port: DEFAULT_KEEPALIVE_PORT,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// デフォルト（またはファイル）に環境変数を重ねる
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overlay values from an environment lookup.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = non_empty("TELEGRAM_TOKEN").or_else(|| non_empty("BOT_TOKEN")) {
            self.telegram.token = token.trim().to_string();
        }
        if let Some(path) = non_empty("NUDGIFY_DATA_FILE") {
            self.store.path = PathBuf::from(path);
        }
        if let Some(zone) = non_empty("NUDGIFY_TIMEZONE") {
            self.reminder.timezone = Some(zone);
        }
        if let Some(port) = non_empty("PORT") {
            self.keepalive.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }
        Ok(())
    }

    /// Fail fast before talking to the platform.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram.token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        self.reminder.zone()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_hosted_deployment() {
        let config = Config::default();
        assert_eq!(config.store.path, PathBuf::from("assignments.json"));
        assert_eq!(config.keepalive.port, 10000);
        assert!(config.keepalive.enabled);
        assert_eq!(config.reminder.zone().unwrap(), ReminderZone::Local);
    }

    #[test]
    fn telegram_token_wins_over_bot_token() {
        let mut config = Config::default();
        config
            .apply_env(env(&[("TELEGRAM_TOKEN", "primary"), ("BOT_TOKEN", "fallback")]))
            .unwrap();
        assert_eq!(config.telegram.token, "primary");

        let mut config = Config::default();
        config.apply_env(env(&[("BOT_TOKEN", "fallback")])).unwrap();
        assert_eq!(config.telegram.token, "fallback");
    }

    #[test]
    fn env_overrides_store_zone_and_port() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("NUDGIFY_DATA_FILE", "/data/tasks.json"),
                ("NUDGIFY_TIMEZONE", "Asia/Kolkata"),
                ("PORT", "8080"),
            ]))
            .unwrap();
        assert_eq!(config.store.path, PathBuf::from("/data/tasks.json"));
        assert_eq!(config.keepalive.port, 8080);
        assert_eq!(
            config.reminder.zone().unwrap(),
            ReminderZone::Named(chrono_tz::Asia::Kolkata)
        );
    }

    #[test]
    fn bad_port_is_rejected() {
        let mut config = Config::default();
        let err = config.apply_env(env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort(_)));
    }

    #[test]
    fn validate_requires_token() {
        let config = Config::default();
        assert!(matches!(config.validate(), Err(ConfigError::MissingToken)));
    }

    #[test]
    fn validate_rejects_unknown_zone() {
        let mut config = Config::default();
        config.telegram.token = "t".into();
        config.reminder.timezone = Some("Nowhere/Town".into());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimezone(_))
        ));
    }

    #[test]
    fn partial_toml_file_keeps_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nudgify.toml");
        std::fs::write(
            &path,
            r#"
[store]
path = "/srv/nudgify/tasks.json"

[reminder]
timezone = "Europe/Berlin"

[keepalive]
enabled = false
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.store.path, PathBuf::from("/srv/nudgify/tasks.json"));
        assert!(!config.keepalive.enabled);
        assert_eq!(config.keepalive.port, 10000);
        assert_eq!(config.telegram.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn invalid_toml_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nudgify.toml");
        std::fs::write(&path, "[store\npath = 1").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::Toml { .. })
        ));
    }

    #[test]
    fn debug_output_hides_token() {
        let mut config = Config::default();
        config.telegram.token = "123:SECRET".into();
        assert!(!format!("{config:?}").contains("SECRET"));
    }
}
