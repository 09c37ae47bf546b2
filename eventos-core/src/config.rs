//! Client configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EventosError, EventosResult};
use crate::event::UserId;

static DEFAULT_API_URL: &str = "http://localhost:3001";
static DEFAULT_FALLBACK_MESSAGE: &str = "Estamos com problemas";

const ENV_API_URL: &str = "EVENTOS_API_URL";
const ENV_USER_ID: &str = "EVENTOS_USER_ID";

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_column_width() -> u16 {
    30
}

fn default_gutter() -> u16 {
    2
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_fallback_message() -> String {
    DEFAULT_FALLBACK_MESSAGE.to_string()
}

/// Configuration at ~/.config/eventos/config.toml
///
/// `EVENTOS_API_URL` and `EVENTOS_USER_ID` override the file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,

    /// Card width in terminal cells.
    #[serde(default = "default_column_width")]
    pub column_width: u16,

    #[serde(default = "default_gutter")]
    pub gutter: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Shown when a failure has no message of its own (unreachable server, garbage body).
    #[serde(default = "default_fallback_message")]
    pub fallback_message: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: default_api_url(),
            user_id: None,
            column_width: default_column_width(),
            gutter: default_gutter(),
            request_timeout_secs: None,
            log_level: default_log_level(),
            fallback_message: default_fallback_message(),
        }
    }
}

impl Config {
    pub fn config_path() -> EventosResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| EventosError::Config("Could not determine config directory".into()))?
            .join("eventos");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config file (defaults if it does not exist) and apply
    /// environment overrides.
    pub fn load() -> EventosResult<Self> {
        let config = Self::load_from(&Self::config_path()?)?;
        config.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn load_from(path: &Path) -> EventosResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| EventosError::Config(e.to_string()))
    }

    /// Apply overrides looked up by environment variable name.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> EventosResult<Self> {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.is_empty()) {
            self.api_url = url;
        }

        if let Some(raw) = lookup(ENV_USER_ID).filter(|v| !v.is_empty()) {
            let id = raw
                .trim()
                .parse::<i64>()
                .map_err(|_| EventosError::Config(format!("{ENV_USER_ID} is not a number: {raw}")))?;
            self.user_id = Some(UserId(id));
        }

        Ok(self)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> EventosResult<()> {
        let contents = format!(
            "\
# eventos configuration

# Backend base URL:
# api_url = \"{}\"

# Signed-in user id (or pass --user / set EVENTOS_USER_ID):
# user_id = 1

# Card width and spacing, in terminal cells:
# column_width = 30
# gutter = 2

# Give up on a request after this many seconds (no timeout by default):
# request_timeout_secs = 10

# Default log filter when RUST_LOG is not set:
# log_level = \"warn\"

# Message shown when the server gives none:
# fallback_message = \"{}\"
",
            DEFAULT_API_URL, DEFAULT_FALLBACK_MESSAGE
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                EventosError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| EventosError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_default_template_parses_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eventos/config.toml");

        Config::create_default_config(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "user_id = 12\ncolumn_width = 40\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.user_id, Some(UserId(12)));
        assert_eq!(config.column_width, 40);
        assert_eq!(config.gutter, 2);
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "column_width = \"wide\"").unwrap();

        assert!(matches!(Config::load_from(&path), Err(EventosError::Config(_))));
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default()
            .with_overrides(|key| match key {
                ENV_API_URL => Some("http://events.test".into()),
                ENV_USER_ID => Some(" 8 ".into()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.api_url, "http://events.test");
        assert_eq!(config.user_id, Some(UserId(8)));
    }

    #[test]
    fn test_bad_user_override_is_rejected() {
        let result = Config::default().with_overrides(|key| (key == ENV_USER_ID).then(|| "me".to_string()));
        assert!(matches!(result, Err(EventosError::Config(_))));
    }
}
