/// Application configuration
///
/// Values are layered: built-in defaults, then an optional JSON file in the
/// user's config directory, then environment variables:
/// - Linux: ~/.config/pistar-folio/config.json
/// - macOS: ~/Library/Application Support/pistar-folio/config.json
/// - Windows: %APPDATA%\pistar-folio\config.json
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::state::cursor::DEFAULT_PAGE_SIZE;
use crate::state::scroll::DEFAULT_THRESHOLD;

const APP_DIR: &str = "pistar-folio";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("API base must be an http(s) URL: {0}")]
    InvalidBase(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Origin of the content backend
    pub api_base: String,
    /// Records requested per page
    pub page_size: u32,
    /// Distance from the bottom of the grid that triggers the next page
    pub scroll_threshold: f32,
    pub request_timeout_secs: u64,
    /// Longest edge of cached thumbnails, in pixels
    pub thumbnail_size: u32,
    /// Overrides the platform cache directory
    pub cache_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "https://api.muhsinzade.com".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            scroll_threshold: DEFAULT_THRESHOLD,
            request_timeout_secs: 30,
            thumbnail_size: 600,
            cache_dir: None,
        }
    }
}

impl Config {
    /// Load the layered configuration for this process
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;

        info!(
            api_base = %config.api_base,
            page_size = config.page_size,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Get the path where the config file is looked up
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.json"))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `FOLIO_*` overrides looked up through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(base) = lookup("FOLIO_API_BASE") {
            self.api_base = base;
        }
        if let Some(value) = lookup("FOLIO_PAGE_SIZE") {
            self.page_size = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "FOLIO_PAGE_SIZE",
                    value,
                })?;
        }
        if let Some(value) = lookup("FOLIO_SCROLL_THRESHOLD") {
            self.scroll_threshold = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "FOLIO_SCROLL_THRESHOLD",
                    value,
                })?;
        }
        if let Some(dir) = lookup("FOLIO_CACHE_DIR") {
            self.cache_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match Url::parse(&self.api_base) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
            _ => return Err(ConfigError::InvalidBase(self.api_base.clone())),
        }
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "page_size",
                value: self.page_size.to_string(),
            });
        }
        if !self.scroll_threshold.is_finite() || self.scroll_threshold < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "scroll_threshold",
                value: self.scroll_threshold.to_string(),
            });
        }
        Ok(())
    }

    /// Directory for cached thumbnails, `None` when no cache location exists
    pub fn thumbnail_cache_dir(&self) -> Option<PathBuf> {
        self.cache_dir
            .clone()
            .or_else(|| dirs_next::cache_dir().map(|dir| dir.join(APP_DIR)))
            .map(|dir| dir.join("thumbnails"))
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
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.page_size, 25);
        assert_eq!(config.scroll_threshold, 100.0);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("FOLIO_API_BASE", "http://localhost:1337"),
                ("FOLIO_PAGE_SIZE", " 10 "),
                ("FOLIO_CACHE_DIR", "/tmp/folio"),
            ]))
            .unwrap();

        assert_eq!(config.api_base, "http://localhost:1337");
        assert_eq!(config.page_size, 10);
        assert_eq!(
            config.thumbnail_cache_dir(),
            Some(PathBuf::from("/tmp/folio/thumbnails"))
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_env_value() {
        let mut config = Config::default();
        let err = config
            .apply_env(env(&[("FOLIO_PAGE_SIZE", "many")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "FOLIO_PAGE_SIZE", .. }));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero_page = Config {
            page_size: 0,
            ..Config::default()
        };
        assert!(zero_page.validate().is_err());

        let ftp = Config {
            api_base: "ftp://example.com".into(),
            ..Config::default()
        };
        assert!(matches!(ftp.validate(), Err(ConfigError::InvalidBase(_))));
    }

    #[test]
    fn test_partial_config_file() {
        let config: Config = serde_json::from_str(r#"{ "page_size": 50 }"#).unwrap();
        assert_eq!(config.page_size, 50);
        assert_eq!(config.api_base, Config::default().api_base);
    }
}
