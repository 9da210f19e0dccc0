//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/dashcal/config.toml` by default:
//!
//! ```toml
//! [calendar]
//! url = "https://example.com/team.ics"
//! timeout_secs = 10
//! lookbehind_days = 14
//! lookahead_days = 365
//!
//! [display]
//! limit = 20
//! json = false
//! ```

use std::path::{Path, PathBuf};

use dashcal_ical::{DEFAULT_LOOKAHEAD_DAYS, DEFAULT_LOOKBEHIND_DAYS, FetchConfig};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Configuration for the dashcal client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Calendar source settings.
    pub calendar: CalendarSettings,

    /// Display settings.
    pub display: DisplaySettings,
}

/// Where the calendar comes from and how far it is expanded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// Calendar URL or path to a local .ics file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Days before now to keep occurrences.
    pub lookbehind_days: u32,

    /// Days after now to expand recurring events.
    pub lookahead_days: u32,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: FetchConfig::DEFAULT_TIMEOUT_SECS,
            lookbehind_days: DEFAULT_LOOKBEHIND_DAYS as u32,
            lookahead_days: DEFAULT_LOOKAHEAD_DAYS as u32,
        }
    }
}

/// Display settings for output formatting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Maximum number of events to display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,

    /// Print JSON instead of text.
    pub json: bool,
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if it is absent.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            ClientError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Serializes the configuration as TOML.
    pub fn to_toml(&self) -> ClientResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dashcal")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.calendar.url, None);
        assert_eq!(config.calendar.timeout_secs, 10);
        assert_eq!(config.calendar.lookbehind_days, 14);
        assert_eq!(config.calendar.lookahead_days, 365);
        assert_eq!(config.display.limit, None);
        assert!(!config.display.json);
    }

    #[test]
    fn load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[calendar]\nurl = \"https://example.com/team.ics\"\nlookahead_days = 30\n\n[display]\nlimit = 5"
        )
        .unwrap();

        let config = ClientConfig::load_from(file.path()).unwrap();
        assert_eq!(
            config.calendar.url.as_deref(),
            Some("https://example.com/team.ics")
        );
        assert_eq!(config.calendar.lookahead_days, 30);
        assert_eq!(config.calendar.lookbehind_days, 14);
        assert_eq!(config.calendar.timeout_secs, 10);
        assert_eq!(config.display.limit, Some(5));
    }

    #[test]
    fn load_empty_file_gives_defaults() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = ClientConfig::load_from(file.path()).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn load_invalid_toml_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[calendar\nurl = ").unwrap();
        let err = ClientConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientConfig::load_from(&dir.path().join("missing.toml")).unwrap_err();
        assert!(err.to_string().starts_with("configuration error: failed to read"));
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = ClientConfig::default();
        config.calendar.url = Some("/home/me/cal.ics".to_string());
        config.display.json = true;

        let text = config.to_toml().unwrap();
        assert!(text.contains("[calendar]"));
        assert!(text.contains("url = \"/home/me/cal.ics\""));
        assert_eq!(toml::from_str::<ClientConfig>(&text).unwrap(), config);
    }

    #[test]
    fn default_path_ends_with_config_toml() {
        let path = ClientConfig::default_path();
        assert!(path.ends_with("dashcal/config.toml"));
    }
}
