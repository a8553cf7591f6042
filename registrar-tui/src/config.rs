//! Configuration loading for the Registrar TUI.
//!
//! All fields are required. No defaults.

use crate::nav::View;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TuiConfig {
    pub api_base_url: String,
    pub request_timeout_ms: u64,
    pub tick_ms: u64,
    pub search_debounce_ms: u64,
    pub page_size: usize,
    pub reset_page_on_sort: bool,
    pub start_view: View,
    pub persistence_path: PathBuf,
    pub log_path: PathBuf,
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeConfig {
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or REGISTRAR_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

pub const SUPPORTED_THEMES: &[&str] = &["synthbrute", "plain"];

impl TuiConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_base_url.trim();
        if url.is_empty() {
            return Err(invalid("api_base_url", "must not be empty"));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(invalid("api_base_url", "must start with http:// or https://"));
        }
        if self.request_timeout_ms == 0 {
            return Err(invalid("request_timeout_ms", "must be > 0"));
        }
        if self.tick_ms == 0 {
            return Err(invalid("tick_ms", "must be > 0"));
        }
        if self.search_debounce_ms < self.tick_ms {
            return Err(invalid("search_debounce_ms", "must be >= tick_ms"));
        }
        if self.page_size == 0 {
            return Err(invalid("page_size", "must be > 0"));
        }
        if self.persistence_path.as_os_str().is_empty() {
            return Err(invalid("persistence_path", "must not be empty"));
        }
        if self.log_path.as_os_str().is_empty() {
            return Err(invalid("log_path", "must not be empty"));
        }
        let theme = self.theme.name.trim().to_ascii_lowercase();
        if theme.is_empty() {
            return Err(invalid("theme.name", "must not be empty"));
        }
        if !SUPPORTED_THEMES.contains(&theme.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "theme.name",
                reason: format!("must be one of {}", SUPPORTED_THEMES.join(", ")),
            });
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var("REGISTRAR_CONFIG").ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
api_base_url = "http://localhost:3000"
request_timeout_ms = 5000
tick_ms = 100
search_debounce_ms = 300
page_size = 10
reset_page_on_sort = false
start_view = "individuals"
persistence_path = "state/registrar.json"
log_path = "state/registrar.log"

[theme]
name = "synthbrute"
"#;

    #[test]
    fn test_sample_parses_and_validates() {
        let config = TuiConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(config.start_view, View::Individuals);
        assert_eq!(config.page_size, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let contents = format!("{SAMPLE}\nextra = 1\n");
        assert!(matches!(
            TuiConfig::from_toml(&contents),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let contents = SAMPLE.replace("page_size = 10\n", "");
        assert!(TuiConfig::from_toml(&contents).is_err());
    }
}
