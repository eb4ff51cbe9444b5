//! Configuration loading for the LeadPilot TUI.
//!
//! All fields are required unless explicitly marked optional. No defaults.

use leadpilot_query::CacheConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides `api_base_url`.
pub const API_URL_ENV: &str = "LEADPILOT_API_URL";
/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_PATH_ENV: &str = "LEADPILOT_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TuiConfig {
    pub api_base_url: String,
    pub request_timeout_ms: u64,
    pub refresh_interval_ms: u64,
    pub usage_poll_interval_ms: u64,
    pub token_path: PathBuf,
    pub state_path: PathBuf,
    pub export_dir: PathBuf,
    pub log_path: PathBuf,
    pub log_format: LogFormat,
    pub theme: ThemeConfig,
    #[serde(default)]
    pub cache: Option<CacheSettings>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeConfig {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheSettings {
    /// Age after which a cached query is reloaded for a new subscriber.
    pub stale_after_ms: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or LEADPILOT_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
}

impl TuiConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        let mut config = Self::from_path(&path)?;
        config.apply_env_override(std::env::var(API_URL_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Replace the base URL with a non-empty override.
    pub fn apply_env_override(&mut self, api_url: Option<String>) {
        if let Some(url) = api_url.filter(|url| !url.trim().is_empty()) {
            self.api_base_url = url;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.api_base_url.trim();
        if base.is_empty() {
            return Err(invalid("api_base_url", "must not be empty"));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(invalid("api_base_url", "must start with http:// or https://"));
        }
        if self.request_timeout_ms == 0 {
            return Err(invalid("request_timeout_ms", "must be > 0"));
        }
        if self.refresh_interval_ms == 0 {
            return Err(invalid("refresh_interval_ms", "must be > 0"));
        }
        if self.usage_poll_interval_ms < self.refresh_interval_ms {
            return Err(invalid(
                "usage_poll_interval_ms",
                "must be >= refresh_interval_ms",
            ));
        }
        for (field, path) in [
            ("token_path", &self.token_path),
            ("state_path", &self.state_path),
            ("export_dir", &self.export_dir),
            ("log_path", &self.log_path),
        ] {
            if path.as_os_str().is_empty() {
                return Err(invalid(field, "must not be empty"));
            }
        }
        if crate::theme::Theme::by_name(&self.theme.name).is_none() {
            return Err(invalid("theme.name", "expected 'dark' or 'light'"));
        }
        if let Some(CacheSettings {
            stale_after_ms: Some(0),
        }) = self.cache
        {
            return Err(invalid("cache.stale_after_ms", "must be > 0 when set"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn cache_config(&self) -> CacheConfig {
        match self.cache.as_ref().and_then(|c| c.stale_after_ms) {
            Some(ms) => CacheConfig::new().with_stale_after(Duration::from_millis(ms)),
            None => CacheConfig::new(),
        }
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from)
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
api_base_url = "http://localhost:8000"
request_timeout_ms = 10000
refresh_interval_ms = 1000
usage_poll_interval_ms = 30000
token_path = "/tmp/leadpilot/token.json"
state_path = "/tmp/leadpilot/state.json"
export_dir = "/tmp/leadpilot/exports"
log_path = "/tmp/leadpilot/leadpilot.log"
log_format = "json"

[theme]
name = "dark"
"#;

    #[test]
    fn parses_sample_config() {
        let config = TuiConfig::parse(SAMPLE).expect("config should parse");
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.cache.is_none());
        assert!(config.validate().is_ok());
        assert!(config.cache_config().stale_after.is_none());
    }

    #[test]
    fn rejects_unknown_fields() {
        let contents = format!("{SAMPLE}\nws_endpoint = \"ws://nope\"\n");
        assert!(matches!(
            TuiConfig::parse(&contents),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn cache_section_sets_stale_after() {
        let contents = format!("{SAMPLE}\n[cache]\nstale_after_ms = 1500\n");
        let config = TuiConfig::parse(&contents).expect("config should parse");
        assert_eq!(
            config.cache_config().stale_after,
            Some(Duration::from_millis(1500))
        );
    }

    #[test]
    fn env_override_replaces_base_url() {
        let mut config = TuiConfig::parse(SAMPLE).expect("config should parse");
        config.apply_env_override(Some("https://api.leadpilot.io".to_string()));
        assert_eq!(config.api_base_url, "https://api.leadpilot.io");
        config.apply_env_override(Some("  ".to_string()));
        assert_eq!(config.api_base_url, "https://api.leadpilot.io");
        config.apply_env_override(None);
        assert_eq!(config.api_base_url, "https://api.leadpilot.io");
    }

    #[test]
    fn validation_names_the_field() {
        let mut config = TuiConfig::parse(SAMPLE).expect("config should parse");
        config.usage_poll_interval_ms = 10;
        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "usage_poll_interval_ms")
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let mut config = TuiConfig::parse(SAMPLE).expect("config should parse");
        config.api_base_url = "localhost:8000".to_string();
        assert!(config.validate().is_err());

        let mut config = TuiConfig::parse(SAMPLE).expect("config should parse");
        config.theme.name = "synthwave".to_string();
        assert!(config.validate().is_err());
    }
}
