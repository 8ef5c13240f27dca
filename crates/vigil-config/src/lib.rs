//! Shared configuration for the Vigil CLI.
//!
//! TOML file under the platform config directory, overridable through
//! `VIGIL_*` environment variables and CLI flags, translated into a
//! `vigil_core::ConsoleConfig` plus the service URL the gateway needs.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use vigil_core::{ConsoleConfig, ScheduleShape};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config struct ──────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Panel service root URL (e.g. `http://127.0.0.1:8000`).
    pub server_url: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Device list page size.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Search debounce quiet period in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Which schedule shape this deployment uses: `window` or `daily`.
    #[serde(default)]
    pub schedule_shape: ScheduleShape,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: None,
            timeout: default_timeout(),
            page_size: default_page_size(),
            debounce_ms: default_debounce_ms(),
            schedule_shape: ScheduleShape::default(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_page_size() -> usize {
    100
}

fn default_debounce_ms() -> u64 {
    400
}

impl Config {
    /// Translate to the core's runtime configuration.
    pub fn console_config(&self) -> ConsoleConfig {
        ConsoleConfig {
            page_size: self.page_size,
            debounce: Duration::from_millis(self.debounce_ms),
            schedule_shape: self.schedule_shape,
        }
    }

    /// The configured service URL, parsed and validated.
    pub fn server_url(&self) -> Result<Url, ConfigError> {
        let raw = self
            .server_url
            .as_deref()
            .ok_or_else(|| ConfigError::Validation {
                field: "server_url".into(),
                reason: "no panel service URL configured".into(),
            })?;
        raw.parse().map_err(|_| ConfigError::Validation {
            field: "server_url".into(),
            reason: format!("invalid URL: {raw}"),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

// ── Loading ─────────────────────────────────────────────────────────

/// Platform config file path: `<config dir>/vigil/config.toml`.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "vigil")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("vigil.toml"))
}

/// Load configuration from defaults, the TOML file, and `VIGIL_*`
/// environment variables (highest precedence).
pub fn load() -> Result<Config, ConfigError> {
    load_from(&config_path())
}

/// Load configuration with an explicit file path (tests, `--config`).
pub fn load_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("VIGIL_"))
        .extract()?;
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_service_conventions() {
        let config = Config::default();
        assert_eq!(config.page_size, 100);
        assert_eq!(config.debounce_ms, 400);
        assert_eq!(config.schedule_shape, ScheduleShape::Window);
        assert!(config.server_url().is_err());
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "server_url = \"http://panel.local:8000\"\npage_size = 25\nschedule_shape = \"daily\""
        )
        .unwrap();

        let config = load_from(file.path()).unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.schedule_shape, ScheduleShape::Daily);
        assert_eq!(
            config.server_url().unwrap().as_str(),
            "http://panel.local:8000/"
        );

        let console = config.console_config();
        assert_eq!(console.page_size, 25);
        assert_eq!(console.debounce, Duration::from_millis(400));
    }

    #[test]
    fn invalid_url_is_a_validation_error() {
        let config = Config {
            server_url: Some("not a url".into()),
            ..Config::default()
        };
        assert!(matches!(
            config.server_url(),
            Err(ConfigError::Validation { .. })
        ));
    }
}
