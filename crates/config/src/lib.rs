//! formsync Configuration
//!
//! TOML-based configuration loading with sensible defaults. Only the remote
//! identifiers and the sync interval are required; everything else has a
//! default matching the remote APIs' published quotas.
//!
//! Files ending in `.json` are parsed as JSON so that existing deployments
//! using the `{"qflow": .., "lark": .., "interval": ..}` layout keep working.
//!
//! # Example
//!
//! ```toml
//! interval = "10m"
//! cycle_timeout = "5m"
//!
//! [source]
//! app_id = "a1b2c3"
//! view_id = "v9x8y7"
//!
//! [sink]
//! app_id = "cli_xxx"
//! app_secret = "secret"
//! app_token = "bascnxxx"
//! table_id = "tblxxx"
//! ```

mod error;
mod logging;
mod rate_limits;
mod sink;
mod source;
mod validation;

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub use error::{ConfigError, Result};
pub use logging::{DEFAULT_LOG_LEVEL, LogConfig, LogFormat};
pub use rate_limits::RateLimitsConfig;
pub use sink::{DEFAULT_SINK_URL, SinkConfig};
pub use source::{DEFAULT_BLACKLIST_KEYWORDS, DEFAULT_SOURCE_URL, SourceConfig};

use serde::Deserialize;

/// Default path of the persisted QingFlow session
pub const DEFAULT_SESSION_FILE: &str = "cookie.txt";

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Time between sync cycles (e.g. "10m", "1h30m")
    #[serde(with = "humantime_serde")]
    pub interval: Duration,

    /// Upper bound on a single cycle
    /// Default: 5m
    #[serde(with = "humantime_serde", default = "default_cycle_timeout")]
    pub cycle_timeout: Duration,

    /// Records requested per source page
    /// Default: 50
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Where the source session cookies are persisted
    /// Default: cookie.txt
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,

    /// Form submission API
    #[serde(default, alias = "qflow")]
    pub source: SourceConfig,

    /// Bitable table
    #[serde(default, alias = "lark")]
    pub sink: SinkConfig,

    /// Per-operation rate ceilings
    #[serde(default)]
    pub rate_limits: RateLimitsConfig,
}

fn default_cycle_timeout() -> Duration {
    Duration::from_secs(5 * 60)
}

fn default_page_size() -> u32 {
    50
}

fn default_session_file() -> PathBuf {
    PathBuf::from(DEFAULT_SESSION_FILE)
}

impl Config {
    /// Load configuration from a file
    ///
    /// The format is chosen by extension: `.json` is JSON, anything else TOML.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, fails to parse, or does not
    /// pass validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json(&contents)
        } else {
            Self::from_str(&contents)
        }
    }

    /// Parse configuration from a JSON string
    pub fn from_json(s: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
interval = "10m"

[source]
app_id = "app"
view_id = "view"

[sink]
app_id = "cli_app"
app_secret = "secret"
app_token = "base"
table_id = "tbl"
"#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_str(MINIMAL).unwrap();
        assert_eq!(config.interval, Duration::from_secs(600));
        assert_eq!(config.cycle_timeout, Duration::from_secs(300));
        assert_eq!(config.page_size, 50);
        assert_eq!(config.session_file, PathBuf::from("cookie.txt"));
        assert_eq!(config.sink.id_field, "编号");
        assert_eq!(config.rate_limits, RateLimitsConfig::default());
    }

    #[test]
    fn test_compound_interval() {
        let toml = MINIMAL.replace("\"10m\"", "\"1h 30m\"");
        let config = Config::from_str(&toml).unwrap();
        assert_eq!(config.interval, Duration::from_secs(90 * 60));
    }

    #[test]
    fn test_bad_interval_is_error() {
        let toml = MINIMAL.replace("\"10m\"", "\"soon\"");
        assert!(matches!(
            Config::from_str(&toml),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_interval_is_error() {
        let toml = MINIMAL.replace("interval = \"10m\"", "");
        assert!(Config::from_str(&toml).is_err());
    }

    #[test]
    fn test_missing_sink_identifier() {
        let toml = MINIMAL.replace("table_id = \"tbl\"", "");
        let err = Config::from_str(&toml).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingField {
                section: "sink",
                field: "table_id"
            }
        ));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let toml = format!("page_size = 0\n{}", MINIMAL);
        assert!(matches!(
            Config::from_str(&toml),
            Err(ConfigError::InvalidValue {
                field: "page_size",
                ..
            })
        ));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let toml = format!("{}\n[rate_limits]\ncreate = -1.0\n", MINIMAL);
        assert!(matches!(
            Config::from_str(&toml),
            Err(ConfigError::InvalidValue {
                section: "rate_limits",
                field: "create",
                ..
            })
        ));
    }

    #[test]
    fn test_blank_log_level_rejected() {
        let toml = format!("{}\n[log]\nlevel = \"  \"\n", MINIMAL);
        assert!(matches!(
            Config::from_str(&toml),
            Err(ConfigError::MissingField {
                section: "log",
                field: "level"
            })
        ));
    }

    #[test]
    fn test_legacy_json_layout() {
        let json = r#"{
            "qflow": {"app_id": "app", "view_id": "view"},
            "lark": {
                "app_id": "cli_app",
                "app_secret": "secret",
                "app_token": "base",
                "table_id": "tbl"
            },
            "interval": "5m"
        }"#;
        let config = Config::from_json(json).unwrap();
        assert_eq!(config.source.view_id, "view");
        assert_eq!(config.sink.table_id, "tbl");
        assert_eq!(config.interval, Duration::from_secs(300));
    }

    #[test]
    fn test_from_file_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("config.toml");
        std::fs::File::create(&toml_path)
            .unwrap()
            .write_all(MINIMAL.as_bytes())
            .unwrap();
        assert!(Config::from_file(&toml_path).is_ok());

        let json_path = dir.path().join("config.json");
        std::fs::write(
            &json_path,
            r#"{"qflow":{"app_id":"a","view_id":"v"},"lark":{"app_id":"a","app_secret":"s","app_token":"t","table_id":"b"},"interval":"1m"}"#,
        )
        .unwrap();
        assert!(Config::from_file(&json_path).is_ok());
    }

    #[test]
    fn test_from_file_missing() {
        let err = Config::from_file("/nonexistent/formsync.toml").unwrap_err();
        assert!(matches!(err, ConfigError::IoError { .. }));
    }
}
