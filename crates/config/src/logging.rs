//! `[log]` section
//!
//! `level` is handed to `tracing_subscriber::EnvFilter` as is, so besides a
//! plain level it accepts per-crate directives such as
//! `"info,formsync_connectors=debug"`.

use serde::Deserialize;

/// Default filter directive
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// How log lines are rendered on stderr
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Console,
    /// One JSON object per line, for log shippers
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive, e.g. "warn" or "info,formsync_connectors=debug"
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::default(),
        }
    }
}
