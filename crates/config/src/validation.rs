//! Configuration validation
//!
//! Checks that:
//! - Identifiers for both remote systems are present
//! - Interval, cycle timeout and page size are non-zero
//! - Every rate ceiling is a positive finite number
//! - The log filter is not blank

use crate::Config;
use crate::error::{ConfigError, Result};

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_source(config)?;
    validate_sink(config)?;
    validate_schedule(config)?;
    validate_rate_limits(config)?;
    require("log", "level", &config.log.level)?;
    Ok(())
}

fn require(section: &'static str, field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::missing_field(section, field));
    }
    Ok(())
}

fn validate_source(config: &Config) -> Result<()> {
    let source = &config.source;
    require("source", "app_id", &source.app_id)?;
    require("source", "view_id", &source.view_id)?;
    require("source", "base_url", &source.base_url)?;
    Ok(())
}

fn validate_sink(config: &Config) -> Result<()> {
    let sink = &config.sink;
    require("sink", "app_id", &sink.app_id)?;
    require("sink", "app_secret", &sink.app_secret)?;
    require("sink", "app_token", &sink.app_token)?;
    require("sink", "table_id", &sink.table_id)?;
    require("sink", "id_field", &sink.id_field)?;
    require("sink", "base_url", &sink.base_url)?;
    Ok(())
}

fn validate_schedule(config: &Config) -> Result<()> {
    if config.interval.is_zero() {
        return Err(ConfigError::invalid_value(
            "config",
            "interval",
            "must be greater than zero",
        ));
    }
    if config.cycle_timeout.is_zero() {
        return Err(ConfigError::invalid_value(
            "config",
            "cycle_timeout",
            "must be greater than zero",
        ));
    }
    if config.page_size == 0 {
        return Err(ConfigError::invalid_value(
            "config",
            "page_size",
            "must be greater than zero",
        ));
    }
    Ok(())
}

fn validate_rate_limits(config: &Config) -> Result<()> {
    for (name, rate) in config.rate_limits.rates() {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ConfigError::invalid_value(
                "rate_limits",
                name,
                format!("must be a positive number of calls per second, got {}", rate),
            ));
        }
    }
    if config.rate_limits.burst == 0 {
        return Err(ConfigError::invalid_value(
            "rate_limits",
            "burst",
            "must be at least 1",
        ));
    }
    Ok(())
}
