//! Outbound call rate ceilings
//!
//! One independent budget per remote operation class. Values are calls per
//! second; every bucket has a burst of one unless `burst` says otherwise.

use serde::Deserialize;

/// Rate ceilings per operation class
///
/// # Example
///
/// ```toml
/// [rate_limits]
/// page_fetch = 1.0
/// exists_check = 15.0
/// create = 40.0
/// update = 40.0
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RateLimitsConfig {
    /// Source page fetches per second
    /// Default: 1
    pub page_fetch: f64,

    /// Sink search-by-identifier calls per second
    /// Default: 15
    pub exists_check: f64,

    /// Sink record creations per second
    /// Default: 40
    pub create: f64,

    /// Sink record updates per second
    /// Default: 40
    pub update: f64,

    /// Bucket capacity shared by all classes
    /// Default: 1 (minimum-interval gate)
    pub burst: u32,
}

impl Default for RateLimitsConfig {
    fn default() -> Self {
        Self {
            page_fetch: 1.0,
            exists_check: 15.0,
            create: 40.0,
            update: 40.0,
            burst: 1,
        }
    }
}

impl RateLimitsConfig {
    /// All (name, rate) pairs, for validation and logging
    pub fn rates(&self) -> [(&'static str, f64); 4] {
        [
            ("page_fetch", self.page_fetch),
            ("exists_check", self.exists_check),
            ("create", self.create),
            ("update", self.update),
        ]
    }
}
