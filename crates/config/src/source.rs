//! Source (QingFlow) configuration

use serde::Deserialize;

/// Default QingFlow host
pub const DEFAULT_SOURCE_URL: &str = "https://qingflow.com";

/// Question titles containing any of these are dropped (binary payloads)
pub const DEFAULT_BLACKLIST_KEYWORDS: &[&str] = &["附件", "图片"];

/// QingFlow form view to read submissions from
///
/// # Example
///
/// ```toml
/// [source]
/// app_id = "a1b2c3"
/// view_id = "v9x8y7"
/// blacklist_keywords = ["附件", "图片", "签名"]
/// ```
///
/// The legacy JSON layout names this section `qflow`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Application id, used to build record permalinks
    pub app_id: String,

    /// View id, addresses the filter endpoint
    pub view_id: String,

    /// API base URL
    /// Default: https://qingflow.com
    pub base_url: String,

    /// Keywords that exclude a question by title
    /// Default: ["附件", "图片"]
    pub blacklist_keywords: Vec<String>,

    /// Per-request timeout in seconds
    /// Default: 30
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            view_id: String::new(),
            base_url: DEFAULT_SOURCE_URL.to_string(),
            blacklist_keywords: DEFAULT_BLACKLIST_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            timeout_secs: 30,
        }
    }
}
