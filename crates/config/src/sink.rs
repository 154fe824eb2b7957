//! Sink (Lark Bitable) configuration

use serde::Deserialize;

/// Default Lark Open Platform host
pub const DEFAULT_SINK_URL: &str = "https://open.feishu.cn";

/// Bitable table that receives the mirrored records
///
/// # Example
///
/// ```toml
/// [sink]
/// app_id = "cli_xxx"
/// app_secret = "secret"
/// app_token = "bascnxxx"
/// table_id = "tblxxx"
/// id_field = "编号"
/// timestamp_fields = ["更新时间", "申请时间"]
/// ```
///
/// The legacy JSON layout names this section `lark`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Lark app id, used to obtain a tenant access token
    pub app_id: String,

    /// Lark app secret
    pub app_secret: String,

    /// Bitable app token (the base)
    pub app_token: String,

    /// Table id inside the base
    pub table_id: String,

    /// API base URL
    /// Default: https://open.feishu.cn
    pub base_url: String,

    /// Business identifier column used for upsert lookups
    /// Default: "编号"
    pub id_field: String,

    /// Columns holding "YYYY-MM-DD HH:MM:SS" (UTC+8) values, written as epoch ms
    /// Default: ["更新时间", "申请时间"]
    pub timestamp_fields: Vec<String>,

    /// Column written as a hyperlink object
    /// Default: "URL"
    pub link_field: String,

    /// Per-request timeout in seconds
    /// Default: 30
    pub timeout_secs: u64,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            app_secret: String::new(),
            app_token: String::new(),
            table_id: String::new(),
            base_url: DEFAULT_SINK_URL.to_string(),
            id_field: "编号".to_string(),
            timestamp_fields: vec!["更新时间".to_string(), "申请时间".to_string()],
            link_field: "URL".to_string(),
            timeout_secs: 30,
        }
    }
}
