//! Bitable open API wire types

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ConnectorError;
use crate::http::Envelope;
use crate::traits::Fields;

/// Common response envelope: `code == 0` means success
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

impl<T: DeserializeOwned> Envelope for ApiResponse<T> {
    fn code(&self) -> i64 {
        self.code
    }
}

impl<T> ApiResponse<T> {
    /// Payload of a successful response
    pub fn into_data(self) -> Result<T, ConnectorError> {
        if self.code != 0 {
            return Err(ConnectorError::remote("bitable", self.code, self.msg));
        }
        self.data
            .ok_or_else(|| ConnectorError::remote("bitable", self.code, "response has no data"))
    }
}

#[derive(Debug, Serialize)]
pub struct TokenRequest<'a> {
    pub app_id: &'a str,
    pub app_secret: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub tenant_access_token: Option<String>,
    /// Lifetime in seconds
    #[serde(default)]
    pub expire: u64,
}

impl Envelope for TokenResponse {
    fn code(&self) -> i64 {
        self.code
    }
}

#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub field_names: Vec<&'a str>,
    pub filter: FilterInfo<'a>,
    pub automatic_fields: bool,
}

#[derive(Debug, Serialize)]
pub struct FilterInfo<'a> {
    pub conjunction: &'static str,
    pub conditions: Vec<Condition<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Condition<'a> {
    pub field_name: &'a str,
    pub operator: &'static str,
    pub value: Vec<&'a str>,
}

impl<'a> SearchRequest<'a> {
    /// Rows whose `field` equals `value`, returning only that column
    pub fn field_equals(field: &'a str, value: &'a str) -> Self {
        Self {
            field_names: vec![field],
            filter: FilterInfo {
                conjunction: "and",
                conditions: vec![Condition {
                    field_name: field,
                    operator: "is",
                    value: vec![value],
                }],
            },
            automatic_fields: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchData {
    pub items: Option<Vec<RecordItem>>,
    pub has_more: bool,
    pub total: u64,
}

#[derive(Debug, Deserialize)]
pub struct RecordItem {
    pub record_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecordBody<'a> {
    pub fields: &'a Fields,
}

#[derive(Debug, Deserialize)]
pub struct RecordData {
    pub record: RecordItem,
}
