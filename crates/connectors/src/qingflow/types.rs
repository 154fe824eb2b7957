//! QingFlow filter API wire types
//!
//! Only the fields the sync reads are modelled; everything else in the
//! response is ignored.

use serde::{Deserialize, Serialize};

use crate::error::ConnectorError;
use crate::http::Envelope;

/// Filter type for "all submissions visible in this view"
const FILTER_TYPE_ALL: i32 = 8;

/// Sort on the "last update" system question, newest first
pub const UPDATE_TIME_SORT: FilterSort = FilterSort {
    que_id: 3,
    is_ascend: false,
    que_type: 4,
};

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSort {
    pub que_id: i64,
    pub is_ascend: bool,
    pub que_type: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub page_size: u32,
    pub page_num: u32,
    #[serde(rename = "type")]
    pub filter_type: i32,
    pub sorts: Vec<FilterSort>,
    pub queries: Vec<serde_json::Value>,
    pub query_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FilterRequest {
    pub filter: Filter,
}

impl FilterRequest {
    /// Request one page sorted by last update, newest first
    pub fn page(page_num: u32, page_size: u32) -> Self {
        Self {
            filter: Filter {
                page_size,
                page_num,
                filter_type: FILTER_TYPE_ALL,
                sorts: vec![UPDATE_TIME_SORT],
                queries: Vec::new(),
                query_key: None,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FilterResponse {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<FilterData>,
}

impl Envelope for FilterResponse {
    fn code(&self) -> i64 {
        self.code
    }
}

impl FilterResponse {
    /// Unwrap the payload, turning a non-zero code into an error
    pub fn into_data(self) -> Result<FilterData, ConnectorError> {
        if self.code != 0 {
            return Err(ConnectorError::remote(
                "qingflow",
                self.code,
                self.message.unwrap_or_default(),
            ));
        }
        self.data
            .ok_or_else(|| ConnectorError::remote("qingflow", self.code, "response has no data"))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterData {
    pub list: Vec<ApplyItem>,
    pub page_num: u32,
    pub page_size: u32,
    pub total: u64,
}

/// One form submission
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplyItem {
    pub apply_id: i64,
    pub answers: Vec<Answer>,
}

/// Answer to one question of the form
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Answer {
    pub que_id: i64,
    pub que_title: String,
    pub values: Vec<AnswerValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AnswerValue {
    pub value: Option<String>,
}

impl Answer {
    /// First answer value, or empty if the question was left blank
    pub fn first_value(&self) -> &str {
        self.values
            .first()
            .and_then(|v| v.value.as_deref())
            .unwrap_or("")
    }
}
