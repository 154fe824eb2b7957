//! QingFlow connector for reading form submissions
//!
//! Pulls pages of submissions from a QingFlow view and flattens every
//! submission into a [`Record`]. Authentication is cookie based: the session
//! is loaded from disk when the client is built and written back by
//! [`QingFlowClient::close`].

mod session;
mod types;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use formsync_config::SourceConfig;
use reqwest::Url;
use reqwest::cookie::Jar;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cancel::with_cancel;
use crate::error::ConnectorError;
use crate::http::decode_envelope;
use crate::ratelimit::{OperationClass, RateLimits};
use crate::record::{Page, Record};
use crate::traits::RecordSource;

pub use session::parse_cookie_pairs;
pub use types::{Answer, AnswerValue, ApplyItem, FilterData, FilterRequest, FilterResponse};

/// Name of the synthetic permalink field added to every record
pub const URL_FIELD: &str = "URL";

/// Client for one QingFlow view
pub struct QingFlowClient {
    client: reqwest::Client,
    jar: Arc<Jar>,
    base_url: Url,
    app_id: String,
    view_id: String,
    blacklist_keywords: Vec<String>,
    session_file: PathBuf,
    limits: Arc<RateLimits>,
}

impl QingFlowClient {
    /// Create a client and restore the persisted session
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is invalid, the HTTP client cannot be
    /// built, or an existing session file cannot be read.
    pub fn new(
        config: &SourceConfig,
        session_file: impl Into<PathBuf>,
        limits: Arc<RateLimits>,
    ) -> Result<Self, ConnectorError> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/')).map_err(|e| {
            ConnectorError::Init(format!("invalid QingFlow base URL '{}': {}", config.base_url, e))
        })?;

        let jar = Arc::new(Jar::default());
        let session_file = session_file.into();
        let loaded = session::load_session(&session_file, &jar, &base_url)?;
        if loaded > 0 {
            info!(
                path = %session_file.display(),
                cookies = loaded,
                "loaded session cookies"
            );
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("formsync/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .cookie_provider(Arc::clone(&jar))
            .build()
            .map_err(|e| ConnectorError::Init(format!("QingFlow HTTP client: {}", e)))?;

        Ok(Self {
            client,
            jar,
            base_url,
            app_id: config.app_id.clone(),
            view_id: config.view_id.clone(),
            blacklist_keywords: config.blacklist_keywords.clone(),
            session_file,
            limits,
        })
    }

    /// Path the session is persisted to
    pub fn session_file(&self) -> &Path {
        &self.session_file
    }

    fn base(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Fetch one raw page from the filter endpoint (single attempt, no retry)
    pub async fn fetch_raw(
        &self,
        page_num: u32,
        page_size: u32,
        cancel: &CancellationToken,
    ) -> Result<FilterData, ConnectorError> {
        self.limits
            .acquire(OperationClass::PageFetch, cancel)
            .await?;

        let url = format!("{}/api/view/{}/apply/filter", self.base(), self.view_id);
        let body = FilterRequest::page(page_num, page_size);

        debug!(page = page_num, page_size, "fetching source page");

        let response: FilterResponse = with_cancel(cancel, async {
            let response = self.client.post(&url).json(&body).send().await?;
            decode_envelope(response).await
        })
        .await?;

        response.into_data()
    }

    /// Flatten every submission of a page into a record
    pub fn to_records(&self, data: &FilterData) -> Vec<Record> {
        data.list.iter().map(|item| self.to_record(item)).collect()
    }

    fn to_record(&self, item: &ApplyItem) -> Record {
        let mut record: Record = item
            .answers
            .iter()
            .filter(|answer| !self.is_blacklisted(&answer.que_title))
            .map(|answer| (answer.que_title.as_str(), answer.first_value()))
            .collect();

        record.insert(URL_FIELD, self.permalink(item.apply_id));
        record
    }

    fn is_blacklisted(&self, title: &str) -> bool {
        self.blacklist_keywords
            .iter()
            .any(|keyword| title.contains(keyword.as_str()))
    }

    /// Share-view link to a single submission
    pub fn permalink(&self, apply_id: i64) -> String {
        format!(
            "{}/appView/{}/shareView/{}?applyId={}",
            self.base(),
            self.app_id,
            self.view_id,
            apply_id
        )
    }

    /// Persist the current session cookies, overwriting the session file
    pub fn close(&self) -> Result<(), ConnectorError> {
        let saved = session::save_session(&self.session_file, &self.jar, &self.base_url)?;
        info!(
            path = %self.session_file.display(),
            cookies = saved,
            "saved session cookies"
        );
        Ok(())
    }
}

impl RecordSource for QingFlowClient {
    async fn fetch_page(
        &self,
        page_num: u32,
        page_size: u32,
        cancel: &CancellationToken,
    ) -> Result<Page, ConnectorError> {
        let data = self.fetch_raw(page_num, page_size, cancel).await?;
        let records = self.to_records(&data);

        Ok(Page {
            page_num,
            page_size,
            total: data.total,
            records,
        })
    }
}
