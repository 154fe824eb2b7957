//! Bitable connector for writing records
//!
//! [`BitableClient`] is the thin HTTP binding to one Bitable table: search by
//! identifier, create, update. [`BitableSink`] holds the upsert decision on
//! top of any [`TableStore`] so it can be tested without the network.

mod auth;
mod fields;
mod sink;
mod types;

use std::sync::Arc;
use std::time::Duration;

use formsync_config::SinkConfig;
use reqwest::Url;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cancel::with_cancel;
use crate::error::ConnectorError;
use crate::http::decode_envelope;
use crate::ratelimit::{OperationClass, RateLimits};
use crate::traits::{Fields, TableStore};

pub use auth::TenantTokenCache;
pub use fields::{FieldTransform, TIMESTAMP_FORMAT, parse_local_timestamp};
pub use sink::BitableSink;
pub use types::{ApiResponse, RecordData, RecordItem, SearchData, SearchRequest};

/// Client for one Bitable table
pub struct BitableClient {
    client: reqwest::Client,
    records_url: String,
    id_field: String,
    tokens: TenantTokenCache,
    limits: Arc<RateLimits>,
}

impl BitableClient {
    /// Create a client for the configured table
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is invalid or the HTTP client cannot be
    /// built
    pub fn new(config: &SinkConfig, limits: Arc<RateLimits>) -> Result<Self, ConnectorError> {
        Url::parse(&config.base_url).map_err(|e| {
            ConnectorError::Init(format!("invalid Bitable base URL '{}': {}", config.base_url, e))
        })?;
        let base = config.base_url.trim_end_matches('/');

        let client = reqwest::Client::builder()
            .user_agent(concat!("formsync/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConnectorError::Init(format!("Bitable HTTP client: {}", e)))?;

        Ok(Self {
            client,
            records_url: format!(
                "{}/open-apis/bitable/v1/apps/{}/tables/{}/records",
                base, config.app_token, config.table_id
            ),
            id_field: config.id_field.clone(),
            tokens: TenantTokenCache::new(base, &config.app_id, &config.app_secret),
            limits,
        })
    }

    /// Send an authorized request and unwrap the response envelope
    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        cancel: &CancellationToken,
    ) -> Result<T, ConnectorError> {
        let token = self.tokens.token(&self.client, cancel).await?;

        let response: ApiResponse<T> = with_cancel(cancel, async {
            let response = request.bearer_auth(token).send().await?;
            decode_envelope(response).await
        })
        .await?;

        response.into_data()
    }
}

impl TableStore for BitableClient {
    async fn find_record(
        &self,
        business_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, ConnectorError> {
        self.limits
            .acquire(OperationClass::ExistsCheck, cancel)
            .await?;

        let body = SearchRequest::field_equals(&self.id_field, business_id);
        let request = self
            .client
            .post(format!("{}/search", self.records_url))
            .query(&[("page_size", "1")])
            .json(&body);

        let data: SearchData = self.send(request, cancel).await?;
        let record_id = data
            .items
            .unwrap_or_default()
            .into_iter()
            .find_map(|item| item.record_id);

        debug!(business_id, found = record_id.is_some(), "searched for record");
        Ok(record_id)
    }

    async fn create_record(
        &self,
        fields: &Fields,
        cancel: &CancellationToken,
    ) -> Result<String, ConnectorError> {
        self.limits.acquire(OperationClass::Create, cancel).await?;

        let request = self
            .client
            .post(&self.records_url)
            .json(&types::RecordBody { fields });

        let data: RecordData = self.send(request, cancel).await?;
        data.record
            .record_id
            .ok_or_else(|| ConnectorError::remote("bitable", 0, "created record has no id"))
    }

    async fn update_record(
        &self,
        record_id: &str,
        fields: &Fields,
        cancel: &CancellationToken,
    ) -> Result<(), ConnectorError> {
        self.limits.acquire(OperationClass::Update, cancel).await?;

        let request = self
            .client
            .put(format!("{}/{}", self.records_url, record_id))
            .json(&types::RecordBody { fields });

        let _: RecordData = self.send(request, cancel).await?;
        Ok(())
    }
}
