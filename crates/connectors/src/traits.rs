//! Seams between the sync engine and the remote systems

use crate::error::ConnectorError;
use crate::record::{Page, Record};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Field map in the sink's wire representation
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Paginated reader of source records
pub trait RecordSource: Send + Sync {
    /// Fetch one page, newest items first
    fn fetch_page(
        &self,
        page_num: u32,
        page_size: u32,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Page, ConnectorError>> + Send;
}

/// Result of a single upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No row with this identifier existed; a new one was created
    Created(String),
    /// An existing row was overwritten
    Updated(String),
    /// The record had no business identifier and was dropped
    Skipped,
}

/// Writer that creates or updates a record by business identifier
pub trait RecordSink: Send + Sync {
    /// Upsert one record
    fn upsert(
        &self,
        record: Record,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<UpsertOutcome, ConnectorError>> + Send;
}

/// Row-level operations on the target table
pub trait TableStore: Send + Sync {
    /// Row id of the record whose identifier column equals `business_id`
    fn find_record(
        &self,
        business_id: &str,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Option<String>, ConnectorError>> + Send;

    /// Insert a row, returning its id
    fn create_record(
        &self,
        fields: &Fields,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<String, ConnectorError>> + Send;

    /// Overwrite the given fields of an existing row
    fn update_record(
        &self,
        record_id: &str,
        fields: &Fields,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), ConnectorError>> + Send;
}
