//! Upsert by business identifier

use std::sync::Arc;

use formsync_config::SinkConfig;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::BitableClient;
use super::fields::FieldTransform;
use crate::error::ConnectorError;
use crate::ratelimit::RateLimits;
use crate::record::Record;
use crate::traits::{RecordSink, TableStore, UpsertOutcome};

/// Record sink that looks a row up by identifier, then updates or creates it
pub struct BitableSink<T = BitableClient> {
    store: T,
    id_field: String,
    transform: FieldTransform,
}

impl BitableSink<BitableClient> {
    /// Sink writing to the configured Bitable table
    ///
    /// # Errors
    ///
    /// Returns error if the underlying client cannot be built
    pub fn from_config(config: &SinkConfig, limits: Arc<RateLimits>) -> Result<Self, ConnectorError> {
        let client = BitableClient::new(config, limits)?;
        Ok(Self::new(
            client,
            config.id_field.clone(),
            FieldTransform::from_config(config),
        ))
    }
}

impl<T: TableStore> BitableSink<T> {
    pub fn new(store: T, id_field: impl Into<String>, transform: FieldTransform) -> Self {
        Self {
            store,
            id_field: id_field.into(),
            transform,
        }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &T {
        &self.store
    }
}

impl<T: TableStore> RecordSink for BitableSink<T> {
    async fn upsert(
        &self,
        record: Record,
        cancel: &CancellationToken,
    ) -> Result<UpsertOutcome, ConnectorError> {
        let Some(business_id) = record.business_id(&self.id_field) else {
            debug!(id_field = %self.id_field, "record has no business id, skipping");
            return Ok(UpsertOutcome::Skipped);
        };

        let existing = self.store.find_record(business_id, cancel).await?;
        let fields = self.transform.apply(&record);

        match existing {
            Some(record_id) => {
                self.store.update_record(&record_id, &fields, cancel).await?;
                debug!(business_id, record_id = %record_id, "updated record");
                Ok(UpsertOutcome::Updated(record_id))
            }
            None => {
                let record_id = self.store.create_record(&fields, cancel).await?;
                debug!(business_id, record_id = %record_id, "created record");
                Ok(UpsertOutcome::Created(record_id))
            }
        }
    }
}
