//! Dry run command - Show what the next sync would write for one record
//!
//! Fetches the newest submission and prints its transformed field map as
//! pretty JSON. Nothing is written to Bitable and no cycle is scheduled.

use std::sync::Arc;

use anyhow::{Context, Result};
use formsync_config::Config;
use formsync_connectors::{FieldTransform, QingFlowClient, RateLimits, RecordSource};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Run the dry run
pub async fn run(config: Config) -> Result<()> {
    let limits = Arc::new(RateLimits::from_config(&config.rate_limits));
    let source = QingFlowClient::new(&config.source, &config.session_file, limits)
        .context("failed to create QingFlow client")?;
    let transform = FieldTransform::from_config(&config.sink);

    info!("dry run: fetching one record");

    let result = source.fetch_page(1, 1, &CancellationToken::new()).await;

    if let Err(e) = source.close() {
        warn!(error = %e, "failed to save session");
    }

    let page = result.context("failed to fetch from QingFlow")?;
    let Some(record) = page.records.first() else {
        info!(total = page.total, "source returned no records");
        return Ok(());
    };

    let fields = transform.apply(record);
    let pretty = serde_json::to_string_pretty(&fields).context("failed to format record")?;
    println!("{}", pretty);

    Ok(())
}
