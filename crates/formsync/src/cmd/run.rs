//! Run command - Periodic sync until SIGINT/SIGTERM

use std::sync::Arc;

use anyhow::{Context, Result};
use formsync_config::Config;
use formsync_connectors::{BitableSink, QingFlowClient, RateLimits, Scheduler, SyncOrchestrator};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Run the sync scheduler
pub async fn run(config: Config) -> Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        interval = ?config.interval,
        cycle_timeout = ?config.cycle_timeout,
        page_size = config.page_size,
        "formsync starting"
    );

    let limits = Arc::new(RateLimits::from_config(&config.rate_limits));
    let source = Arc::new(
        QingFlowClient::new(&config.source, &config.session_file, Arc::clone(&limits))
            .context("failed to create QingFlow client")?,
    );
    let sink = Arc::new(
        BitableSink::from_config(&config.sink, limits).context("failed to create Bitable client")?,
    );

    let orchestrator = Arc::new(SyncOrchestrator::new(
        Arc::clone(&source),
        sink,
        config.page_size,
    ));
    let scheduler =
        Scheduler::new(orchestrator, config.interval).with_cycle_timeout(config.cycle_timeout);

    let shutdown = CancellationToken::new();
    let scheduler_task = tokio::spawn(scheduler.run(shutdown.clone()));

    wait_for_shutdown().await;
    info!("shutdown signal received, stopping scheduler...");
    shutdown.cancel();

    if let Err(e) = scheduler_task.await {
        warn!(error = %e, "scheduler task panicked during shutdown");
    }

    if let Err(e) = source.close() {
        error!(error = %e, "failed to save session");
    }

    info!("formsync shutdown complete");
    Ok(())
}

/// Wait for SIGINT or SIGTERM
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
