//! Periodic sync scheduler
//!
//! Runs one cycle at startup and then one per interval tick until shutdown.
//! Each cycle runs in its own task so a slow cycle never shifts the timer,
//! and is bounded by an overall timeout that cancels its outstanding work.
//!
//! A tick that finds the previous cycle still running is skipped, so at most
//! one cycle is in flight at any time.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::orchestrator::SyncOrchestrator;
use crate::traits::{RecordSink, RecordSource};

/// Default overall timeout for one cycle
pub const DEFAULT_CYCLE_TIMEOUT: Duration = Duration::from_secs(300); // 5 minutes

/// Clears the running flag when a cycle task ends, even by panic
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Fixed-interval driver for a [`SyncOrchestrator`]
pub struct Scheduler<S, K> {
    orchestrator: Arc<SyncOrchestrator<S, K>>,
    interval: Duration,
    cycle_timeout: Duration,
    /// Whether a cycle is currently running
    running: Arc<AtomicBool>,
}

impl<S, K> Scheduler<S, K>
where
    S: RecordSource + 'static,
    K: RecordSink + 'static,
{
    pub fn new(orchestrator: Arc<SyncOrchestrator<S, K>>, interval: Duration) -> Self {
        Self {
            orchestrator,
            interval,
            cycle_timeout: DEFAULT_CYCLE_TIMEOUT,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Set the overall timeout for a single cycle
    pub fn with_cycle_timeout(mut self, timeout: Duration) -> Self {
        self.cycle_timeout = timeout;
        self
    }

    /// Try to start running (returns false if already running)
    fn try_start(&self) -> bool {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Run cycles until `shutdown` is cancelled
    ///
    /// The in-flight cycle, if any, is cancelled along with `shutdown` and
    /// awaited before this returns.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval = ?self.interval,
            cycle_timeout = ?self.cycle_timeout,
            "starting sync scheduler"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut in_flight: Option<JoinHandle<()>> = None;

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    if !self.try_start() {
                        warn!("skipping scheduled sync - previous cycle still in progress");
                        continue;
                    }
                    in_flight = Some(self.spawn_cycle(&shutdown));
                }
            }
        }

        if let Some(handle) = in_flight {
            if !handle.is_finished() {
                info!("waiting for in-flight sync cycle to drain");
            }
            if let Err(e) = handle.await {
                error!(error = %e, "sync cycle task failed");
            }
        }

        info!("sync scheduler stopped");
    }

    fn spawn_cycle(&self, shutdown: &CancellationToken) -> JoinHandle<()> {
        let guard = RunningGuard(Arc::clone(&self.running));
        let orchestrator = Arc::clone(&self.orchestrator);
        let cycle = shutdown.child_token();
        let timeout = self.cycle_timeout;

        tokio::spawn(async move {
            let _guard = guard;
            let started = Instant::now();
            debug!("sync cycle started");

            let run = orchestrator.run_cycle(&cycle);
            tokio::pin!(run);

            let report = tokio::select! {
                report = &mut run => report,
                _ = tokio::time::sleep(timeout) => {
                    error!(
                        timeout_secs = timeout.as_secs(),
                        "sync cycle timed out, cancelling outstanding work"
                    );
                    cycle.cancel();
                    run.await
                }
            };

            debug!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                aborted = report.aborted,
                written = report.written(),
                "sync cycle finished"
            );
        })
    }
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod scheduler_test;
