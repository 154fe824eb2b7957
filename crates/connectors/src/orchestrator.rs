//! One sync cycle: fetch every page, upsert every record
//!
//! Page 1 decides the page count. Pages `2..=page_count` are fetched
//! concurrently and every record is upserted in its own task as soon as its
//! page arrives. Failures stay local to the page or record that hit them;
//! only a failed page 1 aborts the cycle.
//!
//! The cycle cancellation token reaches every rate limiter wait and every
//! in-flight request, so a cycle that runs past its deadline drains quickly
//! with `Cancelled` outcomes instead of hanging.

use std::fmt;
use std::sync::Arc;

use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::ConnectorError;
use crate::record::Page;
use crate::traits::{RecordSink, RecordSource, UpsertOutcome};

/// Cycle progress, logged on every transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleState {
    Idle,
    FetchingFirstPage,
    FanningOutPages,
    FanningOutWrites,
    Draining,
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::FetchingFirstPage => "fetching_first_page",
            Self::FanningOutPages => "fanning_out_pages",
            Self::FanningOutWrites => "fanning_out_writes",
            Self::Draining => "draining",
        };
        f.write_str(name)
    }
}

/// Result of one page or upsert task
#[derive(Debug)]
pub enum TaskOutcome {
    PageFetched(Page),
    PageFailed {
        page_num: u32,
        error: ConnectorError,
    },
    Upserted {
        page_num: u32,
        outcome: UpsertOutcome,
    },
    UpsertFailed {
        page_num: u32,
        error: ConnectorError,
    },
}

/// Counters for one cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Page 1 failed and nothing was written
    pub aborted: bool,
    pub page_count: u32,
    pub pages_fetched: u32,
    pub pages_failed: u32,
    pub created: u64,
    pub updated: u64,
    /// Records without a business identifier
    pub skipped: u64,
    pub failed: u64,
    /// Records whose upsert was cut off by the cycle deadline
    pub cancelled: u64,
}

impl CycleReport {
    fn aborted() -> Self {
        Self {
            aborted: true,
            pages_failed: 1,
            ..Default::default()
        }
    }

    /// Fold one task result into the counters
    pub fn record(&mut self, outcome: &TaskOutcome) {
        match outcome {
            TaskOutcome::PageFetched(_) => self.pages_fetched += 1,
            TaskOutcome::PageFailed { .. } => self.pages_failed += 1,
            TaskOutcome::Upserted { outcome, .. } => match outcome {
                UpsertOutcome::Created(_) => self.created += 1,
                UpsertOutcome::Updated(_) => self.updated += 1,
                UpsertOutcome::Skipped => self.skipped += 1,
            },
            TaskOutcome::UpsertFailed { error, .. } if error.is_cancelled() => self.cancelled += 1,
            TaskOutcome::UpsertFailed { .. } => self.failed += 1,
        }
    }

    /// Records that reached the sink successfully
    pub fn written(&self) -> u64 {
        self.created + self.updated
    }
}

/// Drives sync cycles from a source into a sink
pub struct SyncOrchestrator<S, K> {
    source: Arc<S>,
    sink: Arc<K>,
    page_size: u32,
}

impl<S, K> SyncOrchestrator<S, K>
where
    S: RecordSource + 'static,
    K: RecordSink + 'static,
{
    pub fn new(source: Arc<S>, sink: Arc<K>, page_size: u32) -> Self {
        Self {
            source,
            sink,
            page_size: page_size.max(1),
        }
    }

    #[cfg(test)]
    pub(crate) fn source(&self) -> &Arc<S> {
        &self.source
    }

    #[cfg(test)]
    pub(crate) fn sink(&self) -> &Arc<K> {
        &self.sink
    }

    /// Run one cycle to completion or until `cancel` drains it
    pub async fn run_cycle(&self, cancel: &CancellationToken) -> CycleReport {
        let mut state = CycleState::Idle;
        transition(&mut state, CycleState::FetchingFirstPage);

        let first = match self.source.fetch_page(1, self.page_size, cancel).await {
            Ok(page) => page,
            Err(e) => {
                error!(page = 1, error = %e, "failed to fetch first page, aborting cycle");
                transition(&mut state, CycleState::Idle);
                return CycleReport::aborted();
            }
        };

        let total = first.total;
        let page_count = Page::page_count(total, self.page_size);
        info!(total, page_count, page_size = self.page_size, "starting sync");

        let mut report = CycleReport {
            page_count,
            ..Default::default()
        };
        let mut pages: JoinSet<TaskOutcome> = JoinSet::new();
        let mut writes: JoinSet<TaskOutcome> = JoinSet::new();

        transition(&mut state, CycleState::FanningOutPages);
        for page_num in 2..=page_count {
            let source = Arc::clone(&self.source);
            let cancel = cancel.clone();
            let page_size = self.page_size;
            pages.spawn(async move {
                match source.fetch_page(page_num, page_size, &cancel).await {
                    Ok(page) => TaskOutcome::PageFetched(page),
                    Err(error) => TaskOutcome::PageFailed { page_num, error },
                }
            });
        }

        transition(&mut state, CycleState::FanningOutWrites);
        let first = TaskOutcome::PageFetched(first);
        report.record(&first);
        if let TaskOutcome::PageFetched(page) = first {
            self.spawn_writes(&mut writes, page, cancel);
        }

        transition(&mut state, CycleState::Draining);
        let mut deadline_logged = false;
        loop {
            tokio::select! {
                Some(joined) = pages.join_next(), if !pages.is_empty() => {
                    let outcome = match joined {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            log_panic("page fetch", &e);
                            report.pages_failed += 1;
                            continue;
                        }
                    };
                    report.record(&outcome);
                    match outcome {
                        TaskOutcome::PageFetched(page) => {
                            if page.total != total {
                                debug!(
                                    page = page.page_num,
                                    total = page.total,
                                    first_total = total,
                                    "source total changed during cycle, keeping first page count"
                                );
                            }
                            self.spawn_writes(&mut writes, page, cancel);
                        }
                        TaskOutcome::PageFailed { page_num, error } => {
                            warn!(page = page_num, error = %error, "failed to fetch page");
                        }
                        _ => {}
                    }
                }
                Some(joined) = writes.join_next(), if !writes.is_empty() => {
                    match joined {
                        Ok(outcome) => {
                            if let TaskOutcome::UpsertFailed { page_num, error } = &outcome {
                                if error.is_cancelled() {
                                    debug!(page = page_num, "upsert cancelled");
                                } else {
                                    warn!(page = page_num, error = %error, "failed to upsert record");
                                }
                            }
                            report.record(&outcome);
                        }
                        Err(e) => {
                            log_panic("upsert", &e);
                            report.failed += 1;
                        }
                    }
                }
                _ = cancel.cancelled(), if !deadline_logged && !(pages.is_empty() && writes.is_empty()) => {
                    deadline_logged = true;
                    warn!(
                        pending_pages = pages.len(),
                        pending_writes = writes.len(),
                        "cycle cancelled, draining outstanding tasks"
                    );
                }
                else => break,
            }
        }

        transition(&mut state, CycleState::Idle);
        info!(
            pages_fetched = report.pages_fetched,
            pages_failed = report.pages_failed,
            created = report.created,
            updated = report.updated,
            skipped = report.skipped,
            failed = report.failed,
            cancelled = report.cancelled,
            "sync cycle complete"
        );
        report
    }

    fn spawn_writes(
        &self,
        writes: &mut JoinSet<TaskOutcome>,
        page: Page,
        cancel: &CancellationToken,
    ) {
        let page_num = page.page_num;
        debug!(page = page_num, records = page.records.len(), "spawning upserts");

        for record in page.records {
            let sink = Arc::clone(&self.sink);
            let cancel = cancel.clone();
            writes.spawn(async move {
                match sink.upsert(record, &cancel).await {
                    Ok(outcome) => TaskOutcome::Upserted { page_num, outcome },
                    Err(error) => TaskOutcome::UpsertFailed { page_num, error },
                }
            });
        }
    }
}

fn transition(state: &mut CycleState, next: CycleState) {
    debug!(from = %state, to = %next, "sync state");
    *state = next;
}

fn log_panic(task: &str, e: &JoinError) {
    error!(task, error = %e, "sync task panicked");
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod orchestrator_test;
