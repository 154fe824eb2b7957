//! formsync - Connectors
//!
//! The sync engine that mirrors QingFlow form submissions into a Lark
//! Bitable table, plus the HTTP bindings to both services.
//!
//! # Components
//!
//! - **QingFlow** ([`QingFlowClient`]) - paginated reads of a form view
//! - **Bitable** ([`BitableSink`]) - upsert by business identifier
//! - **Rate limiting** ([`RateLimits`]) - one token bucket per remote operation
//! - **Orchestrator** ([`SyncOrchestrator`]) - one fetch-and-write cycle
//! - **Scheduler** ([`Scheduler`]) - runs cycles on a fixed interval
//!
//! # Design Principles
//!
//! - **No retries**: a failed page or record is logged and picked up next cycle
//! - **Failure isolation**: only a failed first page aborts a cycle
//! - **Bounded cycles**: every wait and request observes the cycle token
//! - **Trait seams**: the orchestrator only sees [`RecordSource`] and [`RecordSink`]
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use formsync_connectors::{BitableSink, QingFlowClient, RateLimits, Scheduler, SyncOrchestrator};
//!
//! let limits = Arc::new(RateLimits::from_config(&config.rate_limits));
//! let source = Arc::new(QingFlowClient::new(&config.source, &config.session_file, Arc::clone(&limits))?);
//! let sink = Arc::new(BitableSink::from_config(&config.sink, limits)?);
//!
//! let orchestrator = Arc::new(SyncOrchestrator::new(source, sink, config.page_size));
//! Scheduler::new(orchestrator, config.interval).run(shutdown).await;
//! ```

pub mod bitable;
mod cancel;
mod error;
mod http;
pub mod orchestrator;
pub mod qingflow;
pub mod ratelimit;
mod record;
pub mod scheduler;
mod traits;

#[cfg(test)]
mod test_server;

// Re-exports
pub use bitable::{BitableClient, BitableSink, FieldTransform};
pub use error::ConnectorError;
pub use orchestrator::{CycleReport, SyncOrchestrator, TaskOutcome};
pub use qingflow::QingFlowClient;
pub use ratelimit::{OperationClass, RateLimits, TokenBucket};
pub use record::{Page, Record};
pub use scheduler::Scheduler;
pub use traits::{Fields, RecordSink, RecordSource, TableStore, UpsertOutcome};
