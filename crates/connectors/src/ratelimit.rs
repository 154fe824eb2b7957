//! Outbound rate limiting
//!
//! Token bucket per remote operation class. Each bucket is its own exclusion
//! domain, so a burst of creates never delays an existence check.
//!
//! Callers reserve a token under the bucket lock and then sleep outside it
//! until their slot comes up. Order among concurrent waiters is not FIFO; the
//! only guarantee is that a bucket never grants more than
//! `burst + rate * elapsed` tokens.
//!
//! # Usage
//!
//! ```ignore
//! use formsync_connectors::ratelimit::{OperationClass, RateLimits};
//!
//! let limits = RateLimits::from_config(&config.rate_limits);
//! limits.acquire(OperationClass::ExistsCheck, &cancel).await?;
//! ```

use std::time::Duration;

use formsync_config::RateLimitsConfig;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::error::ConnectorError;

/// Remote operation classes with independent budgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationClass {
    /// Source page fetch
    PageFetch,
    /// Sink search-by-identifier
    ExistsCheck,
    /// Sink record creation
    Create,
    /// Sink record update
    Update,
}

impl OperationClass {
    /// Name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PageFetch => "page_fetch",
            Self::ExistsCheck => "exists_check",
            Self::Create => "create",
            Self::Update => "update",
        }
    }
}

/// Mutable budget of a single bucket
#[derive(Debug)]
struct BucketState {
    /// Available tokens; negative while callers hold reservations
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket gate with a fixed refill rate
#[derive(Debug)]
pub struct TokenBucket {
    class: OperationClass,
    rate_per_sec: f64,
    burst: f64,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    /// Create a full bucket
    pub fn new(class: OperationClass, rate_per_sec: f64, burst: u32) -> Self {
        let burst = f64::from(burst.max(1));
        Self {
            class,
            rate_per_sec,
            burst,
            state: Mutex::new(BucketState {
                tokens: burst,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Wait for a token
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::Cancelled` as soon as `cancel` fires; the
    /// reserved token is handed back to the bucket.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<(), ConnectorError> {
        if cancel.is_cancelled() {
            return Err(ConnectorError::Cancelled);
        }

        let ready_at = self.reserve().await;
        if ready_at <= Instant::now() {
            return Ok(());
        }

        tokio::select! {
            _ = tokio::time::sleep_until(ready_at) => Ok(()),
            _ = cancel.cancelled() => {
                self.restore().await;
                Err(ConnectorError::Cancelled)
            }
        }
    }

    /// Take one token, returning the instant it becomes usable
    async fn reserve(&self) -> Instant {
        let mut state = self.state.lock().await;
        let now = Instant::now();

        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.rate_per_sec).min(self.burst);
        state.last_refill = now;
        state.tokens -= 1.0;

        if state.tokens >= 0.0 {
            now
        } else {
            let wait = Duration::from_secs_f64(-state.tokens / self.rate_per_sec);
            trace!(
                class = self.class.as_str(),
                wait_ms = wait.as_millis() as u64,
                "rate limited, waiting for token"
            );
            now + wait
        }
    }

    /// Give back a reservation that was never used
    async fn restore(&self) {
        let mut state = self.state.lock().await;
        state.tokens = (state.tokens + 1.0).min(self.burst);
    }
}

/// One bucket per operation class, shared by every client of a process
#[derive(Debug)]
pub struct RateLimits {
    page_fetch: TokenBucket,
    exists_check: TokenBucket,
    create: TokenBucket,
    update: TokenBucket,
}

impl RateLimits {
    /// Build buckets from configured ceilings
    pub fn from_config(config: &RateLimitsConfig) -> Self {
        Self {
            page_fetch: TokenBucket::new(OperationClass::PageFetch, config.page_fetch, config.burst),
            exists_check: TokenBucket::new(
                OperationClass::ExistsCheck,
                config.exists_check,
                config.burst,
            ),
            create: TokenBucket::new(OperationClass::Create, config.create, config.burst),
            update: TokenBucket::new(OperationClass::Update, config.update, config.burst),
        }
    }

    /// Bucket for an operation class
    pub fn bucket(&self, class: OperationClass) -> &TokenBucket {
        match class {
            OperationClass::PageFetch => &self.page_fetch,
            OperationClass::ExistsCheck => &self.exists_check,
            OperationClass::Create => &self.create,
            OperationClass::Update => &self.update,
        }
    }

    /// Wait for a token of the given class
    pub async fn acquire(
        &self,
        class: OperationClass,
        cancel: &CancellationToken,
    ) -> Result<(), ConnectorError> {
        self.bucket(class).acquire(cancel).await
    }
}

impl Default for RateLimits {
    fn default() -> Self {
        Self::from_config(&RateLimitsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_first_token_is_immediate() {
        let bucket = TokenBucket::new(OperationClass::ExistsCheck, 1.0, 1);
        let cancel = CancellationToken::new();

        let start = Instant::now();
        bucket.acquire(&cancel).await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exists_checks_respect_ceiling() {
        let limits = RateLimits::default();
        let cancel = CancellationToken::new();

        let start = Instant::now();
        for _ in 0..100 {
            limits
                .acquire(OperationClass::ExistsCheck, &cancel)
                .await
                .unwrap();
        }

        // 1 free token, then 99 more at 15/s
        assert!(start.elapsed() >= Duration::from_millis(6_600));
        assert!(start.elapsed() < Duration::from_millis(6_800));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_budget() {
        let bucket = Arc::new(TokenBucket::new(OperationClass::Create, 10.0, 1));
        let cancel = CancellationToken::new();

        let start = Instant::now();
        let mut handles = Vec::new();
        for _ in 0..20 {
            let bucket = Arc::clone(&bucket);
            let cancel = cancel.clone();
            handles.push(tokio::spawn(async move { bucket.acquire(&cancel).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert!(start.elapsed() >= Duration::from_millis(1_900));
    }

    #[tokio::test(start_paused = true)]
    async fn test_classes_are_independent() {
        let limits = RateLimits::default();
        let cancel = CancellationToken::new();

        // Drain the page-fetch bucket (1/s)
        limits
            .acquire(OperationClass::PageFetch, &cancel)
            .await
            .unwrap();

        let start = Instant::now();
        limits.acquire(OperationClass::Create, &cancel).await.unwrap();
        limits.acquire(OperationClass::Update, &cancel).await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_unblocks_waiters() {
        let bucket = Arc::new(TokenBucket::new(OperationClass::ExistsCheck, 1.0, 1));
        let cancel = CancellationToken::new();
        bucket.acquire(&cancel).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..5 {
            let bucket = Arc::clone(&bucket);
            let cancel = cancel.clone();
            handles.push(tokio::spawn(async move { bucket.acquire(&cancel).await }));
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
        let cancelled_at = Instant::now();
        cancel.cancel();

        for handle in handles {
            let result = handle.await.unwrap();
            assert!(matches!(result, Err(ConnectorError::Cancelled)));
        }
        assert!(cancelled_at.elapsed() < Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_token_fails_fast() {
        let bucket = TokenBucket::new(OperationClass::ExistsCheck, 1.0, 1);
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert!(matches!(
            bucket.acquire(&cancel).await,
            Err(ConnectorError::Cancelled)
        ));
    }

    #[test]
    fn test_class_names() {
        assert_eq!(OperationClass::PageFetch.as_str(), "page_fetch");
        assert_eq!(OperationClass::ExistsCheck.as_str(), "exists_check");
        assert_eq!(OperationClass::Create.as_str(), "create");
        assert_eq!(OperationClass::Update.as_str(), "update");
    }
}
