//! Cycle-scoped cancellation for outbound calls

use crate::error::ConnectorError;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Run `fut` unless `cancel` fires first, in which case the future is dropped
/// and `ConnectorError::Cancelled` is returned.
pub(crate) async fn with_cancel<F, T>(cancel: &CancellationToken, fut: F) -> Result<T, ConnectorError>
where
    F: Future<Output = Result<T, ConnectorError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ConnectorError::Cancelled),
        result = fut => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_completes_when_not_cancelled() {
        let cancel = CancellationToken::new();
        let result = with_cancel(&cancel, async { Ok::<_, ConnectorError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_pending_future() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let result = with_cancel(&cancel, async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok::<_, ConnectorError>(())
        })
        .await;

        assert!(matches!(result, Err(ConnectorError::Cancelled)));
    }
}
