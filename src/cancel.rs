//! Cooperative cancellation for multi-phase file operations.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::WapiError;

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone)]
pub struct CancelToken {
    flag: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (flag, _) = watch::channel(false);
        Self {
            flag: Arc::new(flag),
        }
    }

    pub fn cancel(&self) {
        self.flag.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.flag.borrow()
    }

    /// Resolves once [`CancelToken::cancel`] has been called on any clone.
    pub async fn cancelled(&self) {
        let mut rx = self.flag.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Race `fut` against cancellation.
    pub async fn guard<T, F>(&self, fut: F) -> Result<T, WapiError>
    where
        F: Future<Output = Result<T, WapiError>>,
    {
        if self.is_cancelled() {
            return Err(WapiError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(WapiError::Cancelled),
            result = fut => result,
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_guard_passes_result_through() {
        let token = CancelToken::new();
        let value = token.guard(async { Ok::<_, WapiError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_guard_aborts_pending_future() {
        let token = CancelToken::new();
        let remote = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            remote.cancel();
        });
        let result = token
            .guard(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, WapiError>(())
            })
            .await;
        assert!(matches!(result, Err(WapiError::Cancelled)));
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_already_cancelled_short_circuits() {
        let token = CancelToken::new();
        token.cancel();
        let result = token.guard(async { Ok::<_, WapiError>(()) }).await;
        assert!(matches!(result, Err(WapiError::Cancelled)));
    }
}
