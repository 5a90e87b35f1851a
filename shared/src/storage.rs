use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::errors::{Result, ServiceError};

const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(2);
const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 3;

/// How the engines talk to a store: every call is bounded by `op_timeout`,
/// and a call that reports `ConcurrentUpdateConflict` is re-issued at most
/// `max_conflict_retries` times before the conflict is surfaced as
/// `StorageUnavailable`.
#[derive(Debug, Clone, Copy)]
pub struct StoragePolicy {
    op_timeout: Duration,
    max_conflict_retries: u32,
}

impl StoragePolicy {
    pub fn new(op_timeout: Duration, max_conflict_retries: u32) -> Self {
        Self {
            op_timeout,
            max_conflict_retries,
        }
    }

    pub async fn run<T, F, Fut>(&self, op: &'static str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut conflicts = 0u32;

        loop {
            match tokio::time::timeout(self.op_timeout, call()).await {
                Err(_) => {
                    warn!(op = op, timeout_ms = self.op_timeout.as_millis() as u64, "Storage call timed out");
                    return Err(ServiceError::StorageUnavailable(format!(
                        "{} timed out after {}ms",
                        op,
                        self.op_timeout.as_millis()
                    )));
                }
                Ok(Err(ServiceError::ConcurrentUpdateConflict(msg))) => {
                    conflicts += 1;
                    if conflicts > self.max_conflict_retries {
                        warn!(op = op, attempts = conflicts, "Giving up after repeated conflicts");
                        return Err(ServiceError::StorageUnavailable(format!(
                            "{} conflicted {} times: {}",
                            op, conflicts, msg
                        )));
                    }
                    debug!(op = op, attempt = conflicts, "Retrying after concurrent update conflict");
                }
                Ok(result) => return result,
            }
        }
    }
}

impl Default for StoragePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_OP_TIMEOUT, DEFAULT_MAX_CONFLICT_RETRIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_passes_through_success() {
        let policy = StoragePolicy::default();
        let value = policy.run("noop", || async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_timeout_is_storage_unavailable() {
        let policy = StoragePolicy::new(Duration::from_millis(20), 0);
        let result: Result<()> = policy
            .run("stalled", || async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(ServiceError::StorageUnavailable(_))));
    }

    #[tokio::test]
    async fn test_retries_conflicts_then_succeeds() {
        let policy = StoragePolicy::new(Duration::from_secs(1), 3);
        let calls = AtomicU32::new(0);
        let calls = &calls;

        let value = policy
            .run("flaky", || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(ServiceError::ConcurrentUpdateConflict("busy".to_string()))
                } else {
                    Ok("done")
                }
            })
            .await
            .unwrap();

        assert_eq!(value, "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_conflicts_surface_as_unavailable() {
        let policy = StoragePolicy::new(Duration::from_secs(1), 2);
        let calls = AtomicU32::new(0);
        let calls = &calls;

        let result: Result<()> = policy
            .run("always_conflicting", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ServiceError::ConcurrentUpdateConflict("busy".to_string()))
            })
            .await;

        assert!(matches!(result, Err(ServiceError::StorageUnavailable(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let policy = StoragePolicy::default();
        let calls = AtomicU32::new(0);
        let calls = &calls;

        let result: Result<()> = policy
            .run("invalid", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ServiceError::InvalidArgument("bad".to_string()))
            })
            .await;

        assert!(matches!(result, Err(ServiceError::InvalidArgument(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
