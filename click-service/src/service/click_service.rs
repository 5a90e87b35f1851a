use shared::{Result, SessionId, SessionScore, StoragePolicy};
use std::sync::Arc;

use crate::repository::ClickStore;

/// Owns per-session click counts.
///
/// Holds no state of its own beyond the injected store handle; clones share
/// the same store.
#[derive(Clone)]
pub struct ClickCounter {
    store: Arc<dyn ClickStore>,
    policy: StoragePolicy,
}

impl ClickCounter {
    pub fn new(store: Arc<dyn ClickStore>, policy: StoragePolicy) -> Self {
        Self { store, policy }
    }

    /// Adds exactly one click to the session, creating it with count 1 when
    /// it does not exist yet.
    #[tracing::instrument(skip(self))]
    pub async fn increment_click(&self, session_id: &str) -> Result<SessionScore> {
        let start = std::time::Instant::now();
        let session_id = SessionId::new(session_id)?;
        let key = &session_id;

        let score = self
            .policy
            .run("click.increment", || async move {
                self.store.increment(key, 1).await
            })
            .await?;

        shared::record_counter("click_service.click.recorded", 1);
        shared::record_timing(
            "click_service.click.latency",
            start.elapsed().as_secs_f64(),
        );

        tracing::debug!(count = score.count(), "Click recorded");

        Ok(score)
    }

    pub async fn get_by_session(&self, session_id: &str) -> Result<Option<SessionScore>> {
        let session_id = SessionId::new(session_id)?;
        let key = &session_id;

        self.policy
            .run("click.find_by_session", || async move {
                self.store.find_by_session(key).await
            })
            .await
    }

    /// Sum of all session counts, read from one consistent snapshot.
    pub async fn get_total_clicks(&self) -> Result<i64> {
        self.policy
            .run("click.sum_counts", || async move { self.store.sum_counts().await })
            .await
    }

    pub async fn list_sessions(&self) -> Result<Vec<SessionScore>> {
        self.policy
            .run("click.scan_all", || async move { self.store.scan_all().await })
            .await
    }

    /// Overwrites the session's count with a known absolute value.
    #[tracing::instrument(skip(self))]
    pub async fn set_session_count(&self, session_id: &str, count: i64) -> Result<SessionScore> {
        let session_id = SessionId::new(session_id)?;
        if count < 0 {
            return Err(shared::ServiceError::InvalidArgument(format!(
                "count must be >= 0, got {}",
                count
            )));
        }
        let key = &session_id;

        let score = self
            .policy
            .run("click.set_count", || async move {
                self.store.set_count(key, count).await
            })
            .await?;

        tracing::info!(count = score.count(), "Session count overwritten");

        Ok(score)
    }
}
