use async_trait::async_trait;
use chrono::Utc;
use shared::{Result, ServiceError, SessionId, SessionScore};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::ClickStore;

/// Click store kept in process memory.
///
/// Every keyed read-modify-write happens under one write lock, so concurrent
/// increments on the same session never lose an update.
#[derive(Clone, Default)]
pub struct MemoryClickRepository {
    sessions: Arc<RwLock<HashMap<SessionId, SessionScore>>>,
}

impl MemoryClickRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> ServiceError {
    ServiceError::Internal(format!("Lock error: {}", e))
}

#[async_trait]
impl ClickStore for MemoryClickRepository {
    async fn increment(&self, session_id: &SessionId, delta: i64) -> Result<SessionScore> {
        let mut sessions = self.sessions.write().map_err(lock_error)?;
        let now = Utc::now();

        let next = match sessions.get(session_id) {
            Some(current) => current.incremented(delta, now)?,
            None => SessionScore::first(session_id.clone(), delta, now)?,
        };

        sessions.insert(session_id.clone(), next.clone());
        Ok(next)
    }

    async fn find_by_session(&self, session_id: &SessionId) -> Result<Option<SessionScore>> {
        let sessions = self.sessions.read().map_err(lock_error)?;
        Ok(sessions.get(session_id).cloned())
    }

    async fn set_count(&self, session_id: &SessionId, count: i64) -> Result<SessionScore> {
        let mut sessions = self.sessions.write().map_err(lock_error)?;
        let now = Utc::now();

        let next = match sessions.get(session_id) {
            Some(current) => current.with_count(count, now)?,
            None => SessionScore::first(session_id.clone(), count, now)?,
        };

        sessions.insert(session_id.clone(), next.clone());
        Ok(next)
    }

    async fn scan_all(&self) -> Result<Vec<SessionScore>> {
        let sessions = self.sessions.read().map_err(lock_error)?;
        let mut all: Vec<SessionScore> = sessions.values().cloned().collect();
        all.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.session_id().cmp(b.session_id()))
        });
        Ok(all)
    }

    async fn sum_counts(&self) -> Result<i64> {
        let sessions = self.sessions.read().map_err(lock_error)?;
        sessions
            .values()
            .try_fold(0i64, |total, score| total.checked_add(score.count()))
            .ok_or_else(|| ServiceError::Internal("total click count overflows i64".to_string()))
    }
}
