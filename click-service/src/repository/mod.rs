//! Storage contract for per-session click counts.
//!
//! - [`ClickRepository`] - PostgreSQL implementation
//! - [`MemoryClickRepository`] - in-process implementation for tests and
//!   database-less runs

pub mod click_repo;
pub mod memory_click_repo;

pub use click_repo::ClickRepository;
pub use memory_click_repo::MemoryClickRepository;

use async_trait::async_trait;
use shared::{Result, SessionId, SessionScore};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickStore: Send + Sync {
    /// Atomically creates the session with `delta` or adds `delta` to it,
    /// returning the stored result.
    async fn increment(&self, session_id: &SessionId, delta: i64) -> Result<SessionScore>;

    async fn find_by_session(&self, session_id: &SessionId) -> Result<Option<SessionScore>>;

    /// Absolute upsert of the session's count.
    async fn set_count(&self, session_id: &SessionId, count: i64) -> Result<SessionScore>;

    async fn scan_all(&self) -> Result<Vec<SessionScore>>;

    async fn sum_counts(&self) -> Result<i64>;
}
