//! Storage contract for leaderboard entries.
//!
//! - [`LeaderboardRepository`] - PostgreSQL implementation
//! - [`MemoryLeaderboardRepository`] - in-process implementation

pub mod leaderboard_repository;
pub mod memory_leaderboard_repo;

pub use leaderboard_repository::LeaderboardRepository;
pub use memory_leaderboard_repo::MemoryLeaderboardRepository;

use async_trait::async_trait;
use shared::{LeaderboardEntry, Result, Username};

/// One rank assignment produced by a recomputation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankAssignment {
    pub username: Username,
    pub rank: i64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RankingStore: Send + Sync {
    /// Absolute upsert of the player's score in a single atomic operation.
    /// An existing entry keeps its id, rank and creation time; a new one
    /// starts unranked.
    async fn upsert_score(&self, username: &Username, total_clicks: i64) -> Result<LeaderboardEntry>;

    async fn find_by_username(&self, username: &Username) -> Result<Option<LeaderboardEntry>>;

    /// Returns whether an entry was removed. Missing entries are not an error.
    async fn delete(&self, username: &Username) -> Result<bool>;

    async fn scan_all(&self) -> Result<Vec<LeaderboardEntry>>;

    /// Persists rank values. Usernames that no longer exist are skipped.
    /// Returns the number of rows whose rank changed.
    async fn write_ranks(&self, assignments: &[RankAssignment]) -> Result<u64>;
}
