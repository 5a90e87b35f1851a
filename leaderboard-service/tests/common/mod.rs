#![allow(dead_code)]

use leaderboard_service::{MemoryLeaderboardRepository, RankingEngine};
use shared::{LeaderboardEntry, StoragePolicy};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub fn test_policy() -> StoragePolicy {
    StoragePolicy::new(Duration::from_secs(2), 3)
}

pub fn create_memory_engine() -> RankingEngine {
    RankingEngine::new(Arc::new(MemoryLeaderboardRepository::new()), test_policy())
}

/// Username -> rank, as persisted.
pub fn ranks_by_name(entries: &[LeaderboardEntry]) -> HashMap<String, i64> {
    entries
        .iter()
        .map(|e| (e.username().as_str().to_string(), e.rank()))
        .collect()
}

pub fn assert_dense(entries: &[LeaderboardEntry]) {
    let mut ranks: Vec<i64> = entries.iter().map(|e| e.rank()).collect();
    ranks.sort_unstable();
    let expected: Vec<i64> = (1..=entries.len() as i64).collect();
    assert_eq!(ranks, expected, "ranks must be exactly 1..=N");
}
