use shared::{LeaderboardEntry, Result, ServiceError, StoragePolicy, Username};
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::assign_dense_ranks;
use crate::repository::{RankAssignment, RankingStore};

/// Maintains the ranked leaderboard on top of a [`RankingStore`].
///
/// `upsert_player` and `remove_player` only touch the score; ranks become
/// authoritative again after the next `recompute_ranks`. Every recomputation
/// reads the full table and sorts it, O(N log N) per call.
#[derive(Clone)]
pub struct RankingEngine {
    store: Arc<dyn RankingStore>,
    policy: StoragePolicy,
}

impl RankingEngine {
    pub fn new(store: Arc<dyn RankingStore>, policy: StoragePolicy) -> Self {
        Self { store, policy }
    }

    /// Absolute overwrite of the player's score. The returned rank is
    /// provisional (0 for a new player).
    #[tracing::instrument(skip(self))]
    pub async fn upsert_player(&self, username: &str, total_clicks: i64) -> Result<LeaderboardEntry> {
        let username = Username::new(username)?;
        if total_clicks < 0 {
            return Err(ServiceError::InvalidArgument(format!(
                "total_clicks must be >= 0, got {}",
                total_clicks
            )));
        }
        let key = &username;

        let entry = self
            .policy
            .run("leaderboard.upsert_score", || async move {
                self.store.upsert_score(key, total_clicks).await
            })
            .await?;

        shared::record_counter("leaderboard_service.score.submitted", 1);
        debug!(rank = entry.rank(), "Player score stored");

        Ok(entry)
    }

    /// Deletes the player if present; absent players are not an error.
    #[tracing::instrument(skip(self))]
    pub async fn remove_player(&self, username: &str) -> Result<bool> {
        let username = Username::new(username)?;
        let key = &username;

        let removed = self
            .policy
            .run("leaderboard.delete", || async move { self.store.delete(key).await })
            .await?;

        if removed {
            shared::record_counter("leaderboard_service.player.removed", 1);
            info!("Player removed from leaderboard");
        } else {
            debug!("Player was not on the leaderboard");
        }

        Ok(removed)
    }

    /// Reads every entry, assigns dense ranks 1..=N and persists them.
    /// Returns the entries in rank order.
    pub async fn recompute_ranks(&self) -> Result<Vec<LeaderboardEntry>> {
        let start = std::time::Instant::now();

        let ranked = self
            .policy
            .run("leaderboard.recompute_ranks", || async move {
                let entries = self.store.scan_all().await?;
                let ranked = assign_dense_ranks(entries);

                let assignments: Vec<RankAssignment> = ranked
                    .iter()
                    .map(|entry| RankAssignment {
                        username: entry.username().clone(),
                        rank: entry.rank(),
                    })
                    .collect();

                let changed = self.store.write_ranks(&assignments).await?;
                debug!(players = ranked.len(), changed = changed, "Ranks recomputed");

                Ok(ranked)
            })
            .await?;

        shared::record_timing(
            "leaderboard_service.recompute.duration",
            start.elapsed().as_secs_f64(),
        );
        shared::record_gauge("leaderboard_service.players", ranked.len() as f64);

        Ok(ranked)
    }

    /// Top `limit` players. Ranks are recomputed and persisted first, so the
    /// 1-based position of each returned entry equals its stored rank.
    pub async fn get_top_players(&self, limit: i64) -> Result<Vec<LeaderboardEntry>> {
        if limit <= 0 {
            return Err(ServiceError::InvalidArgument(format!(
                "limit must be > 0, got {}",
                limit
            )));
        }

        let mut ranked = self.recompute_ranks().await?;
        ranked.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(ranked)
    }

    /// Upsert followed by a recomputation; the returned entry carries its
    /// fresh rank. If the player was removed concurrently between the two
    /// steps the provisional entry is returned.
    pub async fn submit_score(&self, username: &str, total_clicks: i64) -> Result<LeaderboardEntry> {
        let stored = self.upsert_player(username, total_clicks).await?;
        let ranked = self.recompute_ranks().await?;

        Ok(ranked
            .into_iter()
            .find(|entry| entry.username() == stored.username())
            .unwrap_or(stored))
    }

    pub async fn find_player(&self, username: &str) -> Result<Option<LeaderboardEntry>> {
        let username = Username::new(username)?;
        let key = &username;

        self.policy
            .run("leaderboard.find_by_username", || async move {
                self.store.find_by_username(key).await
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockRankingStore;
    use chrono::Utc;
    use std::time::Duration;

    fn engine(store: MockRankingStore) -> RankingEngine {
        RankingEngine::new(Arc::new(store), StoragePolicy::new(Duration::from_secs(1), 1))
    }

    fn entry(name: &str, clicks: i64) -> LeaderboardEntry {
        LeaderboardEntry::first(Username::new(name).unwrap(), clicks, Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_input_rejected_before_storage() {
        let mut store = MockRankingStore::new();
        store.expect_upsert_score().times(0);
        store.expect_delete().times(0);

        let engine = engine(store);

        assert!(matches!(
            engine.upsert_player("", 10).await,
            Err(ServiceError::InvalidArgument(_))
        ));
        assert!(matches!(
            engine.upsert_player("alice", -1).await,
            Err(ServiceError::InvalidArgument(_))
        ));
        assert!(matches!(
            engine.remove_player("").await,
            Err(ServiceError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_zero_limit_rejected() {
        let mut store = MockRankingStore::new();
        store.expect_scan_all().times(0);

        let engine = engine(store);
        assert!(matches!(
            engine.get_top_players(0).await,
            Err(ServiceError::InvalidArgument(_))
        ));
        assert!(matches!(
            engine.get_top_players(-5).await,
            Err(ServiceError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_recompute_writes_every_rank() {
        let mut store = MockRankingStore::new();
        store
            .expect_scan_all()
            .times(1)
            .returning(|| Ok(vec![entry("bob", 5), entry("alice", 9)]));
        store
            .expect_write_ranks()
            .withf(|assignments| {
                assignments.len() == 2
                    && assignments[0].username.as_str() == "alice"
                    && assignments[0].rank == 1
                    && assignments[1].username.as_str() == "bob"
                    && assignments[1].rank == 2
            })
            .times(1)
            .returning(|assignments| Ok(assignments.len() as u64));

        let ranked = engine(store).recompute_ranks().await.unwrap();
        assert_eq!(ranked.len(), 2);
    }

    #[tokio::test]
    async fn test_write_failure_is_propagated() {
        let mut store = MockRankingStore::new();
        store
            .expect_scan_all()
            .returning(|| Ok(vec![entry("alice", 1)]));
        store
            .expect_write_ranks()
            .returning(|_| Err(ServiceError::StorageUnavailable("connection reset".to_string())));

        let result = engine(store).recompute_ranks().await;
        assert!(matches!(result, Err(ServiceError::StorageUnavailable(_))));
    }

    #[tokio::test]
    async fn test_conflicting_recompute_is_retried_from_scan() {
        let mut store = MockRankingStore::new();
        store
            .expect_scan_all()
            .times(2)
            .returning(|| Ok(vec![entry("alice", 1)]));

        let mut attempts = 0;
        store.expect_write_ranks().times(2).returning(move |_| {
            attempts += 1;
            if attempts == 1 {
                Err(ServiceError::ConcurrentUpdateConflict("deadlock detected".to_string()))
            } else {
                Ok(1)
            }
        });

        let ranked = engine(store).recompute_ranks().await.unwrap();
        assert_eq!(ranked[0].rank(), 1);
    }
}
