use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use shared::{LeaderboardEntry, Result, ServiceError, Username};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{RankAssignment, RankingStore};

#[derive(Default)]
struct Table {
    entries: HashMap<Username, LeaderboardEntry>,
    last_created_at: Option<DateTime<Utc>>,
}

impl Table {
    /// Creation timestamps handed out by this table are strictly increasing,
    /// so creation order always survives in the persisted data.
    fn next_created_at(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let created_at = match self.last_created_at {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created_at = Some(created_at);
        created_at
    }
}

#[derive(Clone, Default)]
pub struct MemoryLeaderboardRepository {
    table: Arc<RwLock<Table>>,
}

impl MemoryLeaderboardRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> ServiceError {
    ServiceError::Internal(format!("Lock error: {}", e))
}

#[async_trait]
impl RankingStore for MemoryLeaderboardRepository {
    async fn upsert_score(&self, username: &Username, total_clicks: i64) -> Result<LeaderboardEntry> {
        let mut table = self.table.write().map_err(lock_error)?;

        let existing = table.entries.get(username).cloned();
        let next = match existing {
            Some(current) => current.with_score(total_clicks, Utc::now())?,
            None => {
                let created_at = table.next_created_at();
                LeaderboardEntry::first(username.clone(), total_clicks, created_at)?
            }
        };

        table.entries.insert(username.clone(), next.clone());
        Ok(next)
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<LeaderboardEntry>> {
        let table = self.table.read().map_err(lock_error)?;
        Ok(table.entries.get(username).cloned())
    }

    async fn delete(&self, username: &Username) -> Result<bool> {
        let mut table = self.table.write().map_err(lock_error)?;
        Ok(table.entries.remove(username).is_some())
    }

    async fn scan_all(&self) -> Result<Vec<LeaderboardEntry>> {
        let table = self.table.read().map_err(lock_error)?;
        Ok(table.entries.values().cloned().collect())
    }

    async fn write_ranks(&self, assignments: &[RankAssignment]) -> Result<u64> {
        let mut table = self.table.write().map_err(lock_error)?;
        let mut changed = 0;

        for assignment in assignments {
            if let Some(entry) = table.entries.get_mut(&assignment.username) {
                if entry.rank() != assignment.rank {
                    *entry = entry.with_rank(assignment.rank);
                    changed += 1;
                }
            }
        }

        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Username {
        Username::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_creates_unranked_then_overwrites() {
        let repo = MemoryLeaderboardRepository::new();

        let created = repo.upsert_score(&name("alice"), 10).await.unwrap();
        assert_eq!(created.rank(), 0);
        assert_eq!(created.total_clicks(), 10);

        let updated = repo.upsert_score(&name("alice"), 7).await.unwrap();
        assert_eq!(updated.total_clicks(), 7);
        assert_eq!(updated.id(), created.id());
        assert_eq!(updated.created_at(), created.created_at());
    }

    #[tokio::test]
    async fn test_creation_times_strictly_increase() {
        let repo = MemoryLeaderboardRepository::new();

        let mut previous = None;
        for i in 0..50 {
            let entry = repo.upsert_score(&name(&format!("p{}", i)), 1).await.unwrap();
            if let Some(prev) = previous {
                assert!(entry.created_at() > prev);
            }
            previous = Some(entry.created_at());
        }
    }

    #[tokio::test]
    async fn test_write_ranks_skips_missing_rows() {
        let repo = MemoryLeaderboardRepository::new();
        repo.upsert_score(&name("alice"), 10).await.unwrap();

        let changed = repo
            .write_ranks(&[
                RankAssignment { username: name("alice"), rank: 1 },
                RankAssignment { username: name("ghost"), rank: 2 },
            ])
            .await
            .unwrap();

        assert_eq!(changed, 1);
        assert_eq!(repo.scan_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let repo = MemoryLeaderboardRepository::new();
        repo.upsert_score(&name("alice"), 10).await.unwrap();

        assert!(repo.delete(&name("alice")).await.unwrap());
        assert!(!repo.delete(&name("alice")).await.unwrap());
        assert!(repo.find_by_username(&name("alice")).await.unwrap().is_none());
    }
}
