use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{LeaderboardEntry, Result, Username};
use sqlx::PgPool;
use tracing::{debug, error};
use uuid::Uuid;

use super::{RankAssignment, RankingStore};

#[derive(Debug, sqlx::FromRow)]
struct LeaderboardRow {
    id: Uuid,
    username: String,
    total_clicks: i64,
    rank: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LeaderboardRow {
    fn into_entry(self) -> Result<LeaderboardEntry> {
        LeaderboardEntry::new(
            self.id,
            Username::new(self.username)?,
            self.total_clicks,
            self.rank,
            self.created_at,
            self.updated_at,
        )
    }
}

#[derive(Clone)]
pub struct LeaderboardRepository {
    pool: PgPool,
}

impl LeaderboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RankingStore for LeaderboardRepository {
    async fn upsert_score(&self, username: &Username, total_clicks: i64) -> Result<LeaderboardEntry> {
        let row = sqlx::query_as::<_, LeaderboardRow>(
            r#"
            INSERT INTO leaderboard_entries (id, username, total_clicks, rank, created_at, updated_at)
            VALUES ($1, $2, $3, 0, clock_timestamp(), clock_timestamp())
            ON CONFLICT (username) DO UPDATE
            SET total_clicks = EXCLUDED.total_clicks,
                updated_at = clock_timestamp()
            RETURNING id, username, total_clicks, rank, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username.as_str())
        .bind(total_clicks)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!(username = %username, "Failed to upsert player score: {}", e);
            e
        })?;

        debug!(username = %username, total_clicks = total_clicks, "Upserted player score");
        row.into_entry()
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<LeaderboardEntry>> {
        let row = sqlx::query_as::<_, LeaderboardRow>(
            r#"
            SELECT id, username, total_clicks, rank, created_at, updated_at
            FROM leaderboard_entries
            WHERE username = $1
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(LeaderboardRow::into_entry).transpose()
    }

    async fn delete(&self, username: &Username) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM leaderboard_entries
            WHERE username = $1
            "#,
        )
        .bind(username.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(username = %username, "Failed to delete player: {}", e);
            e
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn scan_all(&self) -> Result<Vec<LeaderboardEntry>> {
        let rows = sqlx::query_as::<_, LeaderboardRow>(
            r#"
            SELECT id, username, total_clicks, rank, created_at, updated_at
            FROM leaderboard_entries
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to scan leaderboard: {}", e);
            e
        })?;

        rows.into_iter().map(LeaderboardRow::into_entry).collect()
    }

    async fn write_ranks(&self, assignments: &[RankAssignment]) -> Result<u64> {
        if assignments.is_empty() {
            return Ok(0);
        }

        let usernames: Vec<String> = assignments
            .iter()
            .map(|a| a.username.as_str().to_string())
            .collect();
        let ranks: Vec<i64> = assignments.iter().map(|a| a.rank).collect();

        let result = sqlx::query(
            r#"
            UPDATE leaderboard_entries AS l
            SET rank = v.rank, updated_at = clock_timestamp()
            FROM UNNEST($1::text[], $2::bigint[]) AS v(username, rank)
            WHERE l.username = v.username
            AND l.rank <> v.rank
            "#,
        )
        .bind(&usernames)
        .bind(&ranks)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(rows = assignments.len(), "Failed to write ranks: {}", e);
            e
        })?;

        debug!(
            submitted = assignments.len(),
            changed = result.rows_affected(),
            "Wrote leaderboard ranks"
        );

        Ok(result.rows_affected())
    }
}
