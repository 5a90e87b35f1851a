use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{Result, SessionId, SessionScore};
use sqlx::PgPool;
use tracing::{debug, error};
use uuid::Uuid;

use super::ClickStore;

#[derive(Debug, sqlx::FromRow)]
struct SessionScoreRow {
    id: Uuid,
    session_id: String,
    count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SessionScoreRow {
    fn into_score(self) -> Result<SessionScore> {
        SessionScore::new(
            self.id,
            SessionId::new(self.session_id)?,
            self.count,
            self.created_at,
            self.updated_at,
        )
    }
}

#[derive(Clone)]
pub struct ClickRepository {
    pool: PgPool,
}

impl ClickRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickStore for ClickRepository {
    async fn increment(&self, session_id: &SessionId, delta: i64) -> Result<SessionScore> {
        let row = sqlx::query_as::<_, SessionScoreRow>(
            r#"
            INSERT INTO session_scores (id, session_id, count, created_at, updated_at)
            VALUES ($1, $2, $3, clock_timestamp(), clock_timestamp())
            ON CONFLICT (session_id) DO UPDATE
            SET count = session_scores.count + EXCLUDED.count,
                updated_at = clock_timestamp()
            RETURNING id, session_id, count, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(session_id.as_str())
        .bind(delta)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!(session_id = %session_id, "Failed to increment session clicks: {}", e);
            e
        })?;

        debug!(session_id = %session_id, count = row.count, "Session clicks incremented");
        row.into_score()
    }

    async fn find_by_session(&self, session_id: &SessionId) -> Result<Option<SessionScore>> {
        let row = sqlx::query_as::<_, SessionScoreRow>(
            r#"
            SELECT id, session_id, count, created_at, updated_at
            FROM session_scores
            WHERE session_id = $1
            "#,
        )
        .bind(session_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(SessionScoreRow::into_score).transpose()
    }

    async fn set_count(&self, session_id: &SessionId, count: i64) -> Result<SessionScore> {
        let row = sqlx::query_as::<_, SessionScoreRow>(
            r#"
            INSERT INTO session_scores (id, session_id, count, created_at, updated_at)
            VALUES ($1, $2, $3, clock_timestamp(), clock_timestamp())
            ON CONFLICT (session_id) DO UPDATE
            SET count = EXCLUDED.count,
                updated_at = clock_timestamp()
            RETURNING id, session_id, count, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(session_id.as_str())
        .bind(count)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!(session_id = %session_id, "Failed to set session clicks: {}", e);
            e
        })?;

        row.into_score()
    }

    async fn scan_all(&self) -> Result<Vec<SessionScore>> {
        let rows = sqlx::query_as::<_, SessionScoreRow>(
            r#"
            SELECT id, session_id, count, created_at, updated_at
            FROM session_scores
            ORDER BY created_at, session_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SessionScoreRow::into_score).collect()
    }

    async fn sum_counts(&self) -> Result<i64> {
        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(count), 0)::BIGINT
            FROM session_scores
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}
