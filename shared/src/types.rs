use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{Result, ServiceError};

/// Opaque client-generated identifier of one anonymous play instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(session_id: impl Into<String>) -> Result<Self> {
        let session_id = session_id.into();
        if session_id.is_empty() {
            return Err(ServiceError::InvalidArgument(
                "session_id must not be empty".to_string(),
            ));
        }
        Ok(Self(session_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Player name on the leaderboard. Case-sensitive; unique across entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    pub fn new(username: impl Into<String>) -> Result<Self> {
        let username = username.into();
        if username.is_empty() {
            return Err(ServiceError::InvalidArgument(
                "username must not be empty".to_string(),
            ));
        }
        Ok(Self(username))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn ensure_non_negative(field: &str, value: i64) -> Result<()> {
    if value < 0 {
        return Err(ServiceError::InvalidArgument(format!(
            "{} must be >= 0, got {}",
            field, value
        )));
    }
    Ok(())
}

/// Click count of one session.
///
/// Values are snapshots: the transition methods return a new record and
/// never touch storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionScore {
    id: Uuid,
    session_id: SessionId,
    count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SessionScore {
    pub fn new(
        id: Uuid,
        session_id: SessionId,
        count: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self> {
        ensure_non_negative("count", count)?;
        Ok(Self {
            id,
            session_id,
            count,
            created_at,
            updated_at,
        })
    }

    /// First record for a session that has not been seen before.
    pub fn first(session_id: SessionId, count: i64, now: DateTime<Utc>) -> Result<Self> {
        Self::new(Uuid::new_v4(), session_id, count, now, now)
    }

    pub fn incremented(&self, delta: i64, now: DateTime<Utc>) -> Result<Self> {
        let count = self.count.checked_add(delta).ok_or_else(|| {
            ServiceError::InvalidArgument(format!(
                "count overflow for session {}",
                self.session_id
            ))
        })?;
        self.with_count(count, now)
    }

    pub fn with_count(&self, count: i64, now: DateTime<Utc>) -> Result<Self> {
        ensure_non_negative("count", count)?;
        Ok(Self {
            count,
            updated_at: now,
            ..self.clone()
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn count(&self) -> i64 {
        self.count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Rank value of an entry that has not been through a recomputation yet.
pub const UNRANKED: i64 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    id: Uuid,
    username: Username,
    total_clicks: i64,
    rank: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LeaderboardEntry {
    pub fn new(
        id: Uuid,
        username: Username,
        total_clicks: i64,
        rank: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self> {
        ensure_non_negative("total_clicks", total_clicks)?;
        ensure_non_negative("rank", rank)?;
        Ok(Self {
            id,
            username,
            total_clicks,
            rank,
            created_at,
            updated_at,
        })
    }

    pub fn first(username: Username, total_clicks: i64, now: DateTime<Utc>) -> Result<Self> {
        Self::new(Uuid::new_v4(), username, total_clicks, UNRANKED, now, now)
    }

    /// Absolute overwrite of the score. The rank is kept as-is and stays
    /// provisional until the next recomputation.
    pub fn with_score(&self, total_clicks: i64, now: DateTime<Utc>) -> Result<Self> {
        ensure_non_negative("total_clicks", total_clicks)?;
        Ok(Self {
            total_clicks,
            updated_at: now,
            ..self.clone()
        })
    }

    pub fn with_rank(&self, rank: i64) -> Self {
        Self {
            rank,
            ..self.clone()
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn total_clicks(&self) -> i64 {
        self.total_clicks
    }

    pub fn rank(&self) -> i64 {
        self.rank
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClicks {
    pub session_id: String,
    pub count: i64,
}

impl From<&SessionScore> for SessionClicks {
    fn from(score: &SessionScore) -> Self {
        Self {
            session_id: score.session_id().as_str().to_string(),
            count: score.count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedPlayer {
    pub username: String,
    pub total_clicks: i64,
    pub rank: i64,
}

impl From<&LeaderboardEntry> for RankedPlayer {
    fn from(entry: &LeaderboardEntry) -> Self {
        Self {
            username: entry.username().as_str().to_string(),
            total_clicks: entry.total_clicks(),
            rank: entry.rank(),
        }
    }
}
