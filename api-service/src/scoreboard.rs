use click_service::{ClickCounter, ClickRepository, MemoryClickRepository};
use leaderboard_service::{LeaderboardRepository, MemoryLeaderboardRepository, RankingEngine};
use shared::{RankedPlayer, Result, ServiceError, SessionClicks, StoragePolicy};
use sqlx::PgPool;
use std::sync::Arc;

/// Operations offered to the request-handling layer.
///
/// Session counts and leaderboard scores are independent: callers that want
/// a session's count on the leaderboard read it with `get_session_clicks`
/// and pass it to `submit_score`. Submissions are absolute, so a smaller
/// value lowers the stored score.
#[derive(Clone)]
pub struct Scoreboard {
    clicks: ClickCounter,
    rankings: RankingEngine,
}

impl Scoreboard {
    pub fn new(clicks: ClickCounter, rankings: RankingEngine) -> Self {
        Self { clicks, rankings }
    }

    pub fn postgres(pool: PgPool, policy: StoragePolicy) -> Self {
        Self::new(
            ClickCounter::new(Arc::new(ClickRepository::new(pool.clone())), policy),
            RankingEngine::new(Arc::new(LeaderboardRepository::new(pool)), policy),
        )
    }

    pub fn in_memory(policy: StoragePolicy) -> Self {
        Self::new(
            ClickCounter::new(Arc::new(MemoryClickRepository::new()), policy),
            RankingEngine::new(Arc::new(MemoryLeaderboardRepository::new()), policy),
        )
    }

    pub async fn record_click(&self, session_id: &str) -> Result<SessionClicks> {
        let score = self.clicks.increment_click(session_id).await?;
        Ok(SessionClicks::from(&score))
    }

    pub async fn get_session_clicks(&self, session_id: &str) -> Result<SessionClicks> {
        self.clicks
            .get_by_session(session_id)
            .await?
            .map(|score| SessionClicks::from(&score))
            .ok_or_else(|| ServiceError::NotFound(format!("session {}", session_id)))
    }

    pub async fn get_total_clicks(&self) -> Result<i64> {
        self.clicks.get_total_clicks().await
    }

    pub async fn list_sessions(&self) -> Result<Vec<SessionClicks>> {
        let sessions = self.clicks.list_sessions().await?;
        Ok(sessions.iter().map(SessionClicks::from).collect())
    }

    pub async fn set_session_clicks(&self, session_id: &str, count: i64) -> Result<SessionClicks> {
        let score = self.clicks.set_session_count(session_id, count).await?;
        Ok(SessionClicks::from(&score))
    }

    pub async fn get_top_players(&self, limit: i64) -> Result<Vec<RankedPlayer>> {
        let entries = self.rankings.get_top_players(limit).await?;
        Ok(entries.iter().map(RankedPlayer::from).collect())
    }

    pub async fn submit_score(&self, username: &str, total_clicks: i64) -> Result<RankedPlayer> {
        let entry = self.rankings.submit_score(username, total_clicks).await?;
        Ok(RankedPlayer::from(&entry))
    }

    /// Removes the player and re-ranks the rest. Removing an unknown player
    /// succeeds.
    ///
    /// An error from the re-rank step is returned even though the delete
    /// already happened. Removal is idempotent, so callers can retry the
    /// whole call until it succeeds.
    pub async fn remove_player(&self, username: &str) -> Result<()> {
        self.rankings.remove_player(username).await?;
        self.rankings.recompute_ranks().await?;
        Ok(())
    }

    /// Recomputes ranks; returns the number of ranked players.
    pub async fn refresh_rankings(&self) -> Result<usize> {
        Ok(self.rankings.recompute_ranks().await?.len())
    }
}
