use std::sync::Arc;

use crate::scoreboard::Scoreboard;

#[derive(Clone)]
pub struct AppState {
    pub scoreboard: Arc<Scoreboard>,
    pub default_leaderboard_limit: i64,
}

impl AppState {
    pub fn new(scoreboard: Scoreboard, default_leaderboard_limit: i64) -> Self {
        Self {
            scoreboard: Arc::new(scoreboard),
            default_leaderboard_limit,
        }
    }
}
