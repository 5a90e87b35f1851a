use shared::LeaderboardEntry;
use std::cmp::Ordering;

/// Total order of the leaderboard: more clicks first, then the entry created
/// earlier, then the username ascending.
///
/// Both the rank write path and the top-N read path sort with this function.
pub fn leaderboard_order(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.total_clicks()
        .cmp(&a.total_clicks())
        .then_with(|| a.created_at().cmp(&b.created_at()))
        .then_with(|| a.username().cmp(b.username()))
}

/// Sorts `entries` and numbers them 1..=N with no gaps or duplicates.
pub fn assign_dense_ranks(mut entries: Vec<LeaderboardEntry>) -> Vec<LeaderboardEntry> {
    entries.sort_by(leaderboard_order);
    entries
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| entry.with_rank(idx as i64 + 1))
        .collect()
}
