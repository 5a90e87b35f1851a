pub mod domain;
pub mod repository;
pub mod service;

pub use domain::{assign_dense_ranks, leaderboard_order};
pub use repository::{
    LeaderboardRepository, MemoryLeaderboardRepository, RankAssignment, RankingStore,
};
pub use service::RankingEngine;
