pub mod ranking;

pub use ranking::{assign_dense_ranks, leaderboard_order};
