pub mod ranking_engine;

pub use ranking_engine::RankingEngine;
