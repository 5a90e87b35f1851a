pub mod config;
pub mod errors;
pub mod storage;
pub mod telemetry;
pub mod types;

pub use config::{DatabaseConfig, ServiceConfig, StorageBackend, StorageConfig};
pub use errors::{Result, ServiceError};
pub use storage::StoragePolicy;
pub use telemetry::{init_metrics, init_tracing, record_counter, record_gauge, record_timing};
pub use types::{
    LeaderboardEntry, RankedPlayer, SessionClicks, SessionId, SessionScore, Username, UNRANKED,
};
