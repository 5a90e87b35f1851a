pub mod error;
pub mod handlers;
pub mod routes;
pub mod scoreboard;
pub mod state;

pub use error::ApiError;
pub use routes::{build_router, cors_layer};
pub use scoreboard::Scoreboard;
pub use state::AppState;
