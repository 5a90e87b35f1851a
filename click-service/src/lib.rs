pub mod repository;
pub mod service;

pub use repository::{ClickRepository, ClickStore, MemoryClickRepository};
pub use service::ClickCounter;
