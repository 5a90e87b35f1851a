#![allow(dead_code)]

use click_service::{ClickCounter, MemoryClickRepository};
use shared::StoragePolicy;
use std::sync::Arc;
use std::time::Duration;

pub fn test_policy() -> StoragePolicy {
    StoragePolicy::new(Duration::from_secs(2), 3)
}

pub fn create_memory_counter() -> ClickCounter {
    ClickCounter::new(Arc::new(MemoryClickRepository::new()), test_policy())
}

pub fn session_name(suffix: &str) -> String {
    format!("test_session_{}", suffix)
}
