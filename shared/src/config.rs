use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::{Result, ServiceError};
use crate::storage::StoragePolicy;

fn parse_env<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|e| ServiceError::Internal(format!("Invalid {}: {}", key, e)))
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            url: env::var("DATABASE_URL")
                .map_err(|_| ServiceError::Internal("DATABASE_URL not set".to_string()))?,
            max_connections: parse_env("MAX_CONNECTIONS", "20")?,
            acquire_timeout_secs: parse_env("DB_ACQUIRE_TIMEOUT_SECS", "5")?,
        })
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub op_timeout_ms: u64,
    pub max_conflict_retries: u32,
    pub run_migrations: bool,
}

impl StorageConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            backend: parse_env("STORAGE_BACKEND", "postgres")?,
            op_timeout_ms: parse_env("STORAGE_TIMEOUT_MS", "2000")?,
            max_conflict_retries: parse_env("STORAGE_MAX_CONFLICT_RETRIES", "3")?,
            run_migrations: parse_env("RUN_MIGRATIONS", "true")?,
        })
    }

    pub fn policy(&self) -> StoragePolicy {
        StoragePolicy::new(
            Duration::from_millis(self.op_timeout_ms),
            self.max_conflict_retries,
        )
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub cors_origin: String,
    pub is_production: bool,
    pub metrics_port: Option<u16>,
    pub default_leaderboard_limit: i64,
}

impl ServiceConfig {
    pub fn from_env(default_port: u16) -> Result<Self> {
        let port = match env::var("BACKEND_PORT").or_else(|_| env::var("API_PORT")) {
            Ok(value) => value
                .parse()
                .map_err(|e| ServiceError::Internal(format!("Invalid BACKEND_PORT: {}", e)))?,
            Err(_) => default_port,
        };

        let metrics_port = match env::var("METRICS_PORT") {
            Ok(value) => Some(
                value
                    .parse()
                    .map_err(|e| ServiceError::Internal(format!("Invalid METRICS_PORT: {}", e)))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            port,
            cors_origin: env::var("CORS_ORIGIN").unwrap_or_else(|_| "*".to_string()),
            is_production: env::var("APP_ENV")
                .map(|v| v.eq_ignore_ascii_case("production"))
                .unwrap_or(false),
            metrics_port,
            default_leaderboard_limit: parse_env("LEADERBOARD_DEFAULT_LIMIT", "10")?,
        })
    }
}
