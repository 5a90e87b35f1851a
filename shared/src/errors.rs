use thiserror::Error;

const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const CHECK_VIOLATION: &str = "23514";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Concurrent update conflict: {0}")]
    ConcurrentUpdateConflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Whether the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ServiceError::StorageUnavailable(_) | ServiceError::ConcurrentUpdateConflict(_)
        )
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) => match db.code().as_deref() {
                Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED) => {
                    ServiceError::ConcurrentUpdateConflict(db.message().to_string())
                }
                Some(CHECK_VIOLATION) => ServiceError::InvalidArgument(db.message().to_string()),
                _ => ServiceError::Internal(format!("Database error: {}", err)),
            },
            sqlx::Error::RowNotFound => ServiceError::NotFound(err.to_string()),
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed => ServiceError::StorageUnavailable(err.to_string()),
            _ => ServiceError::Internal(format!("Database error: {}", err)),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors_are_storage_unavailable() {
        let error = ServiceError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(error, ServiceError::StorageUnavailable(_)));
        assert!(error.is_retryable());

        let error = ServiceError::from(sqlx::Error::PoolClosed);
        assert!(matches!(error, ServiceError::StorageUnavailable(_)));
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let error = ServiceError::from(sqlx::Error::RowNotFound);
        assert!(matches!(error, ServiceError::NotFound(_)));
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_error_messages() {
        let error = ServiceError::InvalidArgument("session_id must not be empty".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid argument: session_id must not be empty"
        );

        let error = ServiceError::ConcurrentUpdateConflict("could not serialize".to_string());
        assert!(error.is_retryable());
    }
}
