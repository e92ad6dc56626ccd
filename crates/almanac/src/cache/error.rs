use sea_orm::DbErr;
use thiserror::Error;

/// Errors from the local catalog store.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Database error from sea-orm.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// A stored row could not be decoded.
    #[error("Corrupt row {id} in {table}: {message}")]
    Corrupt {
        table: &'static str,
        id: i64,
        message: String,
    },
}

/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_error_converts() {
        let err: CacheError = DbErr::RecordNotFound("gone".to_string()).into();
        assert!(err.to_string().contains("Database error"));
    }

    #[test]
    fn corrupt_names_table_and_row() {
        let err = CacheError::Corrupt {
            table: "market_groups",
            id: 61,
            message: "invalid type: map".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("market_groups"));
        assert!(msg.contains("61"));
    }
}
