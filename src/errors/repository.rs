use sqlx::Error as SqlxError;
use thiserror::Error;

/// PostgreSQL SQLSTATE for a unique constraint violation
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(SqlxError),

    /// No record matched the lookup
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Insert rejected by the uniqueness constraint on `code`
    #[error("Duplicate key: {0}")]
    Duplicate(String),

    /// Stored data could not be mapped onto the model
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        match err {
            SqlxError::RowNotFound => Self::NotFound("Resource not found".to_string()),
            SqlxError::Database(db_err) => {
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                    return Self::Duplicate(db_err.message().to_string());
                }
                Self::Database(SqlxError::Database(db_err))
            }
            _ => Self::Database(err),
        }
    }
}
