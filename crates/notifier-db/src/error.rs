//! Database error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("malformed row: {0}")]
    Malformed(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type DbResult<T> = std::result::Result<T, DbError>;

impl From<DbError> for notifier_core::Error {
    fn from(err: DbError) -> Self {
        use notifier_core::Error;

        match err {
            DbError::NotFound(msg) => Error::NotFound(msg),
            DbError::Malformed(msg) => Error::MalformedData(msg),
            DbError::Database(e) => match e {
                sqlx::Error::PoolTimedOut => Error::QueryTimeout(e.to_string()),
                sqlx::Error::RowNotFound => Error::NotFound(e.to_string()),
                sqlx::Error::ColumnDecode { .. }
                | sqlx::Error::ColumnNotFound(_)
                | sqlx::Error::ColumnIndexOutOfBounds { .. }
                | sqlx::Error::Decode(_)
                | sqlx::Error::TypeNotFound { .. } => Error::MalformedData(e.to_string()),
                _ => Error::StoreUnavailable(e.to_string()),
            },
            DbError::Migration(e) => Error::Internal(e.to_string()),
        }
    }
}
