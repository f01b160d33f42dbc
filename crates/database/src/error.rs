use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Invalid database connection settings: {0}")]
    ConnectionConfigError(String),

    #[error("Timed out after {0}s waiting for the database to accept the connection")]
    ConnectTimeout(u64),

    #[error("Database error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Seed data is malformed: {0}")]
    Seed(#[from] CoreError),

    #[error("'{0}' is not one of the library tables")]
    UnknownTable(String),
}
