//! Error types for pgrole

use thiserror::Error;

/// Core error type for pgrole operations
#[derive(Error, Debug)]
pub enum PgRoleError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Not supported: {0}")]
    NotSupported(String),
}

/// Result type alias for pgrole operations
pub type Result<T> = std::result::Result<T, PgRoleError>;
