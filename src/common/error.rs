//! Error handling for PrismDB Rust port

use thiserror::Error;

/// Main error type for PrismDB operations
#[derive(Error, Debug)]
pub enum PrismDBError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Invalid type: {0}")]
    InvalidType(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Catalog error: {0}")]
    Catalog(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, PrismDBError>;

/// Result type alias for PrismDB operations (alias for Result)
pub type PrismDBResult<T> = std::result::Result<T, PrismDBError>;
