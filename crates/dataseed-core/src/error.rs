use thiserror::Error;

/// Core error type shared across dataseed crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Database error or adapter failure.
    #[error("database error: {0}")]
    Db(String),
    /// The schema violates internal invariants.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    /// A table identifier could not be parsed.
    #[error("invalid table identifier '{value}': {reason}")]
    InvalidTableId { value: String, reason: String },
}

/// Convenience alias for results returned by dataseed crates.
pub type Result<T> = std::result::Result<T, Error>;
