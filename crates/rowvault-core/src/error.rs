//! Error types for rowvault.

use thiserror::Error;

/// Result type alias using rowvault's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for rowvault operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Live schema could not be enumerated; aborts the whole batch
    #[error("Schema read error: {0}")]
    SchemaRead(String),

    /// Named live table is absent; recorded per-object
    #[error("object {0} doesn't exist")]
    ObjectNotFound(String),

    /// ALTER/CREATE or trigger installation failed; recorded per-object
    #[error("DDL error: {0}")]
    Ddl(String),

    /// Commit failed after successful DDL; recorded per-object
    #[error("Commit error: {0}")]
    Commit(String),

    /// Aggregate failure of a batch; one message per failed object
    #[error("batch failed: {}", .0.join("; "))]
    Batch(Vec<String>),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Per-object message recorded into a batch error list.
    pub fn object_message(&self) -> String {
        self.to_string()
    }
}
