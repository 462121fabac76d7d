//! Custom error types for the common library
//!
//! This module defines the error types raised by the record store
//! collaborator and its cache.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for record store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Error occurred while connecting to the backing database
    #[error("Record store connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during query execution
    #[error("Record store query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred while talking to the record cache
    #[error("Record cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// A stored row could not be converted to or from a player record
    #[error("Record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Record store configuration error: {0}")]
    Configuration(String),
}

impl StoreError {
    /// Remediation hint shown to the user next to the error
    pub fn hint(&self) -> &'static str {
        match self {
            StoreError::Connection(_) => {
                "Check that DATABASE_URL points to a reachable PostgreSQL instance"
            }
            StoreError::Query(_) => "Retry the operation; if it keeps failing check the database logs",
            StoreError::Cache(_) => "Check REDIS_URL or unset it to disable the record cache",
            StoreError::Serialization(_) => {
                "A stored row does not match the player schema; fix or remove it"
            }
            StoreError::Configuration(_) => "Review the record store environment variables",
        }
    }
}

/// Type alias for Result with StoreError
pub type StoreResult<T> = Result<T, StoreError>;
