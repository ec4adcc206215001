//! Common error types for JWP

use crate::status::ArticleStatus;
use thiserror::Error;

/// Common result type for JWP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across JWP services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Workflow status transition not in the transition table
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: ArticleStatus,
        to: ArticleStatus,
    },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
