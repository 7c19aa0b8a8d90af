// --- File: crates/pushkeeper_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type for all Pushkeeper errors.
///
/// Each crate keeps its own error enum and converts into this one at the
/// HTTP boundary.
#[derive(Error, Debug)]
pub enum PushkeeperError {
    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred during database operation
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A concurrent writer kept winning
    #[error("Conflict: {0}")]
    ConflictError(String),

    /// Error occurred due to a resource not being found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for PushkeeperError {
    fn status_code(&self) -> u16 {
        match self {
            PushkeeperError::ValidationError(_) => 400,
            PushkeeperError::DatabaseError(_) => 500,
            PushkeeperError::ConflictError(_) => 409,
            PushkeeperError::NotFoundError(_) => 404,
            PushkeeperError::InternalError(_) => 500,
        }
    }
}

/// A trait for adding context to errors.
pub trait Context<T, E> {
    /// Adds context to an error.
    fn context<C>(self, context: C) -> Result<T, PushkeeperError>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E: std::error::Error + Send + Sync + 'static> Context<T, E> for Result<T, E> {
    fn context<C>(self, context: C) -> Result<T, PushkeeperError>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|error| PushkeeperError::InternalError(format!("{}: {}", context, error)))
    }
}

// Utility functions for error handling
pub fn validation_error<T: fmt::Display>(message: T) -> PushkeeperError {
    PushkeeperError::ValidationError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> PushkeeperError {
    PushkeeperError::NotFoundError(message.to_string())
}

pub fn conflict<T: fmt::Display>(message: T) -> PushkeeperError {
    PushkeeperError::ConflictError(message.to_string())
}
