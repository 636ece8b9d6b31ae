//! Custom error types for the common library
//!
//! This module defines the error types raised by the shared key/value store
//! plumbing and consumed by every service built on top of it.

use redis::RedisError;
use thiserror::Error;

/// Custom error type for key/value store operations
#[derive(Error, Debug)]
pub enum CacheError {
    /// Error occurred while opening the store connection
    #[error("Cache connection error: {0}")]
    Connection(#[source] RedisError),

    /// Error occurred while executing a store command
    #[error("Cache command error: {0}")]
    Command(#[source] RedisError),

    /// The connection was disposed and will not be reopened
    #[error("Cache connection is closed")]
    Closed,

    /// Configuration error
    #[error("Cache configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with CacheError
pub type CacheResult<T> = Result<T, CacheError>;
