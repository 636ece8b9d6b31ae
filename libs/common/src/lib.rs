//! Common library for the Joy Kunga services
//!
//! This crate provides the key/value store plumbing shared by the services:
//! the Redis client, its lazily established connection and the error types
//! they raise.

pub mod cache;
pub mod connection;
pub mod error;

/// Example usage of the cache module
///
/// ```rust,no_run
/// use common::cache::{RedisConfig, RedisPool};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = RedisConfig::from_env()?;
///     let pool = RedisPool::new(&config)?;
///     pool.set("user:data:example", "{}", None).await?;
///     println!("Stored value: {:?}", pool.get("user:data:example").await?);
///     pool.dispose().await?;
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
