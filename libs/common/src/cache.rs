//! Redis key/value store module
//!
//! This module provides the store client shared by the services: a single
//! lazily opened multiplexed connection, plain `GET`/`SET` style operations
//! on string values, and an explicit teardown for graceful shutdown.

use std::sync::Arc;

use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use tracing::{debug, info};

use crate::connection::SharedConnection;
use crate::error::{CacheError, CacheResult};

const DEFAULT_REDIS_ADDRESS: &str = "localhost:6379";

/// Configuration for Redis connection
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
}

impl RedisConfig {
    /// Create a new RedisConfig from environment variables
    ///
    /// # Environment Variables
    /// - `REDIS_URL`: full Redis connection URL, takes precedence when set
    /// - `REDIS_ADDRESS`: Redis `host:port` (default: "localhost:6379")
    pub fn from_env() -> CacheResult<Self> {
        if let Ok(url) = std::env::var("REDIS_URL") {
            return Self::from_url(url);
        }

        let address = std::env::var("REDIS_ADDRESS")
            .unwrap_or_else(|_| DEFAULT_REDIS_ADDRESS.to_string());
        Self::from_address(&address)
    }

    /// Build a configuration from a bare `host:port` address
    pub fn from_address(address: &str) -> CacheResult<Self> {
        let address = address.trim();
        if address.is_empty() {
            return Err(CacheError::Configuration(
                "Redis address must not be empty".to_string(),
            ));
        }

        Ok(RedisConfig {
            url: format!("redis://{}", address),
        })
    }

    fn from_url(url: String) -> CacheResult<Self> {
        if !url.starts_with("redis://") && !url.starts_with("rediss://") {
            return Err(CacheError::Configuration(format!(
                "Unsupported Redis URL scheme: {}",
                url
            )));
        }

        Ok(RedisConfig { url })
    }
}

/// Redis client sharing one lazily opened connection
#[derive(Clone)]
pub struct RedisPool {
    client: Client,
    connection: Arc<SharedConnection<MultiplexedConnection>>,
}

impl RedisPool {
    /// Initialize a new Redis client
    ///
    /// No connection is opened here; the first operation performs the
    /// handshake and every later operation reuses it.
    pub fn new(config: &RedisConfig) -> CacheResult<Self> {
        let client = Client::open(config.url.clone())
            .map_err(|e| CacheError::Configuration(format!("Invalid Redis URL: {}", e)))?;
        info!("Redis client initialized with URL: {}", config.url);

        Ok(RedisPool {
            client,
            connection: Arc::new(SharedConnection::new()),
        })
    }

    /// Get the shared connection, opening it on first use
    async fn get_connection(&self) -> CacheResult<MultiplexedConnection> {
        let client = self.client.clone();
        self.connection
            .get_or_connect(|| async move {
                let conn = client
                    .get_multiplexed_async_connection()
                    .await
                    .map_err(CacheError::Connection)?;
                info!("Redis connection established");
                Ok(conn)
            })
            .await
    }

    /// Set a key-value pair in Redis with optional TTL
    pub async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> CacheResult<()> {
        let mut conn = self.get_connection().await?;
        debug!("SET {}", key);

        if let Some(ttl) = ttl_seconds {
            let _: () = conn
                .set_ex(key, value, ttl)
                .await
                .map_err(CacheError::Command)?;
        } else {
            let _: () = conn.set(key, value).await.map_err(CacheError::Command)?;
        }

        Ok(())
    }

    /// Set a key only if it does not exist yet; returns whether it was written
    pub async fn set_if_absent(&self, key: &str, value: &str) -> CacheResult<bool> {
        let mut conn = self.get_connection().await?;
        debug!("SETNX {}", key);

        let created: bool = conn.set_nx(key, value).await.map_err(CacheError::Command)?;
        Ok(created)
    }

    /// Get a value from Redis by key
    pub async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.get_connection().await?;
        debug!("GET {}", key);

        let value: Option<String> = conn.get(key).await.map_err(CacheError::Command)?;
        Ok(value)
    }

    /// Delete a key from Redis
    pub async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.get_connection().await?;
        debug!("DEL {}", key);

        let _: u64 = conn.del(key).await.map_err(CacheError::Command)?;
        Ok(())
    }

    /// Check if Redis is reachable
    pub async fn health_check(&self) -> CacheResult<bool> {
        let mut conn = self.get_connection().await?;
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(CacheError::Command)?;
        Ok(pong == "PONG")
    }

    /// Close the shared connection; later operations fail with `CacheError::Closed`
    pub async fn dispose(&self) -> CacheResult<()> {
        match self.connection.close() {
            Some(mut conn) => {
                let _: () = redis::cmd("QUIT")
                    .query_async(&mut conn)
                    .await
                    .map_err(CacheError::Command)?;
                info!("Redis connection closed");
            }
            None => info!("Redis connection was never opened"),
        }

        Ok(())
    }
}
