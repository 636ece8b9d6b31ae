//! Key/value store seam used by the repository

use async_trait::async_trait;
use common::{cache::RedisPool, error::CacheResult};

/// String key/value operations the account service relies on
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> CacheResult<()>;

    /// Write only when the key is missing; returns whether the value was stored
    async fn set_if_absent(&self, key: &str, value: &str) -> CacheResult<bool>;

    async fn delete(&self, key: &str) -> CacheResult<()>;

    async fn health_check(&self) -> CacheResult<bool>;

    /// Release the underlying connection for graceful shutdown
    async fn dispose(&self) -> CacheResult<()>;
}

#[async_trait]
impl KeyValueStore for RedisPool {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        RedisPool::get(self, key).await
    }

    async fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        RedisPool::set(self, key, value, None).await
    }

    async fn set_if_absent(&self, key: &str, value: &str) -> CacheResult<bool> {
        RedisPool::set_if_absent(self, key, value).await
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        RedisPool::delete(self, key).await
    }

    async fn health_check(&self) -> CacheResult<bool> {
        RedisPool::health_check(self).await
    }

    async fn dispose(&self) -> CacheResult<()> {
        RedisPool::dispose(self).await
    }
}
