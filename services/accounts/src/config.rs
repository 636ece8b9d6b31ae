//! Service configuration

use std::str::FromStr;

use anyhow::Result;
use common::cache::RedisConfig;

use crate::password::HashCost;

/// Account service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address the HTTP server binds to
    pub listen_address: String,
    /// Key/value store connection
    pub redis: RedisConfig,
    /// Work factor for new password hashes
    pub hash_cost: HashCost,
}

impl ServiceConfig {
    /// Create a new ServiceConfig from environment variables
    ///
    /// # Environment Variables
    /// - `ACCOUNTS_LISTEN_ADDRESS`: bind address (default: "0.0.0.0:3000")
    /// - `REDIS_ADDRESS` / `REDIS_URL`: see [`RedisConfig::from_env`]
    /// - `PASSWORD_HASH_COST`: argon2 iterations (default: 2)
    /// - `PASSWORD_HASH_MEMORY_KIB`: argon2 memory in KiB (default: 19456)
    /// - `PASSWORD_HASH_PARALLELISM`: argon2 lanes (default: 1)
    pub fn from_env() -> Result<Self> {
        let listen_address = std::env::var("ACCOUNTS_LISTEN_ADDRESS")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let redis = RedisConfig::from_env()?;

        let defaults = HashCost::default();
        let hash_cost = HashCost {
            iterations: env_or("PASSWORD_HASH_COST", defaults.iterations),
            memory_kib: env_or("PASSWORD_HASH_MEMORY_KIB", defaults.memory_kib),
            parallelism: env_or("PASSWORD_HASH_PARALLELISM", defaults.parallelism),
        };

        Ok(ServiceConfig {
            listen_address,
            redis,
            hash_cost,
        })
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
