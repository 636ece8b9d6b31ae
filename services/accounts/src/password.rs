//! Salted one-way password hashing
//!
//! Hashes are argon2id PHC strings. The configured cost only applies to new
//! hashes; verification reads the parameters embedded in the stored hash, so
//! raising the cost never locks out existing accounts. Only argon2 hashes are
//! accepted; bcrypt (`$2a$`, `$2b$`) records cannot be verified.

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version,
    password_hash::{Error as HashError, SaltString},
};
use thiserror::Error;

/// Argon2 work factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Number of passes over memory
    pub iterations: u32,
    /// Memory size in KiB
    pub memory_kib: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            iterations: Params::DEFAULT_T_COST,
            memory_kib: Params::DEFAULT_M_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Invalid password hash cost: {0}")]
    InvalidCost(String),

    #[error("Failed to hash password: {0}")]
    Hashing(String),

    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),

    #[error("Unsupported password hash scheme: {0}")]
    UnsupportedScheme(String),
}

/// Password hasher with a fixed cost
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    pub fn new(cost: HashCost) -> Result<Self, PasswordError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| PasswordError::InvalidCost(e.to_string()))?;

        Ok(Self { params })
    }

    fn argon2(params: Params) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    }

    /// Hash a password with a fresh random salt
    pub async fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let params = self.params.clone();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut rand::thread_rng());
            Self::argon2(params)
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| PasswordError::Hashing(e.to_string()))
        })
        .await
        .map_err(|e| PasswordError::Hashing(e.to_string()))?
    }

    /// Check a password against a stored hash
    pub async fn verify(&self, password: &str, password_hash: &str) -> Result<bool, PasswordError> {
        if !password_hash.starts_with("$argon2") {
            let scheme = password_hash.split('$').nth(1).unwrap_or_default();
            return Err(PasswordError::UnsupportedScheme(scheme.to_string()));
        }

        let params = self.params.clone();
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();

        tokio::task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

            match Self::argon2(params).verify_password(password.as_bytes(), &parsed_hash) {
                Ok(()) => Ok(true),
                Err(HashError::Password) => Ok(false),
                Err(e) => Err(PasswordError::Hashing(e.to_string())),
            }
        })
        .await
        .map_err(|e| PasswordError::Hashing(e.to_string()))?
    }
}
