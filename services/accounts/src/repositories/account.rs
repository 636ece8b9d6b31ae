//! Account repository for key/value store operations

use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    keys::UserKey,
    models::{AuthenticationRecord, NewAccount, Profile},
    password::PasswordHasher,
    store::KeyValueStore,
};

/// Outcome of a credential check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credentials {
    Valid(Uuid),
    Invalid,
    UnknownEmail,
}

/// Account repository
#[derive(Clone)]
pub struct AccountRepository {
    store: Arc<dyn KeyValueStore>,
    hasher: PasswordHasher,
}

impl AccountRepository {
    /// Create a new account repository
    pub fn new(store: Arc<dyn KeyValueStore>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    async fn read<T: DeserializeOwned>(&self, key: &UserKey) -> ApiResult<Option<T>> {
        match self.store.get(&key.to_string()).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn write<T: Serialize + ?Sized>(&self, key: &UserKey, value: &T) -> ApiResult<()> {
        let raw = serde_json::to_string(value)?;
        self.store.set(&key.to_string(), &raw).await?;
        Ok(())
    }

    /// Find the credentials registered for an email
    pub async fn find_authentication(&self, email: &str) -> ApiResult<Option<AuthenticationRecord>> {
        self.read(&UserKey::authentication(email)).await
    }

    /// Create a new account and return its id
    ///
    /// Credentials are claimed with a conditional write first, so two
    /// concurrent signups for one email cannot both succeed. If the profile
    /// write then fails the credentials are removed again; when that removal
    /// fails too the error is `ApiError::SignupIncomplete`.
    pub async fn create(&self, new_account: &NewAccount) -> ApiResult<Uuid> {
        info!("Creating account for email: {}", new_account.email);

        if self.find_authentication(&new_account.email).await?.is_some() {
            return Err(ApiError::UserExists);
        }

        let id = Uuid::new_v4();
        let password_hash = self.hasher.hash(&new_account.password).await?;

        let authentication_key = UserKey::authentication(&new_account.email).to_string();
        let record = serde_json::to_string(&AuthenticationRecord { id, password_hash })?;
        if !self
            .store
            .set_if_absent(&authentication_key, &record)
            .await?
        {
            warn!(
                "Concurrent signup claimed email first: {}",
                new_account.email
            );
            return Err(ApiError::UserExists);
        }

        let profile = Profile {
            email: new_account.email.clone(),
            name: new_account.name.clone(),
        };
        if let Err(write_error) = self.write(&UserKey::profile(id), &profile).await {
            warn!(
                account_id = %id,
                "Profile write failed, removing credentials: {}", write_error
            );

            if let Err(rollback_error) = self.store.delete(&authentication_key).await {
                return Err(ApiError::SignupIncomplete {
                    id,
                    email: profile.email,
                    source: rollback_error,
                });
            }
            return Err(write_error);
        }

        info!(account_id = %id, "Account created");
        Ok(id)
    }

    /// Verify an email/password pair
    pub async fn verify_credentials(&self, email: &str, password: &str) -> ApiResult<Credentials> {
        let Some(record) = self.find_authentication(email).await? else {
            return Ok(Credentials::UnknownEmail);
        };

        if self.hasher.verify(password, &record.password_hash).await? {
            Ok(Credentials::Valid(record.id))
        } else {
            Ok(Credentials::Invalid)
        }
    }

    pub async fn get_profile(&self, id: Uuid) -> ApiResult<Option<Profile>> {
        self.read(&UserKey::profile(id)).await
    }

    /// Replace the stored profile
    pub async fn put_profile(&self, id: Uuid, profile: &Profile) -> ApiResult<()> {
        info!(account_id = %id, "Updating profile");
        self.write(&UserKey::profile(id), profile).await
    }

    pub async fn get_data(&self, id: Uuid) -> ApiResult<Option<Value>> {
        self.read(&UserKey::data(id)).await
    }

    /// Overwrite the stored data blob; no merging
    pub async fn put_data(&self, id: Uuid, data: &Value) -> ApiResult<()> {
        info!(account_id = %id, "Updating data");
        self.write(&UserKey::data(id), data).await
    }

    pub async fn health_check(&self) -> ApiResult<bool> {
        Ok(self.store.health_check().await?)
    }

    /// Close the store connection
    pub async fn dispose(&self) -> ApiResult<()> {
        Ok(self.store.dispose().await?)
    }
}
