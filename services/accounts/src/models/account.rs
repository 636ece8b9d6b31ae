//! Account records and request/response payloads

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display attributes stored under `user:profile:<id>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub email: String,
    pub name: String,
}

/// Credentials stored under `user:authentication:<email>`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationRecord {
    pub id: Uuid,
    pub password_hash: String,
}

/// Signup payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Response for a successful signup
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub id: Uuid,
}

/// Query string of `GET /authenticate`
#[derive(Debug, Deserialize)]
pub struct AuthenticateQuery {
    pub email: String,
    pub password: String,
}
