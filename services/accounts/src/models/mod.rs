//! Account service models

pub mod account;

// Re-export for convenience
pub use account::{AuthenticateQuery, AuthenticationRecord, NewAccount, Profile, SignupResponse};
