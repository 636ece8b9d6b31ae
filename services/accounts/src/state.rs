//! Application state shared across handlers

use crate::repositories::AccountRepository;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountRepository,
}
