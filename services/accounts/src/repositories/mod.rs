//! Repositories for key/value store operations

pub mod account;

pub use account::{AccountRepository, Credentials};
