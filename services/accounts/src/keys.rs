//! Store key namespacing
//!
//! Every record lives under `user:<category>:<identifier>`. Profile and data
//! records are addressed by user id, authentication records by email; the
//! constructors below are the only way to build a key, so the two kinds of
//! identifier cannot be mixed up.

use std::fmt;

use uuid::Uuid;

/// Key namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Profile,
    Authentication,
    Data,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Profile => "profile",
            Category::Authentication => "authentication",
            Category::Data => "data",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully qualified store key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserKey {
    category: Category,
    identifier: String,
}

impl UserKey {
    /// `user:profile:<id>`
    pub fn profile(id: Uuid) -> Self {
        Self {
            category: Category::Profile,
            identifier: id.to_string(),
        }
    }

    /// `user:data:<id>`
    pub fn data(id: Uuid) -> Self {
        Self {
            category: Category::Data,
            identifier: id.to_string(),
        }
    }

    /// `user:authentication:<email>`
    pub fn authentication(email: &str) -> Self {
        Self {
            category: Category::Authentication,
            identifier: email.to_string(),
        }
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user:{}:{}", self.category, self.identifier)
    }
}
