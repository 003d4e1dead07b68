//! Entity identity
//!
//! Every entity gets an [`EntityId`] when it is created. Ids are opaque,
//! fixed-length tokens and are never parsed for meaning.

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Immutable, globally unique entity identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Length of every generated id (a hyphenated UUID)
    pub const LENGTH: usize = 36;

    /// Generate a fresh random id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Deref for EntityId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Anything that carries an [`EntityId`].
///
/// Association operations accept `&impl Identified`, so callers can pass either
/// an entity or a bare id.
pub trait Identified {
    fn id(&self) -> &EntityId;
}

impl Identified for EntityId {
    fn id(&self) -> &EntityId {
        self
    }
}
