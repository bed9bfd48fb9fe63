//! Target addresses.
//!
//! Addresses serialize as plain strings so the builder sees the same text the
//! build file used.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Address of a build target, written `<dir>:<name>`.
///
/// Entities produced by a content generator get `<owner>#<dst>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Address of an entity generated from this target.
    pub fn generated(&self, suffix: &str) -> Self {
        Self(format!("{}#{suffix}", self.0))
    }

    /// `true` when this address was produced by [`Address::generated`].
    pub fn is_generated(&self) -> bool {
        self.0.contains('#')
    }
}

impl Deref for Address {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Address {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Address {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}
