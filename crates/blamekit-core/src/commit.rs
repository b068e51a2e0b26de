//! Commit information structures.

use crate::oid::ObjectId;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Identity and timestamp of an author or committer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    /// Name.
    pub name: String,
    /// Email.
    pub email: String,
    /// When, with the UTC offset it was recorded in.
    pub when: DateTime<FixedOffset>,
}

impl Signature {
    /// Create a new signature.
    pub fn new(name: impl Into<String>, email: impl Into<String>, when: DateTime<FixedOffset>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            when,
        }
    }

    /// Get the identity in "Name <email>" format.
    pub fn identity(&self) -> String {
        if self.email.is_empty() {
            self.name.clone()
        } else {
            format!("{} <{}>", self.name, self.email)
        }
    }
}

/// An immutable commit record as handed out by an object store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Content-addressed id.
    pub id: ObjectId,
    /// Parent ids in recorded order (empty for a root commit).
    pub parents: Vec<ObjectId>,
    /// Author signature.
    pub author: Signature,
    /// Committer signature.
    pub committer: Signature,
    /// Full commit message.
    pub message: String,
}

impl Commit {
    /// Whether this commit has no parents.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Whether this commit has more than one parent.
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// First line of the message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    /// Commit time in seconds since the epoch, the walk priority key.
    pub fn when(&self) -> i64 {
        self.committer.when.timestamp()
    }
}
