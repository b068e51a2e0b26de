//! Test utilities for blamekit.
//!
//! Provides reusable signatures and commit fixtures.

use crate::commit::{Commit, Signature};
use crate::oid::ObjectId;
use chrono::{FixedOffset, TimeZone};

/// Signature for `name` at `secs` past the epoch, in UTC.
pub fn sig(name: &str, secs: i64) -> Signature {
    let utc = FixedOffset::east_opt(0).expect("zero offset is valid");
    let when = utc
        .timestamp_opt(secs, 0)
        .single()
        .expect("timestamp in range");
    Signature::new(name, format!("{}@example.com", name), when)
}

/// Parentless commit whose id is derived from `seed`.
pub fn commit_fixture(seed: &str, message: &str, author: Signature) -> Commit {
    Commit {
        id: ObjectId::from_content(seed.as_bytes()),
        parents: Vec::new(),
        committer: author.clone(),
        author,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sig_fixture() {
        let s = sig("alice", 60);
        assert_eq!(s.email, "alice@example.com");
        assert_eq!(s.when.timestamp(), 60);
        assert_eq!(s.when.offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_commit_fixture() {
        let a = commit_fixture("seed", "msg", sig("bob", 1));
        let b = commit_fixture("seed", "other", sig("carol", 2));
        assert_eq!(a.id, b.id);
        assert!(a.is_root());
        assert_eq!(a.committer, a.author);
    }
}
