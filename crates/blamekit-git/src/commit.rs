//! Conversion of git2 commits into blamekit records.

use blamekit_core::{Commit, ObjectId, Result, Signature};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use git2::Oid;

/// Convert a git object id; fails with `InvalidObjectId` on a width mismatch.
pub fn object_id(oid: Oid) -> Result<ObjectId> {
    ObjectId::from_slice(oid.as_bytes())
}

/// Convert back to a git object id.
pub fn git_oid(id: &ObjectId) -> std::result::Result<Oid, git2::Error> {
    Oid::from_bytes(id.as_bytes())
}

/// Convert a git signature, keeping its UTC offset.
pub fn signature(sig: &git2::Signature<'_>) -> Signature {
    let time = sig.when();
    let offset = FixedOffset::east_opt(time.offset_minutes() * 60).unwrap_or(Utc.fix());
    let when = DateTime::from_timestamp(time.seconds(), 0)
        .unwrap_or_default()
        .with_timezone(&offset);

    Signature::new(
        String::from_utf8_lossy(sig.name_bytes()),
        String::from_utf8_lossy(sig.email_bytes()),
        when,
    )
}

/// Convert a git2 commit.
pub fn from_git(commit: &git2::Commit<'_>) -> Result<Commit> {
    Ok(Commit {
        id: object_id(commit.id())?,
        parents: commit.parent_ids().map(object_id).collect::<Result<_>>()?,
        author: signature(&commit.author()),
        committer: signature(&commit.committer()),
        message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
    })
}
