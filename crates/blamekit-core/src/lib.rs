//! Blamekit Core Library
//!
//! Line attribution for versioned files: object store abstractions, the commit
//! walk, the line diff and the blame engine built on them.

pub mod attribution;
pub mod blame;
pub mod commit;
pub mod diff;
pub mod error;
pub mod line;
pub mod oid;
pub mod store;
pub mod text;
pub mod walk;

#[cfg(test)]
pub mod testutils;

pub use attribution::{Attribution, LineState};
pub use blame::{blame, blame_with, AbortHandle, BlameOptions, Blamer, MergeStrategy};
pub use commit::{Commit, Signature};
pub use diff::{diff_lines, diff_lines_with, DiffOptions, LineMatch};
pub use error::{Error, Result};
pub use line::{materialize, AuthorShare, BlameHunk, BlameResult, Line, LINE_PLACEHOLDER};
pub use oid::ObjectId;
pub use store::{CachedStore, CommitBuilder, MemoryStore, ObjectStore};
pub use text::BinaryPolicy;
pub use walk::CommitWalker;
