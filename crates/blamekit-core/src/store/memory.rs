//! In-memory object store.

use crate::commit::{Commit, Signature};
use crate::error::{Error, Result};
use crate::oid::ObjectId;
use crate::store::traits::ObjectStore;
use crate::text::{decode_lines, BinaryPolicy};
use chrono::{DateTime, FixedOffset};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

/// A commit together with its file snapshot.
#[derive(Debug, Clone)]
struct StoredCommit {
    commit: Commit,
    snapshot: BTreeMap<String, Vec<u8>>,
}

/// Object store keeping every commit and snapshot in memory.
///
/// Commit ids are derived from a canonical encoding of the commit and its
/// snapshot, so building the same history twice yields the same ids.
#[derive(Debug, Default)]
pub struct MemoryStore {
    commits: HashMap<ObjectId, StoredCommit>,
    binary_policy: BinaryPolicy,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how non-text content is decoded.
    pub fn with_binary_policy(mut self, policy: BinaryPolicy) -> Self {
        self.binary_policy = policy;
        self
    }

    /// Start building a commit with the given message.
    pub fn commit(&mut self, message: impl Into<String>) -> CommitBuilder<'_> {
        CommitBuilder::new(self, message.into())
    }

    /// Insert a fully formed commit as-is, without recomputing its id.
    ///
    /// Parents are not checked, which lets callers model dangling references.
    pub fn insert_raw(&mut self, commit: Commit, snapshot: BTreeMap<String, Vec<u8>>) {
        self.commits.insert(commit.id, StoredCommit { commit, snapshot });
    }

    /// Get a stored commit.
    pub fn get(&self, id: &ObjectId) -> Option<&Commit> {
        self.commits.get(id).map(|s| &s.commit)
    }

    /// Number of stored commits.
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    /// Whether the store holds no commits.
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    fn snapshot(&self, id: &ObjectId) -> Result<&BTreeMap<String, Vec<u8>>> {
        self.commits
            .get(id)
            .map(|s| &s.snapshot)
            .ok_or(Error::ObjectNotFound(*id))
    }
}

impl ObjectStore for MemoryStore {
    fn resolve_commit(&self, id: &ObjectId) -> Result<Commit> {
        self.commits
            .get(id)
            .map(|s| s.commit.clone())
            .ok_or(Error::ObjectNotFound(*id))
    }

    fn file_lines_at(&self, commit: &Commit, path: &str) -> Result<Vec<String>> {
        let content = self
            .snapshot(&commit.id)?
            .get(path)
            .ok_or_else(|| Error::PathNotFound {
                path: path.to_string(),
                commit: commit.id,
            })?;
        decode_lines(content, self.binary_policy)
    }
}

/// Builder for a commit in a [`MemoryStore`].
///
/// The snapshot starts as a copy of the first parent's snapshot; `file` and
/// `remove` edit it.
pub struct CommitBuilder<'a> {
    store: &'a mut MemoryStore,
    message: String,
    parents: Vec<ObjectId>,
    author: Option<Signature>,
    committer: Option<Signature>,
    changes: Vec<(String, Option<Vec<u8>>)>,
}

impl<'a> CommitBuilder<'a> {
    fn new(store: &'a mut MemoryStore, message: String) -> Self {
        Self {
            store,
            message,
            parents: Vec::new(),
            author: None,
            committer: None,
            changes: Vec::new(),
        }
    }

    /// Append a parent.
    pub fn parent(mut self, id: ObjectId) -> Self {
        self.parents.push(id);
        self
    }

    /// Set the author; the committer defaults to the author.
    pub fn author(mut self, author: Signature) -> Self {
        self.author = Some(author);
        self
    }

    /// Set the committer.
    pub fn committer(mut self, committer: Signature) -> Self {
        self.committer = Some(committer);
        self
    }

    /// Write a file.
    pub fn file(mut self, path: impl Into<String>, content: impl AsRef<[u8]>) -> Self {
        self.changes.push((path.into(), Some(content.as_ref().to_vec())));
        self
    }

    /// Delete a file.
    pub fn remove(mut self, path: impl Into<String>) -> Self {
        self.changes.push((path.into(), None));
        self
    }

    /// Store the commit and return its id.
    ///
    /// Fails with `ObjectNotFound` if a parent is not in the store.
    pub fn create(self) -> Result<ObjectId> {
        for parent in &self.parents {
            if !self.store.commits.contains_key(parent) {
                return Err(Error::ObjectNotFound(*parent));
            }
        }

        let mut snapshot = match self.parents.first() {
            Some(first) => self.store.snapshot(first)?.clone(),
            None => BTreeMap::new(),
        };
        for (path, content) in self.changes {
            match content {
                Some(bytes) => {
                    snapshot.insert(path, bytes);
                }
                None => {
                    snapshot.remove(&path);
                }
            }
        }

        let author = self.author.unwrap_or_else(default_signature);
        let committer = self.committer.unwrap_or_else(|| author.clone());
        let id = ObjectId::from_content(
            canonical_encoding(&self.parents, &author, &committer, &self.message, &snapshot).as_bytes(),
        );

        let commit = Commit {
            id,
            parents: self.parents,
            author,
            committer,
            message: self.message,
        };
        tracing::trace!("Stored commit {} ({} files)", id.short(), snapshot.len());
        self.store.commits.insert(id, StoredCommit { commit, snapshot });
        Ok(id)
    }
}

fn default_signature() -> Signature {
    let epoch = DateTime::from_timestamp(0, 0).unwrap_or_default();
    Signature::new("Unknown", "", epoch.fixed_offset())
}

fn canonical_encoding(
    parents: &[ObjectId],
    author: &Signature,
    committer: &Signature,
    message: &str,
    snapshot: &BTreeMap<String, Vec<u8>>,
) -> String {
    let mut out = String::new();
    for (path, content) in snapshot {
        let _ = writeln!(out, "file {} {}", ObjectId::from_content(content), path);
    }
    for parent in parents {
        let _ = writeln!(out, "parent {}", parent);
    }
    let _ = writeln!(out, "author {}", signature_line(author));
    let _ = writeln!(out, "committer {}", signature_line(committer));
    out.push('\n');
    out.push_str(message);
    out
}

fn signature_line(sig: &Signature) -> String {
    let offset: &FixedOffset = sig.when.offset();
    format!(
        "{} <{}> {} {}",
        sig.name,
        sig.email,
        sig.when.timestamp(),
        offset.local_minus_utc()
    )
}
