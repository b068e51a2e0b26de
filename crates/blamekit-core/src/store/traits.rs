//! Object store trait definitions.

use crate::{Commit, ObjectId, Result};
use std::sync::Arc;

/// Read-only access to commits and file contents.
///
/// Implementations must report a missing commit as `Error::ObjectNotFound` and
/// a path absent from a commit's snapshot as `Error::PathNotFound`; the blame
/// engine treats the two very differently.
pub trait ObjectStore {
    /// Resolve a commit id to its record.
    fn resolve_commit(&self, id: &ObjectId) -> Result<Commit>;

    /// Lines of the file at `path` in `commit`'s snapshot, without terminators.
    fn file_lines_at(&self, commit: &Commit, path: &str) -> Result<Vec<String>>;
}

impl<T: ObjectStore + ?Sized> ObjectStore for &T {
    fn resolve_commit(&self, id: &ObjectId) -> Result<Commit> {
        (**self).resolve_commit(id)
    }

    fn file_lines_at(&self, commit: &Commit, path: &str) -> Result<Vec<String>> {
        (**self).file_lines_at(commit, path)
    }
}

impl<T: ObjectStore + ?Sized> ObjectStore for Box<T> {
    fn resolve_commit(&self, id: &ObjectId) -> Result<Commit> {
        (**self).resolve_commit(id)
    }

    fn file_lines_at(&self, commit: &Commit, path: &str) -> Result<Vec<String>> {
        (**self).file_lines_at(commit, path)
    }
}

impl<T: ObjectStore + ?Sized> ObjectStore for Arc<T> {
    fn resolve_commit(&self, id: &ObjectId) -> Result<Commit> {
        (**self).resolve_commit(id)
    }

    fn file_lines_at(&self, commit: &Commit, path: &str) -> Result<Vec<String>> {
        (**self).file_lines_at(commit, path)
    }
}
