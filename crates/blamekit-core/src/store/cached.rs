//! Memoising object store wrapper.
//!
//! Keys are immutable (`ObjectId`, or `ObjectId` plus path) and entries are
//! inserted once and never changed, so the cache can be shared by any number of
//! blame calls. Failed lookups are not cached. A panic elsewhere cannot leave
//! an entry half-written, so a poisoned lock is entered anyway.

use crate::store::traits::ObjectStore;
use crate::{Commit, ObjectId, Result};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// An append-only cache in front of another object store.
pub struct CachedStore<S> {
    inner: S,
    commits: RwLock<HashMap<ObjectId, Arc<Commit>>>,
    files: RwLock<HashMap<(ObjectId, String), Arc<Vec<String>>>>,
}

impl<S: ObjectStore> CachedStore<S> {
    /// Wrap a store.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            commits: RwLock::new(HashMap::new()),
            files: RwLock::new(HashMap::new()),
        }
    }

    /// Get the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Number of cached file entries.
    pub fn len(&self) -> usize {
        self.files.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no file content has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shared lines of `path` at `commit`, loading them on first use.
    pub fn shared_lines(&self, commit: &Commit, path: &str) -> Result<Arc<Vec<String>>> {
        let key = (commit.id, path.to_string());
        let cached = self
            .files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();
        if let Some(lines) = cached {
            return Ok(lines);
        }

        let lines = Arc::new(self.inner.file_lines_at(commit, path)?);
        let mut files = self.files.write().unwrap_or_else(PoisonError::into_inner);
        // A concurrent reader may have loaded the same entry; keep the first.
        Ok(files.entry(key).or_insert(lines).clone())
    }

    /// Shared commit record, loading it on first use.
    pub fn shared_commit(&self, id: &ObjectId) -> Result<Arc<Commit>> {
        let cached = self
            .commits
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned();
        if let Some(commit) = cached {
            return Ok(commit);
        }

        let commit = Arc::new(self.inner.resolve_commit(id)?);
        let mut commits = self.commits.write().unwrap_or_else(PoisonError::into_inner);
        Ok(commits.entry(*id).or_insert(commit).clone())
    }
}

impl<S: ObjectStore> ObjectStore for CachedStore<S> {
    fn resolve_commit(&self, id: &ObjectId) -> Result<Commit> {
        Ok(self.shared_commit(id)?.as_ref().clone())
    }

    fn file_lines_at(&self, commit: &Commit, path: &str) -> Result<Vec<String>> {
        Ok(self.shared_lines(commit, path)?.as_ref().clone())
    }
}
