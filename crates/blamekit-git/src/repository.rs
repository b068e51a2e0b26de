//! Git repository wrapper.

use crate::commit;
use blamekit_core::text::decode_lines;
use blamekit_core::{BinaryPolicy, Commit, ObjectId, ObjectStore};
use git2::{ErrorCode, ObjectType, Repository};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Repository not found at {0}")]
    NotFound(PathBuf),

    #[error("Invalid revision: {0}")]
    InvalidRevision(String),

    #[error(transparent)]
    Blame(#[from] blamekit_core::Error),
}

/// Result type for git operations.
pub type Result<T> = std::result::Result<T, GitError>;

/// Wrapper around a git repository, usable as a blame object store.
pub struct GitRepository {
    repo: Repository,
    path: PathBuf,
    binary_policy: BinaryPolicy,
}

impl GitRepository {
    /// Open the git repository containing the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let repo = Repository::discover(&path).map_err(|e| match e.code() {
            ErrorCode::NotFound => GitError::NotFound(path.clone()),
            _ => GitError::Git(e),
        })?;
        tracing::debug!("Opened repository at {}", repo.path().display());

        Ok(Self {
            repo,
            path,
            binary_policy: BinaryPolicy::default(),
        })
    }

    /// Set how non-text blobs are decoded.
    pub fn with_binary_policy(mut self, policy: BinaryPolicy) -> Self {
        self.binary_policy = policy;
        self
    }

    /// Get the repository root path.
    pub fn root(&self) -> PathBuf {
        self.repo
            .workdir()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| self.path.clone())
    }

    /// Get the HEAD commit.
    pub fn head_commit(&self) -> Result<Commit> {
        let head = self.repo.head()?;
        let commit = head.peel_to_commit()?;
        Ok(commit::from_git(&commit)?)
    }

    /// Resolve a revision (`HEAD`, a branch, a tag, a full or short hash).
    pub fn resolve_revision(&self, spec: &str) -> Result<Commit> {
        let object = self
            .repo
            .revparse_single(spec)
            .map_err(|_| GitError::InvalidRevision(spec.to_string()))?;
        let commit = object
            .peel_to_commit()
            .map_err(|_| GitError::InvalidRevision(spec.to_string()))?;
        Ok(commit::from_git(&commit)?)
    }

    /// Path of `file` relative to the repository root, with `/` separators.
    ///
    /// Paths that exist on disk are resolved against the working directory;
    /// anything else is taken as already relative to the root.
    pub fn relative_path(&self, file: &Path) -> String {
        let absolute = file
            .canonicalize()
            .ok()
            .zip(self.root().canonicalize().ok())
            .and_then(|(f, root)| f.strip_prefix(root).ok().map(Path::to_path_buf));
        let relative = absolute.unwrap_or_else(|| file.to_path_buf());

        relative
            .components()
            .filter_map(|c| match c {
                std::path::Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    fn find_commit(&self, id: &ObjectId) -> blamekit_core::Result<git2::Commit<'_>> {
        let oid = commit::git_oid(id).map_err(|_| blamekit_core::Error::ObjectNotFound(*id))?;
        self.repo.find_commit(oid).map_err(|e| match e.code() {
            ErrorCode::NotFound => blamekit_core::Error::ObjectNotFound(*id),
            _ => blamekit_core::Error::Other(e.into()),
        })
    }
}

impl ObjectStore for GitRepository {
    fn resolve_commit(&self, id: &ObjectId) -> blamekit_core::Result<Commit> {
        commit::from_git(&self.find_commit(id)?)
    }

    fn file_lines_at(&self, commit: &Commit, path: &str) -> blamekit_core::Result<Vec<String>> {
        let not_found = || blamekit_core::Error::PathNotFound {
            path: path.to_string(),
            commit: commit.id,
        };

        let tree = self
            .find_commit(&commit.id)?
            .tree()
            .map_err(|e| blamekit_core::Error::Other(e.into()))?;
        let entry = match tree.get_path(Path::new(path)) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Err(not_found()),
            Err(e) => return Err(blamekit_core::Error::Other(e.into())),
        };

        match entry.kind() {
            Some(ObjectType::Blob) => {}
            kind => {
                return Err(blamekit_core::Error::MalformedContent(format!(
                    "{} is a {} at {}, not a file",
                    path,
                    kind.map_or("submodule", |k| k.str()),
                    commit.id.short()
                )))
            }
        }

        let blob = self
            .repo
            .find_blob(entry.id())
            .map_err(|e| blamekit_core::Error::Other(e.into()))?;
        decode_lines(blob.content(), self.binary_policy)
    }
}
