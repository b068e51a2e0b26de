//! Error types for blamekit.

use crate::oid::ObjectId;
use thiserror::Error;

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Blamekit error types.
#[derive(Debug, Error)]
pub enum Error {
    /// A referenced commit could not be resolved by the object store
    #[error("Object not found: {0}")]
    ObjectNotFound(ObjectId),

    /// The path does not exist in the given commit's snapshot
    #[error("Path not found: {path} at {commit}")]
    PathNotFound { path: String, commit: ObjectId },

    /// Content that cannot be split into lines
    #[error("Malformed content: {0}")]
    MalformedContent(String),

    /// Text that does not parse as an object id
    #[error("Invalid object id: {0}")]
    InvalidObjectId(String),

    /// More text lines than attributed commits were handed to the materializer
    #[error("Attribution mismatch: {lines} lines but only {commits} attributed commits")]
    AttributionMismatch { lines: usize, commits: usize },

    /// The blame was aborted through its abort handle
    #[error("Blame aborted")]
    Aborted,

    /// Generic error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Whether this error only means the path is absent at some commit.
    pub fn is_path_not_found(&self) -> bool {
        matches!(self, Error::PathNotFound { .. })
    }
}
