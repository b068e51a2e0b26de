//! Blamekit Git Integration
//!
//! Serves commits and file contents from a git repository to the blame engine.

pub mod blame;
pub mod commit;
pub mod repository;

pub use repository::{GitError, GitRepository, Result};
