//! Object store abstraction layer.
//!
//! The blame engine only reads commits and file lines through the
//! [`ObjectStore`] trait. This module provides the trait, an in-memory
//! implementation and a memoising wrapper usable over any backend.

mod cached;
mod memory;
mod traits;

pub use cached::CachedStore;
pub use memory::{CommitBuilder, MemoryStore};
pub use traits::ObjectStore;
