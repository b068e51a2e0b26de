//! Git blame functionality.

use crate::repository::{GitRepository, Result};
use blamekit_core::{BlameOptions, BlameResult, Blamer, CachedStore};

impl GitRepository {
    /// Blame `path` (relative to the repository root) at revision `rev`.
    pub fn blame(&self, rev: &str, path: &str, options: &BlameOptions) -> Result<BlameResult> {
        let commit = self.resolve_revision(rev)?;
        tracing::debug!("Blaming {} at {} ({})", path, rev, commit.id.short());

        let store = CachedStore::new(self);
        let result = Blamer::new(&store)
            .with_options(options.clone())
            .blame(&commit, path)?;
        Ok(result)
    }
}
