//! The blame engine.
//!
//! Lines of the blamed file start provisional at the start commit. Each commit
//! the walk reaches with provisional lines is diffed against its parents; a
//! line a parent holds unchanged moves to that parent, every other line is
//! fixed to the commit. Lines still provisional when history runs out belong to
//! the root commit holding them.
//!
//! Merge commits hand a line to the first parent, in [`MergeStrategy`] order,
//! holding it unchanged. Which branch really authored a line both parents
//! share is not resolved any further.

use crate::attribution::{Attribution, TrackedLine};
use crate::diff::{diff_lines_with, DiffOptions, LineMatch};
use crate::error::{Error, Result};
use crate::line::{materialize, BlameResult};
use crate::store::ObjectStore;
use crate::walk::{priority_cmp, CommitWalker};
use crate::{Commit, ObjectId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Order in which the parents of a merge are offered a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// Walk priority: newest commit time first, then smallest id.
    #[default]
    Priority,
    /// Parents in recorded order, first parent first.
    FirstParent,
}

impl MergeStrategy {
    /// Parse a strategy name as used on the command line.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "priority" => Some(MergeStrategy::Priority),
            "first-parent" | "first_parent" => Some(MergeStrategy::FirstParent),
            _ => None,
        }
    }

    /// Name as used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStrategy::Priority => "priority",
            MergeStrategy::FirstParent => "first-parent",
        }
    }
}

/// Cancels a running blame from another thread.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    /// Create a handle that has not fired.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every blame holding this handle to stop.
    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether [`AbortHandle::abort`] has been called.
    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Blame configuration.
#[derive(Debug, Clone, Default)]
pub struct BlameOptions {
    /// Parent order for merges.
    pub merge_strategy: MergeStrategy,
    /// Diff tuning.
    pub diff: DiffOptions,
    /// Optional cancellation.
    pub abort: Option<AbortHandle>,
}

impl BlameOptions {
    /// Set the merge strategy.
    pub fn with_merge_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.merge_strategy = strategy;
        self
    }

    /// Set the diff options.
    pub fn with_diff(mut self, diff: DiffOptions) -> Self {
        self.diff = diff;
        self
    }

    /// Set the abort handle.
    pub fn with_abort(mut self, abort: AbortHandle) -> Self {
        self.abort = Some(abort);
        self
    }
}

/// Blame `path` at `commit` with default options.
pub fn blame<S: ObjectStore + ?Sized>(store: &S, commit: &Commit, path: &str) -> Result<BlameResult> {
    Blamer::new(store).blame(commit, path)
}

/// Blame `path` at `commit` with the given options.
pub fn blame_with<S: ObjectStore + ?Sized>(
    store: &S,
    commit: &Commit,
    path: &str,
    options: &BlameOptions,
) -> Result<BlameResult> {
    Blamer::new(store).with_options(options.clone()).blame(commit, path)
}

/// Runs blames against one object store.
pub struct Blamer<'s, S: ObjectStore + ?Sized> {
    store: &'s S,
    options: BlameOptions,
}

impl<'s, S: ObjectStore + ?Sized> Blamer<'s, S> {
    /// Create a blamer with default options.
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            options: BlameOptions::default(),
        }
    }

    /// Set the options.
    pub fn with_options(mut self, options: BlameOptions) -> Self {
        self.options = options;
        self
    }

    /// Attribute every line of `path` at `commit` to the commit that last
    /// introduced it.
    ///
    /// Fails with `PathNotFound` if the file does not exist at `commit`, and
    /// with `ObjectNotFound` if any ancestor cannot be resolved. No partial
    /// result is ever returned.
    pub fn blame(&self, commit: &Commit, path: &str) -> Result<BlameResult> {
        let started = Instant::now();
        let contents = self.store.file_lines_at(commit, path)?;

        if contents.is_empty() {
            return Ok(BlameResult {
                path: path.to_string(),
                revision: commit.id,
                lines: Vec::new(),
            });
        }

        let mut run = BlameRun::new(self.store, &self.options, path, commit, &contents);
        let mut walker = CommitWalker::new(self.store, commit.clone());

        while !run.attribution.is_complete() {
            self.check_abort()?;
            let Some(next) = walker.next() else {
                break;
            };
            let current = next?;
            let id = current.id;
            run.commits.entry(id).or_insert(current);

            let tracked = run.attribution.take_pending(&id);
            if tracked.is_empty() {
                walker.prune();
                run.contents.remove(&id);
                continue;
            }

            let receivers = run.settle(id, tracked)?;
            if receivers.is_empty() {
                walker.prune();
            }

            // Lines handed to a parent the walk has already passed (commit
            // times out of order) are settled right away.
            let mut backlog: Vec<ObjectId> = receivers
                .into_iter()
                .filter(|p| walker.has_yielded(p))
                .collect();
            while let Some(parent) = backlog.pop() {
                self.check_abort()?;
                let tracked = run.attribution.take_pending(&parent);
                if tracked.is_empty() {
                    continue;
                }
                tracing::debug!("Catching up {} lines at {}", tracked.len(), parent.short());
                for receiver in run.settle(parent, tracked)? {
                    if walker.has_yielded(&receiver) {
                        backlog.push(receiver);
                    } else {
                        walker.enqueue(&receiver)?;
                    }
                }
            }
        }

        let visited = walker.yielded();
        let result = run.finish(contents)?;
        tracing::info!(
            "Blamed {} lines of {} at {} in {:?} ({} commits visited)",
            result.lines.len(),
            result.path,
            result.revision.short(),
            started.elapsed(),
            visited
        );
        Ok(result)
    }

    fn check_abort(&self) -> Result<()> {
        match &self.options.abort {
            Some(handle) if handle.is_aborted() => Err(Error::Aborted),
            _ => Ok(()),
        }
    }
}

/// Working state of one blame call.
struct BlameRun<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
    options: &'a BlameOptions,
    path: &'a str,
    revision: ObjectId,
    attribution: Attribution,
    /// Every commit resolved so far.
    commits: HashMap<ObjectId, Commit>,
    /// File lines of commits still holding provisional lines; `None` when the
    /// path does not exist there.
    contents: HashMap<ObjectId, Option<Rc<Vec<String>>>>,
}

impl<'a, S: ObjectStore + ?Sized> BlameRun<'a, S> {
    fn new(
        store: &'a S,
        options: &'a BlameOptions,
        path: &'a str,
        start: &Commit,
        contents: &[String],
    ) -> Self {
        let mut commits = HashMap::new();
        commits.insert(start.id, start.clone());
        let mut cached = HashMap::new();
        cached.insert(start.id, Some(Rc::new(contents.to_vec())));

        Self {
            store,
            options,
            path,
            revision: start.id,
            attribution: Attribution::new(start.id, contents.len()),
            commits,
            contents: cached,
        }
    }

    fn commit(&mut self, id: &ObjectId) -> Result<&Commit> {
        if !self.commits.contains_key(id) {
            let commit = self.store.resolve_commit(id)?;
            self.commits.insert(*id, commit);
        }
        Ok(&self.commits[id])
    }

    fn content(&mut self, commit: &Commit) -> Result<Option<Rc<Vec<String>>>> {
        if let Some(lines) = self.contents.get(&commit.id) {
            return Ok(lines.clone());
        }

        let lines = match self.store.file_lines_at(commit, self.path) {
            Ok(lines) => Some(Rc::new(lines)),
            // The file did not exist yet: this commit holds no line.
            Err(e) if e.is_path_not_found() => None,
            Err(e) => return Err(e),
        };
        self.contents.insert(commit.id, lines.clone());
        Ok(lines)
    }

    fn ordered_parents(&mut self, commit: &Commit) -> Result<Vec<Commit>> {
        let mut parents = Vec::with_capacity(commit.parents.len());
        for id in &commit.parents {
            parents.push(self.commit(id)?.clone());
        }
        if self.options.merge_strategy == MergeStrategy::Priority {
            parents.sort_by(priority_cmp);
        }
        Ok(parents)
    }

    /// Offer the lines waiting at `id` to its parents and fix the rest to it.
    ///
    /// Returns the parents that took at least one line.
    fn settle(&mut self, id: ObjectId, tracked: Vec<TrackedLine>) -> Result<Vec<ObjectId>> {
        let commit = self.commit(&id)?.clone();
        let parents = self.ordered_parents(&commit)?;
        let mut receivers = Vec::new();
        let mut remaining = tracked;

        if let Some(current) = self.content(&commit)? {
            for parent in &parents {
                if remaining.is_empty() {
                    break;
                }
                let Some(older) = self.content(parent)? else {
                    tracing::trace!("{} has no {}", parent.id.short(), self.path);
                    continue;
                };

                let matches = diff_lines_with(older.as_slice(), current.as_slice(), &self.options.diff);
                let mut kept = Vec::with_capacity(remaining.len());
                let mut moved = 0;
                for line in remaining {
                    match matches[line.pos] {
                        LineMatch::Unchanged(pos) => {
                            if self.attribution.reassign(line, parent.id, pos) {
                                moved += 1;
                            }
                        }
                        LineMatch::Changed => kept.push(line),
                    }
                }
                remaining = kept;

                if moved > 0 {
                    receivers.push(parent.id);
                }
            }
        }

        tracing::debug!(
            "Settled {}: {} lines fixed, {} passed to {} parent(s)",
            id.short(),
            remaining.len(),
            receivers.len(),
            parents.len()
        );
        for line in remaining {
            self.attribution.fix(line.line, id);
        }

        self.contents.remove(&id);
        for parent in &parents {
            if !self.attribution.has_pending(&parent.id) {
                self.contents.remove(&parent.id);
            }
        }
        Ok(receivers)
    }

    fn finish(self, contents: Vec<String>) -> Result<BlameResult> {
        let unresolved = self.attribution.unresolved();
        if unresolved > 0 {
            tracing::debug!("History exhausted with {} provisional lines", unresolved);
        }

        let origins = self.attribution.finalize();
        let commits = origins
            .iter()
            .map(|id| self.commits.get(id).ok_or(Error::ObjectNotFound(*id)))
            .collect::<Result<Vec<&Commit>>>()?;

        Ok(BlameResult {
            path: self.path.to_string(),
            revision: self.revision,
            lines: materialize(&contents, &commits)?,
        })
    }
}
