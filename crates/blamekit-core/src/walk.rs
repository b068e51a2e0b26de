//! Ancestor traversal in reverse-causal priority order.

use crate::store::ObjectStore;
use crate::{Commit, ObjectId, Result};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

/// Walk priority between two commits: newer commit time first, then the
/// smaller id. `Ordering::Less` means `a` is visited before `b`.
pub fn priority_cmp(a: &Commit, b: &Commit) -> Ordering {
    b.when().cmp(&a.when()).then_with(|| a.id.cmp(&b.id))
}

/// Heap entry; the greatest entry is the next to visit.
struct Queued(Commit);

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        priority_cmp(&other.0, &self.0)
    }
}

/// Lazily yields every ancestor of a start commit (the start included) once.
///
/// Parents of a yielded commit are scheduled when the next commit is
/// requested, so a commit is only ever yielded after one of its children.
/// Calling [`CommitWalker::prune`] right after a commit is yielded skips its
/// parents; [`CommitWalker::enqueue`] schedules a commit explicitly.
pub struct CommitWalker<'s, S: ObjectStore + ?Sized> {
    store: &'s S,
    queue: BinaryHeap<Queued>,
    seen: HashSet<ObjectId>,
    last: Option<Commit>,
    yielded: HashSet<ObjectId>,
}

impl<'s, S: ObjectStore + ?Sized> CommitWalker<'s, S> {
    /// Start a walk at `start`.
    pub fn new(store: &'s S, start: Commit) -> Self {
        let mut seen = HashSet::new();
        seen.insert(start.id);
        let mut queue = BinaryHeap::new();
        queue.push(Queued(start));

        Self {
            store,
            queue,
            seen,
            last: None,
            yielded: HashSet::new(),
        }
    }

    /// Do not schedule the parents of the commit just yielded.
    pub fn prune(&mut self) {
        self.last = None;
    }

    /// Schedule a commit unless it has already been scheduled.
    ///
    /// Returns whether the commit was newly scheduled. Fails with
    /// `ObjectNotFound` if the store cannot resolve it.
    pub fn enqueue(&mut self, id: &ObjectId) -> Result<bool> {
        if self.seen.contains(id) {
            return Ok(false);
        }
        let commit = self.store.resolve_commit(id)?;
        self.seen.insert(*id);
        self.queue.push(Queued(commit));
        Ok(true)
    }

    /// Whether `id` has already been yielded.
    pub fn has_yielded(&self, id: &ObjectId) -> bool {
        self.yielded.contains(id)
    }

    /// Number of commits yielded so far.
    pub fn yielded(&self) -> usize {
        self.yielded.len()
    }

    fn expand_last(&mut self) -> Result<()> {
        if let Some(commit) = self.last.take() {
            for parent in &commit.parents {
                self.enqueue(parent)?;
            }
        }
        Ok(())
    }
}

impl<S: ObjectStore + ?Sized> Iterator for CommitWalker<'_, S> {
    type Item = Result<Commit>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Err(e) = self.expand_last() {
            return Some(Err(e));
        }

        let Queued(commit) = self.queue.pop()?;
        self.yielded.insert(commit.id);
        self.last = Some(commit.clone());
        Some(Ok(commit))
    }
}
