//! Per-line attribution state narrowed during the ancestor walk.

use crate::ObjectId;
use std::collections::HashMap;

/// Where a line of the blamed file currently points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineState {
    /// Held unchanged by this commit; an ancestor may still claim it.
    Provisional(ObjectId),
    /// Final origin of the line.
    Fixed(ObjectId),
}

impl LineState {
    /// The commit the line currently points at.
    pub fn commit(&self) -> ObjectId {
        match self {
            LineState::Provisional(id) | LineState::Fixed(id) => *id,
        }
    }

    /// Whether the line is final.
    pub fn is_fixed(&self) -> bool {
        matches!(self, LineState::Fixed(_))
    }
}

/// A provisional line waiting at a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedLine {
    /// Index in the blamed file.
    pub line: usize,
    /// Index of the same text in the commit's version of the file.
    pub pos: usize,
}

/// Attribution of every line of the blamed file.
///
/// Every line starts provisional at the start commit. Lines only ever move
/// from a commit to one of its parents, and a fixed line never changes again.
#[derive(Debug)]
pub struct Attribution {
    states: Vec<LineState>,
    pending: HashMap<ObjectId, Vec<TrackedLine>>,
    fixed: usize,
}

impl Attribution {
    /// All `len` lines provisional at `start`.
    pub fn new(start: ObjectId, len: usize) -> Self {
        let mut pending = HashMap::new();
        if len > 0 {
            pending.insert(start, (0..len).map(|i| TrackedLine { line: i, pos: i }).collect());
        }

        Self {
            states: vec![LineState::Provisional(start); len],
            pending,
            fixed: 0,
        }
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the blamed file has no lines.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// State of one line.
    pub fn state(&self, line: usize) -> LineState {
        self.states[line]
    }

    /// Whether every line is fixed.
    pub fn is_complete(&self) -> bool {
        self.fixed == self.states.len()
    }

    /// Number of lines still provisional.
    pub fn unresolved(&self) -> usize {
        self.states.len() - self.fixed
    }

    /// Whether any provisional line is waiting at `id`.
    pub fn has_pending(&self, id: &ObjectId) -> bool {
        self.pending.get(id).is_some_and(|p| !p.is_empty())
    }

    /// Remove and return the lines waiting at `id`, ordered by file line.
    pub fn take_pending(&mut self, id: &ObjectId) -> Vec<TrackedLine> {
        let mut tracked = self.pending.remove(id).unwrap_or_default();
        tracked.sort_unstable_by_key(|t| t.line);
        tracked
    }

    /// Move a provisional line to `parent`, where its text sits at `pos`.
    ///
    /// Returns false, changing nothing, if the line is already fixed.
    pub fn reassign(&mut self, tracked: TrackedLine, parent: ObjectId, pos: usize) -> bool {
        if self.states[tracked.line].is_fixed() {
            return false;
        }
        self.states[tracked.line] = LineState::Provisional(parent);
        self.pending.entry(parent).or_default().push(TrackedLine {
            line: tracked.line,
            pos,
        });
        true
    }

    /// Fix a line to `commit`.
    ///
    /// Returns false, changing nothing, if the line is already fixed.
    pub fn fix(&mut self, line: usize, commit: ObjectId) -> bool {
        if self.states[line].is_fixed() {
            return false;
        }
        self.states[line] = LineState::Fixed(commit);
        self.fixed += 1;
        true
    }

    /// Final origin of every line; provisional lines keep their last commit.
    pub fn finalize(self) -> Vec<ObjectId> {
        self.states.iter().map(LineState::commit).collect()
    }
}
