//! Blame result types and the line materializer.

use crate::error::{Error, Result};
use crate::{Commit, ObjectId};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::borrow::Borrow;
use std::collections::HashMap;

/// Text used for attributed lines that have no text of their own.
pub const LINE_PLACEHOLDER: &str = "\n";

/// One line of a blamed file with the commit that introduced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    /// Text of the line, without its terminator.
    pub text: String,
    /// Commit that last introduced or modified this line.
    pub origin: ObjectId,
    /// Author name of the origin commit.
    pub author_name: String,
    /// Author email of the origin commit.
    pub author_email: String,
    /// Author time of the origin commit.
    pub author_time: DateTime<FixedOffset>,
    /// Full message of the origin commit.
    pub message: String,
}

impl Line {
    /// Copy the origin commit's fields into a new line.
    pub fn new(text: impl Into<String>, origin: &Commit) -> Self {
        Self {
            text: text.into(),
            origin: origin.id,
            author_name: origin.author.name.clone(),
            author_email: origin.author.email.clone(),
            author_time: origin.author.when,
            message: origin.message.clone(),
        }
    }

    /// Get author in "Name <email>" format.
    pub fn author(&self) -> String {
        if self.author_email.is_empty() {
            self.author_name.clone()
        } else {
            format!("{} <{}>", self.author_name, self.author_email)
        }
    }
}

/// Consecutive lines sharing an origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlameHunk {
    /// Shared origin commit.
    pub origin: ObjectId,
    /// First line number (1-indexed).
    pub start: usize,
    /// Number of lines.
    pub len: usize,
}

/// Line count of one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorShare {
    /// Author name.
    pub name: String,
    /// Author email.
    pub email: String,
    /// Lines attributed to this author.
    pub lines: usize,
}

/// Blame of one file at one revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlameResult {
    /// Path of the blamed file.
    pub path: String,
    /// Commit the blame was computed at.
    pub revision: ObjectId,
    /// One entry per physical line, in file order.
    pub lines: Vec<Line>,
}

impl BlameResult {
    /// Group consecutive lines with the same origin.
    pub fn hunks(&self) -> Vec<BlameHunk> {
        let mut hunks: Vec<BlameHunk> = Vec::new();
        for (i, line) in self.lines.iter().enumerate() {
            match hunks.last_mut() {
                Some(hunk) if hunk.origin == line.origin => hunk.len += 1,
                _ => hunks.push(BlameHunk {
                    origin: line.origin,
                    start: i + 1,
                    len: 1,
                }),
            }
        }
        hunks
    }

    /// Lines `start..=end` (1-indexed), clamped to the file.
    pub fn line_range(&self, start: usize, end: usize) -> &[Line] {
        let from = start.saturating_sub(1).min(self.lines.len());
        let to = end.min(self.lines.len()).max(from);
        &self.lines[from..to]
    }

    /// Line counts per author, most lines first, then by name.
    pub fn authors(&self) -> Vec<AuthorShare> {
        let mut counts: HashMap<(&str, &str), usize> = HashMap::new();
        for line in &self.lines {
            *counts
                .entry((line.author_name.as_str(), line.author_email.as_str()))
                .or_insert(0) += 1;
        }

        let mut shares: Vec<AuthorShare> = counts
            .into_iter()
            .map(|((name, email), lines)| AuthorShare {
                name: name.to_string(),
                email: email.to_string(),
                lines,
            })
            .collect();
        shares.sort_by(|a, b| {
            b.lines
                .cmp(&a.lines)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.email.cmp(&b.email))
        });
        shares
    }

    /// The line of the author owning the most lines.
    ///
    /// Ties go to the author appearing first in the file.
    pub fn primary_author(&self) -> Option<&Line> {
        let mut counts: HashMap<(&str, &str), (usize, usize)> = HashMap::new();
        for (i, line) in self.lines.iter().enumerate() {
            counts
                .entry((line.author_name.as_str(), line.author_email.as_str()))
                .and_modify(|(count, _)| *count += 1)
                .or_insert((1, i));
        }

        counts
            .into_values()
            .max_by(|(ca, fa), (cb, fb)| ca.cmp(cb).then_with(|| fb.cmp(fa)))
            .map(|(_, first)| &self.lines[first])
    }
}

/// Zip the blamed file's text with the commit attributed to each line.
///
/// `commits` may hold more entries than `contents` when the line splitter
/// counted a final segment with no text; those lines get
/// [`LINE_PLACEHOLDER`] as their text. More text lines than commits is an
/// `AttributionMismatch`.
pub fn materialize<T, C>(contents: &[T], commits: &[C]) -> Result<Vec<Line>>
where
    T: AsRef<str>,
    C: Borrow<Commit>,
{
    if contents.len() > commits.len() {
        return Err(Error::AttributionMismatch {
            lines: contents.len(),
            commits: commits.len(),
        });
    }

    Ok(commits
        .iter()
        .enumerate()
        .map(|(i, commit)| {
            let text = contents.get(i).map_or(LINE_PLACEHOLDER, |t| t.as_ref());
            Line::new(text, commit.borrow())
        })
        .collect())
}
