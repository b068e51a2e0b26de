//! Line-level alignment between two versions of a file.
//!
//! Lines are interned and the common prefix is matched directly. What is
//! left is solved exactly with a longest-common-subsequence table while the
//! table stays within [`DiffOptions::max_dp_cells`]. Larger regions go to
//! `imara-diff`'s Myers implementation, whose hunks are then slid toward
//! earlier lines.
//!
//! Whenever several alignments are equally good the one keeping earlier lines
//! of the newer sequence unchanged wins.

use imara_diff::{Algorithm, Diff, InternedInput, TokenSource};
use std::collections::HashMap;
use std::ops::Range;

/// Default upper bound on the LCS table for one region.
pub const DEFAULT_MAX_DP_CELLS: usize = 4_000_000;

/// How a line of the newer sequence relates to the older sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineMatch {
    /// Identical to the older line at this index.
    Unchanged(usize),
    /// Added or modified.
    Changed,
}

/// Tuning for [`diff_lines_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffOptions {
    /// Largest LCS table (older lines × newer lines) built for a region.
    pub max_dp_cells: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            max_dp_cells: DEFAULT_MAX_DP_CELLS,
        }
    }
}

impl DiffOptions {
    /// Set the LCS table bound.
    pub fn with_max_dp_cells(mut self, cells: usize) -> Self {
        self.max_dp_cells = cells;
        self
    }
}

/// Align `newer` against `older` with default options.
pub fn diff_lines<A: AsRef<str>, B: AsRef<str>>(older: &[A], newer: &[B]) -> Vec<LineMatch> {
    diff_lines_with(older, newer, &DiffOptions::default())
}

/// Align `newer` against `older`, returning one entry per line of `newer`.
pub fn diff_lines_with<A: AsRef<str>, B: AsRef<str>>(
    older: &[A],
    newer: &[B],
    options: &DiffOptions,
) -> Vec<LineMatch> {
    let (a, b) = intern(older, newer);
    let mut out = vec![LineMatch::Changed; b.len()];

    // Common prefix. There is no suffix counterpart: trimming from the end
    // would claim trailing duplicates before earlier ones.
    let prefix = a.iter().zip(&b).take_while(|(x, y)| x == y).count();
    for (i, slot) in out.iter_mut().enumerate().take(prefix) {
        *slot = LineMatch::Unchanged(i);
    }

    let (ar, br) = (prefix..a.len(), prefix..b.len());
    if ar.is_empty() || br.is_empty() {
        return out;
    }

    if ar.len().saturating_mul(br.len()) <= options.max_dp_cells {
        lcs_region(&a, &b, ar, br, &mut out);
    } else {
        tracing::trace!(
            "Region {}x{} exceeds LCS bound, using Myers",
            ar.len(),
            br.len()
        );
        myers_region(&a, &b, ar, br, &mut out);
        prefer_leftmost(&a, &b, &mut out);
    }
    out
}

/// Number of lines in `matches` that are unchanged.
pub fn unchanged_count(matches: &[LineMatch]) -> usize {
    matches
        .iter()
        .filter(|m| matches!(m, LineMatch::Unchanged(_)))
        .count()
}

/// Map every distinct line to a small integer so comparisons are cheap.
fn intern<A: AsRef<str>, B: AsRef<str>>(older: &[A], newer: &[B]) -> (Vec<u32>, Vec<u32>) {
    let mut ids: HashMap<&str, u32> = HashMap::with_capacity(older.len() + newer.len());

    let mut a = Vec::with_capacity(older.len());
    for line in older {
        let next = ids.len() as u32;
        a.push(*ids.entry(line.as_ref()).or_insert(next));
    }
    let mut b = Vec::with_capacity(newer.len());
    for line in newer {
        let next = ids.len() as u32;
        b.push(*ids.entry(line.as_ref()).or_insert(next));
    }
    (a, b)
}

/// Interned lines fed to `imara-diff`.
struct Tokens<'a>(&'a [u32]);

impl<'a> TokenSource for Tokens<'a> {
    type Token = u32;
    type Tokenizer = std::iter::Copied<std::slice::Iter<'a, u32>>;

    fn tokenize(&self) -> Self::Tokenizer {
        self.0.iter().copied()
    }

    fn estimate_tokens(&self) -> u32 {
        self.0.len() as u32
    }
}

/// Exact LCS over a region, preferring to keep earlier newer lines.
fn lcs_region(a: &[u32], b: &[u32], ar: Range<usize>, br: Range<usize>, out: &mut [LineMatch]) {
    let (n, m) = (ar.len(), br.len());
    let a = &a[ar.clone()];
    let b = &b[br.clone()];
    let width = m + 1;

    // table[i * width + j] = LCS length of a[i..] and b[j..]
    let mut table = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i * width + j] = if a[i] == b[j] {
                table[(i + 1) * width + j + 1] + 1
            } else {
                table[(i + 1) * width + j].max(table[i * width + j + 1])
            };
        }
    }

    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            out[br.start + j] = LineMatch::Unchanged(ar.start + i);
            i += 1;
            j += 1;
        } else if table[(i + 1) * width + j] >= table[i * width + j + 1] {
            // Dropping the older line keeps b[j] available for a match.
            i += 1;
        } else {
            j += 1;
        }
    }
}

/// Myers alignment of a region; lines between hunks are unchanged.
fn myers_region(a: &[u32], b: &[u32], ar: Range<usize>, br: Range<usize>, out: &mut [LineMatch]) {
    let input = InternedInput::new(Tokens(&a[ar.clone()]), Tokens(&b[br.clone()]));
    let diff = Diff::compute(Algorithm::Myers, &input);

    let (mut ai, mut bi) = (0usize, 0usize);
    let mut keep_until = |ai: &mut usize, bi: &mut usize, end: usize| {
        while *bi < end {
            out[br.start + *bi] = LineMatch::Unchanged(ar.start + *ai);
            *ai += 1;
            *bi += 1;
        }
    };
    for hunk in diff.hunks() {
        keep_until(&mut ai, &mut bi, hunk.after.start as usize);
        ai = hunk.before.end as usize;
        bi = hunk.after.end as usize;
    }
    keep_until(&mut ai, &mut bi, br.len());
}

/// Move matches onto the earliest equal line without changing their number.
///
/// On the newer side a match slides back over the run of changed lines before
/// it onto the first one with the same text. On the older side each match is
/// rebound to the first equal older line after the previous match.
fn prefer_leftmost(a: &[u32], b: &[u32], out: &mut [LineMatch]) {
    let mut run_start: Option<usize> = None;
    for j in 0..out.len() {
        let LineMatch::Unchanged(k) = out[j] else {
            run_start.get_or_insert(j);
            continue;
        };
        let Some(start) = run_start.take() else {
            continue;
        };
        if let Some(i) = (start..j).find(|&i| b[i] == b[j]) {
            out[i] = LineMatch::Unchanged(k);
            out[j] = LineMatch::Changed;
            run_start = Some(i + 1);
        }
    }

    let mut next_older = 0;
    for m in out.iter_mut() {
        if let LineMatch::Unchanged(k) = *m {
            let k = (next_older..k).find(|&p| a[p] == a[k]).unwrap_or(k);
            *m = LineMatch::Unchanged(k);
            next_older = k + 1;
        }
    }
}
