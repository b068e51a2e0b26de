//! CLI command implementations.

pub mod authors;
pub mod blame;

use anyhow::Result;
use blamekit_core::{AbortHandle, BinaryPolicy, BlameOptions, BlameResult};
use blamekit_git::GitRepository;
use colored::Colorize;
use std::path::PathBuf;

/// What to blame.
pub struct Target {
    pub repo: PathBuf,
    pub rev: String,
    pub path: PathBuf,
    pub binary: BinaryPolicy,
}

/// Inclusive 1-indexed line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

/// Parse `START:END`, `START:` or `START`.
pub fn parse_range(s: &str) -> std::result::Result<LineRange, String> {
    let parse = |v: &str| {
        v.trim()
            .parse::<usize>()
            .map_err(|_| format!("invalid line number '{}'", v))
    };

    let (start, end) = match s.split_once(':') {
        Some((start, "")) => (parse(start)?, usize::MAX),
        Some((start, end)) => (parse(start)?, parse(end)?),
        None => {
            let line = parse(s)?;
            (line, line)
        }
    };
    if start == 0 || end < start {
        return Err(format!("invalid line range '{}'", s));
    }
    Ok(LineRange { start, end })
}

/// Blame the target on a blocking worker; Ctrl-C aborts it.
pub async fn run_blame(target: Target, options: BlameOptions) -> Result<BlameResult> {
    let abort = AbortHandle::new();
    let options = options.with_abort(abort.clone());

    let mut task = tokio::task::spawn_blocking(move || -> Result<BlameResult> {
        let repo = GitRepository::open(&target.repo)?.with_binary_policy(target.binary);
        let path = repo.relative_path(&target.path);
        tracing::debug!("Blaming {} in {}", path, repo.root().display());
        Ok(repo.blame(&target.rev, &path, &options)?)
    });

    tokio::select! {
        result = &mut task => result?,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("{} Interrupted, stopping blame", "✗".red());
            abort.abort();
            task.await?
        }
    }
}
