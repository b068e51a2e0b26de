//! Authors command implementation.

use super::{run_blame, Target};
use anyhow::Result;
use blamekit_core::{AuthorShare, BlameOptions};
use colored::Colorize;

/// Run the authors command.
pub async fn run(target: Target) -> Result<()> {
    println!("{} Authors of {} at {}", "→".blue(), target.path.display(), target.rev);

    let result = run_blame(target, BlameOptions::default()).await?;
    let total = result.lines.len();
    if total == 0 {
        println!("{} File is empty", "⚠".yellow());
        return Ok(());
    }

    println!();
    for share in result.authors() {
        println!("  {}", format_share(&share, total));
    }
    println!();

    if let Some(primary) = result.primary_author() {
        println!("{} Primary author: {}", "✓".green(), primary.author().bold());
    }

    Ok(())
}

fn format_share(share: &AuthorShare, total: usize) -> String {
    let percent = share.lines as f64 * 100.0 / total as f64;
    let who = if share.email.is_empty() {
        share.name.clone()
    } else {
        format!("{} <{}>", share.name, share.email)
    };
    format!("{:>6} {:>5.1}%  {}", share.lines, percent, who)
}
