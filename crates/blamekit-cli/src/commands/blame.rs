//! Blame command implementation.

use super::{run_blame, LineRange, Target};
use anyhow::Result;
use blamekit_core::{BlameOptions, Line, MergeStrategy, LINE_PLACEHOLDER};
use colored::Colorize;
use std::collections::HashSet;

/// Run the blame command.
pub async fn run(
    target: Target,
    merge_strategy: MergeStrategy,
    range: Option<LineRange>,
    json: bool,
) -> Result<()> {
    if !json {
        eprintln!(
            "{} Blaming {} at {}",
            "→".blue(),
            target.path.display(),
            target.rev
        );
    }

    let options = BlameOptions::default().with_merge_strategy(merge_strategy);
    let mut result = run_blame(target, options).await?;

    let first_line = match range {
        Some(range) => {
            result.lines = result.line_range(range.start, range.end).to_vec();
            range.start
        }
        None => 1,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if result.lines.is_empty() {
        eprintln!("{} No lines to show", "⚠".yellow());
        return Ok(());
    }

    let author_width = result
        .lines
        .iter()
        .map(|l| l.author_name.chars().count())
        .max()
        .unwrap_or(0);
    let number_width = (first_line + result.lines.len() - 1).to_string().len();

    for (i, line) in result.lines.iter().enumerate() {
        println!("{}", format_row(line, first_line + i, author_width, number_width));
    }

    let commits: HashSet<_> = result.lines.iter().map(|l| l.origin).collect();
    eprintln!(
        "{} {} lines from {} commits",
        "✓".green(),
        result.lines.len(),
        commits.len()
    );

    Ok(())
}

fn format_row(line: &Line, number: usize, author_width: usize, number_width: usize) -> String {
    let text = if line.text == LINE_PLACEHOLDER { "" } else { line.text.as_str() };
    format!(
        "{} ({:<aw$} {} {:>nw$}) {}",
        line.origin.short().yellow(),
        line.author_name,
        line.author_time.format("%Y-%m-%d %H:%M:%S %z"),
        number,
        text,
        aw = author_width,
        nw = number_width
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use blamekit_core::{Commit, ObjectId, Signature};
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn test_format_row() {
        colored::control::set_override(false);
        let when = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, 12, 30, 0)
            .unwrap();
        let commit = Commit {
            id: "b029517f6300c2da0f4b651b8642506cd6aaf45d".parse::<ObjectId>().unwrap(),
            parents: Vec::new(),
            author: Signature::new("Ada", "ada@example.com", when),
            committer: Signature::new("Ada", "ada@example.com", when),
            message: "init".to_string(),
        };

        let row = format_row(&Line::new("let x = 1;", &commit), 7, 5, 2);
        assert_eq!(row, "b029517 (Ada   2024-03-01 12:30:00 +0100  7) let x = 1;");

        let row = format_row(&Line::new(LINE_PLACEHOLDER, &commit), 8, 3, 1);
        assert_eq!(row, "b029517 (Ada 2024-03-01 12:30:00 +0100 8) ");
    }
}
