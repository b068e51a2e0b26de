//! Blamekit CLI
//!
//! Command-line interface for blaming files in git repositories.

use anyhow::Result;
use blamekit_core::{BinaryPolicy, MergeStrategy};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{LineRange, Target};

#[derive(Parser)]
#[command(name = "blamekit")]
#[command(author, version, about = "Who wrote this line, and when", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the commit that last changed each line of a file
    Blame {
        /// File to blame
        path: PathBuf,

        /// Revision to blame at
        #[arg(short, long, default_value = "HEAD")]
        rev: String,

        /// Repository path (defaults to the current directory)
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Only show lines START:END (1-indexed, inclusive)
        #[arg(short = 'L', long, value_parser = commands::parse_range)]
        lines: Option<LineRange>,

        /// Parent order for merges: priority or first-parent
        #[arg(long, default_value = "priority", value_parser = parse_merge_strategy)]
        merge_strategy: MergeStrategy,

        /// Binary content handling: lossy or reject
        #[arg(long, default_value = "lossy", value_parser = parse_binary_policy)]
        binary: BinaryPolicy,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how many lines of a file each author owns
    Authors {
        /// File to inspect
        path: PathBuf,

        /// Revision to blame at
        #[arg(short, long, default_value = "HEAD")]
        rev: String,

        /// Repository path (defaults to the current directory)
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Binary content handling: lossy or reject
        #[arg(long, default_value = "lossy", value_parser = parse_binary_policy)]
        binary: BinaryPolicy,
    },
}

fn parse_merge_strategy(s: &str) -> std::result::Result<MergeStrategy, String> {
    MergeStrategy::from_str(s).ok_or_else(|| format!("unknown merge strategy '{}'", s))
}

fn parse_binary_policy(s: &str) -> std::result::Result<BinaryPolicy, String> {
    BinaryPolicy::from_str(s).ok_or_else(|| format!("unknown binary policy '{}'", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging on stderr so stdout stays machine-readable
    let filter = if cli.verbose { "blamekit=debug" } else { "blamekit=info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Blame {
            path,
            rev,
            repo,
            lines,
            merge_strategy,
            binary,
            json,
        } => {
            let target = Target { repo, rev, path, binary };
            commands::blame::run(target, merge_strategy, lines, json).await?;
        }
        Commands::Authors {
            path,
            rev,
            repo,
            binary,
        } => {
            let target = Target { repo, rev, path, binary };
            commands::authors::run(target).await?;
        }
    }

    Ok(())
}
