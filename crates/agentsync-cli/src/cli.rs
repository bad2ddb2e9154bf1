//! CLI argument parsing using clap derive

use agentsync_adapters::TargetKind;
use agentsync_core::TargetDecl;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// agentsync - Keep agent configuration in sync across host applications
#[derive(Parser, Debug)]
#[command(name = "agentsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Preferences file (TOML, JSON or YAML)
    #[arg(long, global = true, env = "AGENTSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Source-of-truth directory
    #[arg(long, global = true)]
    pub source: Option<PathBuf>,

    /// Target directory, optionally prefixed with its kind (`gemini:./app`)
    #[arg(long = "target", global = true, value_parser = parse_target)]
    pub targets: Vec<TargetDecl>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show when each target was last synced
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Classify every artifact against every target
    Diff {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Push source artifacts to the targets
    Sync {
        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Symlink artifacts instead of copying them
        #[arg(long)]
        link: bool,

        /// Overwrite target items edited after the source
        #[arg(long)]
        prune: bool,
    },

    /// Apply in the mode stored in the preferences file
    Apply {
        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Pull drifted target edits back into the source
    Backport {
        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,
    },
}

/// Parse `KIND:DIR` or a bare `DIR`.
///
/// The prefix only counts as a kind when it names one, so a Windows drive
/// letter stays part of the path.
pub fn parse_target(value: &str) -> Result<TargetDecl, String> {
    if let Some((prefix, path)) = value.split_once(':')
        && let Ok(kind) = prefix.parse::<TargetKind>()
    {
        if path.is_empty() {
            return Err(format!("missing directory after `{prefix}:`"));
        }
        return Ok(TargetDecl {
            path: PathBuf::from(path),
            kind: Some(kind),
        });
    }
    Ok(TargetDecl {
        path: PathBuf::from(value),
        kind: None,
    })
}
