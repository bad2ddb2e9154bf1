//! Diff command implementation

use agentsync_core::{CategoryChanges, SyncSession};
use colored::Colorize;
use serde_json::json;

use crate::error::{CliError, Result};

/// Run the diff command
///
/// Classifies every target concurrently and prints what a sync would do.
pub async fn run_diff(session: &SyncSession, json_output: bool) -> Result<()> {
    let outcomes = session.diff_all().await;

    if json_output {
        let entries: Vec<_> = outcomes
            .iter()
            .map(|outcome| match &outcome.result {
                Ok(change_set) => json!({"target": outcome.target, "changes": change_set}),
                Err(e) => json!({"target": outcome.target, "error": e.to_string()}),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let mut failed = 0;
    for outcome in &outcomes {
        println!(
            "{} {} ({})",
            "=>".blue().bold(),
            outcome.target.root.display(),
            outcome.target.kind.as_str().cyan()
        );
        match &outcome.result {
            Ok(change_set) if change_set.is_clean() => {
                println!("   {} Everything up to date.", "OK".green().bold());
            }
            Ok(change_set) => {
                for (category, changes) in change_set.iter() {
                    print_category(category.as_str(), changes);
                }
            }
            Err(e) => {
                failed += 1;
                println!("   {} {}", "FAILED".red().bold(), e);
            }
        }
        println!();
    }

    if failed > 0 {
        return Err(CliError::user(format!("{failed} target(s) could not be classified")));
    }
    Ok(())
}

pub(crate) fn print_category(name: &str, changes: &CategoryChanges) {
    println!(
        "   {}: {} missing, {} outdated, {} drifted, {} unchanged",
        name.bold(),
        changes.missing.len(),
        changes.outdated.len(),
        changes.drifted.len(),
        changes.unchanged()
    );
    for item in &changes.missing {
        println!("     {} {}", "+".green(), item);
    }
    for item in &changes.outdated {
        println!("     {} {}", "~".yellow(), item);
    }
    for item in &changes.drifted {
        println!("     {} {} {}", "!".red(), item, "(edited on target)".dimmed());
    }
}
