//! Status command implementation

use agentsync_core::SyncSession;
use colored::Colorize;
use serde_json::json;

use crate::error::Result;

/// Run the status command
///
/// Read-only: reports each target's manifest without classifying anything.
pub fn run_status(session: &SyncSession, json_output: bool) -> Result<()> {
    let statuses = session.status_all();

    if json_output {
        let entries: Vec<_> = statuses
            .iter()
            .map(|status| match &status.result {
                Ok(manifest) => json!({"target": status.target, "manifest": manifest}),
                Err(e) => json!({"target": status.target, "error": e.to_string()}),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("{}", "agentsync status".bold());
    println!();
    println!("{}: {}", "Source".dimmed(), session.source_root().display());
    println!();

    for status in &statuses {
        let label = format!("{:<7}", status.target.kind.as_str()).cyan();
        match &status.result {
            Ok(Some(manifest)) => println!(
                "  {} {} {} ({} items, {})",
                label,
                status.target.root.display(),
                "synced".green(),
                manifest.item_count,
                manifest.last_sync_timestamp.to_rfc3339()
            ),
            Ok(None) => println!(
                "  {} {} {}",
                label,
                status.target.root.display(),
                "never synced".yellow()
            ),
            Err(e) => println!(
                "  {} {} {}: {}",
                label,
                status.target.root.display(),
                "unreadable".red(),
                e
            ),
        }
    }

    Ok(())
}
