//! Sync and backport command implementations

use agentsync_core::{
    ApplyMode, BatchReport, CommandRegistrar, Error, ExecutorOptions, RegistrationStatus,
    SyncSession, TargetSyncReport,
};
use colored::Colorize;

use crate::commands::diff::print_category;
use crate::error::{CliError, Result};

/// Run the sync command
///
/// Applies missing and outdated items to every target. Drifted items are
/// left alone and listed unless `prune` is set.
pub async fn run_sync(session: &SyncSession, dry_run: bool, link: bool, prune: bool) -> Result<()> {
    let preferences = session.preferences();
    let options = ExecutorOptions {
        mode: ApplyMode::Forward,
        link: link || preferences.link,
        prune: prune || preferences.prune,
        dry_run,
    };
    apply(session, options).await
}

/// Run the backport command
///
/// Copies drifted target edits back into the source directory.
pub async fn run_backport(session: &SyncSession, dry_run: bool) -> Result<()> {
    let options = ExecutorOptions {
        mode: ApplyMode::Backport,
        dry_run,
        ..session.preferences().executor_options(ApplyMode::Backport)
    };
    apply(session, options).await
}

/// Run the apply command
///
/// Uses the apply mode, link and prune settings from the preferences file.
pub async fn run_apply(session: &SyncSession, dry_run: bool) -> Result<()> {
    let preferences = session.preferences();
    let options = ExecutorOptions {
        dry_run,
        ..preferences.executor_options(preferences.mode)
    };
    apply(session, options).await
}

async fn apply(session: &SyncSession, options: ExecutorOptions) -> Result<()> {
    let verb = match options.mode {
        ApplyMode::Forward => "Syncing",
        ApplyMode::Backport => "Backporting",
    };
    let suffix = if options.dry_run { " (dry run)" } else { "" };
    println!("{} {}{}...", "=>".blue().bold(), verb, suffix);
    println!();

    let registrar = CommandRegistrar::new(session.preferences().registration_timeout());
    let reports = session.apply_all(options, &registrar).await;

    let mut failed = 0;
    for report in &reports {
        if !print_report(report) {
            failed += 1;
        }
        println!();
    }

    if failed > 0 {
        return Err(CliError::user(format!(
            "{failed} of {} target(s) failed",
            reports.len()
        )));
    }
    Ok(())
}

/// Print one target's outcome. Returns whether it succeeded.
fn print_report(report: &TargetSyncReport) -> bool {
    println!(
        "{} {} ({})",
        "=>".blue().bold(),
        report.target.root.display(),
        report.target.kind.as_str().cyan()
    );

    let batch = match &report.batch {
        Ok(batch) => batch,
        Err(Error::RolledBack { reverted, source }) => {
            println!("   {} {}", "ROLLED BACK".red().bold(), source);
            for path in reverted {
                println!("     {} {}", "<".yellow(), path.display());
            }
            return false;
        }
        Err(e) => {
            println!("   {} {}", "FAILED".red().bold(), e);
            return false;
        }
    };

    if let Some(change_set) = &report.change_set {
        for (category, changes) in change_set.iter() {
            if !changes.is_clean() {
                print_category(category.as_str(), changes);
            }
        }
    }
    print_batch(batch);

    let mut ok = true;
    for outcome in &report.registrations {
        match &outcome.status {
            RegistrationStatus::Registered => {
                println!("   {} registered {}", "+".green(), outcome.name)
            }
            RegistrationStatus::AlreadyRegistered => {
                println!("   {} {} already registered", "=".dimmed(), outcome.name)
            }
            RegistrationStatus::Failed(reason) => {
                ok = false;
                println!("   {} {}: {}", "FAILED".red().bold(), outcome.name, reason)
            }
        }
    }
    ok
}

fn print_batch(batch: &BatchReport) {
    for action in &batch.actions {
        println!("   {} {}", "-".dimmed(), action);
    }
    for preview in &batch.previews {
        for line in preview.lines() {
            let line = if line.starts_with('+') && !line.starts_with("+++") {
                line.green()
            } else if line.starts_with('-') && !line.starts_with("---") {
                line.red()
            } else {
                line.normal()
            };
            println!("     {line}");
        }
    }

    if !batch.dry_run {
        let counts: Vec<String> = batch
            .applied
            .iter()
            .map(|(category, count)| format!("{count} {category}"))
            .collect();
        let summary = if counts.is_empty() {
            "nothing to apply".to_string()
        } else {
            counts.join(", ")
        };
        println!(
            "   {} {} item(s) applied ({})",
            "OK".green().bold(),
            batch.touched,
            summary
        );
    }

    if !batch.excluded_drifted.is_empty() {
        println!(
            "   {} Kept local edits newer than the source (use {} to overwrite or {} to pull them):",
            "DRIFTED".yellow().bold(),
            "--prune".cyan(),
            "backport".cyan()
        );
        for item in &batch.excluded_drifted {
            println!("     {} {} {}", "!".yellow(), item.category, item.name);
        }
    }
    for warning in &batch.warnings {
        println!("   {} {}", "warning:".yellow(), warning);
    }
}
