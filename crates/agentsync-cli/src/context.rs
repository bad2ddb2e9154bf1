//! Resolving preferences, source and targets for a command

use crate::cli::Cli;
use crate::error::{CliError, Result};
use agentsync_core::{SyncPreferences, SyncSession, Target, TargetDecl};
use std::path::{Path, PathBuf};

/// Build the session a command runs against.
///
/// Command-line flags win over preferences. Without any declared target, the
/// current directory is searched for host marker directories.
pub fn session(cli: &Cli, cwd: &Path) -> Result<SyncSession> {
    let preferences = load_preferences(cli.config.as_deref())?;

    let source = cli
        .source
        .clone()
        .or_else(|| preferences.source.clone())
        .ok_or_else(|| {
            CliError::user("No source directory: pass --source or set `source` in preferences")
        })?;
    let source = canonical(&cwd.join(source), "Source directory")?;

    let decls: Vec<TargetDecl> = if cli.targets.is_empty() {
        preferences.targets.clone()
    } else {
        cli.targets.clone()
    };
    let targets = if decls.is_empty() {
        Target::discover(cwd)
    } else {
        let mut targets = Vec::new();
        for decl in decls {
            let decl = TargetDecl {
                path: canonical(&cwd.join(&decl.path), "Target directory")?,
                kind: decl.kind,
            };
            let resolved = decl.resolve();
            if resolved.is_empty() {
                return Err(CliError::user(format!(
                    "No .claude or .gemini directory in {}; prefix the target with its kind",
                    decl.path.display()
                )));
            }
            targets.extend(resolved);
        }
        targets
    };

    if targets.is_empty() {
        return Err(CliError::user(
            "No targets: pass --target or run inside a project with .claude or .gemini",
        ));
    }

    tracing::debug!(source = %source.display(), targets = targets.len(), "Resolved session");
    Ok(SyncSession::new(source, targets, preferences))
}

fn load_preferences(explicit: Option<&Path>) -> Result<SyncPreferences> {
    match explicit {
        Some(path) => Ok(SyncPreferences::load(path)?),
        None => match SyncPreferences::default_path() {
            Some(path) => Ok(SyncPreferences::load(&path)?),
            None => Ok(SyncPreferences::default()),
        },
    }
}

fn canonical(path: &Path, what: &str) -> Result<PathBuf> {
    dunce::canonicalize(path)
        .map_err(|_| CliError::user(format!("{what} does not exist: {}", path.display())))
}
