//! The capability interface every host adapter implements

use crate::category::Category;
use crate::error::Result;
use crate::kind::TargetKind;
use serde_json::Value;
use std::path::PathBuf;

/// Direction of a dialect translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Host dialect -> canonical dialect (before merge)
    ToCanonical,
    /// Canonical dialect -> host dialect (after merge)
    FromCanonical,
}

/// Where a host keeps its remote-tool registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryLocation {
    /// Document path relative to the target root
    pub path: PathBuf,
    /// Top-level key holding the name -> definition map
    pub key: &'static str,
}

/// A fully-formed registration invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl RegistrationCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl std::fmt::Display for RegistrationCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Per-host translation of paths, field names and registration commands.
///
/// The core never inspects a target's directory name to decide how to talk to
/// it; it asks the adapter selected for the target's [`TargetKind`].
pub trait FormatAdapter: Send + Sync {
    /// The host this adapter speaks for.
    fn kind(&self) -> TargetKind;

    /// Directory, relative to the target root, holding a directory-backed
    /// category's artifacts. `None` for categories that are not stored as
    /// plain files on the target.
    fn category_dir(&self, category: Category) -> Option<PathBuf>;

    /// Target-relative path of a shared settings document named `doc_name`
    /// in the source (`settings/<doc_name>`).
    fn translate_settings_path(&self, doc_name: &str) -> PathBuf;

    /// Rename keys and values of a settings document between dialects.
    fn translate_field_names(&self, doc: Value, direction: Direction) -> Value;

    /// Translate a dot-delimited settings key path such as `hooks.PreToolUse`.
    fn translate_key_path(&self, path: &str, _direction: Direction) -> String {
        path.to_string()
    }

    /// Translate a single remote-tool definition between dialects.
    fn translate_registry_entry(&self, definition: Value, _direction: Direction) -> Value {
        definition
    }

    /// Where registered remote tools can be read back from.
    fn registry_location(&self) -> RegistryLocation;

    /// Build the host command that registers `name` with a canonical `definition`.
    fn registration_command_for(&self, name: &str, definition: &Value)
    -> Result<RegistrationCommand>;

    /// Build the host command that unregisters `name`, run before
    /// re-registering a changed definition.
    fn removal_command_for(&self, name: &str) -> RegistrationCommand;

    /// Whether command output reports that `name` was already registered.
    fn is_already_registered(&self, output: &str) -> bool {
        output.to_lowercase().contains("already exists")
    }
}
