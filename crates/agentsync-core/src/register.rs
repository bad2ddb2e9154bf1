//! Registration of remote tools with host applications
//!
//! Registrations are not written into target files by the executor. It
//! hands a [`RegistrationPlan`] back to the caller, and a registrar asks the
//! host application itself to register each tool.

use crate::registry::{Registry, read_target_registry};
use crate::target::Target;
use agentsync_adapters::{FormatAdapter, RegistrationCommand};
use async_trait::async_trait;
use serde::Serialize;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// Canonical remote-tool definitions to register, keyed by name.
pub type RegistrationPlan = Registry;

pub const DEFAULT_REGISTRATION_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegistrationStatus {
    Registered,
    AlreadyRegistered,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationOutcome {
    pub name: String,
    pub status: RegistrationStatus,
}

impl RegistrationOutcome {
    pub fn failed(name: &str, reason: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: RegistrationStatus::Failed(reason.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, RegistrationStatus::Failed(_))
    }
}

/// Registers remote tools with a target's host application.
///
/// Failures are reported per tool in the outcome, never raised.
#[async_trait]
pub trait RemoteToolRegistrar: Send + Sync {
    async fn register(&self, target: &Target, plan: &RegistrationPlan) -> Vec<RegistrationOutcome>;
}

/// Runs the host's own CLI for each registration.
#[derive(Debug, Clone)]
pub struct CommandRegistrar {
    timeout: Duration,
}

impl Default for CommandRegistrar {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRATION_TIMEOUT)
    }
}

impl CommandRegistrar {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn register_one(
        &self,
        target: &Target,
        name: &str,
        definition: &serde_json::Value,
        replace: bool,
    ) -> RegistrationOutcome {
        let adapter = target.adapter();
        let commands = match commands_for(adapter, name, definition, replace) {
            Ok(commands) => commands,
            Err(e) => return RegistrationOutcome::failed(name, e.to_string()),
        };

        let mut last = None;
        for command in &commands {
            tracing::debug!(root = %target.root.display(), %command, "Running registration command");
            match self.run(target, command).await {
                Ok(output) => last = Some(output),
                Err(reason) => return RegistrationOutcome::failed(name, reason),
            }
        }
        let Some(output) = last else {
            return RegistrationOutcome::failed(name, "no registration command");
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let status = if adapter.is_already_registered(&stdout) || adapter.is_already_registered(&stderr) {
            RegistrationStatus::AlreadyRegistered
        } else if output.status.success() {
            RegistrationStatus::Registered
        } else {
            let code = output.status.code().unwrap_or(-1);
            RegistrationStatus::Failed(format!("exit code {code}: {}", stderr.trim()))
        };

        if let RegistrationStatus::Failed(reason) = &status {
            tracing::warn!(name = %name, reason = %reason, "Registration failed");
        }
        RegistrationOutcome {
            name: name.to_string(),
            status,
        }
    }

    async fn run(
        &self,
        target: &Target,
        command: &RegistrationCommand,
    ) -> std::result::Result<Output, String> {
        let output = Command::new(&command.program)
            .args(&command.args)
            .current_dir(&target.root)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.timeout, output).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(format!("could not run {}: {e}", command.program)),
            Err(_) => Err(format!("timed out after {}s", self.timeout.as_secs())),
        }
    }
}

/// Host commands that register `name`. A definition the host already knows
/// is removed first, since the hosts refuse to add over an existing entry.
fn commands_for(
    adapter: &dyn FormatAdapter,
    name: &str,
    definition: &serde_json::Value,
    replace: bool,
) -> agentsync_adapters::Result<Vec<RegistrationCommand>> {
    let add = adapter.registration_command_for(name, definition)?;
    if replace {
        Ok(vec![adapter.removal_command_for(name), add])
    } else {
        Ok(vec![add])
    }
}

#[async_trait]
impl RemoteToolRegistrar for CommandRegistrar {
    async fn register(&self, target: &Target, plan: &RegistrationPlan) -> Vec<RegistrationOutcome> {
        let registered = match read_target_registry(target) {
            Ok(registered) => registered,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read registered tools, adding without removal");
                Registry::new()
            }
        };

        let mut outcomes = Vec::with_capacity(plan.len());
        for (name, definition) in plan {
            let replace = registered.contains_key(name);
            outcomes.push(self.register_one(target, name, definition, replace).await);
        }
        outcomes
    }
}
