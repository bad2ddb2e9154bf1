//! Claude Code adapter.
//!
//! Claude speaks the canonical dialect, so field translation is the identity.
//! Artifacts live under `.claude/`, remote tools in the project `.mcp.json`.

use crate::adapter::{Direction, FormatAdapter, RegistrationCommand, RegistryLocation};
use crate::category::Category;
use crate::error::{Error, Result};
use crate::kind::TargetKind;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Default, Clone, Copy)]
pub struct ClaudeAdapter;

impl FormatAdapter for ClaudeAdapter {
    fn kind(&self) -> TargetKind {
        TargetKind::Claude
    }

    fn category_dir(&self, category: Category) -> Option<PathBuf> {
        match category {
            Category::ExtensionBundle => Some(PathBuf::from(".claude/skills")),
            Category::HookScript => Some(PathBuf::from(".claude/hooks")),
            Category::SharedSettings | Category::RemoteToolRegistration => None,
        }
    }

    fn translate_settings_path(&self, doc_name: &str) -> PathBuf {
        PathBuf::from(".claude").join(doc_name)
    }

    fn translate_field_names(&self, doc: Value, _direction: Direction) -> Value {
        doc
    }

    fn registry_location(&self) -> RegistryLocation {
        RegistryLocation {
            path: PathBuf::from(".mcp.json"),
            key: "mcpServers",
        }
    }

    fn registration_command_for(
        &self,
        name: &str,
        definition: &Value,
    ) -> Result<RegistrationCommand> {
        if !definition.is_object() {
            return Err(Error::InvalidDefinition {
                name: name.to_string(),
                reason: "definition must be a JSON object".into(),
            });
        }
        Ok(RegistrationCommand::new("claude")
            .args(["mcp", "add-json", "--scope", "project"])
            .arg(name)
            .arg(definition.to_string()))
    }

    fn removal_command_for(&self, name: &str) -> RegistrationCommand {
        RegistrationCommand::new("claude")
            .args(["mcp", "remove", "--scope", "project"])
            .arg(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn settings_path_lives_under_dot_claude() {
        assert_eq!(
            ClaudeAdapter.translate_settings_path("settings.json"),
            PathBuf::from(".claude/settings.json")
        );
    }

    #[test]
    fn field_translation_is_identity() {
        let doc = json!({"hooks": {"PreToolUse": []}, "model": "opus"});
        assert_eq!(
            ClaudeAdapter.translate_field_names(doc.clone(), Direction::FromCanonical),
            doc
        );
    }

    #[test]
    fn registration_uses_add_json() {
        let def = json!({"command": "uvx", "args": ["serena"]});
        let cmd = ClaudeAdapter.registration_command_for("serena", &def).unwrap();
        assert_eq!(cmd.program, "claude");
        assert_eq!(
            cmd.args,
            vec!["mcp", "add-json", "--scope", "project", "serena", &def.to_string()]
        );
    }

    #[test]
    fn removal_is_project_scoped() {
        let cmd = ClaudeAdapter.removal_command_for("serena");
        assert_eq!(cmd.args, vec!["mcp", "remove", "--scope", "project", "serena"]);
    }

    #[test]
    fn registration_rejects_non_object() {
        assert!(ClaudeAdapter
            .registration_command_for("bad", &json!("uvx"))
            .is_err());
    }

    #[test]
    fn already_registered_detection() {
        assert!(ClaudeAdapter.is_already_registered("MCP server serena already exists in .mcp.json"));
        assert!(!ClaudeAdapter.is_already_registered("Added stdio MCP server serena"));
    }
}
