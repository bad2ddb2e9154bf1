//! Gemini CLI adapter.
//!
//! Gemini names hook events and built-in tools differently, uses
//! `GEMINI_PROJECT_DIR` in hook commands, and distinguishes transports by
//! field name (`httpUrl` for streamable HTTP, `url` for SSE) rather than by a
//! `type` field. Remote tools are registered inside `.gemini/settings.json`.

use crate::adapter::{Direction, FormatAdapter, RegistrationCommand, RegistryLocation};
use crate::category::Category;
use crate::dialect::{self, NameTable};
use crate::error::{Error, Result};
use crate::kind::TargetKind;
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Hook event names, `(canonical, gemini)`.
const HOOK_EVENTS: NameTable = &[
    ("PreToolUse", "BeforeTool"),
    ("PostToolUse", "AfterTool"),
    ("UserPromptSubmit", "BeforeAgent"),
    ("Stop", "AfterAgent"),
    ("PreCompact", "PreCompress"),
    ("SessionStart", "SessionStart"),
    ("SessionEnd", "SessionEnd"),
    ("Notification", "Notification"),
];

/// Built-in tool names used in hook matchers, `(canonical, gemini)`.
const TOOL_NAMES: NameTable = &[
    ("Bash", "run_shell_command"),
    ("Read", "read_file"),
    ("Write", "write_file"),
    ("Edit", "replace"),
    ("Glob", "glob"),
    ("Grep", "search_file_content"),
    ("WebFetch", "web_fetch"),
    ("WebSearch", "google_web_search"),
];

/// Substrings rewritten inside hook commands, `(canonical, gemini)`.
const COMMAND_PATHS: NameTable = &[
    ("$CLAUDE_PROJECT_DIR", "$GEMINI_PROJECT_DIR"),
    ("${CLAUDE_PROJECT_DIR}", "${GEMINI_PROJECT_DIR}"),
    (".claude/", ".gemini/"),
];

const SERVERS_KEY: &str = "mcpServers";

#[derive(Debug, Default, Clone, Copy)]
pub struct GeminiAdapter;

impl GeminiAdapter {
    fn translate_hooks(hooks: Map<String, Value>, direction: Direction) -> Map<String, Value> {
        dialect::rename_keys(HOOK_EVENTS, hooks, direction)
            .into_iter()
            .map(|(event, groups)| (event, Self::translate_hook_groups(groups, direction)))
            .collect()
    }

    fn translate_hook_groups(groups: Value, direction: Direction) -> Value {
        let Value::Array(groups) = groups else {
            return groups;
        };
        Value::Array(
            groups
                .into_iter()
                .map(|group| {
                    let Value::Object(mut group) = group else {
                        return group;
                    };
                    if let Some(Value::String(matcher)) = group.get("matcher") {
                        let renamed = dialect::rename_matcher(TOOL_NAMES, matcher, direction);
                        group.insert("matcher".into(), Value::String(renamed));
                    }
                    if let Some(Value::Array(handlers)) = group.get_mut("hooks") {
                        for handler in handlers.iter_mut() {
                            if let Some(Value::String(command)) = handler.get_mut("command") {
                                *command = dialect::replace_all(COMMAND_PATHS, command, direction);
                            }
                        }
                    }
                    Value::Object(group)
                })
                .collect(),
        )
    }
}

impl FormatAdapter for GeminiAdapter {
    fn kind(&self) -> TargetKind {
        TargetKind::Gemini
    }

    fn category_dir(&self, category: Category) -> Option<PathBuf> {
        match category {
            Category::ExtensionBundle => Some(PathBuf::from(".gemini/skills")),
            Category::HookScript => Some(PathBuf::from(".gemini/hooks")),
            Category::SharedSettings | Category::RemoteToolRegistration => None,
        }
    }

    fn translate_settings_path(&self, doc_name: &str) -> PathBuf {
        PathBuf::from(".gemini").join(doc_name)
    }

    fn translate_field_names(&self, doc: Value, direction: Direction) -> Value {
        let Value::Object(doc) = doc else {
            return doc;
        };
        let translated = doc
            .into_iter()
            .map(|(key, value)| {
                let value = match (key.as_str(), value) {
                    ("hooks", Value::Object(hooks)) => {
                        Value::Object(Self::translate_hooks(hooks, direction))
                    }
                    (SERVERS_KEY, Value::Object(servers)) => Value::Object(
                        servers
                            .into_iter()
                            .map(|(name, def)| (name, self.translate_registry_entry(def, direction)))
                            .collect(),
                    ),
                    (_, other) => other,
                };
                (key, value)
            })
            .collect();
        Value::Object(translated)
    }

    fn translate_registry_entry(&self, definition: Value, direction: Direction) -> Value {
        let Value::Object(mut def) = definition else {
            return definition;
        };
        match direction {
            Direction::FromCanonical => {
                let kind = def.remove("type");
                match kind.as_ref().and_then(Value::as_str) {
                    Some("http") if def.contains_key("url") => {
                        if let Some(url) = def.remove("url") {
                            def.insert("httpUrl".into(), url);
                        }
                    }
                    Some("http") | Some("sse") | Some("stdio") | None => {}
                    Some(_) => {
                        if let Some(kind) = kind {
                            def.insert("type".into(), kind);
                        }
                    }
                }
            }
            Direction::ToCanonical => {
                if let Some(url) = def.remove("httpUrl") {
                    def.insert("type".into(), Value::String("http".into()));
                    def.insert("url".into(), url);
                } else if def.contains_key("url") && !def.contains_key("type") {
                    def.insert("type".into(), Value::String("sse".into()));
                }
            }
        }
        Value::Object(def)
    }

    fn translate_key_path(&self, path: &str, direction: Direction) -> String {
        let mut segments: Vec<&str> = path.split('.').collect();
        if segments.len() >= 2 && segments[0] == "hooks" {
            segments[1] = dialect::rename(HOOK_EVENTS, segments[1], direction);
        }
        segments.join(".")
    }

    fn registry_location(&self) -> RegistryLocation {
        RegistryLocation {
            path: PathBuf::from(".gemini/settings.json"),
            key: SERVERS_KEY,
        }
    }

    fn registration_command_for(
        &self,
        name: &str,
        definition: &Value,
    ) -> Result<RegistrationCommand> {
        let invalid = |reason: &str| Error::InvalidDefinition {
            name: name.to_string(),
            reason: reason.to_string(),
        };
        let def = definition
            .as_object()
            .ok_or_else(|| invalid("definition must be a JSON object"))?;

        let mut cmd = RegistrationCommand::new("gemini").args(["mcp", "add", "--scope", "project"]);

        if let Some(Value::Object(env)) = def.get("env") {
            for (key, value) in env {
                let value = value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string());
                cmd = cmd.arg("-e").arg(format!("{}={}", key, value));
            }
        }
        if let Some(Value::Object(headers)) = def.get("headers") {
            for (key, value) in headers {
                let value = value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string());
                cmd = cmd.arg("-H").arg(format!("{}: {}", key, value));
            }
        }

        if let Some(command) = def.get("command").and_then(Value::as_str) {
            let args: Vec<String> = def
                .get("args")
                .and_then(Value::as_array)
                .map(|a| a.iter().filter_map(Value::as_str).map(str::to_string).collect())
                .unwrap_or_default();
            cmd = cmd.arg(name).arg(command);
            if args.iter().any(|a| a.starts_with('-')) {
                cmd = cmd.arg("--");
            }
            Ok(cmd.args(args))
        } else if let Some(url) = def.get("url").and_then(Value::as_str) {
            let transport = match def.get("type").and_then(Value::as_str) {
                Some("sse") => "sse",
                _ => "http",
            };
            Ok(cmd.args(["--transport", transport]).arg(name).arg(url))
        } else {
            Err(invalid("definition needs either a command or a url"))
        }
    }

    fn removal_command_for(&self, name: &str) -> RegistrationCommand {
        RegistrationCommand::new("gemini")
            .args(["mcp", "remove", "--scope", "project"])
            .arg(name)
    }
}
