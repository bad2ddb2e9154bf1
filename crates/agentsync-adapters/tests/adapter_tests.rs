//! Behaviour shared by every host adapter

use agentsync_adapters::{Category, Direction, TargetKind, normalize_definition};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use std::path::PathBuf;

fn round_trip(kind: TargetKind, definition: &Value) -> Value {
    let adapter = kind.adapter();
    let host = adapter.translate_registry_entry(definition.clone(), Direction::FromCanonical);
    adapter.translate_registry_entry(host, Direction::ToCanonical)
}

#[rstest]
#[case::stdio_explicit(json!({"type": "stdio", "command": "uvx", "args": ["serena"]}))]
#[case::stdio_implicit(json!({"command": "npx", "env": {"TOKEN": "abc"}}))]
#[case::http(json!({"type": "http", "url": "https://api.example.com/mcp"}))]
#[case::sse(json!({"type": "sse", "url": "https://api.example.com/sse"}))]
fn test_registry_entries_survive_translation(
    #[values(TargetKind::Claude, TargetKind::Gemini)] kind: TargetKind,
    #[case] definition: Value,
) {
    assert_eq!(
        normalize_definition(&round_trip(kind, &definition)),
        normalize_definition(&definition)
    );
}

#[rstest]
#[case(TargetKind::Claude, ".claude")]
#[case(TargetKind::Gemini, ".gemini")]
fn test_file_categories_live_under_marker_dir(#[case] kind: TargetKind, #[case] marker: &str) {
    let adapter = kind.adapter();
    assert_eq!(
        adapter.category_dir(Category::ExtensionBundle),
        Some(PathBuf::from(marker).join("skills"))
    );
    assert_eq!(
        adapter.category_dir(Category::HookScript),
        Some(PathBuf::from(marker).join("hooks"))
    );
    assert_eq!(adapter.category_dir(Category::SharedSettings), None);
    assert_eq!(adapter.category_dir(Category::RemoteToolRegistration), None);
    assert_eq!(
        adapter.translate_settings_path("settings.json"),
        PathBuf::from(marker).join("settings.json")
    );
}

#[rstest]
fn test_registration_commands_name_the_tool(
    #[values(TargetKind::Claude, TargetKind::Gemini)] kind: TargetKind,
) {
    let cmd = kind
        .adapter()
        .registration_command_for("serena", &json!({"command": "uvx", "args": ["serena"]}))
        .unwrap();
    assert_eq!(cmd.program, kind.as_str());
    assert!(cmd.args.iter().any(|a| a == "serena"));
    assert!(cmd.args.iter().any(|a| a == "project"));
}

#[test]
fn test_settings_without_hooks_pass_through_unchanged() {
    let doc = json!({"model": "opus", "env": {"DEBUG": "1"}});
    for kind in TargetKind::ALL {
        let adapter = kind.adapter();
        assert_eq!(
            adapter.translate_field_names(doc.clone(), Direction::FromCanonical),
            doc
        );
        assert_eq!(
            adapter.translate_field_names(doc.clone(), Direction::ToCanonical),
            doc
        );
    }
}
