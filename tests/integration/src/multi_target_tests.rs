//! One source tree fanned out to a Claude and a Gemini project

use agentsync_adapters::{Category, TargetKind};
use agentsync_core::{CommandRegistrar, ExecutorOptions, SyncPreferences, SyncSession, Target};
use agentsync_test_utils::{ProjectFixture, SourceFixture};
use pretty_assertions::assert_eq;
use serde_json::json;

fn source() -> SourceFixture {
    SourceFixture::new()
        .extension("documenting", &[("SKILL.md", "# Documenting")])
        .hook("guard.py", "print('ok')")
        .settings(
            "settings.json",
            &json!({
                "hooks": {
                    "PreToolUse": [{
                        "matcher": "Bash",
                        "hooks": [{"type": "command", "command": "python3 .claude/hooks/guard.py"}]
                    }]
                }
            }),
        )
}

#[tokio::test]
async fn both_dialects_converge_after_one_sync() {
    let source = source();
    let claude = ProjectFixture::claude();
    let gemini = ProjectFixture::gemini();
    let targets = vec![
        Target::new(claude.root(), TargetKind::Claude),
        Target::new(gemini.root(), TargetKind::Gemini),
    ];
    let session = SyncSession::new(source.root(), targets, SyncPreferences::default());

    let reports = session
        .apply_all(ExecutorOptions::default(), &CommandRegistrar::default())
        .await;
    assert!(reports.iter().all(|r| r.is_success()));
    for report in &reports {
        assert_eq!(report.batch.as_ref().unwrap().touched, 3);
        assert!(report.registrations.is_empty());
    }

    claude.assert_exists(".claude/skills/documenting/SKILL.md");
    gemini.assert_exists(".gemini/skills/documenting/SKILL.md");
    gemini.assert_exists(".gemini/hooks/guard.py");

    let claude_settings = claude.read_json(".claude/settings.json");
    assert_eq!(claude_settings["hooks"]["PreToolUse"][0]["matcher"], "Bash");
    let gemini_settings = gemini.read_json(".gemini/settings.json");
    let before_tool = &gemini_settings["hooks"]["BeforeTool"][0];
    assert_eq!(before_tool["matcher"], "run_shell_command");
    assert_eq!(
        before_tool["hooks"][0]["command"],
        "python3 .gemini/hooks/guard.py"
    );

    for outcome in session.diff_all().await {
        let change_set = outcome.result.unwrap();
        assert!(change_set.is_clean(), "{} not clean: {change_set:?}", outcome.target);
        assert_eq!(
            change_set.get(Category::ExtensionBundle).unwrap().unchanged(),
            1
        );
    }

    for status in session.status_all() {
        let manifest = status.result.unwrap().expect("manifest written");
        assert_eq!(manifest.item_count, 3);
    }
}
