//! End-to-end scenarios: classify, apply, classify again
//!
//! Each scenario drives the public engine the way a caller would: build a
//! change set, execute a batch, then classify the result.

use agentsync_adapters::{Category, TargetKind};
use agentsync_core::{
    ApplyMode, Classification, DiffClassifier, ExecutorOptions, SyncExecutor, SyncPreferences,
    Target,
};
use agentsync_test_utils::mtime::{base_time, set_tree_mtime};
use agentsync_test_utils::{ProjectFixture, SourceFixture};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use std::time::Duration;

fn run(source: &SourceFixture, target: &Target, mode: ApplyMode) -> agentsync_core::BatchReport {
    let prefs = SyncPreferences::default();
    let change_set = prefs
        .classifier()
        .build_change_set(source.root(), target, &Category::ALL)
        .unwrap();
    SyncExecutor::new(
        source.root(),
        target.clone(),
        prefs.merge_engine(),
        prefs.executor_options(mode),
    )
    .execute(&change_set)
    .unwrap()
}

fn classification_of(
    source: &SourceFixture,
    target: &Target,
    category: Category,
    name: &str,
) -> Option<Classification> {
    DiffClassifier::default()
        .build_change_set(source.root(), target, &[category])
        .unwrap()
        .get(category)
        .and_then(|changes| changes.classification_of(name))
}

// =============================================================================
// Scenario A: a missing item is created, then reads as unchanged
// =============================================================================

#[test]
fn scenario_a_missing_item_is_created_then_unchanged() {
    let source = SourceFixture::new().extension("foo", &[("SKILL.md", "# foo"), ("lib/x.py", "x = 1")]);
    let project = ProjectFixture::claude();
    let target = Target::new(project.root(), TargetKind::Claude);

    assert_eq!(
        classification_of(&source, &target, Category::ExtensionBundle, "foo"),
        Some(Classification::Missing)
    );

    let report = run(&source, &target, ApplyMode::Forward);
    assert_eq!(report.touched, 1);
    project.assert_exists(".claude/skills/foo/lib/x.py");

    // `None` means the item was dropped from the change set as unchanged
    assert_eq!(
        classification_of(&source, &target, Category::ExtensionBundle, "foo"),
        None
    );
    let again = run(&source, &target, ApplyMode::Forward);
    assert_eq!(again.touched, 0);
}

// =============================================================================
// Scenario B: a newer target edit is preserved, then backported
// =============================================================================

#[test]
fn scenario_b_drifted_item_is_excluded_then_backported() {
    let source = SourceFixture::new().extension("bar", &[("SKILL.md", "# bar from source")]);
    let project = ProjectFixture::gemini();
    project.write(".gemini/skills/bar/SKILL.md", "# bar edited locally");
    set_tree_mtime(&source.path("extensions/bar"), base_time());
    set_tree_mtime(
        &project.path(".gemini/skills/bar"),
        base_time() + Duration::from_secs(10),
    );
    let target = Target::new(project.root(), TargetKind::Gemini);

    assert_eq!(
        classification_of(&source, &target, Category::ExtensionBundle, "bar"),
        Some(Classification::Drifted)
    );

    let forward = run(&source, &target, ApplyMode::Forward);
    assert_eq!(forward.touched, 0);
    assert_eq!(forward.excluded_drifted.len(), 1);
    assert_eq!(forward.excluded_drifted[0].name, "bar");
    assert_eq!(project.read(".gemini/skills/bar/SKILL.md"), "# bar edited locally");

    let backport = run(&source, &target, ApplyMode::Backport);
    assert_eq!(backport.touched, 1);
    assert_eq!(
        fs::read_to_string(source.path("extensions/bar/SKILL.md")).unwrap(),
        "# bar edited locally"
    );
    assert_eq!(
        classification_of(&source, &target, Category::ExtensionBundle, "bar"),
        None
    );
}

// =============================================================================
// Scenario C: a protected key survives the settings merge
// =============================================================================

#[test]
fn scenario_c_protected_model_key_survives_merge() {
    let source = SourceFixture::new().settings(
        "settings.json",
        &json!({"model": "y", "permissions": {"defaultMode": "acceptEdits"}}),
    );
    let project = ProjectFixture::claude();
    project.write_json(".claude/settings.json", &json!({"model": "x"}));
    set_tree_mtime(&project.path(".claude/settings.json"), base_time());
    let target = Target::new(project.root(), TargetKind::Claude);

    let report = run(&source, &target, ApplyMode::Forward);
    assert_eq!(report.touched, 1);

    let merged = project.read_json(".claude/settings.json");
    assert_eq!(merged["model"], "x");
    assert_eq!(merged["permissions"]["defaultMode"], "acceptEdits");
    assert!(report.actions.iter().any(|a| a.contains("Preserved model")));

    // The merged document is stable: the next run classifies it as unchanged
    assert_eq!(
        classification_of(&source, &target, Category::SharedSettings, "settings.json"),
        None
    );
}

#[test]
fn scenario_rollback_leaves_target_as_it_was() {
    let source = SourceFixture::new()
        .extension("one", &[("SKILL.md", "one")])
        .extension("two", &[("SKILL.md", "two")])
        .hook("guard.py", "new guard");
    let project = ProjectFixture::claude();
    project.write(".claude/hooks/guard.py", "old guard");
    set_tree_mtime(&project.path(".claude/hooks/guard.py"), base_time());
    let hook_mtime = fs::metadata(project.path(".claude/hooks/guard.py"))
        .unwrap()
        .modified()
        .unwrap();
    let target = Target::new(project.root(), TargetKind::Claude);

    let prefs = SyncPreferences::default();
    let change_set = prefs
        .classifier()
        .build_change_set(source.root(), &target, &Category::ALL)
        .unwrap();
    // Hooks apply after bundles, so both bundles are written before this fails
    fs::remove_file(source.path("hooks/guard.py")).unwrap();

    let err = SyncExecutor::new(
        source.root(),
        target.clone(),
        prefs.merge_engine(),
        ExecutorOptions::default(),
    )
    .execute(&change_set)
    .unwrap_err();

    match err {
        agentsync_core::Error::RolledBack { reverted, .. } => assert_eq!(reverted.len(), 3),
        other => panic!("expected rollback, got {other:?}"),
    }
    project.assert_not_exists(".claude/skills/one");
    project.assert_not_exists(".claude/skills/two");
    assert_eq!(project.read(".claude/hooks/guard.py"), "old guard");
    assert_eq!(
        fs::metadata(project.path(".claude/hooks/guard.py"))
            .unwrap()
            .modified()
            .unwrap(),
        hook_mtime
    );
}
