//! Settings documents: read, merge through the target's dialect, render

use crate::merge::{MergeEngine, MergeResult};
use crate::{Error, Result};
use agentsync_adapters::{Direction, FormatAdapter};
use serde_json::{Map, Value};
use similar::TextDiff;
use std::path::Path;

/// A settings merge computed ahead of the write.
#[derive(Debug, Clone)]
pub struct SettingsPlan {
    /// Target document text before the merge, empty when the document is absent
    pub before: String,
    /// Merged document in the target's dialect
    pub merged: Value,
    pub result: MergeResult,
}

impl SettingsPlan {
    pub fn render(&self) -> Result<String> {
        render_json(&self.merged)
    }

    /// Unified diff of the target document, for dry runs.
    pub fn unified_diff(&self, label: &str) -> Result<String> {
        let after = self.render()?;
        let diff = TextDiff::from_lines(self.before.as_str(), after.as_str());
        Ok(diff
            .unified_diff()
            .context_radius(3)
            .header(&format!("a/{label}"), &format!("b/{label}"))
            .to_string())
    }
}

/// Merge the canonical `source` document into the target document at
/// `target_path`.
///
/// The merge runs in the target's own dialect: the source document and the
/// protected and additive key paths are translated, the target document is
/// not, so every value the merge keeps is written back exactly as read.
pub fn plan_settings(
    engine: &MergeEngine,
    adapter: &dyn FormatAdapter,
    source_path: &Path,
    target_path: &Path,
) -> Result<SettingsPlan> {
    let source = adapter.translate_field_names(read_json(source_path)?, Direction::FromCanonical);
    let before = match agentsync_fs::io::read_text(target_path) {
        Ok(text) => text,
        Err(e) if e.is_not_found() => String::new(),
        Err(e) => return Err(e.into()),
    };
    let target = parse_json(target_path, &before)?;

    let host = MergeEngine::new(
        engine
            .spec()
            .map_paths(|path| adapter.translate_key_path(path, Direction::FromCanonical)),
    );
    let (merged, result) = host.merge(&target, &source);

    Ok(SettingsPlan {
        before,
        merged,
        result,
    })
}

/// Read the target document at `path` and translate it to the canonical
/// dialect, for writing back into the source tree.
pub fn canonical_document(adapter: &dyn FormatAdapter, path: &Path) -> Result<String> {
    let doc = read_json(path)?;
    render_json(&adapter.translate_field_names(doc, Direction::ToCanonical))
}

/// Read a JSON document. An empty file is an empty object.
pub fn read_json(path: &Path) -> Result<Value> {
    let text = agentsync_fs::io::read_text(path)?;
    parse_json(path, &text)
}

fn parse_json(path: &Path, text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_str(text).map_err(|e| Error::InvalidDocument {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

pub fn render_json(value: &Value) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    Ok(text)
}
