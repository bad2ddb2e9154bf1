//! Protected-key merge of settings documents
//!
//! Merging is pure: it takes two parsed documents and returns the merged
//! document plus a description of what moved. Paths are dot-delimited key
//! paths from the document root (`permissions.allow`, `mcpServers.serena`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Prefixes the user owns on the target side.
pub const DEFAULT_PROTECTED_KEYS: &[&str] = &[
    "model",
    "permissions.allow",
    "permissions.deny",
    "permissions.ask",
    "hooks.PreToolUse",
    "env",
];

/// Registry-shaped keys merged name-wise instead of replaced.
pub const DEFAULT_ADDITIVE_KEYS: &[&str] = &["mcpServers"];

/// Which key paths the merge must never clobber, and which it unions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedKeySpec {
    pub protected: Vec<String>,
    pub additive: Vec<String>,
}

impl Default for ProtectedKeySpec {
    fn default() -> Self {
        Self {
            protected: DEFAULT_PROTECTED_KEYS.iter().map(|s| s.to_string()).collect(),
            additive: DEFAULT_ADDITIVE_KEYS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ProtectedKeySpec {
    pub fn new(
        protected: impl IntoIterator<Item = impl Into<String>>,
        additive: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            protected: protected.into_iter().map(Into::into).collect(),
            additive: additive.into_iter().map(Into::into).collect(),
        }
    }

    /// The same spec with every path rewritten by `rename`, for merging in a
    /// dialect whose keys are spelled differently.
    pub fn map_paths(&self, rename: impl Fn(&str) -> String) -> Self {
        Self {
            protected: self.protected.iter().map(|p| rename(p.as_str())).collect(),
            additive: self.additive.iter().map(|p| rename(p.as_str())).collect(),
        }
    }

    /// Whether `path` equals a protected prefix or lies beneath one.
    pub fn is_protected(&self, path: &str) -> bool {
        self.protected.iter().any(|prefix| is_within(path, prefix))
    }

    pub fn is_additive(&self, path: &str) -> bool {
        self.additive.iter().any(|key| key == path)
    }

    /// Protected prefixes strictly beneath `path` that exist in `value`,
    /// where `value` is the document node found at `path`.
    pub fn protected_below(&self, path: &str, value: &Value) -> Vec<String> {
        self.protected
            .iter()
            .filter_map(|prefix| {
                let rest = prefix.strip_prefix(path)?.strip_prefix('.')?;
                lookup(value, rest).map(|_| prefix.clone())
            })
            .collect()
    }
}

fn is_within(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('.'))
}

fn lookup<'a>(value: &'a Value, dotted: &str) -> Option<&'a Value> {
    dotted
        .split('.')
        .try_fold(value, |node, key| node.as_object()?.get(key))
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Replaced,
}

/// One key path the merge wrote into the target document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeChange {
    pub kind: ChangeKind,
    pub path: String,
}

impl fmt::Display for MergeChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ChangeKind::Added => write!(f, "+ {}", self.path),
            ChangeKind::Replaced => write!(f, "~ {}", self.path),
        }
    }
}

/// Outcome of a merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeResult {
    /// Whether the merged document differs from the target document
    pub updated: bool,
    pub changes: Vec<MergeChange>,
    /// Paths where the source disagreed but the target's value was kept
    pub preserved: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MergeEngine {
    spec: ProtectedKeySpec,
}

impl MergeEngine {
    pub fn new(spec: ProtectedKeySpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &ProtectedKeySpec {
        &self.spec
    }

    /// Merge `source` into `target`.
    ///
    /// A non-object document on either side is treated as empty.
    pub fn merge(&self, target: &Value, source: &Value) -> (Value, MergeResult) {
        let empty = Map::new();
        let target_map = target.as_object().unwrap_or(&empty);
        let source_map = source.as_object().unwrap_or(&empty);

        let mut result = MergeResult::default();
        let merged = Value::Object(self.merge_maps(target_map, source_map, "", &mut result));
        result.updated = merged != *target;
        (merged, result)
    }

    fn merge_maps(
        &self,
        target: &Map<String, Value>,
        source: &Map<String, Value>,
        prefix: &str,
        result: &mut MergeResult,
    ) -> Map<String, Value> {
        let mut merged = target.clone();

        for (key, source_value) in source {
            let path = join(prefix, key);
            let Some(target_value) = target.get(key) else {
                tracing::debug!(path = %path, "Introducing key");
                merged.insert(key.clone(), source_value.clone());
                result.changes.push(MergeChange {
                    kind: ChangeKind::Added,
                    path,
                });
                continue;
            };

            if self.spec.is_protected(&path) {
                if target_value != source_value {
                    tracing::warn!(path = %path, "Preserving protected key");
                    result.preserved.push(path);
                }
                continue;
            }

            match (target_value, source_value) {
                (Value::Object(t), Value::Object(s)) if self.spec.is_additive(&path) => {
                    let mut union = t.clone();
                    for (name, definition) in s {
                        let entry = join(&path, name);
                        if t.contains_key(name) {
                            if t.get(name) != Some(definition) {
                                tracing::debug!(path = %entry, "Keeping target entry");
                                result.preserved.push(entry);
                            }
                            continue;
                        }
                        tracing::info!(path = %entry, "Introducing registry entry");
                        union.insert(name.clone(), definition.clone());
                        result.changes.push(MergeChange {
                            kind: ChangeKind::Added,
                            path: entry,
                        });
                    }
                    merged.insert(key.clone(), Value::Object(union));
                }
                (Value::Object(t), Value::Object(s)) => {
                    let nested = self.merge_maps(t, s, &path, result);
                    merged.insert(key.clone(), Value::Object(nested));
                }
                _ if target_value == source_value => {}
                _ => {
                    let below = self.spec.protected_below(&path, target_value);
                    if below.is_empty() {
                        merged.insert(key.clone(), source_value.clone());
                        result.changes.push(MergeChange {
                            kind: ChangeKind::Replaced,
                            path,
                        });
                    } else {
                        tracing::warn!(
                            path = %path,
                            protected = ?below,
                            "Keeping target value that holds protected keys"
                        );
                        result.preserved.push(path);
                    }
                }
            }
        }

        merged
    }
}
