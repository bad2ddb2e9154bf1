//! Remote-tool registry documents on both sides of a sync

use crate::classify::Classification;
use crate::settings::{read_json, render_json};
use crate::target::Target;
use crate::{Error, Result};
use agentsync_adapters::{Direction, normalize_definition};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Remote-tool definitions keyed by name, in the canonical dialect.
pub type Registry = BTreeMap<String, Value>;

const WRAPPER_KEY: &str = "mcpServers";

pub fn source_registry_path(source_root: &Path) -> PathBuf {
    source_root.join("mcp.json")
}

/// Read the source registry. Accepts either a flat name-keyed object or one
/// wrapped under `mcpServers`. A missing document is an empty registry.
pub fn read_source_registry(source_root: &Path) -> Result<Registry> {
    let path = source_registry_path(source_root);
    let doc = match read_json(&path) {
        Ok(doc) => doc,
        Err(e) if e.is_not_found() => return Ok(Registry::new()),
        Err(e) => return Err(e),
    };
    let servers = match doc {
        Value::Object(mut map) => match map.remove(WRAPPER_KEY) {
            Some(Value::Object(inner)) => inner,
            Some(_) => return Err(invalid(&path, "`mcpServers` must be an object")),
            None => map,
        },
        _ => return Err(invalid(&path, "registry must be a JSON object")),
    };
    Ok(servers.into_iter().collect())
}

/// Read a target's registry and translate every entry to the canonical dialect.
pub fn read_target_registry(target: &Target) -> Result<Registry> {
    let adapter = target.adapter();
    let location = adapter.registry_location();
    let path = target.root.join(&location.path);
    let doc = match read_json(&path) {
        Ok(doc) => doc,
        Err(e) if e.is_not_found() => return Ok(Registry::new()),
        Err(e) => return Err(e),
    };

    let Some(servers) = doc.get(location.key) else {
        return Ok(Registry::new());
    };
    let servers = servers
        .as_object()
        .ok_or_else(|| invalid(&path, "registry key must hold an object"))?;

    Ok(servers
        .iter()
        .map(|(name, def)| {
            let canonical = adapter.translate_registry_entry(def.clone(), Direction::ToCanonical);
            (name.clone(), canonical)
        })
        .collect())
}

/// Classify one source-side registration against the target registry.
pub fn classify_registration(name: &str, source: &Value, target: &Registry) -> Classification {
    match target.get(name) {
        None => Classification::Missing,
        Some(existing) if normalize_definition(existing) == normalize_definition(source) => {
            Classification::Unchanged
        }
        Some(_) => Classification::Drifted,
    }
}

/// Render the source registry with `entries` added, keeping its shape and
/// every other entry.
pub fn render_source_registry(source_root: &Path, entries: &Registry) -> Result<String> {
    let path = source_registry_path(source_root);
    let mut doc = match read_json(&path) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return Err(invalid(&path, "registry must be a JSON object")),
        Err(e) if e.is_not_found() => Map::new(),
        Err(e) => return Err(e),
    };

    let servers = if doc.contains_key(WRAPPER_KEY) {
        match doc.get_mut(WRAPPER_KEY) {
            Some(Value::Object(inner)) => inner,
            _ => return Err(invalid(&path, "`mcpServers` must be an object")),
        }
    } else {
        &mut doc
    };
    for (name, definition) in entries {
        servers.insert(name.clone(), definition.clone());
    }

    render_json(&Value::Object(doc))
}

fn invalid(path: &Path, reason: &str) -> Error {
    Error::InvalidDocument {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
