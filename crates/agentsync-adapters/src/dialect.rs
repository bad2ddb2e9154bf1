//! Name tables shared by adapters whose dialect differs from the canonical one

use crate::adapter::Direction;
use serde_json::{Map, Value};

/// A two-column rename table: `(canonical, host)`.
pub type NameTable = &'static [(&'static str, &'static str)];

/// Look up `name` in `table` for the given direction. Unknown names pass through.
pub fn rename<'a>(table: NameTable, name: &'a str, direction: Direction) -> &'a str {
    table
        .iter()
        .find_map(|(canonical, host)| match direction {
            Direction::FromCanonical if *canonical == name => Some(*host),
            Direction::ToCanonical if *host == name => Some(*canonical),
            _ => None,
        })
        .unwrap_or(name)
}

/// Rename every `|`-separated alternative of a hook matcher, keeping the
/// whitespace around each alternative.
pub fn rename_matcher(table: NameTable, matcher: &str, direction: Direction) -> String {
    matcher
        .split('|')
        .map(|part| {
            let name = part.trim();
            let start = part.len() - part.trim_start().len();
            let end = start + name.len();
            format!("{}{}{}", &part[..start], rename(table, name, direction), &part[end..])
        })
        .collect::<Vec<_>>()
        .join("|")
}

/// Rename the keys of a JSON object, keeping order.
pub fn rename_keys(table: NameTable, map: Map<String, Value>, direction: Direction) -> Map<String, Value> {
    map.into_iter()
        .map(|(key, value)| (rename(table, &key, direction).to_string(), value))
        .collect()
}

/// Apply literal substring replacements, `(canonical, host)` pairs.
pub fn replace_all(pairs: NameTable, text: &str, direction: Direction) -> String {
    pairs.iter().fold(text.to_string(), |acc, (canonical, host)| match direction {
        Direction::FromCanonical => acc.replace(canonical, host),
        Direction::ToCanonical => acc.replace(host, canonical),
    })
}

/// Normalize a canonical remote-tool definition for equality checks.
///
/// A stdio server may or may not spell out `"type": "stdio"`; both forms
/// describe the same registration.
pub fn normalize_definition(definition: &Value) -> Value {
    let mut normalized = definition.clone();
    if let Some(obj) = normalized.as_object_mut()
        && obj.contains_key("command")
        && obj.get("type").and_then(Value::as_str) == Some("stdio")
    {
        obj.remove("type");
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TABLE: NameTable = &[("Bash", "run_shell_command"), ("Edit", "replace")];

    #[test]
    fn rename_both_directions() {
        assert_eq!(rename(TABLE, "Bash", Direction::FromCanonical), "run_shell_command");
        assert_eq!(rename(TABLE, "run_shell_command", Direction::ToCanonical), "Bash");
        assert_eq!(rename(TABLE, "Unknown", Direction::FromCanonical), "Unknown");
    }

    #[test]
    fn matcher_alternatives_are_renamed() {
        assert_eq!(
            rename_matcher(TABLE, "Bash|Edit", Direction::FromCanonical),
            "run_shell_command|replace"
        );
    }

    #[test]
    fn matcher_spacing_is_kept() {
        assert_eq!(
            rename_matcher(TABLE, "run_shell_command | replace", Direction::ToCanonical),
            "Bash | Edit"
        );
    }

    #[test]
    fn stdio_type_is_normalized_away() {
        let explicit = json!({"type": "stdio", "command": "uvx", "args": ["srv"]});
        let implicit = json!({"command": "uvx", "args": ["srv"]});
        assert_eq!(normalize_definition(&explicit), normalize_definition(&implicit));
    }

    #[test]
    fn http_type_is_kept() {
        let http = json!({"type": "http", "url": "https://example.com/mcp"});
        assert_eq!(normalize_definition(&http), http);
    }
}
