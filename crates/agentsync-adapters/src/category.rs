//! Artifact categories

use serde::{Deserialize, Serialize};

/// The fixed set of artifact categories.
///
/// [`Category::ALL`] is also the order in which a batch applies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Directory bundles under `extensions/<name>/`
    ExtensionBundle,
    /// Executable hook scripts under `hooks/<name>`
    HookScript,
    /// Settings documents under `settings/<doc>.json`
    SharedSettings,
    /// Entries of the remote-tool registry document
    RemoteToolRegistration,
}

impl Category {
    /// All categories in apply order.
    pub const ALL: [Category; 4] = [
        Category::ExtensionBundle,
        Category::HookScript,
        Category::SharedSettings,
        Category::RemoteToolRegistration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExtensionBundle => "extension-bundle",
            Self::HookScript => "hook-script",
            Self::SharedSettings => "shared-settings",
            Self::RemoteToolRegistration => "remote-tool-registration",
        }
    }

    /// Directory of this category inside the source root, if it is directory-backed.
    pub fn source_dir(&self) -> Option<&'static str> {
        match self {
            Self::ExtensionBundle => Some("extensions"),
            Self::HookScript => Some("hooks"),
            Self::SharedSettings => Some("settings"),
            Self::RemoteToolRegistration => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_order_is_fixed() {
        let mut sorted = Category::ALL;
        sorted.sort();
        assert_eq!(sorted, Category::ALL);
        assert_eq!(Category::ALL[0], Category::ExtensionBundle);
        assert_eq!(Category::ALL[3], Category::RemoteToolRegistration);
    }

    #[test]
    fn serializes_kebab_case() {
        let json = serde_json::to_string(&Category::SharedSettings).unwrap();
        assert_eq!(json, "\"shared-settings\"");
    }
}
