//! Target kinds and discovery

use crate::adapter::FormatAdapter;
use crate::claude::ClaudeAdapter;
use crate::error::Error;
use crate::gemini::GeminiAdapter;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

static CLAUDE: ClaudeAdapter = ClaudeAdapter;
static GEMINI: GeminiAdapter = GeminiAdapter;

/// The host application a target directory belongs to.
///
/// Determined once when targets are discovered or declared, then carried
/// explicitly alongside the target path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Claude,
    Gemini,
}

impl TargetKind {
    pub const ALL: [TargetKind; 2] = [TargetKind::Claude, TargetKind::Gemini];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Gemini => "gemini",
        }
    }

    /// Directory whose presence marks a project as using this host.
    pub fn marker_dir(&self) -> &'static str {
        match self {
            Self::Claude => ".claude",
            Self::Gemini => ".gemini",
        }
    }

    /// The adapter implementing this host's capabilities.
    pub fn adapter(&self) -> &'static dyn FormatAdapter {
        match self {
            Self::Claude => &CLAUDE,
            Self::Gemini => &GEMINI,
        }
    }

    /// Every host whose marker directory exists under `root`.
    pub fn discover(root: &Path) -> Vec<TargetKind> {
        Self::ALL
            .into_iter()
            .filter(|kind| root.join(kind.marker_dir()).is_dir())
            .collect()
    }
}

impl FromStr for TargetKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "claude" => Ok(Self::Claude),
            "gemini" => Ok(Self::Gemini),
            other => Err(Error::UnknownKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
