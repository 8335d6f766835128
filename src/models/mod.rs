//! Data models for the deep-mind store
//!
//! These represent the canonical JSON written to each matrix manifest
//! and to the per-project `.deep-mind.json` marker.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A registered project inside a matrix manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectRecord {
    /// Filesystem location of the project
    pub path: String,

    /// Registration timestamp (ISO-8601, local time)
    pub registered: String,
}

/// Matrix manifest, one per matrix directory (`manifest.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,

    /// Creation timestamp (ISO-8601, local time)
    pub created: String,

    /// Project name -> record; last write wins on re-registration
    #[serde(default)]
    pub projects: BTreeMap<String, ProjectRecord>,

    /// Ordered vertical names; each should have a matching `<name>.md`
    #[serde(default)]
    pub verticals: Vec<String>,
}

impl Manifest {
    /// Create a fresh manifest with no projects and no verticals
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            created: now_iso(),
            projects: BTreeMap::new(),
            verticals: Vec::new(),
        }
    }

    pub fn has_vertical(&self, vertical: &str) -> bool {
        self.verticals.iter().any(|v| v == vertical)
    }
}

/// Per-project marker file (`.deep-mind.json`) written at the project path.
///
/// Not transactionally linked to the manifest entry; a crash between the
/// two writes leaves them out of sync.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectMarker {
    pub matrix: String,
    pub project: String,
    pub registered: String,
}

/// Current local time as an ISO-8601 string, the format stored in manifests
pub fn now_iso() -> String {
    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}
