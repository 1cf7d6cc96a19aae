//! Project record model and name validation.
//!
//! # Responsibility
//! - Define the persisted project unit and its external JSON field names.
//! - Enforce the project-name pattern with a typed validation result.
//!
//! # Invariants
//! - `id` is stable and never reused for another project.
//! - JSON field names (`lastEdited`, `fromURL`) match the legacy storage
//!   schema so existing stored lists keep loading.

use crate::model::scene::Scene;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a saved project.
pub type ProjectId = Uuid;

/// Name given to projects created without an explicit name.
pub const DEFAULT_PROJECT_NAME: &str = "Untitled Project";

static PROJECT_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new("^[A-Za-z0-9 ]{1,64}$").expect("project name pattern is a valid regex")
});

/// Typed rejection for an illegal project name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub name: String,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid project name `{}`: expected 1-64 letters, digits or spaces",
            self.name
        )
    }
}

impl Error for ValidationError {}

/// Validates a project name against the `^[A-Za-z0-9 ]{1,64}$` pattern.
///
/// The name is trimmed before matching, mirroring the editor's rename flow.
pub fn validate_project_name(name: &str) -> Result<(), ValidationError> {
    if PROJECT_NAME_RE.is_match(name.trim()) {
        Ok(())
    } else {
        Err(ValidationError {
            name: name.to_string(),
        })
    }
}

/// One persisted project: identity, display name, recency stamp, the scene
/// blob and optional share-link provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: ProjectId,
    pub name: String,
    /// Unix epoch milliseconds of the last edit; drives recency ordering.
    #[serde(rename = "lastEdited")]
    pub last_edited_ms: i64,
    #[serde(default)]
    pub data: Scene,
    /// Set when the project was created from an imported share link; used to
    /// deduplicate repeated imports of the same link.
    #[serde(rename = "fromURL", default)]
    pub source_link: Option<String>,
}

impl ProjectRecord {
    /// Creates an empty project with a fresh id.
    pub fn new(name: impl Into<String>, now_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            last_edited_ms: now_ms,
            data: Scene::default(),
            source_link: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_project_name, ProjectRecord};

    #[test]
    fn name_pattern_accepts_letters_digits_and_spaces() {
        validate_project_name("Untitled Project").unwrap();
        validate_project_name("Board 42").unwrap();
        validate_project_name(&"a".repeat(64)).unwrap();
        // Trimmed before matching.
        validate_project_name("  padded  ").unwrap();
    }

    #[test]
    fn name_pattern_rejects_empty_and_special_characters() {
        assert!(validate_project_name("").is_err());
        assert!(validate_project_name("   ").is_err());
        assert!(validate_project_name("bad/name").is_err());
        assert!(validate_project_name("emoji \u{1F600}").is_err());
        assert!(validate_project_name(&"a".repeat(65)).is_err());
    }

    #[test]
    fn record_json_uses_legacy_field_names() {
        let record = ProjectRecord::new("Sample", 1_700_000_000_000);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"lastEdited\":1700000000000"));
        assert!(json.contains("\"fromURL\":null"));

        // A record persisted before the scene blob existed still loads.
        let legacy = format!(
            "{{\"id\":\"{}\",\"name\":\"Old\",\"lastEdited\":5}}",
            record.id
        );
        let loaded: ProjectRecord = serde_json::from_str(&legacy).unwrap();
        assert!(loaded.data.pieces.is_empty());
        assert_eq!(loaded.source_link, None);
    }
}
