//! JSON changelogs.

use std::path::{Path, PathBuf};

use oxide_change::ChangeSet;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// An ordered list of change sets read from one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLog {
    /// Change sets in declaration order.
    #[serde(default)]
    pub change_sets: Vec<ChangeSet>,
    /// Directory relative large-object paths are resolved against.
    #[serde(skip)]
    pub root: Option<PathBuf>,
}

impl ChangeLog {
    /// Creates a changelog from change sets.
    #[must_use]
    pub fn new(change_sets: Vec<ChangeSet>) -> Self {
        Self {
            change_sets,
            root: None,
        }
    }

    /// Parses a changelog. Change sets without a filename get `filename`.
    ///
    /// # Errors
    ///
    /// Returns a serialization error for invalid JSON.
    pub fn from_json_str(json: &str, filename: &str) -> Result<Self> {
        let mut changelog: Self = serde_json::from_str(json)?;
        for changeset in &mut changelog.change_sets {
            if changeset.filename.is_empty() {
                changeset.filename = filename.to_string();
            }
        }
        Ok(changelog)
    }

    /// Reads a changelog file. Its directory becomes the resource root.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read, or a serialization
    /// error for invalid JSON.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut changelog = Self::from_json_str(&content, &filename)?;
        changelog.root = path.parent().map(Path::to_path_buf);
        Ok(changelog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxide_change::Change;

    const CHANGELOG: &str = r#"{
        "changeSets": [
            {
                "id": "1",
                "author": "ada",
                "changes": [
                    {"type": "createTable", "tableName": "users",
                     "columns": [{"name": "id", "type": "int", "primaryKey": true}]}
                ]
            },
            {
                "id": "2",
                "author": "ada",
                "filename": "other.json",
                "changes": [
                    {"type": "insertData", "tableName": "users",
                     "columns": [{"name": "id", "value": {"kind": "integer", "value": 1}}]}
                ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_changelog() {
        let changelog = ChangeLog::from_json_str(CHANGELOG, "main.json").unwrap();
        assert_eq!(changelog.change_sets.len(), 2);
        assert_eq!(changelog.change_sets[0].identity(), "main.json::1::ada");
        assert_eq!(changelog.change_sets[1].filename, "other.json");
        assert!(matches!(changelog.change_sets[1].changes[0], Change::InsertData(_)));
    }

    #[test]
    fn test_file_sets_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("changelog.json");
        std::fs::write(&path, CHANGELOG).unwrap();

        let changelog = ChangeLog::from_json_file(&path).unwrap();
        assert_eq!(changelog.root.as_deref(), Some(dir.path()));
        assert_eq!(changelog.change_sets[0].filename, "changelog.json");
    }
}
