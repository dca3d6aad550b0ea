use crate::applier::Applier;
use crate::errors::MdiffError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A full replacement of one file's content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
}

impl FileChange {
    pub fn new(file_path: impl Into<String>, content: impl Into<String>) -> Self {
        FileChange {
            file_path: file_path.into(),
            content: content.into(),
        }
    }
}

/// `{ "changes": [ { "file_path": ..., "content": ... }, ... ] }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    #[serde(default, deserialize_with = "null_as_default")]
    pub changes: Vec<FileChange>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ChangeSet {
    pub fn from_json_str(json: &str) -> Result<Self, MdiffError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, MdiffError> {
        let json = fs::read_to_string(path).map_err(|e| {
            MdiffError::IoError(format!(
                "failed to read change set '{}': {}",
                path.display(),
                e
            ))
        })?;
        serde_json::from_str(&json).map_err(|e| {
            MdiffError::ChangeSetParseError(format!(
                "failed to parse JSON from '{}': {}",
                path.display(),
                e
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Written paths, in application order.
    pub applied: Vec<PathBuf>,
    /// Entries passed over because they had no path.
    pub skipped: usize,
}

impl ApplyReport {
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }
}

/// Applies every change in order; a later entry for the same path wins.
/// Entries with an empty path are logged and skipped. The first write
/// failure aborts the batch, leaving earlier entries applied.
pub fn apply_change_set(
    change_set: &ChangeSet,
    applier: &dyn Applier,
) -> Result<ApplyReport, MdiffError> {
    apply_change_set_with(change_set, applier, |_| {})
}

/// Like [`apply_change_set`], but calls `on_applied` right after each
/// successful write, so callers see every written path even when a later
/// entry aborts the batch.
pub fn apply_change_set_with<F>(
    change_set: &ChangeSet,
    applier: &dyn Applier,
    mut on_applied: F,
) -> Result<ApplyReport, MdiffError>
where
    F: FnMut(&Path),
{
    let mut report = ApplyReport::default();

    for (index, change) in change_set.changes.iter().enumerate() {
        if change.file_path.is_empty() {
            warn!(
                "Skipping change entry {} due to missing 'file_path'.",
                index
            );
            report.skipped += 1;
            continue;
        }

        debug!("Applying change entry {}: {}", index, change.file_path);
        let written = applier.apply(change)?;
        on_applied(&written);
        report.applied.push(written);
    }

    Ok(report)
}
