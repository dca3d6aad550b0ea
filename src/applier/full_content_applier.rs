use crate::applier::atomic_writer::write_in_place;
use crate::applier::Applier;
use crate::change_set::FileChange;
use crate::errors::MdiffError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Overwrites each target with the change's full content. Relative paths
/// resolve against `base_path`; absolute ones are used as given.
#[derive(Debug, Clone)]
pub struct FullContentApplier {
    base_path: PathBuf,
}

impl FullContentApplier {
    pub fn new(base_path: &Path) -> Self {
        FullContentApplier {
            base_path: base_path.to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Applier for FullContentApplier {
    fn apply(&self, change: &FileChange) -> Result<PathBuf, MdiffError> {
        let file_path = self.base_path.join(&change.file_path);
        debug!("Applying full content to file: {}", file_path.display());

        write_in_place(&file_path, change.content.as_bytes())?;

        info!(
            "Applied full content to {} ({} bytes)",
            file_path.display(),
            change.content.len()
        );
        Ok(file_path)
    }
}
