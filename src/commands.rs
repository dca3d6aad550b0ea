use crate::applier::FullContentApplier;
use crate::change_set::{apply_change_set_with, ApplyReport, ChangeSet};
use crate::config::{ApplyConfig, ExtractConfig};
use crate::errors::MdiffError;
use crate::extractor::extract_file_content;
use crate::ignore::IgnoreMatcher;
use std::path::Path;
use tracing::{debug, warn};

/// Builds the ignore matcher for the configured tree and extracts it.
pub fn run_extract(config: &ExtractConfig) -> Result<Vec<u8>, MdiffError> {
    debug!("Running extract with {:?}", config);
    let matcher = IgnoreMatcher::new(config.gitignore.as_deref(), &config.scan_dir)?;
    extract_file_content(&config.scan_dir, &config.extensions, Some(&matcher))
}

/// Loads the change set and writes every entry under `base_dir`.
pub fn run_apply(config: &ApplyConfig) -> Result<ApplyReport, MdiffError> {
    run_apply_with(config, |_| {})
}

/// Same as [`run_apply`], reporting each written path through `on_applied`
/// as soon as it lands on disk.
pub fn run_apply_with<F>(config: &ApplyConfig, on_applied: F) -> Result<ApplyReport, MdiffError>
where
    F: FnMut(&Path),
{
    debug!("Running apply with {:?}", config);
    let change_set = ChangeSet::from_file(&config.changes_file)?;
    if change_set.is_empty() {
        warn!(
            "No changes found in {}.",
            config.changes_file.display()
        );
        return Ok(ApplyReport::default());
    }

    let applier = FullContentApplier::new(&config.base_dir);
    apply_change_set_with(&change_set, &applier, on_applied)
}
