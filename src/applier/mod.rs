use crate::change_set::FileChange;
use crate::errors::MdiffError;
use std::path::PathBuf;

pub mod atomic_writer;
pub mod full_content_applier;

pub use atomic_writer::{write_in_place, write_in_place_from};
pub use full_content_applier::FullContentApplier;

pub trait Applier {
    /// Writes one change and returns the path actually written.
    fn apply(&self, change: &FileChange) -> Result<PathBuf, MdiffError>;
}
