pub mod applier;
pub mod change_set;
pub mod commands;
pub mod config;
pub mod errors;
pub mod extractor;
pub mod ignore;
pub mod logger;
pub mod utils;
pub mod walker;

pub use applier::{write_in_place, Applier, FullContentApplier};
pub use change_set::{apply_change_set, apply_change_set_with, ApplyReport, ChangeSet, FileChange};
pub use commands::{run_apply, run_apply_with, run_extract};
pub use errors::MdiffError;
pub use extractor::extract_file_content;
pub use ignore::{IgnoreMatcher, IgnorePattern};
