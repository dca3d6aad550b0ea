use crate::errors::MdiffError;
use crate::utils::{absolutize, parse_extensions};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    /// Absolute, cleaned directory to scan.
    pub scan_dir: PathBuf,
    /// Dot-prefixed extensions, compared case-sensitively.
    pub extensions: Vec<String>,
    /// Absolute path of an explicit ignore file.
    pub gitignore: Option<PathBuf>,
}

impl ExtractConfig {
    pub fn new(
        directory: &Path,
        extensions: &str,
        gitignore: Option<&Path>,
    ) -> Result<Self, MdiffError> {
        let extensions = parse_extensions(extensions);
        if extensions.is_empty() {
            return Err(MdiffError::ConfigError(
                "no valid file extensions provided".to_string(),
            ));
        }

        let scan_dir = absolutize(directory).map_err(|e| {
            MdiffError::ConfigError(format!(
                "failed to get absolute path for directory '{}': {}",
                directory.display(),
                e
            ))
        })?;
        let metadata = fs::metadata(&scan_dir).map_err(|e| {
            MdiffError::ConfigError(format!(
                "cannot access directory '{}': {}",
                scan_dir.display(),
                e
            ))
        })?;
        if !metadata.is_dir() {
            return Err(MdiffError::ConfigError(format!(
                "path '{}' is not a directory",
                scan_dir.display()
            )));
        }

        let gitignore = gitignore
            .map(|path| {
                absolutize(path).map_err(|e| {
                    MdiffError::ConfigError(format!(
                        "failed to get absolute path for ignore file '{}': {}",
                        path.display(),
                        e
                    ))
                })
            })
            .transpose()?;

        Ok(ExtractConfig {
            scan_dir,
            extensions,
            gitignore,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyConfig {
    pub changes_file: PathBuf,
    /// Directory that relative change paths resolve against. Empty means
    /// the current directory.
    pub base_dir: PathBuf,
}

impl ApplyConfig {
    pub fn new(changes_file: &Path, base_dir: Option<&Path>) -> Self {
        ApplyConfig {
            changes_file: changes_file.to_path_buf(),
            base_dir: base_dir.map(Path::to_path_buf).unwrap_or_default(),
        }
    }
}
