use crate::errors::MdiffError;
use std::fs::{self, DirBuilder, Permissions};
use std::io::{self, ErrorKind, Read};
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile, PathPersistError};
use tracing::{debug, trace, warn};

#[cfg(unix)]
pub const DEFAULT_FILE_MODE: u32 = 0o644;
#[cfg(unix)]
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// Replaces the contents of `path` with `content` via a temporary file and a
/// rename, keeping the target's permission bits.
pub fn write_in_place(path: &Path, content: &[u8]) -> Result<(), MdiffError> {
    write_in_place_from(path, content)
}

/// Streaming form of [`write_in_place`]. If `reader` fails, the target is
/// left untouched and the temporary file is removed.
pub fn write_in_place_from<R: Read>(path: &Path, mut reader: R) -> Result<(), MdiffError> {
    debug!("Writing {} in place", path.display());

    let permissions = target_permissions(path)?;
    let dir = parent_dir(path);
    create_dir_chain(dir)?;

    let file_name = path.file_name().ok_or_else(|| {
        MdiffError::FileError(format!("'{}' does not name a file", path.display()))
    })?;
    let mut temp = Builder::new()
        .prefix(&format!(".{}.", file_name.to_string_lossy()))
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| {
            MdiffError::IoError(format!(
                "could not create temporary file in {}: {}",
                dir.display(),
                e
            ))
        })?;
    trace!("Created temporary file {}", temp.path().display());

    if let Err(e) = io::copy(&mut reader, &mut temp).and_then(|_| temp.as_file().sync_all()) {
        let temp_display = temp.path().display().to_string();
        discard(temp);
        return Err(MdiffError::IoError(format!(
            "could not write to temporary file '{}': {}",
            temp_display, e
        )));
    }

    if let Some(permissions) = permissions {
        if let Err(e) = temp.as_file().set_permissions(permissions) {
            let temp_display = temp.path().display().to_string();
            discard(temp);
            return Err(MdiffError::IoError(format!(
                "could not set permissions on temporary file '{}': {}",
                temp_display, e
            )));
        }
    }

    // Closes the handle; the file itself stays until persisted or dropped.
    let temp_path = temp.into_temp_path();

    if let Err(PathPersistError { error, path: leftover }) = temp_path.persist(path) {
        let leftover = match leftover.keep() {
            Ok(kept) => kept,
            Err(e) => e.path.to_path_buf(),
        };
        warn!(
            "Rename onto {} failed, leaving temporary file {}",
            path.display(),
            leftover.display()
        );
        return Err(MdiffError::IoError(format!(
            "could not rename temporary file '{}' to '{}': {}",
            leftover.display(),
            path.display(),
            error
        )));
    }

    Ok(())
}

/// Permissions the replacement should carry: the target's own, or the
/// default for new files.
fn target_permissions(path: &Path) -> Result<Option<Permissions>, MdiffError> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(Some(metadata.permissions())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(default_permissions()),
        Err(e) => Err(MdiffError::IoError(format!(
            "could not stat target file path '{}': {}",
            path.display(),
            e
        ))),
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(DEFAULT_FILE_MODE))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<Permissions> {
    None
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn create_dir_chain(dir: &Path) -> Result<(), MdiffError> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DEFAULT_DIR_MODE);
    }
    builder.create(dir).map_err(|e| {
        MdiffError::IoError(format!(
            "could not create directory {}: {}",
            dir.display(),
            e
        ))
    })
}

fn discard(temp: NamedTempFile) {
    let temp_path: PathBuf = temp.path().to_path_buf();
    if let Err(e) = temp.close() {
        warn!(
            "Failed to remove temporary file {}: {}",
            temp_path.display(),
            e
        );
    }
}
