use std::io;
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

/// Renders a path with `/` separators regardless of platform.
pub fn normalize_path(path: &Path) -> String {
    let path = path.to_string_lossy();
    if MAIN_SEPARATOR == '/' {
        path.into_owned()
    } else {
        path.replace(MAIN_SEPARATOR, "/")
    }
}

/// Lexically folds `.` and `..` components. Never touches the filesystem,
/// so symlinks are not resolved.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match cleaned.components().next_back() {
                Some(Component::Normal(_)) => {
                    cleaned.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => cleaned.push(".."),
            },
            other => cleaned.push(other.as_os_str()),
        }
    }
    if cleaned.as_os_str().is_empty() {
        cleaned.push(".");
    }
    cleaned
}

/// Makes `path` absolute against the current directory and cleans it.
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    std::path::absolute(path).map(|p| clean_path(&p))
}

/// Computes `target` relative to `base`, inserting `..` segments when
/// `target` lies outside `base`. Returns `None` when the two paths share no
/// common root (one relative and one absolute, or different volumes).
pub fn relative_path(base: &Path, target: &Path) -> Option<PathBuf> {
    let base = clean_path(base);
    let target = clean_path(target);
    if base.has_root() != target.has_root() {
        return None;
    }

    let mut base_components = base
        .components()
        .filter(|c| *c != Component::CurDir)
        .peekable();
    let mut target_components = target
        .components()
        .filter(|c| *c != Component::CurDir)
        .peekable();

    loop {
        match (base_components.peek(), target_components.peek()) {
            (Some(b), Some(t)) if b == t => {}
            _ => break,
        }
        base_components.next();
        target_components.next();
    }

    let mut relative = PathBuf::new();
    for component in base_components {
        match component {
            Component::Normal(_) => relative.push(".."),
            _ => return None,
        }
    }
    for component in target_components {
        match component {
            Component::Prefix(_) | Component::RootDir => return None,
            other => relative.push(other.as_os_str()),
        }
    }

    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    Some(relative)
}

/// Returns the suffix of the file name starting at its last `.`, dot
/// included. `.gitignore` has extension `.gitignore`; `Makefile` has none.
pub fn dotted_extension(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    name.rfind('.').map(|idx| &name[idx..])
}

/// Splits a comma-separated extension list, trimming entries, dropping empty
/// ones and prefixing a `.` where missing.
pub fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|ext| !ext.is_empty())
        .map(|ext| {
            if ext.starts_with('.') {
                ext.to_owned()
            } else {
                format!(".{}", ext)
            }
        })
        .collect()
}
