use crate::errors::MdiffError;
use std::path::Path;
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

/// What the walker should do after visiting an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// The entry was handled; keep going.
    Continue,
    /// The entry was passed over; keep going.
    Skip,
    /// Do not descend into this directory. Same as `Skip` for files.
    SkipSubtree,
}

pub trait Visitor {
    /// Called for every descendant of the walk root. Returning an error
    /// aborts the walk.
    fn visit(&mut self, entry: &DirEntry) -> Result<Visit, MdiffError>;

    /// Called when an entry cannot be read. The default logs and continues.
    fn visit_error(&mut self, err: &walkdir::Error) {
        match err.path() {
            Some(path) => warn!("Error accessing path {}: {}. Skipping.", path.display(), err),
            None => warn!("Error during directory walk: {}. Skipping.", err),
        }
    }
}

/// Depth-first walk below `root` in file-name order. The root itself is not
/// visited. Symlinks are reported but not followed.
pub fn walk_tree<V: Visitor + ?Sized>(root: &Path, visitor: &mut V) -> Result<(), MdiffError> {
    let mut entries = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    while let Some(item) = entries.next() {
        let entry = match item {
            Ok(entry) => entry,
            Err(err) => {
                visitor.visit_error(&err);
                continue;
            }
        };

        if visitor.visit(&entry)? == Visit::SkipSubtree && entry.file_type().is_dir() {
            entries.skip_current_dir();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;
    use tracing_test::traced_test;

    struct Recorder {
        root: PathBuf,
        seen: Vec<String>,
        prune: &'static str,
    }

    impl Visitor for Recorder {
        fn visit(&mut self, entry: &DirEntry) -> Result<Visit, MdiffError> {
            let rel = entry.path().strip_prefix(&self.root).unwrap();
            self.seen.push(crate::utils::normalize_path(rel));
            if entry.file_name() == self.prune {
                return Ok(Visit::SkipSubtree);
            }
            Ok(Visit::Continue)
        }
    }

    #[test]
    fn test_walk_is_sorted_and_prunes() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("b/inner")).unwrap();
        fs::create_dir_all(root.join("skipme")).unwrap();
        fs::write(root.join("b/inner/z.txt"), "z").unwrap();
        fs::write(root.join("skipme/hidden.txt"), "h").unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join("c.txt"), "c").unwrap();

        let mut recorder = Recorder {
            root: root.to_path_buf(),
            seen: Vec::new(),
            prune: "skipme",
        };
        walk_tree(root, &mut recorder).unwrap();

        assert_eq!(
            recorder.seen,
            vec!["a.txt", "b", "b/inner", "b/inner/z.txt", "c.txt", "skipme"]
        );
    }

    #[test]
    fn test_visitor_error_aborts_walk() {
        struct Failing;
        impl Visitor for Failing {
            fn visit(&mut self, _entry: &DirEntry) -> Result<Visit, MdiffError> {
                Err(MdiffError::FileError("stop".to_string()))
            }
        }

        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        assert!(walk_tree(dir.path(), &mut Failing).is_err());
    }

    /// Deletes `doomed` once the walk has listed it but before descending.
    struct Saboteur {
        doomed: PathBuf,
        seen: Vec<String>,
    }

    impl Visitor for Saboteur {
        fn visit(&mut self, entry: &DirEntry) -> Result<Visit, MdiffError> {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == "a.txt" {
                fs::remove_dir_all(&self.doomed).unwrap();
            }
            self.seen.push(name);
            Ok(Visit::Continue)
        }
    }

    #[test]
    #[traced_test]
    fn test_unreadable_directory_is_reported_and_walk_continues() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::create_dir_all(root.join("b")).unwrap();
        fs::write(root.join("b/inner.txt"), "i").unwrap();
        fs::write(root.join("c.txt"), "c").unwrap();

        let mut saboteur = Saboteur {
            doomed: root.join("b"),
            seen: Vec::new(),
        };
        walk_tree(root, &mut saboteur)
            .unwrap_or_else(|e| panic!("Walk should survive access errors: {:?}", e));

        assert!(logs_contain("Error accessing path"));
        assert!(!saboteur.seen.contains(&"inner.txt".to_string()));
        assert_eq!(saboteur.seen.last().map(String::as_str), Some("c.txt"));
    }
}
