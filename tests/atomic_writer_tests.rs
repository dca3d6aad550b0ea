use mdiff::applier::{write_in_place, write_in_place_from};
use mdiff::errors::MdiffError;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use tempfile::tempdir;
use tracing::debug;

/// Yields one chunk of bytes, then fails.
struct FailingReader {
    chunk: &'static [u8],
    sent: bool,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.sent {
            return Err(io::Error::new(io::ErrorKind::Other, "disk on fire"));
        }
        self.sent = true;
        let n = self.chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&self.chunk[..n]);
        Ok(n)
    }
}

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_write_creates_parent_directories() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("a/b/c/new.txt");

    write_in_place(&target, b"fresh")
        .unwrap_or_else(|e| panic!("Failed to write: {:?}", e));

    assert_eq!(fs::read(&target).unwrap(), b"fresh");
    assert_eq!(dir_entries(&dir.path().join("a/b/c")), vec!["new.txt"]);

    debug!("Test passed for write creating parent directories.");
}

#[test]
fn test_write_replaces_existing_content_completely() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("config.toml");
    fs::write(&target, "a much longer original body of text").unwrap();

    write_in_place(&target, b"short").unwrap();

    assert_eq!(fs::read_to_string(&target).unwrap(), "short");
    assert_eq!(dir_entries(dir.path()), vec!["config.toml"]);
}

#[test]
fn test_empty_content_creates_empty_file() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("empty.txt");

    write_in_place(&target, b"").unwrap();

    assert!(target.is_file());
    assert_eq!(fs::metadata(&target).unwrap().len(), 0);
}

#[test]
fn test_failed_write_leaves_target_and_directory_untouched() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("keep.txt");
    fs::write(&target, "original").unwrap();
    let before = fs::metadata(&target).unwrap().permissions();

    let reader = FailingReader {
        chunk: b"partial replacement",
        sent: false,
    };
    let result = write_in_place_from(&target, reader);

    assert!(
        matches!(result, Err(MdiffError::IoError(_))),
        "Expected an IO error, got {:?}",
        result
    );
    assert_eq!(fs::read_to_string(&target).unwrap(), "original");
    assert_eq!(fs::metadata(&target).unwrap().permissions(), before);
    assert_eq!(dir_entries(dir.path()), vec!["keep.txt"]);
}

#[test]
fn test_unstatable_target_is_an_error() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "i am a file").unwrap();

    let result = write_in_place(&blocker.join("child.txt"), b"content");

    assert!(matches!(result, Err(MdiffError::IoError(_))));
    assert_eq!(fs::read_to_string(&blocker).unwrap(), "i am a file");
}

#[test]
fn test_target_without_file_name_is_rejected() {
    let dir = tempdir().unwrap();
    let result = write_in_place(&dir.path().join(".."), b"content");
    assert!(result.is_err());
}

#[cfg(unix)]
mod unix {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn test_new_file_gets_default_mode() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("nested/new.sh");

        write_in_place(&target, b"#!/bin/sh\n").unwrap();

        let mode = fs::metadata(&target).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[test]
    fn test_existing_permissions_are_preserved() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("run.sh");
        fs::write(&target, "old").unwrap();
        fs::set_permissions(&target, fs::Permissions::from_mode(0o750)).unwrap();

        write_in_place(&target, b"new").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
        let mode = fs::metadata(&target).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o750);
    }

    #[test]
    fn test_failed_rename_keeps_temp_file_and_leaves_target_alone() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("t");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("inside.txt"), "untouched").unwrap();

        let result = write_in_place(&target, b"hello");

        assert!(
            matches!(result, Err(MdiffError::IoError(ref msg)) if msg.contains("could not rename")),
            "Expected a rename error, got {:?}",
            result
        );
        assert!(target.is_dir());
        assert_eq!(dir_entries(&target), vec!["inside.txt"]);
        assert_eq!(
            fs::read_to_string(target.join("inside.txt")).unwrap(),
            "untouched"
        );

        let leftovers: Vec<String> = dir_entries(dir.path())
            .into_iter()
            .filter(|name| name != "t")
            .collect();
        assert_eq!(leftovers.len(), 1, "Expected one temp file, got {:?}", leftovers);
        assert!(leftovers[0].starts_with(".t.") && leftovers[0].ends_with(".tmp"));
        assert_eq!(fs::read(dir.path().join(&leftovers[0])).unwrap(), b"hello");

        debug!("Test passed for a failed rename keeping its temp file.");
    }
}
