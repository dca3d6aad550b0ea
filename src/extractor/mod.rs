use crate::errors::MdiffError;
use crate::ignore::IgnoreMatcher;
use crate::utils::{dotted_extension, normalize_path};
use crate::walker::{walk_tree, Visit, Visitor};
use std::fs;
use std::path::Path;
use tracing::{debug, info, trace, warn};
use walkdir::DirEntry;

pub mod tagged;

pub use tagged::write_tagged_block;

/// Collects tagged file blocks while walking a tree.
pub struct TreeExtractor<'a> {
    scan_root: &'a Path,
    extensions: &'a [String],
    matcher: Option<&'a IgnoreMatcher>,
    output: Vec<u8>,
    files_extracted: usize,
    entries_ignored: usize,
}

impl<'a> TreeExtractor<'a> {
    pub fn new(
        scan_root: &'a Path,
        extensions: &'a [String],
        matcher: Option<&'a IgnoreMatcher>,
    ) -> Self {
        debug!(
            "Initializing TreeExtractor for {} with extensions {:?}",
            scan_root.display(),
            extensions
        );
        TreeExtractor {
            scan_root,
            extensions,
            matcher,
            output: Vec::new(),
            files_extracted: 0,
            entries_ignored: 0,
        }
    }

    pub fn files_extracted(&self) -> usize {
        self.files_extracted
    }

    pub fn entries_ignored(&self) -> usize {
        self.entries_ignored
    }

    pub fn into_output(self) -> Vec<u8> {
        self.output
    }

    fn wants(&self, path: &Path) -> bool {
        match dotted_extension(path) {
            Some(ext) => self.extensions.iter().any(|wanted| wanted == ext),
            None => false,
        }
    }

    fn tag_path(&self, path: &Path) -> String {
        match path.strip_prefix(self.scan_root) {
            Ok(relative) => normalize_path(relative),
            Err(e) => {
                warn!(
                    "Failed to get relative path for {} (base {}): {}. Using absolute path.",
                    path.display(),
                    self.scan_root.display(),
                    e
                );
                path.to_string_lossy().into_owned()
            }
        }
    }
}

impl Visitor for TreeExtractor<'_> {
    fn visit(&mut self, entry: &DirEntry) -> Result<Visit, MdiffError> {
        let path = entry.path();
        let is_dir = entry.file_type().is_dir();

        if let Some(matcher) = self.matcher {
            if matcher.is_ignored(path, is_dir) {
                trace!("Ignoring {}", path.display());
                self.entries_ignored += 1;
                return Ok(if is_dir { Visit::SkipSubtree } else { Visit::Skip });
            }
        }

        if is_dir {
            return Ok(Visit::Continue);
        }

        if !self.wants(path) {
            return Ok(Visit::Skip);
        }

        let content = match fs::read(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read file {}: {}. Skipping.", path.display(), e);
                return Ok(Visit::Skip);
            }
        };

        let tag_path = self.tag_path(path);
        trace!("Extracting {} ({} bytes)", tag_path, content.len());
        write_tagged_block(&mut self.output, &tag_path, &content);
        self.files_extracted += 1;
        Ok(Visit::Continue)
    }
}

/// Walks `scan_root` and returns the tagged content of every file whose
/// extension is in `extensions` and which `matcher` does not ignore.
/// No matching files yields an empty buffer.
pub fn extract_file_content(
    scan_root: &Path,
    extensions: &[String],
    matcher: Option<&IgnoreMatcher>,
) -> Result<Vec<u8>, MdiffError> {
    let mut extractor = TreeExtractor::new(scan_root, extensions, matcher);
    walk_tree(scan_root, &mut extractor)?;

    info!(
        "Extracted {} file(s) from {} ({} ignored)",
        extractor.files_extracted(),
        scan_root.display(),
        extractor.entries_ignored()
    );
    Ok(extractor.into_output())
}
