use crate::errors::MdiffError;
use crate::utils::{absolutize, normalize_path, relative_path};
use glob::{MatchOptions, Pattern};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

pub const DEFAULT_IGNORE_FILE: &str = ".gitignore";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Evaluates a single glob against a `/`-separated candidate.
pub trait GlobMatcher {
    fn matches(&self, pattern: &str, candidate: &str) -> Result<bool, MdiffError>;
}

/// `*`, `?` and `[...]` over the `glob` crate. `*` never crosses a `/`, and
/// runs of `*` are collapsed so `**` is just `*`. Each distinct pattern is
/// compiled once and reused, malformed ones included.
#[derive(Debug, Default)]
pub struct BasicGlobMatcher {
    compiled: RefCell<HashMap<String, Result<Pattern, String>>>,
}

impl BasicGlobMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct patterns compiled so far.
    pub fn cached_patterns(&self) -> usize {
        self.compiled.borrow().len()
    }
}

impl GlobMatcher for BasicGlobMatcher {
    fn matches(&self, pattern: &str, candidate: &str) -> Result<bool, MdiffError> {
        let mut compiled = self.compiled.borrow_mut();
        if !compiled.contains_key(pattern) {
            trace!("Compiling glob '{}'", pattern);
            let result = Pattern::new(&collapse_stars(pattern)).map_err(|e| e.to_string());
            compiled.insert(pattern.to_owned(), result);
        }

        match &compiled[pattern] {
            Ok(glob) => Ok(glob.matches_with(candidate, MATCH_OPTIONS)),
            Err(message) => Err(MdiffError::PatternError {
                pattern: pattern.to_owned(),
                message: message.clone(),
            }),
        }
    }
}

fn collapse_stars(pattern: &str) -> String {
    let mut collapsed = String::with_capacity(pattern.len());
    let mut previous_was_star = false;
    for ch in pattern.chars() {
        if ch == '*' && previous_was_star {
            continue;
        }
        previous_was_star = ch == '*';
        collapsed.push(ch);
    }
    collapsed
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchScope {
    /// Match against the whole path relative to the anchor directory.
    FullPath,
    /// Match against the last path segment only, at any depth.
    BaseName,
}

/// One line of an ignore file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnorePattern {
    raw: String,
    glob: String,
    dir_only: bool,
    anchored: bool,
    scope: MatchScope,
}

impl IgnorePattern {
    /// Parses an ignore-file line. Blank lines, `#` comments and `!`
    /// negations yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let raw = line.trim();
        if raw.is_empty() || raw.starts_with('#') || raw.starts_with('!') {
            return None;
        }

        let dir_only = raw.ends_with('/');
        let anchored = raw.starts_with('/');
        let without_suffix = raw.strip_suffix('/').unwrap_or(raw);
        let slashed = normalize_path(Path::new(without_suffix));

        let (glob, scope) = if anchored {
            let glob = slashed.strip_prefix('/').unwrap_or(&slashed).to_owned();
            (glob, MatchScope::FullPath)
        } else if slashed.contains('/') {
            (slashed, MatchScope::FullPath)
        } else {
            (slashed, MatchScope::BaseName)
        };

        Some(IgnorePattern {
            raw: raw.to_owned(),
            glob,
            dir_only,
            anchored,
            scope,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn glob(&self) -> &str {
        &self.glob
    }

    pub fn is_dir_only(&self) -> bool {
        self.dir_only
    }

    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    pub fn scope(&self) -> MatchScope {
        self.scope
    }
}

/// Patterns from a single ignore file, resolved against the directory that
/// holds that file. Any match ignores the path; there is no negation.
pub struct IgnoreMatcher {
    patterns: Vec<IgnorePattern>,
    anchor_dir: PathBuf,
    glob: Box<dyn GlobMatcher>,
    // Indices of malformed patterns already warned about.
    reported: RefCell<HashSet<usize>>,
}

impl IgnoreMatcher {
    /// Loads `explicit` if given, otherwise `<scan_root>/.gitignore`.
    /// A missing file yields a matcher that ignores nothing.
    pub fn new(explicit: Option<&Path>, scan_root: &Path) -> Result<Self, MdiffError> {
        let ignore_file = match explicit {
            Some(path) => absolutize(path).map_err(|e| {
                MdiffError::ConfigError(format!(
                    "failed to get absolute path for ignore file '{}': {}",
                    path.display(),
                    e
                ))
            })?,
            None => scan_root.join(DEFAULT_IGNORE_FILE),
        };
        Self::load(&ignore_file)
    }

    pub fn load(ignore_file: &Path) -> Result<Self, MdiffError> {
        let anchor_dir = ignore_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let metadata = match fs::metadata(ignore_file) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No ignore file at {}", ignore_file.display());
                return Ok(Self::from_patterns(anchor_dir, Vec::new()));
            }
            Err(e) => {
                return Err(MdiffError::IgnoreFileError(format!(
                    "failed to stat ignore file '{}': {}",
                    ignore_file.display(),
                    e
                )))
            }
        };

        if metadata.is_dir() {
            return Err(MdiffError::ConfigError(format!(
                "ignore file path '{}' is a directory, not a file",
                ignore_file.display()
            )));
        }

        let bytes = fs::read(ignore_file).map_err(|e| {
            MdiffError::IgnoreFileError(format!(
                "failed to read ignore file '{}': {}",
                ignore_file.display(),
                e
            ))
        })?;
        let text = String::from_utf8_lossy(&bytes);
        let patterns: Vec<IgnorePattern> = text.lines().filter_map(IgnorePattern::parse).collect();

        debug!(
            "Loaded {} ignore patterns from {} (anchored at {})",
            patterns.len(),
            ignore_file.display(),
            anchor_dir.display()
        );
        Ok(Self::from_patterns(anchor_dir, patterns))
    }

    pub fn from_patterns(anchor_dir: PathBuf, patterns: Vec<IgnorePattern>) -> Self {
        IgnoreMatcher {
            patterns,
            anchor_dir,
            glob: Box::new(BasicGlobMatcher::new()),
            reported: RefCell::new(HashSet::new()),
        }
    }

    pub fn with_glob_matcher(mut self, glob: Box<dyn GlobMatcher>) -> Self {
        self.glob = glob;
        self
    }

    pub fn patterns(&self) -> &[IgnorePattern] {
        &self.patterns
    }

    pub fn anchor_dir(&self) -> &Path {
        &self.anchor_dir
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// `path` must be absolute. Malformed patterns are treated as
    /// non-matching and logged the first time they are hit.
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        if self.patterns.is_empty() {
            return false;
        }

        let Some(relative) = relative_path(&self.anchor_dir, path) else {
            debug!(
                "{} has no path relative to {}, not ignoring",
                path.display(),
                self.anchor_dir.display()
            );
            return false;
        };
        let relative = normalize_path(&relative);
        let base_name = match relative.rfind('/') {
            Some(idx) => &relative[idx + 1..],
            None => relative.as_str(),
        };

        for (index, pattern) in self.patterns.iter().enumerate() {
            if pattern.dir_only && !is_dir {
                continue;
            }

            let candidate = match pattern.scope {
                MatchScope::FullPath => relative.as_str(),
                MatchScope::BaseName => base_name,
            };

            match self.glob.matches(&pattern.glob, candidate) {
                Ok(true) => {
                    trace!("{} ignored by pattern '{}'", relative, pattern.raw);
                    return true;
                }
                Ok(false) => {}
                Err(e) => {
                    if self.reported.borrow_mut().insert(index) {
                        warn!(
                            "Malformed ignore pattern '{}' (processed as '{}'): {}",
                            pattern.raw, pattern.glob, e
                        );
                    }
                }
            }
        }
        false
    }
}
