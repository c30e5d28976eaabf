//! Glob pattern resolution against the source tree
//!
//! Matching follows shell glob rules: `*` and `?` never cross a `/`, `**`
//! spans directories, and hidden entries (names starting with `.`) are only
//! visited when the pattern itself spells out a dot segment such as
//! `.cache/*.png`. Results are root-relative, forward-slash paths in sorted
//! order.

use crate::error::{GenerateError, GenerateResult};
use crate::utils::normalize_path;
use globset::{GlobBuilder, GlobMatcher};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Resolves glob patterns for one generation run.
///
/// Directory listings, compiled matchers and match results are cached, so a
/// pattern declared several times only touches the filesystem once.
#[derive(Debug, Default)]
pub struct PatternResolver {
    matchers: HashMap<String, GlobMatcher>,
    listings: HashMap<(PathBuf, bool), Vec<String>>,
    resolved: HashMap<(String, PathBuf), Vec<String>>,
}

impl PatternResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// All files under `root` matching `pattern`, relative to `root`.
    pub fn resolve(&mut self, pattern: &str, root: &Path) -> GenerateResult<Vec<String>> {
        let key = (pattern.to_string(), root.to_path_buf());
        if let Some(hit) = self.resolved.get(&key) {
            tracing::trace!("pattern cache hit: {pattern} in {}", root.display());
            return Ok(hit.clone());
        }

        let matcher = self.matcher(pattern)?.clone();
        let files = self.listing(root, names_hidden_segment(pattern))?;
        let matched: Vec<String> =
            files.iter().filter(|path| matcher.is_match(path.as_str())).cloned().collect();

        tracing::debug!("{pattern} matched {} file(s) in {}", matched.len(), root.display());
        self.resolved.insert(key, matched.clone());
        Ok(matched)
    }

    /// Test a single path against `pattern` without touching the filesystem.
    pub fn matches(&mut self, path: &str, pattern: &str) -> GenerateResult<bool> {
        let matcher = self.matcher(pattern)?;
        Ok(matcher.is_match(normalize_path(path).as_str()))
    }

    fn matcher(&mut self, pattern: &str) -> GenerateResult<&GlobMatcher> {
        if !self.matchers.contains_key(pattern) {
            let glob = GlobBuilder::new(pattern).literal_separator(true).build().map_err(|e| {
                GenerateError::InvalidPattern { pattern: pattern.to_string(), message: e.to_string() }
            })?;
            self.matchers.insert(pattern.to_string(), glob.compile_matcher());
        }
        Ok(&self.matchers[pattern])
    }

    fn listing(&mut self, root: &Path, include_hidden: bool) -> GenerateResult<&[String]> {
        let key = (root.to_path_buf(), include_hidden);
        if !self.listings.contains_key(&key) {
            let files = list_files(root, include_hidden)?;
            self.listings.insert(key.clone(), files);
        }
        Ok(&self.listings[&key])
    }
}

/// Whether some segment of `pattern` starts with a literal `.`, other than
/// `.` and `..` themselves.
fn names_hidden_segment(pattern: &str) -> bool {
    normalize_path(pattern)
        .split('/')
        .any(|segment| segment.starts_with('.') && segment != "." && segment != "..")
}

/// Walk `root` and return every file as a sorted relative path. Hidden files
/// and directories are skipped unless `include_hidden` is set.
pub fn list_files(root: &Path, include_hidden: bool) -> GenerateResult<Vec<String>> {
    let metadata = fs::metadata(root).map_err(|e| GenerateError::Filesystem {
        root: root.to_path_buf(),
        message: e.to_string(),
    })?;
    if !metadata.is_dir() {
        return Err(GenerateError::Filesystem {
            root: root.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(move |entry| {
            include_hidden || entry.depth() == 0 || !is_hidden(entry.file_name())
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) if e.depth() == 0 => {
                return Err(GenerateError::Filesystem {
                    root: root.to_path_buf(),
                    message: e.to_string(),
                });
            }
            Err(e) => {
                tracing::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let rel_path = match entry.path().strip_prefix(root) {
            Ok(p) => normalize_path(&p.to_string_lossy()),
            Err(_) => continue,
        };
        files.push(rel_path);
    }

    // Sort by relative path for deterministic ordering
    files.sort();
    Ok(files)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|n| n.starts_with('.'))
}
