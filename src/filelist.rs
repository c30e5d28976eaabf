//! Dirty-tracking file list
//!
//! The `COMPARE_ECHO` rule runs this on every build. It re-globs the source
//! patterns and rewrites the list only when the matched set changed, so the
//! list's mtime (and therefore regeneration) moves only on real additions or
//! removals.

use crate::pattern::PatternResolver;
use crate::utils::write_if_changed;
use anyhow::Result;
use std::collections::BTreeSet;
use std::path::Path;

/// Union of all files under `root` matching any of `patterns`, sorted.
pub fn collect(root: &Path, patterns: &[String]) -> Result<Vec<String>> {
    let mut resolver = PatternResolver::new();
    let mut files = BTreeSet::new();
    for pattern in patterns {
        files.extend(resolver.resolve(pattern, root)?);
    }
    Ok(files.into_iter().collect())
}

/// Rewrite `output` with the current match set if it differs.
///
/// Returns `true` when the file was written.
pub fn refresh(root: &Path, patterns: &[String], output: &Path) -> Result<bool> {
    let files = collect(root, patterns)?;
    let written = write_if_changed(output, &files.join("\n"))?;
    if written {
        tracing::info!("file list {} updated ({} files)", output.display(), files.len());
    } else {
        tracing::debug!("file list {} unchanged", output.display());
    }
    Ok(written)
}
