//! Content-aware file writing

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Write `content` to `path` unless the file already holds exactly that
/// content. Returns `true` when the file was written.
///
/// Leaving an unchanged file alone keeps its mtime stable, which is what lets
/// a `restat` rule stop the rebuild from propagating.
pub fn write_if_changed(path: &Path, content: &str) -> Result<bool> {
    if let Ok(existing) = fs::read_to_string(path) {
        if existing == content {
            tracing::debug!("{} unchanged, not rewriting", path.display());
            return Ok(false);
        }
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed creating directory: {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed writing {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_new_file() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("nested").join("list.txt");
        assert!(write_if_changed(&path, "a\nb").expect("write"));
        assert_eq!(fs::read_to_string(&path).expect("read"), "a\nb");
    }

    #[test]
    fn skips_identical_content() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("list.txt");
        fs::write(&path, "same").expect("seed");
        assert!(!write_if_changed(&path, "same").expect("write"));
        assert!(write_if_changed(&path, "different").expect("write"));
        assert_eq!(fs::read_to_string(&path).expect("read"), "different");
    }
}
