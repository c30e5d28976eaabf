//! Path normalization
//!
//! Paths in the build graph are plain strings with forward slashes. Source
//! inputs are joined onto the source root, outputs stay relative to the build
//! directory.

use std::path::Path;

pub fn normalize_path(path: &str) -> String {
    // Convert backslashes to forward slashes and normalize
    path.replace('\\', "/")
}

/// Normalize a root directory argument: forward slashes, no leading `./`,
/// no trailing slash. An empty root becomes `.`.
pub fn clean_root(root: &Path) -> String {
    let raw = normalize_path(&root.to_string_lossy());
    if raw.starts_with('/') && raw.trim_matches('/').is_empty() {
        return "/".to_string();
    }

    let mut cleaned = raw.as_str();
    while let Some(rest) = cleaned.strip_prefix("./") {
        cleaned = rest.trim_start_matches('/');
    }
    let cleaned = cleaned.trim_end_matches('/');

    if cleaned.is_empty() {
        ".".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Join a root-relative path onto `root`. A `.` root leaves `rel` untouched.
pub fn join_root(root: &str, rel: &str) -> String {
    match root {
        "" | "." => rel.to_string(),
        "/" => format!("/{rel}"),
        _ => format!("{}/{}", root.trim_end_matches('/'), rel),
    }
}

/// Directory part of a forward-slash path, empty for a bare file name.
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// File name without its final extension. Dotfiles keep their full name.
pub fn file_stem(path: &str) -> &str {
    let name = match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    };
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_root_strips_dot_prefix_and_trailing_slash() {
        assert_eq!(clean_root(Path::new("./assets/")), "assets");
        assert_eq!(clean_root(Path::new(".")), ".");
        assert_eq!(clean_root(Path::new("./")), ".");
        assert_eq!(clean_root(Path::new("")), ".");
        assert_eq!(clean_root(Path::new("/")), "/");
        assert_eq!(clean_root(Path::new("../src")), "../src");
    }

    #[test]
    fn join_root_skips_current_dir() {
        assert_eq!(join_root(".", "foo.psd"), "foo.psd");
        assert_eq!(join_root("src", "a/foo.psd"), "src/a/foo.psd");
        assert_eq!(join_root("/", "foo.psd"), "/foo.psd");
    }

    #[test]
    fn parent_dir_and_stem() {
        assert_eq!(parent_dir("a/b/foo.psd"), "a/b");
        assert_eq!(parent_dir("foo.psd"), "");
        assert_eq!(file_stem("a/b/foo.psd"), "foo");
        assert_eq!(file_stem("a/archive.tar.gz"), "archive.tar");
        assert_eq!(file_stem(".hidden"), ".hidden");
        assert_eq!(file_stem("Makefile"), "Makefile");
    }
}
