//! Utility functions

pub mod files;
pub mod paths;
pub mod shell;

pub use files::write_if_changed;
pub use paths::{clean_root, file_stem, join_root, normalize_path, parent_dir};
pub use shell::shell_quote;
