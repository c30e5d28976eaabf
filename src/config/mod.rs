//! Generator settings
//!
//! An optional `assetman.toml` next to the pipeline description overrides
//! file names and commands. Without it every setting has a default.

use crate::compile::RegenOptions;
use crate::utils::join_root;
use serde::Deserialize;

pub mod loader;

pub use loader::{load_settings, LoadedSettings};

pub const SETTINGS_FILE: &str = "assetman.toml";
pub const DEFAULT_SCRIPT: &str = "assets.js";
pub const DEFAULT_GRAPH_FILE: &str = "build.ninja";
pub const DEFAULT_FILE_LIST: &str = ".src_files";
pub const DEFAULT_DIRTY_MARKER: &str = ".dirty";
pub const DEFAULT_CLEAN_COMMAND: &str = "ninja -t clean";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Pipeline description file name, relative to the source directory.
    pub script: String,
    /// Build file written into the current directory.
    pub graph_file: String,
    /// Dirty-tracking file list written into the current directory.
    pub file_list: String,
    pub dirty_marker: String,
    /// Program the regeneration rule runs. Defaults to the running executable.
    pub generator: Option<String>,
    pub clean_command: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            script: DEFAULT_SCRIPT.to_string(),
            graph_file: DEFAULT_GRAPH_FILE.to_string(),
            file_list: DEFAULT_FILE_LIST.to_string(),
            dirty_marker: DEFAULT_DIRTY_MARKER.to_string(),
            generator: None,
            clean_command: DEFAULT_CLEAN_COMMAND.to_string(),
        }
    }
}

impl Settings {
    /// Build the regeneration options for a run over `src_root`.
    ///
    /// `current_program` is used when no `generator` override is configured.
    pub fn regen_options(
        &self,
        src_root: &str,
        current_program: &str,
        settings_path: Option<String>,
    ) -> RegenOptions {
        RegenOptions {
            program: self.generator.clone().unwrap_or_else(|| current_program.to_string()),
            src_root: src_root.to_string(),
            script_path: join_root(src_root, &self.script),
            settings_path,
            graph_file: self.graph_file.clone(),
            file_list: self.file_list.clone(),
            dirty_marker: self.dirty_marker.clone(),
            clean_command: self.clean_command.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regen_options_follow_settings() {
        let settings = Settings {
            script: "pipeline.js".to_string(),
            generator: Some("tools/assetman".to_string()),
            ..Settings::default()
        };
        let options = settings.regen_options("src", "/usr/bin/assetman", None);
        assert_eq!(options.program, "tools/assetman");
        assert_eq!(options.script_path, "src/pipeline.js");
        assert_eq!(options.graph_file, "build.ninja");

        let options = Settings::default().regen_options(".", "/usr/bin/assetman", None);
        assert_eq!(options.program, "/usr/bin/assetman");
        assert_eq!(options.script_path, "assets.js");
    }
}
