//! Generate command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};

use crate::compile::generate;
use crate::config::{load_settings, SETTINGS_FILE};
use crate::utils::{clean_root, join_root};

#[derive(Args)]
pub struct GenerateArgs {
    /// Path to source directory containing the pipeline description (assets.js)
    #[arg(value_name = "SRC_PATH", default_value = ".")]
    pub src_path: PathBuf,
}

pub fn run(args: GenerateArgs) -> Result<()> {
    let src_root = clean_root(&args.src_path);
    let loaded = load_settings(Path::new(&src_root))?;
    let settings_path = loaded.path.as_ref().map(|_| join_root(&src_root, SETTINGS_FILE));
    let options = loaded.settings.regen_options(&src_root, &current_program(), settings_path);

    let compiled = generate(&options)?;

    let rendered = compiled.graph.render();
    fs::write(&options.graph_file, rendered)
        .with_context(|| format!("Failed writing build graph: {}", options.graph_file))?;

    tracing::info!(
        "wrote {} ({} edges, {} default targets)",
        options.graph_file,
        compiled.graph.edges().len(),
        compiled.graph.defaults().len()
    );
    Ok(())
}

/// Path of the running executable, so the regeneration rule re-runs this
/// exact binary.
fn current_program() -> String {
    std::env::current_exe()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|_| env!("CARGO_PKG_NAME").to_string())
}
