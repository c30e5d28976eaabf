//! Settings file loading

use super::{Settings, SETTINGS_FILE};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings plus the file they came from, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub path: Option<PathBuf>,
}

/// Load `assetman.toml` from `src_root`, falling back to defaults when absent.
///
/// A settings file that exists but does not parse is an error: it sits next
/// to the pipeline description, so it is never picked up by accident.
pub fn load_settings(src_root: &Path) -> Result<LoadedSettings> {
    let settings_file = src_root.join(SETTINGS_FILE);
    if !settings_file.is_file() {
        return Ok(LoadedSettings::default());
    }

    let content = fs::read_to_string(&settings_file)
        .with_context(|| format!("Failed reading settings file: {}", settings_file.display()))?;
    let settings = parse_settings(&content, &settings_file)?;
    tracing::debug!("loaded settings from {}", settings_file.display());

    Ok(LoadedSettings { settings, path: Some(settings_file) })
}

/// Parse TOML settings, supporting an optional nested `[assetman]` table.
fn parse_settings(content: &str, settings_file: &Path) -> Result<Settings> {
    // Parse to generic value first
    let raw: toml::Value = toml::from_str(content)
        .with_context(|| format!("Invalid TOML syntax: {}", settings_file.display()))?;

    let value = match raw.get("assetman") {
        Some(nested) => nested.clone(),
        None => raw,
    };

    let settings: Settings = value
        .try_into()
        .with_context(|| format!("Invalid settings: {}", settings_file.display()))?;

    for (key, field) in [
        ("script", &settings.script),
        ("graph_file", &settings.graph_file),
        ("file_list", &settings.file_list),
        ("dirty_marker", &settings.dirty_marker),
    ] {
        if field.trim().is_empty() {
            anyhow::bail!("Invalid settings: {} must not be empty ({})", key, settings_file.display());
        }
    }

    Ok(settings)
}
