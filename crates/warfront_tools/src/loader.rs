//! File loading for scenarios, configuration and intent scripts.
//!
//! The core never touches the filesystem; everything it consumes is read
//! here first.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use warfront_core::config::CoreConfig;
use warfront_core::data::ScenarioData;
use warfront_core::session::Intent;

use crate::error::{Result, ToolError};

/// Read a whole file as UTF-8.
///
/// # Errors
///
/// `FileNotFound` if the path does not exist, `Read` for other IO failures.
pub fn read_text(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(ToolError::FileNotFound(path.display().to_string()));
    }
    fs::read_to_string(path).map_err(|source| ToolError::Read {
        path: path.display().to_string(),
        source,
    })
}

/// Parse a RON file into `T`.
///
/// # Errors
///
/// Read errors as [`read_text`]; `Ron` if the document does not parse.
pub fn load_ron<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = read_text(path)?;
    ron::from_str(&text).map_err(|source| ToolError::Ron {
        path: path.display().to_string(),
        source,
    })
}

/// Load a scenario document.
///
/// # Errors
///
/// As [`load_ron`].
pub fn load_scenario(path: &Path) -> Result<ScenarioData> {
    let scenario: ScenarioData = load_ron(path)?;
    tracing::debug!(path = %path.display(), name = %scenario.name, "Loaded scenario");
    Ok(scenario)
}

/// Load a core configuration, or the defaults when no path is given.
///
/// # Errors
///
/// As [`load_ron`].
pub fn load_config(path: Option<&Path>) -> Result<CoreConfig> {
    match path {
        Some(path) => load_ron(path),
        None => Ok(CoreConfig::default()),
    }
}

/// Parse a JSON-lines intent script.
///
/// Blank lines and lines starting with `#` are skipped.
///
/// # Errors
///
/// `Script` naming the first line that is not a valid intent.
pub fn parse_script(text: &str) -> Result<Vec<Intent>> {
    text.lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line, json)| serde_json::from_str(json).map_err(|source| ToolError::Script { line, source }))
        .collect()
}

/// Load a JSON-lines intent script from disk.
///
/// # Errors
///
/// Read errors as [`read_text`], parse errors as [`parse_script`].
pub fn load_script(path: &Path) -> Result<Vec<Intent>> {
    let intents = parse_script(&read_text(path)?)?;
    tracing::debug!(path = %path.display(), intents = intents.len(), "Loaded script");
    Ok(intents)
}
