//! JSON persistence for the raw and filtered user stores.
//!
//! Both stores are pretty-printed UTF-8 JSON arrays with non-ASCII content
//! preserved as written. An unreadable or unwritable store path is the one
//! fatal condition of the batch jobs, so everything here carries path
//! context on its errors.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Read a JSON array from `path`.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read store file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Store file {} is not a JSON array", path.display()))
}

/// Write `items` to `path` as a pretty-printed JSON array, creating parent
/// directories and fully replacing prior content.
pub fn save_json<T: Serialize>(items: &[T], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(items).context("Failed to serialize store")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write store file {}", path.display()))
}
