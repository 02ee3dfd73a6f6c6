//! Whole-file JSON collections.
//!
//! A collection is read completely, changed in memory, then written back in a
//! single step: the new content goes to a temporary file in the same directory
//! which is renamed over the destination, so an interrupted run never leaves a
//! half-written file behind.

use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;

/// Raw object form used when records must round-trip untouched fields.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

pub fn load_collection<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).with_context(|| format!("parsing {}", path.display()))
}

/// Serializes `items` as a 2-space indented array. Non-ASCII text is kept
/// literal.
pub fn render_collection<T: Serialize>(items: &[T]) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(items).context("serializing collection")
}

pub fn save_collection<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    let body = render_collection(items)?;
    write_atomic(path, &body)
}

/// Writes `bytes` to `path` through a sibling temp file and a rename. Missing
/// parent directories are created.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;

    let mut tmp = NamedTempFile::new_in(parent)
        .with_context(|| format!("creating temp file in {}", parent.display()))?;
    tmp.write_all(bytes)
        .with_context(|| format!("writing temp file for {}", path.display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("flushing temp file for {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}
