//! Discovery of the per-month data files (`<data root>/<year>/videos_*.json`).

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::warn;
use walkdir::WalkDir;

const YEAR_DIR_PREFIX: &str = "20";
const COLLECTION_PREFIX: &str = "videos_";
const COLLECTION_SUFFIX: &str = ".json";

/// Walks `root` and returns every collection file that sits directly inside a
/// year-named directory, sorted by path.
pub fn find_collections(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), err);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if is_collection_file(entry.path()) {
            found.push(entry.into_path());
        }
    }

    found.sort();
    Ok(found)
}

fn is_collection_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    if !(name.starts_with(COLLECTION_PREFIX) && name.ends_with(COLLECTION_SUFFIX)) {
        return false;
    }
    path.parent()
        .and_then(|parent| parent.file_name())
        .and_then(|dir| dir.to_str())
        .is_some_and(|dir| dir.starts_with(YEAR_DIR_PREFIX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn finds_only_year_scoped_collections() -> Result<()> {
        let temp = tempdir()?;
        let root = temp.path();
        fs::create_dir_all(root.join("2024"))?;
        fs::create_dir_all(root.join("2023"))?;
        fs::create_dir_all(root.join("scripts"))?;
        fs::write(root.join("2024/videos_10.json"), "[]")?;
        fs::write(root.join("2024/videos_02.json"), "[]")?;
        fs::write(root.join("2023/videos_12.json"), "[]")?;
        fs::write(root.join("2024/notes.json"), "[]")?;
        fs::write(root.join("scripts/videos_01.json"), "[]")?;
        fs::write(root.join("videos.json"), "[]")?;

        let found = find_collections(root)?;
        let relative: Vec<_> = found
            .iter()
            .map(|path| path.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            relative,
            vec![
                PathBuf::from("2023/videos_12.json"),
                PathBuf::from("2024/videos_02.json"),
                PathBuf::from("2024/videos_10.json"),
            ]
        );
        Ok(())
    }

    #[test]
    fn missing_root_is_empty() -> Result<()> {
        let temp = tempdir()?;
        assert!(find_collections(&temp.path().join("absent"))?.is_empty());
        Ok(())
    }
}
