//! Shared driver for the thumbnail passes.
//!
//! A pass walks every collection file under the data root, asks a
//! [`ThumbnailSource`] to make sure `<output dir>/<id>.jpg` exists for each
//! record, and points the record's `thumbnail` field at it. A file is only
//! rewritten when one of its records actually changed, and a failure on one
//! file never stops the scan.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::record::THUMBNAIL_FIELD;
use crate::scan::find_collections;
use crate::store::{RawRecord, load_collection, save_collection};

/// View of the fields a source may need from a record.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub artist: &'a str,
    pub url: Option<&'a str>,
}

impl<'a> Entry<'a> {
    /// `None` when the record has no string `id`.
    pub fn from_record(record: &'a RawRecord) -> Option<Self> {
        let id = str_field(record, "id").filter(|id| !id.is_empty())?;
        Some(Self {
            id,
            title: str_field(record, "title").unwrap_or_default(),
            artist: str_field(record, "artist").unwrap_or_default(),
            url: str_field(record, "url"),
        })
    }
}

fn str_field<'a>(record: &'a RawRecord, key: &str) -> Option<&'a str> {
    record.get(key).and_then(Value::as_str)
}

/// What a source did for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provision {
    /// The image was already on disk; nothing was fetched or drawn.
    AlreadyPresent,
    /// A new image was written.
    Created,
    /// The source cannot handle this record; its `thumbnail` stays unset.
    Unsupported,
}

/// Produces the image file for a record.
pub trait ThumbnailSource {
    /// Short name used in log lines.
    fn label(&self) -> &'static str;

    /// Makes sure `dest` holds an image for `entry`. An `Err` is logged by the
    /// pass and leaves the record untouched.
    fn provide(&mut self, entry: &Entry<'_>, dest: &Path) -> Result<Provision>;
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub files_scanned: usize,
    pub files_updated: usize,
    pub files_failed: usize,
    pub created: usize,
    pub already_present: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct ThumbnailPass {
    output_dir: PathBuf,
    url_prefix: String,
}

impl ThumbnailPass {
    pub fn new(output_dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            url_prefix: url_prefix.into(),
        }
    }

    pub fn image_path(&self, video_id: &str) -> PathBuf {
        self.output_dir.join(format!("{video_id}.jpg"))
    }

    /// Value stored in the record's `thumbnail` field.
    pub fn thumbnail_value(&self, video_id: &str) -> String {
        format!("{}/{video_id}.jpg", self.url_prefix.trim_end_matches('/'))
    }

    /// Runs the pass over every collection under `data_root`. Only a missing,
    /// uncreatable output directory is fatal.
    pub fn run(&self, data_root: &Path, source: &mut dyn ThumbnailSource) -> Result<PassSummary> {
        fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("creating {}", self.output_dir.display()))?;

        let files = find_collections(data_root)?;
        info!(
            "[{}] {} data file(s) under {}",
            source.label(),
            files.len(),
            data_root.display()
        );

        let mut summary = PassSummary::default();
        for path in &files {
            summary.files_scanned += 1;
            info!("Processing {}", path.display());
            match self.process_file(path, source, &mut summary) {
                Ok(true) => {
                    summary.files_updated += 1;
                    info!("Updated {}", path.display());
                }
                Ok(false) => info!("No changes for {}", path.display()),
                Err(err) => {
                    summary.files_failed += 1;
                    error!("Error processing {}: {err:#}", path.display());
                }
            }
        }

        info!(
            "[{}] done: {} file(s) scanned, {} updated, {} failed; {} image(s) created, {} already present, {} record(s) skipped",
            source.label(),
            summary.files_scanned,
            summary.files_updated,
            summary.files_failed,
            summary.created,
            summary.already_present,
            summary.skipped,
        );
        Ok(summary)
    }

    /// Updates one collection in memory and writes it back if anything
    /// changed. Returns whether the file was rewritten.
    fn process_file(
        &self,
        path: &Path,
        source: &mut dyn ThumbnailSource,
        summary: &mut PassSummary,
    ) -> Result<bool> {
        let mut records: Vec<RawRecord> = load_collection(path)?;
        let mut changed = false;

        for record in &mut records {
            let Some(entry) = Entry::from_record(record) else {
                warn!("Skipping record without id in {}", path.display());
                summary.skipped += 1;
                continue;
            };
            let video_id = entry.id.to_owned();
            let dest = self.image_path(&video_id);

            let provision = match source.provide(&entry, &dest) {
                Ok(provision) => provision,
                Err(err) => {
                    warn!("{video_id}: {err:#}");
                    summary.skipped += 1;
                    continue;
                }
            };
            match provision {
                Provision::AlreadyPresent => summary.already_present += 1,
                Provision::Created => summary.created += 1,
                Provision::Unsupported => {
                    summary.skipped += 1;
                    continue;
                }
            }

            let value = Value::String(self.thumbnail_value(&video_id));
            if record.get(THUMBNAIL_FIELD) != Some(&value) {
                record.insert(THUMBNAIL_FIELD.to_owned(), value);
                changed = true;
            }
        }

        if changed {
            save_collection(path, &records)?;
        }
        Ok(changed)
    }
}
