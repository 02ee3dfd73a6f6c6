//! Thumbnail source that copies the platform's own thumbnail image.

use std::path::Path;

use anyhow::{Result, bail};
use tracing::{info, warn};

use crate::http::{Fetch, Pacer};
use crate::platform::{Platform, thumbnail_url};
use crate::store::write_atomic;
use crate::thumbnails::{Entry, Provision, ThumbnailSource};

pub struct DownloadSource<'a, F: Fetch> {
    fetcher: &'a F,
    pacer: Pacer,
}

impl<'a, F: Fetch> DownloadSource<'a, F> {
    pub fn new(fetcher: &'a F, pacer: Pacer) -> Self {
        Self { fetcher, pacer }
    }
}

impl<F: Fetch> ThumbnailSource for DownloadSource<'_, F> {
    fn label(&self) -> &'static str {
        "download"
    }

    fn provide(&mut self, entry: &Entry<'_>, dest: &Path) -> Result<Provision> {
        let Some(video_url) = entry.url else {
            warn!("{}: record has no url", entry.id);
            return Ok(Provision::Unsupported);
        };
        let Some(platform) = Platform::detect(video_url) else {
            info!("Unknown platform for {video_url}");
            return Ok(Provision::Unsupported);
        };
        let Some(source_url) = thumbnail_url(entry.id, video_url) else {
            warn!("{}: no thumbnail source for {video_url}", entry.id);
            return Ok(Provision::Unsupported);
        };

        if dest.exists() {
            info!("Already exists: {}", dest.display());
            return Ok(Provision::AlreadyPresent);
        }

        info!(
            "Downloading {} thumbnail {source_url} -> {}",
            platform.as_str(),
            dest.display()
        );
        self.pacer.wait();
        let bytes = self.fetcher.get_bytes(&source_url)?;
        if bytes.is_empty() {
            bail!("empty response from {source_url}");
        }
        write_atomic(dest, &bytes)?;
        info!("Downloaded: {}", dest.display());
        Ok(Provision::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::stub::StubFetcher;
    use crate::store::{RawRecord, load_collection};
    use crate::thumbnails::ThumbnailPass;
    use serde_json::json;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    const NICO_THUMB: &str = "https://nicovideo.cdn.nimg.jp/thumbnails/100/sm100.L";
    const YT_THUMB: &str = "https://img.youtube.com/vi/XYZ/hqdefault.jpg";

    fn fixture(data: &Path) -> Result<std::path::PathBuf> {
        let file = data.join("2024/videos_05.json");
        fs::create_dir_all(file.parent().unwrap())?;
        let records = json!([
            {"id": "sm100", "title": "a", "url": "https://www.nicovideo.jp/watch/sm100"},
            {"id": "yt-1", "title": "b", "url": "https://www.youtube.com/watch?v=XYZ"},
            {"id": "v-1", "title": "c", "url": "https://vimeo.com/1"},
            {"id": "sm404", "title": "d", "url": "https://www.nicovideo.jp/watch/sm404"},
            {"id": "sm7", "title": "e"}
        ]);
        fs::write(&file, serde_json::to_vec_pretty(&records)?)?;
        Ok(file)
    }

    #[test]
    fn downloads_supported_platforms_and_skips_the_rest() -> Result<()> {
        let temp = tempdir()?;
        let data = temp.path().join("data");
        let file = fixture(&data)?;
        let fetcher = StubFetcher::default()
            .with(NICO_THUMB, b"nico-bytes".to_vec())
            .with(YT_THUMB, b"yt-bytes".to_vec());
        let pass = ThumbnailPass::new(temp.path().join("thumbs"), "/thumbnails");

        let mut source = DownloadSource::new(&fetcher, Pacer::new(Duration::ZERO));
        let summary = pass.run(&data, &mut source)?;

        assert_eq!(summary.created, 2);
        assert_eq!(summary.skipped, 3);
        assert_eq!(fs::read(temp.path().join("thumbs/sm100.jpg"))?, b"nico-bytes");
        assert_eq!(fs::read(temp.path().join("thumbs/yt-1.jpg"))?, b"yt-bytes");

        let records: Vec<RawRecord> = load_collection(&file)?;
        assert_eq!(records[0]["thumbnail"], "/thumbnails/sm100.jpg");
        assert_eq!(records[1]["thumbnail"], "/thumbnails/yt-1.jpg");
        assert!(!records[2].contains_key("thumbnail"));
        assert!(!records[3].contains_key("thumbnail"));
        assert!(!records[4].contains_key("thumbnail"));
        assert!(!temp.path().join("thumbs/sm404.jpg").exists());
        Ok(())
    }

    #[test]
    fn rerun_makes_no_new_requests_for_present_images() -> Result<()> {
        let temp = tempdir()?;
        let data = temp.path().join("data");
        let file = fixture(&data)?;
        let fetcher = StubFetcher::default()
            .with(NICO_THUMB, b"nico".to_vec())
            .with(YT_THUMB, b"yt".to_vec());
        let pass = ThumbnailPass::new(temp.path().join("thumbs"), "/thumbnails");

        pass.run(&data, &mut DownloadSource::new(&fetcher, Pacer::new(Duration::ZERO)))?;
        // Two successes plus the failing sm404 request.
        assert_eq!(fetcher.request_count(), 3);
        let after_first = fs::read(&file)?;

        let summary =
            pass.run(&data, &mut DownloadSource::new(&fetcher, Pacer::new(Duration::ZERO)))?;
        assert_eq!(summary.already_present, 2);
        assert_eq!(summary.files_updated, 0);
        // Only the still-missing sm404 is retried.
        assert_eq!(fetcher.request_count(), 4);
        assert_eq!(fs::read(&file)?, after_first);
        Ok(())
    }
}
