//! Video platforms and their URL conventions.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

static NICO_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:sm|nm|so)\d+").expect("valid video id pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Nicovideo,
    Youtube,
}

impl Platform {
    /// Substring dispatch on a record's watch URL.
    pub fn detect(video_url: &str) -> Option<Self> {
        if video_url.contains("youtube.com") || video_url.contains("youtu.be") {
            Some(Self::Youtube)
        } else if video_url.contains("nicovideo.jp") {
            Some(Self::Nicovideo)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nicovideo => "nicovideo",
            Self::Youtube => "youtube",
        }
    }
}

/// Canonical watch page for a nicovideo identifier.
pub fn nicovideo_watch_url(video_id: &str) -> String {
    format!("https://www.nicovideo.jp/watch/{video_id}")
}

/// Finds a nicovideo identifier (`sm`, `nm` or `so` followed by digits)
/// anywhere in `text`.
pub fn extract_nicovideo_id(text: &str) -> Option<String> {
    NICO_ID_RE.find(text).map(|m| m.as_str().to_owned())
}

/// Pulls the video id out of a `youtu.be/<id>` short link or a
/// `youtube.com/watch?v=<id>` URL. The scheme and any leading text are
/// optional; only the part from the host onwards is looked at.
pub fn extract_youtube_id(video_url: &str) -> Option<String> {
    let start = video_url
        .find("youtu.be/")
        .or_else(|| video_url.find("youtube.com/"))?;
    let parsed = Url::parse(&format!("https://{}", &video_url[start..])).ok()?;
    let id = if parsed.host_str() == Some("youtu.be") {
        parsed.path_segments()?.find(|segment| !segment.is_empty())?.to_owned()
    } else if parsed.path() == "/watch" {
        parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())?
    } else {
        return None;
    };
    (!id.is_empty()).then_some(id)
}

/// Builds the CDN URL of the thumbnail for a record. `None` when the platform
/// is not recognised. YouTube URLs that carry no recognisable id (shorts,
/// embeds, live pages) fall back to the record's own id.
pub fn thumbnail_url(video_id: &str, video_url: &str) -> Option<String> {
    match Platform::detect(video_url)? {
        Platform::Youtube => {
            let yt_id = extract_youtube_id(video_url).unwrap_or_else(|| video_id.to_owned());
            Some(format!("https://img.youtube.com/vi/{yt_id}/hqdefault.jpg"))
        }
        Platform::Nicovideo => {
            let numeric = video_id
                .strip_prefix("sm")
                .or_else(|| video_id.strip_prefix("nm"))
                .or_else(|| video_id.strip_prefix("so"))
                .unwrap_or(video_id);
            Some(format!(
                "https://nicovideo.cdn.nimg.jp/thumbnails/{numeric}/{video_id}.L"
            ))
        }
    }
}
