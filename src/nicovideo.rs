//! Playlist (mylist) enumeration and per-video metadata for nicovideo.
//!
//! The playlist is resolved through its public RSS feed, then every video is
//! looked up on the `getthumbinfo` endpoint. The thumbinfo document is read
//! with tolerant patterns: a missing element turns into a default value, never
//! into an error, because the endpoint omits fields for old or restricted
//! uploads.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::{Captures, Regex};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::http::{Fetch, Pacer};
use crate::platform::{Platform, nicovideo_watch_url};
use crate::record::{CATEGORY_OTHER, CATEGORY_VOCALOID, UNKNOWN_ARTIST, VideoRecord};

const RSS_URL_BASE: &str = "https://www.nicovideo.jp/mylist";
const THUMBINFO_URL_BASE: &str = "https://ext.nicovideo.jp/api/getthumbinfo";

/// Voice-synth names looked for in titles and descriptions, in priority order.
pub const VOICE_NAMES: [&str; 6] = ["初音ミク", "鏡音リン", "鏡音レン", "巡音ルカ", "MEIKO", "KAITO"];

static MYLIST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"mylist/(\d+)").expect("valid mylist pattern"));
static SM_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"sm\d+").expect("valid sm pattern"));
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<title>(.*?)</title>").expect("valid title pattern"));
static DESCRIPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<description>(.*?)</description>").expect("valid description pattern")
});
static NICKNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<user_nickname>(.*?)</user_nickname>").expect("valid nickname pattern")
});
static VIEWS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<view_counter>\s*(\d+)\s*</view_counter>").expect("valid view pattern")
});
static LIKES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<like_counter>\s*(\d+)\s*</like_counter>").expect("valid like pattern")
});
static TAGS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<tags\b[^>]*>(.*?)</tags>").expect("valid tags pattern"));
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<tag\b[^>]*>(.*?)</tag>").expect("valid tag pattern"));
static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|amp|lt|gt|quot|apos);").expect("valid entity pattern")
});

/// Numeric mylist id embedded in a playlist URL.
pub fn extract_mylist_id(playlist_url: &str) -> Option<String> {
    MYLIST_RE
        .captures(playlist_url)
        .map(|caps| caps[1].to_owned())
}

pub fn rss_url(mylist_id: &str) -> String {
    format!("{RSS_URL_BASE}/{mylist_id}?rss=2.0")
}

pub fn thumbinfo_url(video_id: &str) -> String {
    format!("{THUMBINFO_URL_BASE}/{video_id}")
}

#[derive(Deserialize)]
struct RssDocument {
    channel: RssChannel,
}

#[derive(Deserialize)]
struct RssChannel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Deserialize)]
struct RssItem {
    #[serde(default)]
    link: Option<String>,
}

/// Parses an RSS 2.0 feed and returns the `sm` ids of its items, deduplicated
/// and sorted lexically.
pub fn parse_rss_video_ids(xml: &str) -> Result<Vec<String>> {
    let document: RssDocument = quick_xml::de::from_str(xml).context("parsing RSS feed")?;
    let ids: BTreeSet<String> = document
        .channel
        .items
        .iter()
        .filter_map(|item| item.link.as_deref())
        .filter_map(|link| SM_ID_RE.find(link))
        .map(|m| m.as_str().to_owned())
        .collect();
    Ok(ids.into_iter().collect())
}

/// Fields recovered from a thumbinfo document. `None` means the element was
/// absent or unparsable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThumbInfo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub user_nickname: Option<String>,
    pub view_counter: Option<u64>,
    pub like_counter: Option<u64>,
    pub tags: Vec<String>,
}

pub fn parse_thumbinfo(body: &str) -> ThumbInfo {
    ThumbInfo {
        title: capture_text(&TITLE_RE, body),
        description: capture_text(&DESCRIPTION_RE, body),
        user_nickname: capture_text(&NICKNAME_RE, body).filter(|name| !name.is_empty()),
        view_counter: capture_number(&VIEWS_RE, body),
        like_counter: capture_number(&LIKES_RE, body),
        tags: parse_tags(body),
    }
}

fn capture_text(re: &Regex, body: &str) -> Option<String> {
    re.captures(body)
        .map(|caps| decode_entities(caps[1].trim()))
}

/// Counters that overflow `u64` are treated as missing.
fn capture_number(re: &Regex, body: &str) -> Option<u64> {
    re.captures(body)
        .and_then(|caps| caps[1].parse::<u64>().ok())
}

fn parse_tags(body: &str) -> Vec<String> {
    let Some(caps) = TAGS_RE.captures(body) else {
        return Vec::new();
    };
    let inner = &caps[1];

    let tagged: Vec<String> = TAG_RE
        .captures_iter(inner)
        .map(|tag| decode_entities(tag[1].trim()))
        .filter(|tag| !tag.is_empty())
        .collect();
    if !tagged.is_empty() {
        return tagged;
    }

    inner
        .split_whitespace()
        .map(decode_entities)
        .collect()
}

/// Resolves the predefined XML entities and numeric character references.
pub fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => {
                    let digits = &entity[1..];
                    let code = match digits.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => digits.parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                }
            };
            decoded.map_or_else(|| caps[0].to_owned(), String::from)
        })
        .into_owned()
}

/// Returns the first voice-synth name (in [`VOICE_NAMES`] order) mentioned in
/// the title or description.
pub fn detect_vocaloid(title: &str, description: &str) -> Option<&'static str> {
    VOICE_NAMES
        .iter()
        .copied()
        .find(|name| title.contains(name) || description.contains(name))
}

/// Turns parsed thumbinfo into the persisted record, filling defaults.
pub fn build_record(video_id: &str, info: ThumbInfo, date_added: &str) -> VideoRecord {
    let title = info.title.unwrap_or_else(|| format!("動画 {video_id}"));
    let description = info.description.unwrap_or_default();
    let vocaloid = detect_vocaloid(&title, &description).map(str::to_owned);
    let category = if vocaloid.is_some() {
        CATEGORY_VOCALOID
    } else {
        CATEGORY_OTHER
    };

    VideoRecord {
        id: video_id.to_owned(),
        url: nicovideo_watch_url(video_id),
        platform: Platform::Nicovideo,
        category: category.to_owned(),
        date_added: date_added.to_owned(),
        rank: None,
        views: info.view_counter.unwrap_or(0),
        likes: info.like_counter.unwrap_or(0),
        tags: info.tags,
        artist: info
            .user_nickname
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_owned()),
        vocaloid,
        thumbnail: None,
        title,
        description,
    }
}

/// Drives one generator run: playlist URL in, records out. Requests go through
/// the injected fetcher and are spaced by the pacer.
pub struct PlaylistGenerator<'a, F: Fetch> {
    fetcher: &'a F,
    pacer: Pacer,
    date_added: String,
}

impl<'a, F: Fetch> PlaylistGenerator<'a, F> {
    pub fn new(fetcher: &'a F, pacer: Pacer, date_added: impl Into<String>) -> Self {
        Self {
            fetcher,
            pacer,
            date_added: date_added.into(),
        }
    }

    /// Resolves the playlist to video ids. Every failure is logged and yields
    /// an empty list.
    pub fn collect_video_ids(&mut self, playlist_url: &str) -> Vec<String> {
        let Some(mylist_id) = extract_mylist_id(playlist_url) else {
            warn!("Could not find a mylist id in {playlist_url}");
            return Vec::new();
        };

        let feed_url = rss_url(&mylist_id);
        self.pacer.wait();
        let ids = self
            .fetcher
            .get_text(&feed_url)
            .and_then(|xml| parse_rss_video_ids(&xml));
        match ids {
            Ok(ids) => {
                debug!("Video ids found in RSS: {:?}", ids);
                ids
            }
            Err(err) => {
                warn!("Failed to read RSS feed {feed_url}: {err:#}");
                Vec::new()
            }
        }
    }

    pub fn fetch_record(&mut self, video_id: &str) -> Result<VideoRecord> {
        self.pacer.wait();
        let body = self.fetcher.get_text(&thumbinfo_url(video_id))?;
        Ok(build_record(
            video_id,
            parse_thumbinfo(&body),
            &self.date_added,
        ))
    }

    /// Full pipeline. Videos whose metadata cannot be fetched are left out.
    pub fn generate(&mut self, playlist_url: &str) -> Vec<VideoRecord> {
        info!("Parsing playlist: {playlist_url}");
        let ids = self.collect_video_ids(playlist_url);
        info!("Videos found: {}", ids.len());
        if ids.is_empty() {
            warn!("No videos found; the playlist may be private or missing.");
            return Vec::new();
        }

        let total = ids.len();
        let mut records = Vec::with_capacity(total);
        for (index, video_id) in ids.iter().enumerate() {
            info!("[{}/{}] Fetching metadata for {}", index + 1, total, video_id);
            match self.fetch_record(video_id) {
                Ok(record) => records.push(record),
                Err(err) => warn!("Failed to fetch metadata for {video_id}: {err:#}"),
            }
        }
        records
    }
}
