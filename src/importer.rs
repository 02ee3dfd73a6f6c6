//! Import of a saved playlist widget (`ol.col-playlist > li.media-info`).

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use crate::platform::{extract_nicovideo_id, nicovideo_watch_url};
use crate::record::PlaylistEntry;

static ITEM_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("ol.col-playlist > li.media-info").expect("valid playlist item selector")
});
static HEADING_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h3").expect("valid heading selector"));
static CREATOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".playlist-creator").expect("valid creator selector"));
static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid link selector"));

/// Extracts one entry per playlist item, in document order. Items without a
/// recoverable video id are skipped.
pub fn parse_playlist_html(html: &str) -> Vec<PlaylistEntry> {
    let document = Html::parse_document(html);
    let mut entries = Vec::new();

    for (index, item) in document.select(&ITEM_SELECTOR).enumerate() {
        let Some(id) = item_video_id(&item) else {
            warn!("Skipping playlist item {} without a video id", index + 1);
            continue;
        };
        let title = attr_or_text(&item, "data-song-title", &HEADING_SELECTOR);
        let artist = attr_or_text(&item, "data-creator-name", &CREATOR_SELECTOR);
        entries.push(PlaylistEntry {
            url: nicovideo_watch_url(&id),
            id,
            title,
            artist,
        });
    }

    entries
}

fn item_video_id(item: &ElementRef<'_>) -> Option<String> {
    if let Some(id) = item
        .value()
        .attr("data-video-id")
        .map(str::trim)
        .filter(|id| !id.is_empty())
    {
        return Some(id.to_owned());
    }
    item.select(&LINK_SELECTOR)
        .next()
        .and_then(|link| link.value().attr("href"))
        .and_then(extract_nicovideo_id)
}

/// Non-empty attribute value, else the trimmed text of the first match of
/// `fallback`, else an empty string.
fn attr_or_text(item: &ElementRef<'_>, attr: &str, fallback: &Selector) -> String {
    if let Some(value) = item.value().attr(attr).filter(|value| !value.is_empty()) {
        return value.to_owned();
    }
    item.select(fallback)
        .next()
        .map(|node| node.text().collect::<String>().trim().to_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDGET: &str = r#"
<html><body>
<div class="playlist">
  <ol class="col-playlist">
    <li class="media-info" data-video-id="sm100" data-song-title="曲A" data-creator-name="作者A">
      <h3>heading ignored</h3>
    </li>
    <li class="media-info" data-video-id="sm200">
      <h3>
        曲B
      </h3>
      <span class="playlist-creator"> 作者B </span>
    </li>
    <li class="media-info">
      <a href="https://www.nicovideo.jp/watch/sm300?from=kiite">曲C</a>
    </li>
    <li class="media-info"><h3>no id</h3></li>
    <li class="other" data-video-id="sm999"></li>
  </ol>
  <ul class="col-playlist"><li class="media-info" data-video-id="sm888"></li></ul>
</div>
</body></html>"#;

    #[test]
    fn items_are_extracted_with_fallbacks() {
        let entries = parse_playlist_html(WIDGET);
        assert_eq!(
            entries,
            vec![
                PlaylistEntry {
                    id: "sm100".into(),
                    title: "曲A".into(),
                    url: "https://www.nicovideo.jp/watch/sm100".into(),
                    artist: "作者A".into(),
                },
                PlaylistEntry {
                    id: "sm200".into(),
                    title: "曲B".into(),
                    url: "https://www.nicovideo.jp/watch/sm200".into(),
                    artist: "作者B".into(),
                },
                PlaylistEntry {
                    id: "sm300".into(),
                    title: String::new(),
                    url: "https://www.nicovideo.jp/watch/sm300".into(),
                    artist: String::new(),
                },
            ]
        );
    }

    #[test]
    fn entries_serialize_in_widget_field_order() {
        let entries = parse_playlist_html(WIDGET);
        let text = serde_json::to_string(&entries[0]).unwrap();
        assert_eq!(
            text,
            r#"{"id":"sm100","title":"曲A","url":"https://www.nicovideo.jp/watch/sm100","artist":"作者A"}"#
        );
    }

    #[test]
    fn document_without_playlist_is_empty() {
        assert!(parse_playlist_html("<p>nothing here</p>").is_empty());
    }
}
