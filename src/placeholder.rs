//! Locally drawn placeholder thumbnails.
//!
//! The card is 320x180: a dark vertical gradient, the wrapped title, an
//! optional `by <artist>` line, the video id near the bottom edge and a red
//! play button in the middle. Text is drawn with a one-pixel black shadow.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_hollow_circle_mut, draw_polygon_mut, draw_text_mut, text_size,
};
use imageproc::point::Point;
use tracing::{debug, info, warn};

use crate::store::write_atomic;
use crate::thumbnails::{Entry, Provision, ThumbnailSource};

pub const WIDTH: u32 = 320;
pub const HEIGHT: u32 = 180;
pub const JPEG_QUALITY: u8 = 85;
/// Maximum characters per title line.
pub const TITLE_WRAP: usize = 25;

const TITLE_SCALE: f32 = 16.0;
const CAPTION_SCALE: f32 = 12.0;
const TITLE_TOP: i32 = 40;
const TITLE_LINE_HEIGHT: i32 = 20;
const ARTIST_GAP: i32 = 10;
const ID_BOTTOM_OFFSET: i32 = 30;

const SHADOW: Rgb<u8> = Rgb([0x00, 0x00, 0x00]);
const TITLE_COLOR: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);
const ARTIST_COLOR: Rgb<u8> = Rgb([0xcc, 0xcc, 0xcc]);
const ID_COLOR: Rgb<u8> = Rgb([0x88, 0x88, 0x88]);
const PLAY_FILL: Rgb<u8> = Rgb([0xff, 0x00, 0x00]);
const PLAY_GLYPH: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);

/// Fonts tried in order when no explicit font is configured. CJK-capable
/// faces come first so Japanese titles render.
pub const FONT_CANDIDATES: &[&str] = &[
    "/System/Library/Fonts/ヒラギノ角ゴシック W3.ttc",
    "/System/Library/Fonts/Hiragino Sans GB.ttc",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/fonts-japanese-gothic.ttf",
    "C:\\Windows\\Fonts\\meiryo.ttc",
    "C:\\Windows\\Fonts\\msgothic.ttc",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/Library/Fonts/Arial Unicode.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Loads a TrueType/OpenType font (first face of a collection).
pub fn load_font(path: &Path) -> Result<FontVec> {
    let bytes = fs::read(path).with_context(|| format!("reading font {}", path.display()))?;
    FontVec::try_from_vec_and_index(bytes, 0)
        .with_context(|| format!("parsing font {}", path.display()))
}

/// Picks the preferred font if it loads, otherwise the first candidate that
/// does. `None` means text will be left out.
pub fn resolve_font(preferred: Option<&Path>) -> Option<FontVec> {
    let candidates = preferred
        .map(Path::to_path_buf)
        .into_iter()
        .chain(FONT_CANDIDATES.iter().map(PathBuf::from));
    for path in candidates {
        if !path.exists() {
            continue;
        }
        match load_font(&path) {
            Ok(font) => {
                debug!("Using font {}", path.display());
                return Some(font);
            }
            Err(err) => warn!("{err:#}"),
        }
    }
    None
}

/// Greedy word wrap: lines hold at most `width` characters, words longer than
/// a line are split. Text without spaces (typical for Japanese titles) is
/// therefore cut into `width`-sized chunks.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();
        loop {
            let needed = if current_len == 0 {
                chars.len()
            } else {
                current_len + 1 + chars.len()
            };
            if needed <= width {
                if current_len > 0 {
                    current.push(' ');
                    current_len += 1;
                }
                current.extend(chars.iter());
                current_len += chars.len();
                break;
            }
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
                continue;
            }
            let rest = chars.split_off(width);
            lines.push(chars.into_iter().collect());
            chars = rest;
        }
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Draws placeholder cards. Holds the font for the whole run.
pub struct PlaceholderRenderer {
    font: Option<FontVec>,
}

impl PlaceholderRenderer {
    pub fn new(font: Option<FontVec>) -> Self {
        if font.is_none() {
            warn!("No usable font found; placeholders will be drawn without text");
        }
        Self { font }
    }

    pub fn render(&self, video_id: &str, title: &str, artist: &str) -> RgbImage {
        let mut img = gradient_background();

        if let Some(font) = &self.font {
            let mut y = TITLE_TOP;
            for line in wrap_text(title, TITLE_WRAP) {
                draw_centered(&mut img, font, TITLE_SCALE, y, &line, TITLE_COLOR);
                y += TITLE_LINE_HEIGHT;
            }
            if !artist.is_empty() {
                let caption = format!("by {artist}");
                draw_centered(&mut img, font, CAPTION_SCALE, y + ARTIST_GAP, &caption, ARTIST_COLOR);
            }
            let id_y = HEIGHT as i32 - ID_BOTTOM_OFFSET;
            draw_centered(&mut img, font, CAPTION_SCALE, id_y, video_id, ID_COLOR);
        }

        draw_play_button(&mut img);
        img
    }

    /// Renders and writes the card as a JPEG at `dest`.
    pub fn write(&self, video_id: &str, title: &str, artist: &str, dest: &Path) -> Result<()> {
        let img = self.render(video_id, title, artist);
        let bytes = encode_jpeg(&img)?;
        write_atomic(dest, &bytes)
    }
}

impl ThumbnailSource for PlaceholderRenderer {
    fn label(&self) -> &'static str {
        "placeholder"
    }

    fn provide(&mut self, entry: &Entry<'_>, dest: &Path) -> Result<Provision> {
        if dest.exists() {
            info!("Already exists: {}", dest.display());
            return Ok(Provision::AlreadyPresent);
        }
        self.write(entry.id, entry.title, entry.artist, dest)?;
        info!("Created: {}", dest.display());
        Ok(Provision::Created)
    }
}

pub fn encode_jpeg(img: &RgbImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
    encoder.encode_image(img).context("encoding JPEG")?;
    Ok(buffer.into_inner())
}

/// Dark blue-grey gradient, lighter towards the bottom.
fn gradient_background() -> RgbImage {
    RgbImage::from_fn(WIDTH, HEIGHT, |_, y| {
        let t = y as f32 / HEIGHT as f32;
        Rgb([
            (26.0 + t * 30.0) as u8,
            (26.0 + t * 30.0) as u8,
            (26.0 + t * 50.0) as u8,
        ])
    })
}

fn draw_centered(img: &mut RgbImage, font: &FontVec, scale: f32, y: i32, text: &str, color: Rgb<u8>) {
    let scale = PxScale::from(scale);
    let (text_width, _) = text_size(scale, font, text);
    let x = (WIDTH as i32 - text_width as i32) / 2;
    draw_text_mut(img, SHADOW, x + 1, y + 1, scale, font, text);
    draw_text_mut(img, color, x, y, scale, font, text);
}

fn draw_play_button(img: &mut RgbImage) {
    let cx = WIDTH as i32 / 2 - 15;
    let cy = HEIGHT as i32 / 2 - 15;
    draw_filled_circle_mut(img, (cx, cy), 20, PLAY_FILL);
    // Two-pixel white ring.
    draw_hollow_circle_mut(img, (cx, cy), 20, PLAY_GLYPH);
    draw_hollow_circle_mut(img, (cx, cy), 19, PLAY_GLYPH);
    let triangle = [
        Point::new(cx - 5, cy - 10),
        Point::new(cx - 5, cy + 10),
        Point::new(cx + 15, cy),
    ];
    draw_polygon_mut(img, &triangle, PLAY_GLYPH);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{RawRecord, load_collection};
    use crate::thumbnails::ThumbnailPass;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn wrap_breaks_on_spaces() {
        let lines = wrap_text("the quick brown fox jumps over the lazy dog", 10);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps over", "the lazy", "dog"]);
    }

    #[test]
    fn wrap_splits_long_unspaced_titles() {
        let title = "あ".repeat(30);
        let lines = wrap_text(&title, TITLE_WRAP);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].chars().count(), 25);
        assert_eq!(lines[1].chars().count(), 5);
        assert!(wrap_text("   ", 5).is_empty());
    }

    #[test]
    fn render_without_font_still_draws_background_and_button() {
        let renderer = PlaceholderRenderer::new(None);
        let img = renderer.render("sm1", "title", "artist");
        assert_eq!(img.dimensions(), (WIDTH, HEIGHT));
        assert_eq!(*img.get_pixel(0, 0), Rgb([26, 26, 26]));
        let bottom = img.get_pixel(0, HEIGHT - 1);
        assert!(bottom[2] > bottom[0]);
        // Centre of the red disc, left of the triangle.
        let disc = img.get_pixel(130, 75);
        assert_eq!(*disc, PLAY_FILL);
        // Inside the triangle.
        assert_eq!(*img.get_pixel(145, 75), PLAY_GLYPH);
    }

    #[test]
    fn encoded_output_is_a_jpeg() -> Result<()> {
        let img = PlaceholderRenderer::new(None).render("sm1", "", "");
        let bytes = encode_jpeg(&img)?;
        assert_eq!(&bytes[..3], &[0xFF, 0xD8, 0xFF]);
        let decoded = image::load_from_memory(&bytes)?;
        assert_eq!((decoded.width(), decoded.height()), (WIDTH, HEIGHT));
        Ok(())
    }

    #[test]
    fn missing_font_path_is_an_error() {
        assert!(load_font(Path::new("/definitely/not/here.ttf")).is_err());
    }

    #[test]
    fn placeholder_pass_creates_images_once() -> Result<()> {
        let temp = tempdir()?;
        let data = temp.path().join("data");
        let file = data.join("2024/videos_03.json");
        fs::create_dir_all(file.parent().unwrap())?;
        fs::write(
            &file,
            serde_json::to_vec_pretty(&json!([
                {"id": "sm1", "title": "曲", "artist": "作者"},
                {"id": "sm2", "title": "別の曲"}
            ]))?,
        )?;
        let thumbs = temp.path().join("thumbs");
        let pass = ThumbnailPass::new(&thumbs, "/thumbnails");

        let summary = pass.run(&data, &mut PlaceholderRenderer::new(None))?;
        assert_eq!(summary.created, 2);
        assert!(thumbs.join("sm1.jpg").exists());
        assert!(thumbs.join("sm2.jpg").exists());
        let records: Vec<RawRecord> = load_collection(&file)?;
        assert_eq!(records[1]["thumbnail"], "/thumbnails/sm2.jpg");

        let before = fs::read(thumbs.join("sm1.jpg"))?;
        let json_before = fs::read(&file)?;
        let summary = pass.run(&data, &mut PlaceholderRenderer::new(None))?;
        assert_eq!(summary.created, 0);
        assert_eq!(summary.already_present, 2);
        assert_eq!(fs::read(thumbs.join("sm1.jpg"))?, before);
        assert_eq!(fs::read(&file)?, json_before);
        Ok(())
    }
}
