//! Font discovery and glyph drawing.
//!
//! Fonts come from a [`FontProvider`]. The first candidate path that exists
//! and parses is used; when none does, the built-in 8x8 bitmap font takes
//! over so a card can always be drawn.

use super::canvas::{blend, fill_rect, stroke_rect};
use super::spec::Color;
use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::RgbImage;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Source of font files.
pub trait FontProvider {
    fn exists(&self, path: &Path) -> bool;
    fn load(&self, path: &Path) -> Option<Vec<u8>>;
}

/// Reads fonts from the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsFontProvider;

impl FontProvider for FsFontProvider {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn load(&self, path: &Path) -> Option<Vec<u8>> {
        fs::read(path).ok()
    }
}

/// Fonts held in memory, keyed by the path callers ask for.
#[derive(Clone, Debug, Default)]
pub struct MemoryFontProvider {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemoryFontProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<P: Into<PathBuf>>(&mut self, path: P, data: Vec<u8>) {
        self.files.insert(path.into(), data);
    }
}

impl FontProvider for MemoryFontProvider {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn load(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.get(path).cloned()
    }
}

/// Largest pixel size text is measured or drawn at. Larger requests are
/// clamped so glyph metrics stay within integer range.
pub const MAX_FONT_SIZE: f32 = 1024.0;

pub(crate) fn clamp_size(size: f32) -> f32 {
    if size.is_nan() {
        0.0
    } else {
        size.clamp(0.0, MAX_FONT_SIZE)
    }
}

/// A font ready to draw with.
pub enum CardFont {
    Outline(FontVec),
    /// Built-in 8x8 glyphs, scaled by whole pixels to about half the
    /// requested size so a wrapped line still fits the canvas.
    Bitmap,
}

impl CardFont {
    pub fn is_builtin(&self) -> bool {
        matches!(self, CardFont::Bitmap)
    }

    /// Advance width of `text` in pixels at `size`, saturating at `u32::MAX`.
    pub fn measure(&self, text: &str, size: f32) -> u32 {
        let size = clamp_size(size);
        match self {
            CardFont::Outline(font) => {
                let scaled = font.as_scaled(PxScale::from(size));
                let mut width = 0.0_f32;
                let mut prev = None;
                for ch in text.chars() {
                    let id = scaled.glyph_id(ch);
                    if let Some(p) = prev {
                        width += scaled.kern(p, id);
                    }
                    width += scaled.h_advance(id);
                    prev = Some(id);
                }
                // float-to-int casts saturate
                width.max(0.0).ceil() as u32
            }
            CardFont::Bitmap => {
                let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
                chars.saturating_mul(8 * bitmap_scale(size) as u32)
            }
        }
    }

    /// Draw `text` with its top-left corner at `(x, y)`.
    pub fn draw(&self, img: &mut RgbImage, x: i64, y: i64, text: &str, size: f32, color: Color) {
        let size = clamp_size(size);
        match self {
            CardFont::Outline(font) => draw_outline(font, img, x, y, text, size, color),
            CardFont::Bitmap => draw_bitmap(img, x, y, text, size, color),
        }
    }
}

/// Pick the first usable font among `candidates`, else the built-in one.
pub fn select_font<F: FontProvider + ?Sized>(provider: &F, candidates: &[PathBuf]) -> CardFont {
    for path in candidates {
        if !provider.exists(path) {
            continue;
        }
        let Some(data) = provider.load(path) else {
            warn!(path = %path.display(), "font exists but could not be read");
            continue;
        };
        match FontVec::try_from_vec(data) {
            Ok(font) => {
                info!(path = %path.display(), "using font");
                return CardFont::Outline(font);
            }
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unparsable font"),
        }
    }
    info!(tried = candidates.len(), "no font candidate usable, using built-in bitmap font");
    CardFont::Bitmap
}

fn draw_outline(font: &FontVec, img: &mut RgbImage, x: i64, y: i64, text: &str, size: f32, color: Color) {
    let scale = PxScale::from(size);
    let scaled = font.as_scaled(scale);
    let mut caret = point(x as f32, y as f32 + scaled.ascent());
    let mut prev = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(p) = prev {
            caret.x += scaled.kern(p, id);
        }
        let glyph = id.with_scale_and_position(scale, caret);
        caret.x += scaled.h_advance(id);
        prev = Some(id);

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            let (ox, oy) = (bounds.min.x as i64, bounds.min.y as i64);
            outlined.draw(|gx, gy, coverage| blend(img, ox + gx as i64, oy + gy as i64, color, coverage));
        }
    }
}

fn bitmap_scale(size: f32) -> i64 {
    ((clamp_size(size) / 16.0) as i64).max(1)
}

fn draw_bitmap(img: &mut RgbImage, x: i64, y: i64, text: &str, size: f32, color: Color) {
    let s = bitmap_scale(size);
    let cell = 8 * s;
    for (i, ch) in text.chars().enumerate() {
        let left = x.saturating_add((i as i64).saturating_mul(cell));
        match BASIC_FONTS.get(ch).or_else(|| LATIN_FONTS.get(ch)) {
            Some(rows) => {
                for (row, bits) in rows.iter().enumerate() {
                    for col in 0..8 {
                        if *bits & (1u8 << col) != 0 {
                            let px = left + col as i64 * s;
                            let py = y + row as i64 * s;
                            fill_rect(img, px, py, px + s - 1, py + s - 1, color);
                        }
                    }
                }
            }
            None if ch.is_whitespace() => {}
            // no bitmap glyph: hollow box
            None => stroke_rect(img, left + s, y + s, left + cell - s - 1, y + cell - 1, s as u32, color),
        }
    }
}
