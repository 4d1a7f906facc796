//! Poetry card rasterization.
//!
//! A card is a fixed-size canvas with a framed border, the verse wrapped and
//! centered with a drop shadow, and an attribution line near the bottom.
//! Missing fonts or shaping support lower the typography quality but never
//! fail the render.

pub mod canvas;
pub mod font;
pub mod layout;
pub mod spec;

pub use font::{select_font, CardFont, FontProvider, FsFontProvider, MemoryFontProvider};
pub use spec::{Background, Border, CardSpec, Color};

use crate::error::Result;
use image::{DynamicImage, ImageOutputFormat, RgbImage};
use std::io::Cursor;
use tracing::debug;

/// Renders cards for one [`CardSpec`].
///
/// Fonts are resolved once, when the renderer is built.
pub struct CardRenderer {
    spec: CardSpec,
    verse_font: CardFont,
    attribution_font: CardFont,
}

impl CardRenderer {
    /// Renderer loading fonts from the filesystem.
    pub fn new(spec: CardSpec) -> Self {
        Self::with_provider(spec, &FsFontProvider)
    }

    pub fn with_provider<F: FontProvider + ?Sized>(spec: CardSpec, provider: &F) -> Self {
        let verse_font = select_font(provider, &spec.verse_fonts);
        let attribution_font = select_font(provider, &spec.attribution_fonts);
        Self { spec, verse_font, attribution_font }
    }

    pub fn spec(&self) -> &CardSpec {
        &self.spec
    }

    pub fn verse_font(&self) -> &CardFont {
        &self.verse_font
    }

    /// Draw `text` and `attribution` onto a new canvas of the configured size.
    pub fn render(&self, text: &str, attribution: &str) -> RgbImage {
        let spec = &self.spec;
        let mut img = canvas::fill(spec.width, spec.height, &spec.background);
        self.draw_frame(&mut img);
        self.draw_verse(&mut img, text);
        self.draw_attribution(&mut img, attribution);
        img
    }

    fn draw_frame(&self, img: &mut RgbImage) {
        let spec = &self.spec;
        if let Some(border) = spec.outer_border {
            canvas::frame(img, border, spec.accent);
            if spec.corner_accent > 0 {
                let m = border.margin as i64;
                let y = m + spec.corner_accent as i64;
                canvas::fill_rect(img, m, y, m + spec.corner_accent as i64, y, spec.accent);
            }
        }
        if let Some(border) = spec.inner_border {
            canvas::frame(img, border, spec.accent);
        }
    }

    fn draw_verse(&self, img: &mut RgbImage, text: &str) {
        let spec = &self.spec;
        let lines = layout::lines(text, spec.wrap_width);

        let line_height = spec.line_height() as i64;
        let block = (lines.len() as i64).saturating_mul(line_height);
        let mut y = (spec.height as i64 - block) / 2;
        debug!(lines = lines.len(), top = y, builtin = self.verse_font.is_builtin(), "laying out verse");

        let offset = spec.shadow_offset as i64;
        for line in &lines {
            let width = self.verse_font.measure(line, spec.font_size) as i64;
            let x = (spec.width as i64 - width) / 2;
            self.verse_font
                .draw(img, x + offset, y + offset, line, spec.font_size, spec.shadow_color);
            self.verse_font.draw(img, x, y, line, spec.font_size, spec.text_color);
            y = y.saturating_add(line_height);
        }
    }

    fn draw_attribution(&self, img: &mut RgbImage, attribution: &str) {
        let spec = &self.spec;
        let label = format!("~ {}", attribution);
        let width = self.attribution_font.measure(&label, spec.attribution_font_size) as i64;
        let x = (spec.width as i64 - width) / 2;
        let y = spec.height as i64 - spec.attribution_bottom as i64;
        self.attribution_font
            .draw(img, x, y, &label, spec.attribution_font_size, spec.accent);
    }
}

/// Render a card using fonts from the filesystem.
pub fn render(text: &str, attribution: &str, spec: &CardSpec) -> RgbImage {
    CardRenderer::new(spec.clone()).render(text, attribution)
}

/// Encode a card as PNG bytes.
pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img.clone()).write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
    Ok(bytes)
}
