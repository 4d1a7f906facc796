use super::font::clamp_size;
use crate::error::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// RGB triple, `[r, g, b]` in JSON.
pub type Color = [u8; 3];

/// Canvas fill.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    Solid(Color),
    /// Linear blend from the top row to the bottom row.
    Gradient { top: Color, bottom: Color },
}

/// A rectangular outline `margin` pixels in from each canvas edge.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Border {
    pub margin: u32,
    pub width: u32,
}

/// Fixed look of a rendered card.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CardSpec {
    pub width: u32,
    pub height: u32,
    pub background: Background,
    pub accent: Color,
    pub outer_border: Option<Border>,
    pub inner_border: Option<Border>,
    /// Length of the short accent line under the top-left outer corner.
    /// Zero disables it.
    pub corner_accent: u32,
    pub font_size: f32,
    pub line_gap: u32,
    /// Approximate characters per wrapped line.
    pub wrap_width: usize,
    pub shadow_offset: i32,
    pub shadow_color: Color,
    pub text_color: Color,
    pub attribution_font_size: f32,
    /// Distance from the bottom edge to the top of the attribution line.
    pub attribution_bottom: u32,
    /// Tried in order for the verse; the first that exists and parses wins.
    pub verse_fonts: Vec<PathBuf>,
    pub attribution_fonts: Vec<PathBuf>,
}

impl Default for CardSpec {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1080,
            background: Background::Solid([15, 15, 18]),
            accent: [197, 160, 89],
            outer_border: Some(Border { margin: 40, width: 3 }),
            inner_border: Some(Border { margin: 60, width: 1 }),
            corner_accent: 50,
            font_size: 72.0,
            line_gap: 40,
            wrap_width: 30,
            shadow_offset: 4,
            shadow_color: [5, 5, 5],
            text_color: [240, 240, 240],
            attribution_font_size: 40.0,
            attribution_bottom: 120,
            verse_fonts: vec![
                "app/assets/NotoNastaliqUrdu-Regular.ttf".into(),
                "NotoNastaliqUrdu-Regular.ttf".into(),
                "arial.ttf".into(),
            ],
            attribution_fonts: vec!["times.ttf".into()],
        }
    }
}

impl CardSpec {
    /// Read a spec from JSON. Missing fields keep their defaults.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Vertical distance between consecutive verse lines, saturating at
    /// `u32::MAX`.
    pub fn line_height(&self) -> u32 {
        (clamp_size(self.font_size).round() as u32).saturating_add(self.line_gap)
    }
}
