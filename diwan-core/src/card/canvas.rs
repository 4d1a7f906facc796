//! Clipped drawing primitives on an RGB canvas.

use super::spec::{Background, Border, Color};
use image::{Rgb, RgbImage};

/// New canvas filled with the background.
pub fn fill(width: u32, height: u32, background: &Background) -> RgbImage {
    match *background {
        Background::Solid(c) => RgbImage::from_pixel(width, height, Rgb(c)),
        Background::Gradient { top, bottom } => {
            let span = height.saturating_sub(1).max(1) as f32;
            RgbImage::from_fn(width, height, |_, y| Rgb(mix(top, bottom, y as f32 / span)))
        }
    }
}

fn mix(a: Color, b: Color, t: f32) -> Color {
    let mut out = [0u8; 3];
    for i in 0..3 {
        out[i] = (a[i] as f32 + (b[i] as f32 - a[i] as f32) * t).round() as u8;
    }
    out
}

/// Fill the inclusive rectangle `(x0, y0)..=(x1, y1)`, clipped to the canvas.
pub fn fill_rect(img: &mut RgbImage, x0: i64, y0: i64, x1: i64, y1: i64, color: Color) {
    let (w, h) = (img.width() as i64, img.height() as i64);
    let (x0, x1) = (x0.max(0), x1.min(w - 1));
    let (y0, y1) = (y0.max(0), y1.min(h - 1));
    for y in y0..=y1 {
        for x in x0..=x1 {
            img.put_pixel(x as u32, y as u32, Rgb(color));
        }
    }
}

/// Outline of the inclusive rectangle, `width` pixels thick, growing inward.
pub fn stroke_rect(img: &mut RgbImage, x0: i64, y0: i64, x1: i64, y1: i64, width: u32, color: Color) {
    if width == 0 || x1 < x0 || y1 < y0 {
        return;
    }
    let t = width as i64 - 1;
    fill_rect(img, x0, y0, x1, y0 + t, color);
    fill_rect(img, x0, y1 - t, x1, y1, color);
    fill_rect(img, x0, y0, x0 + t, y1, color);
    fill_rect(img, x1 - t, y0, x1, y1, color);
}

/// Outline inset by `border.margin` from each edge of the canvas.
pub fn frame(img: &mut RgbImage, border: Border, color: Color) {
    let (w, h) = (img.width() as i64, img.height() as i64);
    let m = border.margin as i64;
    stroke_rect(img, m, m, w - m, h - m, border.width, color);
}

/// Alpha-blend `color` over the pixel at `(x, y)` with coverage in `[0, 1]`.
/// Coordinates off the canvas are ignored.
pub fn blend(img: &mut RgbImage, x: i64, y: i64, color: Color, coverage: f32) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
        return;
    }
    let a = coverage.clamp(0.0, 1.0);
    if a <= 0.0 {
        return;
    }
    let px = img.get_pixel_mut(x as u32, y as u32);
    for i in 0..3 {
        let base = px.0[i] as f32;
        px.0[i] = (base + (color[i] as f32 - base) * a).round() as u8;
    }
}
