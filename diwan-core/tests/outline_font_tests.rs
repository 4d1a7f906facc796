use diwan_core::card::{CardRenderer, CardSpec, MemoryFontProvider};
use std::path::PathBuf;

const MONO: &[u8] = include_bytes!("fonts/DejaVuSansMono.ttf");

fn mono_renderer() -> CardRenderer {
    let mut provider = MemoryFontProvider::new();
    provider.insert("fonts/DejaVuSansMono.ttf", MONO.to_vec());
    let spec = CardSpec {
        verse_fonts: vec![PathBuf::from("missing.ttf"), PathBuf::from("fonts/DejaVuSansMono.ttf")],
        attribution_fonts: vec![PathBuf::from("fonts/DejaVuSansMono.ttf")],
        ..CardSpec::default()
    };
    CardRenderer::with_provider(spec, &provider)
}

#[test]
fn loads_outline_font_from_candidates() {
    let r = mono_renderer();
    assert!(!r.verse_font().is_builtin());

    let width = r.verse_font().measure("ishq", 72.0);
    assert!(width > 0);
    // monospaced: twice the text, twice the advance
    let double = r.verse_font().measure("ishqishq", 72.0);
    assert!(double.abs_diff(2 * width) <= 1, "{} vs {}", double, width);
}

#[test]
fn outline_verse_is_drawn_in_the_centered_line_box() {
    let r = mono_renderer();
    let spec = r.spec().clone();
    let img = r.render("ishq", "AI Poet");

    // one line: box of 112 px starting at (1080 - 112) / 2, left edge at
    // (1080 - advance) / 2
    let top = (1080 - spec.line_height()) / 2;
    let width = r.verse_font().measure("ishq", spec.font_size);
    let left = (1080 - width) / 2;

    let mut ink = Vec::new();
    for y in 61..1019 {
        for x in 100..980 {
            // anti-aliased text over the dark background; the gold accent
            // and the shadow never get this bright in blue
            if img.get_pixel(x, y).0.iter().all(|&c| c > 200) {
                ink.push((x, y));
            }
        }
    }
    assert!(!ink.is_empty());
    assert!(ink.iter().any(|&(x, y)| img.get_pixel(x, y).0 == spec.text_color));
    for &(x, y) in &ink {
        assert!((top..top + spec.line_height()).contains(&y), "ink at row {}", y);
        assert!(x + 4 >= left && x <= left + width + 4, "ink at column {}", x);
    }
}
