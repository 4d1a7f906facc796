//! Text preparation before drawing: contextual joining, line wrapping and
//! visual reordering.
//!
//! Joining and wrapping work on logical order. Each wrapped line is then
//! reordered on its own, so a multi-line right-to-left verse still starts
//! on the top line.

use std::borrow::Cow;

/// Replace Arabic-script letters with their contextual presentation forms.
///
/// Outline fonts are drawn glyph by glyph with no shaping table, so joining
/// has to happen in the text itself. Without the `shaping` feature the text
/// is returned unchanged.
#[cfg(feature = "shaping")]
pub fn shape(text: &str) -> Cow<'_, str> {
    use ar_reshaper::ArabicReshaper;

    let reshaper = ArabicReshaper::default();
    if reshaper.need_reshape(text) {
        Cow::Owned(reshaper.reshape(text))
    } else {
        Cow::Borrowed(text)
    }
}

#[cfg(not(feature = "shaping"))]
pub fn shape(text: &str) -> Cow<'_, str> {
    Cow::Borrowed(text)
}

/// Reorder one line's right-to-left runs into visual order for
/// left-to-right drawing. A no-op without the `shaping` feature.
#[cfg(feature = "shaping")]
pub fn visual(line: &str) -> Cow<'_, str> {
    use unicode_bidi::BidiInfo;

    let info = BidiInfo::new(line, None);
    if !info.has_rtl() {
        return Cow::Borrowed(line);
    }
    let parts: Vec<String> = info
        .paragraphs
        .iter()
        .map(|para| info.reorder_line(para, para.range.clone()).into_owned())
        .collect();
    Cow::Owned(parts.concat())
}

#[cfg(not(feature = "shaping"))]
pub fn visual(line: &str) -> Cow<'_, str> {
    Cow::Borrowed(line)
}

/// Lines ready to draw left to right, top to bottom.
pub fn lines(text: &str, width: usize) -> Vec<String> {
    wrap(&shape(text), width)
        .into_iter()
        .map(|line| visual(&line).into_owned())
        .collect()
}

/// Greedy word wrap on character count.
///
/// Words are packed into lines of at most `width` characters separated by
/// single spaces. A word longer than `width` is split across lines.
/// Whitespace-only input yields no lines.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for chunk in chars.chunks(width) {
            let chunk_len = chunk.len();
            if current_len > 0 && current_len + 1 + chunk_len > width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(chunk);
            current_len += chunk_len;
        }
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}
