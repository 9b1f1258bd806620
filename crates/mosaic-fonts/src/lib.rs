//! Pixel fonts for the mosaic panel.
//!
//! Glyphs are drawn as rows of `█` (lit) and space (unlit). Rendered frames
//! carry tags derived from the text and colour, so drawing the same string
//! twice produces equal frames and does not restart transitions.

use image::RgbaImage;
use mosaic_core::{Align, Frame, Rgba, Tag, hstack};

/// Height of the small font in pixels.
pub const GLYPH_HEIGHT: u32 = 5;

/// Height of the large clock digits in pixels.
pub const LARGE_HEIGHT: u32 = 7;

/// Blank columns between glyphs.
pub const LETTER_SPACING: u32 = 1;

/// Large 7-segment style digits (7 rows tall, 6 pixels wide).
pub const LARGE_DIGITS: [[&str; 7]; 10] = [
    // 0
    [
        " ████ ",
        "██  ██",
        "██  ██",
        "██  ██",
        "██  ██",
        "██  ██",
        " ████ ",
    ],
    // 1
    [
        "  ██  ",
        " ███  ",
        "  ██  ",
        "  ██  ",
        "  ██  ",
        "  ██  ",
        " ████ ",
    ],
    // 2
    [
        " ████ ",
        "██  ██",
        "    ██",
        "  ██  ",
        " ██   ",
        "██    ",
        "██████",
    ],
    // 3
    [
        " ████ ",
        "██  ██",
        "    ██",
        "  ███ ",
        "    ██",
        "██  ██",
        " ████ ",
    ],
    // 4
    [
        "██  ██",
        "██  ██",
        "██  ██",
        "██████",
        "    ██",
        "    ██",
        "    ██",
    ],
    // 5
    [
        "██████",
        "██    ",
        "██    ",
        "█████ ",
        "    ██",
        "██  ██",
        " ████ ",
    ],
    // 6
    [
        " ████ ",
        "██    ",
        "██    ",
        "█████ ",
        "██  ██",
        "██  ██",
        " ████ ",
    ],
    // 7
    [
        "██████",
        "    ██",
        "   ██ ",
        "  ██  ",
        "  ██  ",
        "  ██  ",
        "  ██  ",
    ],
    // 8
    [
        " ████ ",
        "██  ██",
        "██  ██",
        " ████ ",
        "██  ██",
        "██  ██",
        " ████ ",
    ],
    // 9
    [
        " ████ ",
        "██  ██",
        "██  ██",
        " █████",
        "    ██",
        "    ██",
        " ████ ",
    ],
];

/// Colon separator for the large digits (7 rows tall, 2 pixels wide).
pub const LARGE_COLON: [&str; 7] = ["  ", "██", "██", "  ", "██", "██", "  "];

/// Small 3×5 glyph for `ch`, case-insensitive. Narrow punctuation is one or
/// two pixels wide.
pub fn glyph(ch: char) -> Option<[&'static str; 5]> {
    let rows = match ch.to_ascii_uppercase() {
        '0' => ["███", "█ █", "█ █", "█ █", "███"],
        '1' => [" █ ", "██ ", " █ ", " █ ", "███"],
        '2' => ["███", "  █", "███", "█  ", "███"],
        '3' => ["███", "  █", " ██", "  █", "███"],
        '4' => ["█ █", "█ █", "███", "  █", "  █"],
        '5' => ["███", "█  ", "███", "  █", "███"],
        '6' => ["███", "█  ", "███", "█ █", "███"],
        '7' => ["███", "  █", "  █", " █ ", " █ "],
        '8' => ["███", "█ █", "███", "█ █", "███"],
        '9' => ["███", "█ █", "███", "  █", "███"],
        'A' => [" █ ", "█ █", "███", "█ █", "█ █"],
        'B' => ["██ ", "█ █", "██ ", "█ █", "██ "],
        'C' => [" ██", "█  ", "█  ", "█  ", " ██"],
        'D' => ["██ ", "█ █", "█ █", "█ █", "██ "],
        'E' => ["███", "█  ", "██ ", "█  ", "███"],
        'F' => ["███", "█  ", "██ ", "█  ", "█  "],
        'G' => [" ██", "█  ", "█ █", "█ █", " ██"],
        'H' => ["█ █", "█ █", "███", "█ █", "█ █"],
        'I' => ["███", " █ ", " █ ", " █ ", "███"],
        'J' => ["  █", "  █", "  █", "█ █", " █ "],
        'K' => ["█ █", "█ █", "██ ", "█ █", "█ █"],
        'L' => ["█  ", "█  ", "█  ", "█  ", "███"],
        'M' => ["█ █", "███", "███", "█ █", "█ █"],
        'N' => ["██ ", "█ █", "█ █", "█ █", "█ █"],
        'O' => [" █ ", "█ █", "█ █", "█ █", " █ "],
        'P' => ["██ ", "█ █", "██ ", "█  ", "█  "],
        'Q' => [" █ ", "█ █", "█ █", "██ ", " ██"],
        'R' => ["██ ", "█ █", "██ ", "█ █", "█ █"],
        'S' => [" ██", "█  ", " █ ", "  █", "██ "],
        'T' => ["███", " █ ", " █ ", " █ ", " █ "],
        'U' => ["█ █", "█ █", "█ █", "█ █", "███"],
        'V' => ["█ █", "█ █", "█ █", "█ █", " █ "],
        'W' => ["█ █", "█ █", "███", "███", "█ █"],
        'X' => ["█ █", "█ █", " █ ", "█ █", "█ █"],
        'Y' => ["█ █", "█ █", " █ ", " █ ", " █ "],
        'Z' => ["███", "  █", " █ ", "█  ", "███"],
        ' ' => ["  ", "  ", "  ", "  ", "  "],
        ':' => [" ", "█", " ", "█", " "],
        '.' => [" ", " ", " ", " ", "█"],
        ',' => [" ", " ", " ", "█", "█"],
        '!' => ["█", "█", "█", " ", "█"],
        '\'' => ["█", "█", " ", " ", " "],
        '-' => ["   ", "   ", "███", "   ", "   "],
        '+' => ["   ", " █ ", "███", " █ ", "   "],
        '/' => ["  █", "  █", " █ ", "█  ", "█  "],
        '%' => ["█ █", "  █", " █ ", "█  ", "█ █"],
        '?' => ["███", "  █", " ██", "   ", " █ "],
        '(' => [" █", "█ ", "█ ", "█ ", " █"],
        ')' => ["█ ", " █", " █", " █", "█ "],
        '°' => ["██", "██", "  ", "  ", "  "],
        _ => return None,
    };
    Some(rows)
}

/// Rasterise glyph rows with lit pixels in `color`.
fn rasterize(rows: &[&str], color: Rgba<u8>, tag: Tag) -> Frame {
    let width = rows
        .iter()
        .map(|row| row.chars().count() as u32)
        .max()
        .unwrap_or(0)
        .max(1);
    let mut image = RgbaImage::new(width, rows.len().max(1) as u32);
    for (y, row) in rows.iter().enumerate() {
        for (x, ch) in row.chars().enumerate() {
            if ch == '█' {
                image.put_pixel(x as u32, y as u32, color);
            }
        }
    }
    Frame::with_tag(image, tag)
}

/// Frame for a single small glyph. Unknown characters render as `?`.
pub fn glyph_frame(ch: char, color: Rgba<u8>) -> Frame {
    let (ch, rows) = match glyph(ch) {
        Some(rows) => (ch.to_ascii_uppercase(), rows),
        None => ('?', glyph('?').unwrap_or_default()),
    };
    rasterize(&rows, color, Tag::derive(("glyph", ch, color.0)))
}

/// Frame for `text` in the small font, glyphs separated by
/// [`LETTER_SPACING`]. Empty text yields a 1×1 transparent frame.
pub fn text_frame(text: &str, color: Rgba<u8>) -> Frame {
    let glyphs: Vec<Frame> = text.chars().map(|ch| glyph_frame(ch, color)).collect();
    hstack(&glyphs, LETTER_SPACING, Align::Start)
}

/// Pixel width of `text` in the small font.
pub fn text_width(text: &str) -> u32 {
    let glyphs = text.chars().map(|ch| glyph(ch).or_else(|| glyph('?')));
    let (count, width) = glyphs.fold((0u32, 0u32), |(n, w), rows| {
        let cols = rows.map_or(0, |r| r[0].chars().count() as u32);
        (n + 1, w + cols)
    });
    width + count.saturating_sub(1) * LETTER_SPACING
}

/// Frame for a large clock digit. Values above 9 use their last digit.
pub fn large_digit_frame(digit: u32, color: Rgba<u8>) -> Frame {
    let digit = digit % 10;
    rasterize(
        &LARGE_DIGITS[digit as usize],
        color,
        Tag::derive(("large-digit", digit, color.0)),
    )
}

/// Frame for the large colon separator.
pub fn large_colon_frame(color: Rgba<u8>) -> Frame {
    rasterize(&LARGE_COLON, color, Tag::derive(("large-colon", color.0)))
}
