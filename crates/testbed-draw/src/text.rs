//! Overlay text.
//!
//! Text is positioned in screen pixels (top-left origin). When a
//! [`TextOverlay`] is installed on the facade, strings are handed to it
//! verbatim. Without one, the built-in 5x7 bitmap font turns every lit
//! glyph pixel into a small screen-aligned rectangle that the facade draws
//! as two triangles, so text shows up with no font backend at all.

use crate::color::Color;
use crate::geometry::Vec2;

/// External text backend (an immediate-mode UI, a font atlas, a log sink).
pub trait TextOverlay {
    /// Draw `text` with its top-left corner at `position` (pixels).
    fn draw_text(&mut self, position: Vec2, color: Color, text: &str);
}

/// Glyph cell width in font pixels.
pub const GLYPH_WIDTH: usize = 5;
/// Glyph cell height in font pixels.
pub const GLYPH_HEIGHT: usize = 7;
/// Horizontal advance per character, including the one-pixel gap.
pub const GLYPH_ADVANCE: usize = GLYPH_WIDTH + 1;
/// Vertical advance per line, including the gap.
pub const LINE_ADVANCE: usize = GLYPH_HEIGHT + 2;

// Each row uses the low 5 bits, bit 4 being the leftmost column.
const GLYPHS: &[(char, [u8; GLYPH_HEIGHT])] = &[
    ('0', [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110]),
    ('1', [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
    ('2', [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111]),
    ('3', [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110]),
    ('4', [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010]),
    ('5', [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110]),
    ('6', [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110]),
    ('7', [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000]),
    ('8', [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110]),
    ('9', [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100]),
    ('A', [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001]),
    ('B', [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110]),
    ('C', [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110]),
    ('D', [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100]),
    ('E', [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111]),
    ('F', [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000]),
    ('G', [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111]),
    ('H', [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001]),
    ('I', [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
    ('J', [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100]),
    ('K', [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001]),
    ('L', [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111]),
    ('M', [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001]),
    ('N', [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001]),
    ('O', [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110]),
    ('P', [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000]),
    ('Q', [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101]),
    ('R', [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001]),
    ('S', [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110]),
    ('T', [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100]),
    ('U', [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110]),
    ('V', [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100]),
    ('W', [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010]),
    ('X', [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001]),
    ('Y', [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100]),
    ('Z', [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111]),
    (' ', [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000]),
    ('.', [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100]),
    (',', [0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b00100, 0b01000]),
    (':', [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000]),
    (';', [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b00100, 0b01000]),
    ('!', [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100]),
    ('?', [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b00000, 0b00100]),
    ('-', [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000]),
    ('+', [0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000]),
    ('=', [0b00000, 0b00000, 0b11111, 0b00000, 0b11111, 0b00000, 0b00000]),
    ('/', [0b00001, 0b00010, 0b00010, 0b00100, 0b01000, 0b01000, 0b10000]),
    ('(', [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010]),
    (')', [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000]),
    ('[', [0b01110, 0b01000, 0b01000, 0b01000, 0b01000, 0b01000, 0b01110]),
    (']', [0b01110, 0b00010, 0b00010, 0b00010, 0b00010, 0b00010, 0b01110]),
    ('_', [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b11111]),
    ('#', [0b01010, 0b01010, 0b11111, 0b01010, 0b11111, 0b01010, 0b01010]),
    ('%', [0b11001, 0b11010, 0b00010, 0b00100, 0b01000, 0b01011, 0b10011]),
];

/// Bitmap rows for `ch`, top to bottom. Lowercase letters share the
/// uppercase shapes.
pub fn glyph(ch: char) -> Option<&'static [u8; GLYPH_HEIGHT]> {
    let ch = ch.to_ascii_uppercase();
    GLYPHS.iter().find(|(c, _)| *c == ch).map(|(_, rows)| rows)
}

/// One lit font pixel, as a rectangle in screen pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlyphPixel {
    /// Top-left corner.
    pub min: Vec2,
    /// Bottom-right corner.
    pub max: Vec2,
}

/// Lay out `text` starting at `origin` and return every lit pixel.
///
/// `scale` is the size of one font pixel in screen pixels. `'\n'` starts a
/// new line; characters without a glyph still advance the cursor.
pub fn rasterize(text: &str, origin: Vec2, scale: f32) -> Vec<GlyphPixel> {
    let mut pixels = Vec::new();

    for (line_idx, line) in text.split('\n').enumerate() {
        let line_y = origin.y + (line_idx * LINE_ADVANCE) as f32 * scale;

        for (char_idx, ch) in line.chars().enumerate() {
            let Some(rows) = glyph(ch) else {
                continue;
            };
            let char_x = origin.x + (char_idx * GLYPH_ADVANCE) as f32 * scale;

            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 0 {
                        continue;
                    }
                    let min = Vec2::new(char_x + col as f32 * scale, line_y + row as f32 * scale);
                    pixels.push(GlyphPixel {
                        min,
                        max: min + Vec2::new(scale, scale),
                    });
                }
            }
        }
    }

    pixels
}

/// Width of the longest line of `text` in screen pixels.
pub fn text_width(text: &str, scale: f32) -> f32 {
    let longest = text.split('\n').map(|l| l.chars().count()).max().unwrap_or(0);
    if longest == 0 {
        return 0.0;
    }
    (longest * GLYPH_ADVANCE - 1) as f32 * scale
}

/// Height of `text` in screen pixels.
pub fn text_height(text: &str, scale: f32) -> f32 {
    let lines = text.split('\n').count();
    ((lines - 1) * LINE_ADVANCE + GLYPH_HEIGHT) as f32 * scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_covers_digits_and_letters() {
        for ch in ('0'..='9').chain('A'..='Z').chain('a'..='z') {
            assert!(glyph(ch).is_some(), "missing glyph for {ch:?}");
        }
        assert_eq!(glyph('q'), glyph('Q'));
        assert!(glyph('~').is_none());
    }

    #[test]
    fn rows_fit_in_five_bits() {
        for (ch, rows) in GLYPHS {
            assert!(rows.iter().all(|r| *r < 32), "glyph {ch:?} is wider than 5 pixels");
        }
    }

    #[test]
    fn space_has_no_pixels() {
        assert!(rasterize("   ", Vec2::ZERO, 1.0).is_empty());
    }

    #[test]
    fn pixel_count_matches_bitmap() {
        let lit: u32 = glyph('A').unwrap().iter().map(|r| r.count_ones()).sum();
        assert_eq!(rasterize("A", Vec2::ZERO, 2.0).len(), lit as usize);
    }

    #[test]
    fn pixels_are_scaled_and_offset() {
        // '1' has its top pixel in column 2 of row 0.
        let pixels = rasterize("1", Vec2::new(10.0, 20.0), 3.0);
        let first = pixels[0];
        assert_eq!(first.min, Vec2::new(16.0, 20.0));
        assert_eq!(first.max, Vec2::new(19.0, 23.0));
    }

    #[test]
    fn unknown_characters_still_advance() {
        let with_gap = rasterize("~I", Vec2::ZERO, 1.0);
        let plain = rasterize("I", Vec2::ZERO, 1.0);
        assert_eq!(with_gap.len(), plain.len());
        assert_eq!(with_gap[0].min.x, plain[0].min.x + GLYPH_ADVANCE as f32);
    }

    #[test]
    fn newline_moves_down() {
        let pixels = rasterize("-\n-", Vec2::ZERO, 1.0);
        assert_eq!(pixels.len(), 10);
        assert_eq!(pixels[5].min.y - pixels[0].min.y, LINE_ADVANCE as f32);
    }

    #[test]
    fn text_metrics() {
        assert_eq!(text_width("", 2.0), 0.0);
        assert_eq!(text_width("AB", 2.0), 22.0);
        assert_eq!(text_width("A\nBCD", 1.0), 17.0);
        assert_eq!(text_height("A", 1.0), 7.0);
        assert_eq!(text_height("A\nB", 1.0), 16.0);
    }
}
