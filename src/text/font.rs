//! Glyph bitmaps for text rendering.
//!
//! Uses the Spleen bitmap font family. Small text samples the 6x12 face,
//! everything else the 12x24 face; the compositor scales cells to the
//! requested font size and anti-aliases by supersampling.

use spleen_font::{FONT_6X12, FONT_12X24, PSF2Font};
use std::collections::HashMap;

/// Bitmap face used for a given font size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    /// Spleen 6x12, for font sizes up to 12pt.
    Small,
    /// Spleen 12x24.
    Large,
}

impl Face {
    pub fn for_size(font_size: f32) -> Self {
        if font_size <= 12.0 { Face::Small } else { Face::Large }
    }

    /// Cell size in font pixels (width, height).
    pub fn cell(self) -> (usize, usize) {
        match self {
            Face::Small => (6, 12),
            Face::Large => (12, 24),
        }
    }

    fn data(self) -> &'static [u8] {
        match self {
            Face::Small => FONT_6X12,
            Face::Large => FONT_12X24,
        }
    }
}

/// A 1-bit glyph cell, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub width: usize,
    pub height: usize,
    pub bits: Vec<bool>,
}

impl Glyph {
    fn blank(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width * height],
        }
    }

    /// Hollow box, drawn for characters the face does not cover.
    fn missing(width: usize, height: usize) -> Self {
        let mut g = Self::blank(width, height);
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let edge = x == 1 || x == width - 2 || y == 1 || y == height - 2;
                g.bits[y * width + x] = edge;
            }
        }
        g
    }

    /// Whether the font pixel at (x, y) is set. Out-of-cell reads are unset.
    #[inline]
    pub fn is_set(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return false;
        }
        self.bits[y as usize * self.width + x as usize]
    }

    /// Thicken strokes by one font pixel to the right.
    pub fn emboldened(&self) -> Self {
        let mut out = self.clone();
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                if self.is_set(x - 1, y) {
                    out.bits[y as usize * self.width + x as usize] = true;
                }
            }
        }
        out
    }
}

/// Load glyph cells for every distinct character of `text`.
pub fn glyphs_for(text: &str, face: Face, bold: bool) -> HashMap<char, Glyph> {
    let (w, h) = face.cell();
    let mut glyphs = HashMap::new();
    let Ok(mut font) = PSF2Font::new(face.data()) else {
        log::warn!("failed to load bitmap font; text renders as boxes");
        for ch in text.chars().filter(|c| !c.is_whitespace()) {
            glyphs.entry(ch).or_insert_with(|| Glyph::missing(w, h));
        }
        return glyphs;
    };

    for ch in text.chars() {
        if glyphs.contains_key(&ch) {
            continue;
        }
        let glyph = if ch.is_whitespace() {
            Glyph::blank(w, h)
        } else {
            let utf8 = ch.to_string();
            match font.glyph_for_utf8(utf8.as_bytes()) {
                Some(rows) => {
                    let mut g = Glyph::blank(w, h);
                    for (row_y, row) in rows.enumerate() {
                        for (col_x, on) in row.enumerate() {
                            if row_y < h && col_x < w {
                                g.bits[row_y * w + col_x] = on;
                            }
                        }
                    }
                    g
                }
                None => Glyph::missing(w, h),
            }
        };
        let glyph = if bold { glyph.emboldened() } else { glyph };
        glyphs.insert(ch, glyph);
    }
    glyphs
}
