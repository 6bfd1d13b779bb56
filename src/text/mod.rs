//! # Text Layout
//!
//! Greedy word wrapping of a string into lines that fit a box width, with
//! monospace metrics derived from the bitmap face scaled to the font size.
//!
//! - [`font`]: Spleen glyph cells

pub mod font;

pub use font::{Face, Glyph, glyphs_for};

/// Line height as a multiple of font size.
pub const LINE_HEIGHT: f32 = 1.16;

/// Horizontal alignment of lines within the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    /// Parse a CSS-style `textAlign`. `justify` lays out as left.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "left" | "start" | "justify" => Some(Align::Left),
            "center" => Some(Align::Center),
            "right" | "end" => Some(Align::Right),
            _ => None,
        }
    }
}

/// Wrapped text with the metrics needed to place each glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub lines: Vec<Vec<char>>,
    pub face: Face,
    /// Points per font pixel.
    pub scale: f32,
    /// Horizontal advance per character, in points.
    pub advance: f32,
    pub line_height: f32,
}

impl TextLayout {
    /// Lay out `text` at `font_size` points, wrapping to `max_width`.
    pub fn new(text: &str, font_size: f32, max_width: f32) -> Self {
        let face = Face::for_size(font_size);
        let (cell_w, cell_h) = face.cell();
        let scale = font_size / cell_h as f32;
        let advance = cell_w as f32 * scale;
        let max_chars = if advance > 0.0 {
            ((max_width / advance).floor() as usize).max(1)
        } else {
            usize::MAX
        };

        let lines = text
            .split('\n')
            .flat_map(|paragraph| wrap(paragraph, max_chars))
            .collect();

        Self {
            lines,
            face,
            scale,
            advance,
            line_height: font_size * LINE_HEIGHT,
        }
    }

    /// Width of a line in points.
    pub fn line_width(&self, line: usize) -> f32 {
        self.lines.get(line).map_or(0.0, |l| l.len() as f32 * self.advance)
    }

    /// Height of the whole block in points.
    pub fn height(&self) -> f32 {
        self.lines.len() as f32 * self.line_height
    }

    /// Left offset of a line inside a box of `box_width`.
    pub fn line_offset(&self, line: usize, align: Align, box_width: f32) -> f32 {
        let free = (box_width - self.line_width(line)).max(0.0);
        match align {
            Align::Left => 0.0,
            Align::Center => free / 2.0,
            Align::Right => free,
        }
    }

    /// The lines as strings.
    pub fn line_strings(&self) -> Vec<String> {
        self.lines.iter().map(|l| l.iter().collect()).collect()
    }
}

/// Greedy word wrap into lines of at most `max_chars` characters.
///
/// Words longer than a line are broken; runs of spaces collapse at breaks.
fn wrap(paragraph: &str, max_chars: usize) -> Vec<Vec<char>> {
    let mut lines = Vec::new();
    let mut current: Vec<char> = Vec::new();

    for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
        let mut word: Vec<char> = word.chars().collect();
        let needed = if current.is_empty() { word.len() } else { current.len() + 1 + word.len() };
        if needed <= max_chars {
            if !current.is_empty() {
                current.push(' ');
            }
            current.append(&mut word);
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        while word.len() > max_chars {
            let rest = word.split_off(max_chars);
            lines.push(std::mem::replace(&mut word, rest));
        }
        current = word;
    }

    lines.push(current);
    lines
}
