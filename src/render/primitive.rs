//! Drawable primitives produced by the element renderer.
//!
//! A primitive carries everything the compositor needs to paint it: its
//! frame (page position, size, rotation) and fully resolved paint values.

use image::RgbaImage;
use std::collections::HashMap;

use super::color::Color;
use crate::shader::Frame;
use crate::text::{Align, Glyph, TextLayout};

/// Wrapped text in a clipped box.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub frame: Frame,
    /// Final text after binding, before wrapping.
    pub content: String,
    pub layout: TextLayout,
    pub glyphs: HashMap<char, Glyph>,
    pub color: Color,
    pub align: Align,
    pub bold: bool,
}

/// Outline of a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeKind {
    /// Rectangle with corner radius, filling the frame.
    RoundRect { radius: f32 },
    /// Ellipse inscribed in the frame.
    Ellipse,
}

/// A filled and stroked shape. The stroke is centered on the outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shape {
    pub frame: Frame,
    pub kind: ShapeKind,
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f32,
}

/// An empty `rows x columns` grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableGrid {
    pub frame: Frame,
    pub rows: u32,
    pub columns: u32,
    /// Shade the first row.
    pub header_row: bool,
    /// Draw the outer border (cell separators are always drawn).
    pub bordered: bool,
    pub line: Color,
    pub line_width: f32,
    pub header_fill: Color,
}

/// Decoded image pixels, already scaled to the frame size.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBox {
    pub frame: Frame,
    pub pixels: RgbaImage,
}

/// One paintable item, in template order.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Text(TextBox),
    Shape(Shape),
    Table(TableGrid),
    Image(ImageBox),
    /// Placeholder for an element that paints nothing (zero size, failed fetch).
    Empty,
    /// Element type the compositor does not know how to paint.
    Unsupported { type_name: String },
}

impl Primitive {
    /// Final text of a text primitive.
    pub fn text(&self) -> Option<&str> {
        match self {
            Primitive::Text(t) => Some(&t.content),
            _ => None,
        }
    }
}
