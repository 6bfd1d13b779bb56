//! # Page Compositor
//!
//! Paints primitives onto a page-sized RGB surface, strictly in the order
//! given. There is no reordering and no occlusion culling: a later opaque
//! primitive overdraws an earlier one wherever they overlap.
//!
//! The surface is one pixel per point. Each primitive is painted by walking
//! the page pixels inside its rotated bounds, mapping every pixel center back
//! into the primitive's local frame, and blending the coverage found there.

use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

use crate::error::{FolioError, Result};
use crate::render::color::Color;
use crate::render::primitive::{ImageBox, Primitive, Shape, ShapeKind, TableGrid, TextBox};
use crate::shader::{Frame, blend_over, fill_coverage, sdf_ellipse, sdf_round_rect, stroke_coverage};
use crate::template::PageGeometry;

/// Supersampling grid per axis for text.
const TEXT_SAMPLES: usize = 3;

/// One page being composited. Owned by a single render.
pub struct PageSurface {
    image: RgbImage,
}

impl PageSurface {
    /// Create a surface filled with the background color.
    pub fn new(geometry: &PageGeometry, background: Color) -> Self {
        let (width, height) = geometry.pixel_size();
        let bg = blend_over([255, 255, 255], background.to_rgba(), 1.0);
        Self {
            image: RgbImage::from_pixel(width, height, Rgb(bg)),
        }
    }

    /// Paint one primitive over everything painted so far.
    ///
    /// Fails only for [`Primitive::Unsupported`], which paints nothing;
    /// callers treat that as a warning and keep going.
    pub fn paint(&mut self, primitive: &Primitive) -> Result<()> {
        match primitive {
            Primitive::Shape(shape) => self.paint_shape(shape),
            Primitive::Text(text) => self.paint_text(text),
            Primitive::Table(table) => self.paint_table(table),
            Primitive::Image(image) => self.paint_image(image),
            Primitive::Empty => {}
            Primitive::Unsupported { type_name } => {
                return Err(FolioError::UnknownElementType(type_name.clone()));
            }
        }
        Ok(())
    }

    /// Finish compositing and take the raster.
    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Run `shade` for every page pixel whose center may fall within
    /// `margin` of the frame, passing local coordinates and the current color.
    fn shade(&mut self, frame: &Frame, margin: f32, mut shade: impl FnMut(f32, f32, [u8; 3]) -> [u8; 3]) {
        if frame.is_empty() {
            return;
        }
        let (x0, y0, x1, y1) = frame.page_bounds(margin);
        let (w, h) = (self.image.width() as f32, self.image.height() as f32);
        let x_start = x0.floor().clamp(0.0, w) as u32;
        let x_end = x1.ceil().clamp(0.0, w) as u32;
        let y_start = y0.floor().clamp(0.0, h) as u32;
        let y_end = y1.ceil().clamp(0.0, h) as u32;

        for py in y_start..y_end {
            for px in x_start..x_end {
                let (lx, ly) = frame.to_local(px as f32 + 0.5, py as f32 + 0.5);
                let pixel = self.image.get_pixel_mut(px, py);
                pixel.0 = shade(lx, ly, pixel.0);
            }
        }
    }

    fn paint_shape(&mut self, shape: &Shape) {
        let Shape {
            frame,
            kind,
            fill,
            stroke,
            stroke_width,
        } = *shape;
        let (fill, stroke) = (fill.to_rgba(), stroke.to_rgba());
        let margin = stroke_width / 2.0 + 1.0;

        self.shade(&frame, margin, |lx, ly, dst| {
            let d = match kind {
                ShapeKind::RoundRect { radius } => sdf_round_rect(lx, ly, frame.width, frame.height, radius),
                ShapeKind::Ellipse => sdf_ellipse(lx, ly, frame.width, frame.height),
            };
            let filled = blend_over(dst, fill, fill_coverage(d));
            blend_over(filled, stroke, stroke_coverage(d, stroke_width))
        });
    }

    fn paint_text(&mut self, text: &TextBox) {
        let color = text.color.to_rgba();
        let step = 1.0 / TEXT_SAMPLES as f32;
        let total = (TEXT_SAMPLES * TEXT_SAMPLES) as f32;

        self.shade(&text.frame, 0.0, |lx, ly, dst| {
            let mut hits = 0usize;
            for sy in 0..TEXT_SAMPLES {
                for sx in 0..TEXT_SAMPLES {
                    let x = lx - 0.5 + (sx as f32 + 0.5) * step;
                    let y = ly - 0.5 + (sy as f32 + 0.5) * step;
                    if text_hit(text, x, y) {
                        hits += 1;
                    }
                }
            }
            blend_over(dst, color, hits as f32 / total)
        });
    }

    fn paint_table(&mut self, table: &TableGrid) {
        let frame = table.frame;
        let columns = table.columns.max(1);
        let rows = table.rows.max(1);
        let cell_w = frame.width / columns as f32;
        let cell_h = frame.height / rows as f32;
        let (line, header) = (table.line.to_rgba(), table.header_fill.to_rgba());
        let lw = table.line_width;

        self.shade(&frame, lw / 2.0 + 1.0, |lx, ly, dst| {
            let mut color = dst;
            let outer = sdf_round_rect(lx, ly, frame.width, frame.height, 0.0);

            if table.header_row {
                let header_d = sdf_round_rect(lx, ly, frame.width, cell_h, 0.0);
                color = blend_over(color, header, fill_coverage(header_d));
            }

            let inside = fill_coverage(outer - lw / 2.0);
            let mut coverage: f32 = 0.0;
            if columns > 1 {
                let k = (lx / cell_w).round().clamp(1.0, (columns - 1) as f32);
                coverage = coverage.max(stroke_coverage(lx - k * cell_w, lw) * inside);
            }
            if rows > 1 {
                let k = (ly / cell_h).round().clamp(1.0, (rows - 1) as f32);
                coverage = coverage.max(stroke_coverage(ly - k * cell_h, lw) * inside);
            }
            if table.bordered {
                coverage = coverage.max(stroke_coverage(outer, lw));
            }
            blend_over(color, line, coverage)
        });
    }

    fn paint_image(&mut self, image: &ImageBox) {
        let frame = image.frame;
        let (pw, ph) = image.pixels.dimensions();
        if pw == 0 || ph == 0 {
            return;
        }

        self.shade(&frame, 0.0, |lx, ly, dst| {
            if lx < 0.0 || ly < 0.0 || lx >= frame.width || ly >= frame.height {
                return dst;
            }
            let ix = ((lx / frame.width * pw as f32) as u32).min(pw - 1);
            let iy = ((ly / frame.height * ph as f32) as u32).min(ph - 1);
            blend_over(dst, image.pixels.get_pixel(ix, iy).0, 1.0)
        });
    }
}

/// Whether the local point `(x, y)` lands on an inked glyph pixel.
fn text_hit(text: &TextBox, x: f32, y: f32) -> bool {
    let frame = &text.frame;
    if x < 0.0 || y < 0.0 || x >= frame.width || y >= frame.height {
        return false;
    }
    let layout = &text.layout;
    let line = (y / layout.line_height) as usize;
    let Some(chars) = layout.lines.get(line) else {
        return false;
    };

    let (_, cell_h) = layout.face.cell();
    let glyph_h = cell_h as f32 * layout.scale;
    let top = line as f32 * layout.line_height + (layout.line_height - glyph_h) / 2.0;
    let gx = x - layout.line_offset(line, text.align, frame.width);
    if gx < 0.0 {
        return false;
    }
    let idx = (gx / layout.advance) as usize;
    let Some(ch) = chars.get(idx) else {
        return false;
    };
    let fx = ((gx - idx as f32 * layout.advance) / layout.scale).floor() as i32;
    let fy = ((y - top) / layout.scale).floor() as i32;
    text.glyphs.get(ch).is_some_and(|g| g.is_set(fx, fy))
}

/// Composite `primitives` in order onto a fresh page.
///
/// Primitives that cannot be painted are skipped with a warning.
pub fn composite(geometry: &PageGeometry, background: Color, primitives: &[Primitive]) -> RgbImage {
    let mut surface = PageSurface::new(geometry, background);
    for primitive in primitives {
        if let Err(err) = surface.paint(primitive) {
            log::warn!("skipping primitive: {}", err);
        }
    }
    surface.into_image()
}

/// Encode a composed page as PNG, for previews.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| FolioError::Encode(format!("Failed to encode PNG: {}", e)))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{Align, TextLayout, glyphs_for};
    use image::RgbaImage;

    const PAGE: PageGeometry = PageGeometry {
        width: 200.0,
        height: 100.0,
    };

    fn frame(x: f32, y: f32, w: f32, h: f32) -> Frame {
        Frame { x, y, width: w, height: h, angle: 0.0 }
    }

    fn rect(f: Frame, fill: Color) -> Primitive {
        Primitive::Shape(Shape {
            frame: f,
            kind: ShapeKind::RoundRect { radius: 0.0 },
            fill,
            stroke: Color::BLACK,
            stroke_width: 1.0,
        })
    }

    fn text_box(f: Frame, content: &str) -> Primitive {
        let layout = TextLayout::new(content, 24.0, f.width);
        Primitive::Text(TextBox {
            frame: f,
            content: content.into(),
            glyphs: glyphs_for(content, layout.face, false),
            layout,
            color: Color::BLACK,
            align: Align::Left,
            bold: false,
        })
    }

    fn ink_in(img: &RgbImage, x0: u32, y0: u32, x1: u32, y1: u32) -> usize {
        (y0..y1)
            .flat_map(|y| (x0..x1).map(move |x| (x, y)))
            .filter(|&(x, y)| img.get_pixel(x, y).0 != [255, 255, 255])
            .count()
    }

    #[test]
    fn test_blank_surface_is_background() {
        let surface = PageSurface::new(&PAGE, Color::WHITE);
        let img = surface.into_image();
        assert_eq!(img.dimensions(), (200, 100));
        assert!(img.pixels().all(|p| p.0 == [255, 255, 255]));
    }

    #[test]
    fn test_later_primitive_wins_overlap() {
        let red = Color::rgb(255, 0, 0);
        let blue = Color::rgb(0, 0, 255);
        let a = rect(frame(10.0, 10.0, 60.0, 60.0), red);
        let b = rect(frame(40.0, 40.0, 60.0, 50.0), blue);

        let mut surface = PageSurface::new(&PAGE, Color::WHITE);
        surface.paint(&a).unwrap();
        surface.paint(&b).unwrap();
        assert_eq!(surface.into_image().get_pixel(55, 55).0, [0, 0, 255]);

        let mut surface = PageSurface::new(&PAGE, Color::WHITE);
        surface.paint(&b).unwrap();
        surface.paint(&a).unwrap();
        assert_eq!(surface.into_image().get_pixel(55, 55).0, [255, 0, 0]);
    }

    #[test]
    fn test_transparent_fill_draws_outline_only() {
        let mut surface = PageSurface::new(&PAGE, Color::WHITE);
        surface.paint(&rect(frame(10.0, 10.0, 50.0, 50.0), Color::TRANSPARENT)).unwrap();
        let img = surface.into_image();
        assert_eq!(img.get_pixel(35, 35).0, [255, 255, 255]);
        assert_ne!(img.get_pixel(10, 35).0, [255, 255, 255]);
    }

    #[test]
    fn test_rotation_pivots_on_top_left() {
        let mut f = frame(100.0, 10.0, 60.0, 10.0);
        f.angle = 90.0;
        let mut surface = PageSurface::new(&PAGE, Color::WHITE);
        surface.paint(&rect(f, Color::rgb(0, 128, 0))).unwrap();
        let img = surface.into_image();
        // Rotated clockwise about (100, 10): now spans x 90..100, y 10..70
        assert_eq!(img.get_pixel(95, 50).0, [0, 128, 0]);
        assert_eq!(img.get_pixel(130, 15).0, [255, 255, 255]);
    }

    #[test]
    fn test_zero_size_paints_nothing() {
        let mut surface = PageSurface::new(&PAGE, Color::WHITE);
        surface.paint(&rect(frame(10.0, 10.0, 0.0, 50.0), Color::BLACK)).unwrap();
        assert!(surface.into_image().pixels().all(|p| p.0 == [255, 255, 255]));
    }

    #[test]
    fn test_ellipse_fill() {
        let mut surface = PageSurface::new(&PAGE, Color::WHITE);
        surface
            .paint(&Primitive::Shape(Shape {
                frame: frame(0.0, 0.0, 100.0, 100.0),
                kind: ShapeKind::Ellipse,
                fill: Color::BLACK,
                stroke: Color::BLACK,
                stroke_width: 0.0,
            }))
            .unwrap();
        let img = surface.into_image();
        assert_eq!(img.get_pixel(50, 50).0, [0, 0, 0]);
        assert_eq!(img.get_pixel(2, 2).0, [255, 255, 255]);
    }

    #[test]
    fn test_text_inks_inside_its_frame_only() {
        let mut surface = PageSurface::new(&PAGE, Color::WHITE);
        surface.paint(&text_box(frame(20.0, 20.0, 120.0, 40.0), "Hello")).unwrap();
        let img = surface.into_image();
        assert!(ink_in(&img, 20, 20, 140, 60) > 20);
        assert_eq!(ink_in(&img, 0, 0, 200, 20), 0);
        assert_eq!(ink_in(&img, 0, 60, 200, 100), 0);
    }

    #[test]
    fn test_table_grid_lines() {
        let mut surface = PageSurface::new(&PAGE, Color::WHITE);
        surface
            .paint(&Primitive::Table(TableGrid {
                frame: frame(10.0, 10.0, 90.0, 60.0),
                rows: 3,
                columns: 3,
                header_row: true,
                bordered: true,
                line: Color::BLACK,
                line_width: 1.0,
                header_fill: Color::HEADER_GREY,
            }))
            .unwrap();
        let img = surface.into_image();
        // Inner vertical line at x = 40 straddles pixels 39 and 40
        assert!(img.get_pixel(40, 50).0[0] < 200);
        assert!(img.get_pixel(39, 50).0[0] < 200);
        assert!(img.get_pixel(10, 50).0[0] < 200);
        // Header cell interior is shaded, body cell interior is white
        assert_eq!(img.get_pixel(25, 20).0, [240, 240, 240]);
        assert_eq!(img.get_pixel(25, 45).0, [255, 255, 255]);
    }

    #[test]
    fn test_image_blit() {
        let mut surface = PageSurface::new(&PAGE, Color::WHITE);
        surface
            .paint(&Primitive::Image(ImageBox {
                frame: frame(10.0, 10.0, 20.0, 20.0),
                pixels: RgbaImage::from_pixel(20, 20, image::Rgba([10, 20, 30, 255])),
            }))
            .unwrap();
        let img = surface.into_image();
        assert_eq!(img.get_pixel(15, 15).0, [10, 20, 30]);
        assert_eq!(img.get_pixel(35, 15).0, [255, 255, 255]);
    }

    #[test]
    fn test_unsupported_is_error_and_paints_nothing() {
        let mut surface = PageSurface::new(&PAGE, Color::WHITE);
        let err = surface
            .paint(&Primitive::Unsupported { type_name: "chart".into() })
            .unwrap_err();
        assert!(matches!(err, FolioError::UnknownElementType(t) if t == "chart"));
        assert!(surface.into_image().pixels().all(|p| p.0 == [255, 255, 255]));
    }

    #[test]
    fn test_composite_skips_unsupported() {
        let primitives = vec![
            rect(frame(0.0, 0.0, 50.0, 50.0), Color::BLACK),
            Primitive::Unsupported { type_name: "chart".into() },
            rect(frame(100.0, 0.0, 50.0, 50.0), Color::BLACK),
        ];
        let img = composite(&PAGE, Color::WHITE, &primitives);
        assert_eq!(img.get_pixel(25, 25).0, [0, 0, 0]);
        assert_eq!(img.get_pixel(125, 25).0, [0, 0, 0]);
    }

    #[test]
    fn test_encode_png_signature() {
        let img = PageSurface::new(&PAGE, Color::WHITE).into_image();
        let png = encode_png(&img).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
