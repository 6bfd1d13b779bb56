//! Element renderer: one template element plus its bound value in, one
//! drawable primitive out.
//!
//! Every element type renders synchronously except `image`, which returns a
//! deferred fetch. The pipeline awaits all deferred fetches before it
//! composites the page.

use image::imageops::FilterType;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::color::Color;
use super::primitive::{ImageBox, Primitive, Shape, ShapeKind, TableGrid, TextBox};
use crate::binding::{display_string, source_reference};
use crate::error::{Diagnostic, DiagnosticKind, FolioError, Result};
use crate::resource::ImageSource;
use crate::shader::Frame;
use crate::template::{CircleProps, Element, ElementKind, ImageProps, RectangleProps, TableProps, TextProps};
use crate::text::{Align, TextLayout, glyphs_for};

/// Longest side of a resampled image. Larger frames are stretched by the
/// compositor.
pub const MAX_IMAGE_SIDE: u32 = 2048;

/// Future resolving an image element to its primitive.
pub type ImageFetch = Pin<Box<dyn Future<Output = Result<Primitive>> + Send + 'static>>;

/// Output of rendering one element.
pub enum Rendered {
    /// Primitive available immediately.
    Ready(Primitive),
    /// Primitive available once the image fetch completes.
    Deferred(ImageFetch),
}

impl std::fmt::Debug for Rendered {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rendered::Ready(p) => f.debug_tuple("Ready").field(p).finish(),
            Rendered::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Maps elements to primitives.
#[derive(Clone)]
pub struct ElementRenderer {
    images: Arc<dyn ImageSource>,
}

impl ElementRenderer {
    pub fn new(images: Arc<dyn ImageSource>) -> Self {
        Self { images }
    }

    /// Render one element.
    ///
    /// `bound` is the resolved value of the element's data mapping, if any.
    /// A bound value of the wrong shape fails with
    /// [`FolioError::BindingType`]; callers retry with `bound = None` to fall
    /// back to the literal property. Unparsable property values fall back to
    /// their defaults and are reported in `diagnostics`.
    pub fn render(
        &self,
        element: &Element,
        bound: Option<&Value>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Rendered> {
        let frame = frame_of(element);
        let mut props = PropertyCheck {
            element_id: &element.id,
            diagnostics,
        };

        let primitive = match &element.kind {
            ElementKind::Text(text) => render_text(frame, text, bound, &mut props)?,
            ElementKind::Paragraph(paragraph) => render_text(frame, &paragraph.0, bound, &mut props)?,
            ElementKind::Rectangle(rect) => render_rectangle(frame, rect, &mut props),
            ElementKind::Circle(circle) => render_circle(frame, circle, &mut props),
            ElementKind::Table(table) => render_table(frame, table),
            ElementKind::Image(image) => return self.render_image(frame, image, bound),
            ElementKind::Unknown { type_name, .. } => Primitive::Unsupported {
                type_name: type_name.clone(),
            },
        };
        Ok(Rendered::Ready(primitive))
    }

    fn render_image(&self, frame: Frame, image: &ImageProps, bound: Option<&Value>) -> Result<Rendered> {
        let reference = match bound {
            Some(value) => source_reference(value)?,
            None => image
                .src
                .clone()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| FolioError::ResourceUnavailable("image has no source".into()))?,
        };

        if frame.is_empty() {
            return Ok(Rendered::Ready(Primitive::Empty));
        }

        let images = Arc::clone(&self.images);
        Ok(Rendered::Deferred(Box::pin(async move {
            let source = images.fetch(&reference).await?;
            let (width, height) = resample_size(&frame);
            let pixels = source.resize_exact(width, height, FilterType::Triangle).to_rgba8();
            Ok(Primitive::Image(ImageBox { frame, pixels }))
        })))
    }
}

/// Pixel size to resample an image to: the frame size, scaled down to fit
/// within [`MAX_IMAGE_SIDE`] with the aspect ratio kept.
fn resample_size(frame: &Frame) -> (u32, u32) {
    let limit = MAX_IMAGE_SIDE as f32;
    let scale = (limit / frame.width.max(frame.height)).min(1.0);
    let side = |v: f32| (v * scale).round().clamp(1.0, limit) as u32;
    (side(frame.width), side(frame.height))
}

fn frame_of(element: &Element) -> Frame {
    let p = &element.position;
    Frame {
        x: p.x,
        y: p.y,
        width: p.width.max(0.0),
        height: p.height.max(0.0),
        angle: p.angle,
    }
}

/// Parses property values, reporting and defaulting the bad ones.
struct PropertyCheck<'a> {
    element_id: &'a str,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl PropertyCheck<'_> {
    fn invalid(&mut self, message: String) {
        log::warn!("element '{}': {}", self.element_id, message);
        self.diagnostics.push(Diagnostic::for_element(
            self.element_id,
            DiagnosticKind::InvalidProperty,
            message,
        ));
    }

    fn color(&mut self, name: &str, value: &str, default: Color) -> Color {
        Color::parse(value).unwrap_or_else(|| {
            self.invalid(format!("invalid {} '{}', using {}", name, value, default));
            default
        })
    }

    fn length(&mut self, name: &str, value: f32, default: f32) -> f32 {
        if value.is_finite() && value >= 0.0 {
            value
        } else {
            self.invalid(format!("invalid {} {}, using {}", name, value, default));
            default
        }
    }
}

fn is_bold(weight: &str) -> bool {
    match weight.trim().to_ascii_lowercase().as_str() {
        "bold" | "bolder" => true,
        other => other.parse::<u32>().is_ok_and(|w| w >= 600),
    }
}

fn render_text(
    frame: Frame,
    text: &TextProps,
    bound: Option<&Value>,
    props: &mut PropertyCheck<'_>,
) -> Result<Primitive> {
    let content = match bound {
        Some(value) => display_string(value)?,
        None => text.text.clone(),
    };

    let defaults = TextProps::default();
    let mut font_size = props.length("fontSize", text.font_size, defaults.font_size);
    if font_size == 0.0 {
        font_size = defaults.font_size;
    }
    let color = props.color("color", &text.color, Color::BLACK);
    let align = Align::parse(&text.text_align).unwrap_or_else(|| {
        props.invalid(format!("invalid textAlign '{}', using left", text.text_align));
        Align::Left
    });
    let bold = is_bold(&text.font_weight);

    let layout = TextLayout::new(&content, font_size, frame.width);
    let glyphs = glyphs_for(&content, layout.face, bold);

    Ok(Primitive::Text(TextBox {
        frame,
        content,
        layout,
        glyphs,
        color,
        align,
        bold,
    }))
}

fn render_rectangle(frame: Frame, rect: &RectangleProps, props: &mut PropertyCheck<'_>) -> Primitive {
    Primitive::Shape(Shape {
        frame,
        kind: ShapeKind::RoundRect {
            radius: props.length("borderRadius", rect.border_radius, 0.0),
        },
        fill: props.color("fill", &rect.fill, Color::TRANSPARENT),
        stroke: props.color("stroke", &rect.stroke, Color::BLACK),
        stroke_width: props.length("strokeWidth", rect.stroke_width, 1.0),
    })
}

fn render_circle(frame: Frame, circle: &CircleProps, props: &mut PropertyCheck<'_>) -> Primitive {
    let radius = props.length("radius", circle.radius, 50.0);
    let stroke_width = props.length("strokeWidth", circle.stroke_width, 1.0);
    // The stroke scales with the circle as it is stretched to its frame.
    let scale = if radius > 0.0 {
        (frame.width + frame.height) / (4.0 * radius)
    } else {
        1.0
    };
    Primitive::Shape(Shape {
        frame,
        kind: ShapeKind::Ellipse,
        fill: props.color("fill", &circle.fill, Color::TRANSPARENT),
        stroke: props.color("stroke", &circle.stroke, Color::BLACK),
        stroke_width: stroke_width * scale,
    })
}

fn render_table(frame: Frame, table: &TableProps) -> Primitive {
    Primitive::Table(TableGrid {
        frame,
        rows: table.rows,
        columns: table.columns,
        header_row: table.header_row,
        bordered: table.bordered,
        line: Color::BLACK,
        line_width: 1.0,
        header_fill: Color::HEADER_GREY,
    })
}
