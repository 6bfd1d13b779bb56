//! # Render Tests
//!
//! End-to-end checks of the render pipeline through the public API: page
//! geometry, data binding fallbacks, paint order, determinism, and image
//! fetch ordering.
//!
//! Nothing here touches the network. Images come from an in-memory source
//! that can delay individual fetches.

use async_trait::async_trait;
use image::{DynamicImage, Rgba, RgbaImage, RgbImage};
use lopdf::Document as PdfDocument;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use folio::error::Result;
use folio::resource::{ImageSource, OfflineImageSource};
use folio::template::{ImageProps, RectangleProps, TextProps};
use folio::{DiagnosticKind, Element, ElementKind, FolioError, Position, RenderOptions, Renderer, Template};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Solid-color images by reference, each served after its own delay.
struct DelayedImages {
    images: HashMap<String, ([u8; 4], Duration)>,
}

impl DelayedImages {
    fn new(entries: &[(&str, [u8; 4], u64)]) -> Self {
        let images = entries
            .iter()
            .map(|&(name, color, ms)| (name.to_string(), (color, Duration::from_millis(ms))))
            .collect();
        Self { images }
    }
}

#[async_trait]
impl ImageSource for DelayedImages {
    async fn fetch(&self, reference: &str) -> Result<DynamicImage> {
        let (color, delay) = self
            .images
            .get(reference)
            .ok_or_else(|| FolioError::ResourceUnavailable(reference.to_string()))?;
        tokio::time::sleep(*delay).await;
        Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba(*color))))
    }
}

fn offline() -> Renderer {
    Renderer::new(Arc::new(OfflineImageSource), RenderOptions::default())
}

fn text(id: &str, content: &str, position: Position) -> Element {
    Element::new(id, ElementKind::Text(TextProps::new(content)), position)
}

fn rect(id: &str, fill: &str, position: Position) -> Element {
    Element::new(
        id,
        ElementKind::Rectangle(RectangleProps {
            fill: fill.to_string(),
            ..Default::default()
        }),
        position,
    )
}

fn image(id: &str, src: &str, position: Position) -> Element {
    Element::new(
        id,
        ElementKind::Image(ImageProps {
            src: Some(src.to_string()),
            ..Default::default()
        }),
        position,
    )
}

async fn raster(renderer: &Renderer, template: &Template, data: &Value) -> RgbImage {
    renderer.render_page(template, data).await.unwrap().image
}

/// Count dark pixels inside `[x0, x1) x [y0, y1)`.
fn ink(img: &RgbImage, (x0, y0, x1, y1): (u32, u32, u32, u32)) -> usize {
    (y0..y1)
        .flat_map(|y| (x0..x1).map(move |x| (x, y)))
        .filter(|&(x, y)| img.get_pixel(x, y).0.iter().all(|&c| c < 128))
        .count()
}

fn media_box(pdf: &[u8]) -> Vec<f32> {
    let doc = PdfDocument::load_mem(pdf).unwrap();
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 1, "expected a single page");
    let page_id = *pages.values().next().unwrap();
    doc.get_dictionary(page_id)
        .unwrap()
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o.as_float().unwrap())
        .collect()
}

// ============================================================================
// PAGE GEOMETRY
// ============================================================================

#[tokio::test]
async fn empty_template_renders_blank_a4() {
    let template = Template::new("empty", "Empty");
    let page = offline().render_page(&template, &json!({})).await.unwrap();
    assert_eq!(page.image.dimensions(), (595, 842));
    assert!(page.image.pixels().all(|p| p.0 == [255, 255, 255]));

    let output = page.into_output().unwrap();
    assert_eq!(media_box(&output.document), vec![0.0, 0.0, 595.0, 842.0]);
    assert!(output.diagnostics.is_empty());
}

#[tokio::test]
async fn landscape_letter_swaps_axes() {
    let template = Template::from_json(r#"{"id": "l", "pageSize": "letter", "orientation": "landscape"}"#).unwrap();
    let output = offline().render(&template, &json!({})).await.unwrap();
    assert_eq!(media_box(&output.document), vec![0.0, 0.0, 792.0, 612.0]);
}

#[tokio::test]
async fn custom_page_size() {
    let template =
        Template::from_json(r#"{"id": "c", "pageSize": "custom", "width": 300, "height": 200}"#).unwrap();
    let page = offline().render_page(&template, &json!({})).await.unwrap();
    assert_eq!(page.image.dimensions(), (300, 200));
}

// ============================================================================
// DATA BINDING
// ============================================================================

#[tokio::test]
async fn hello_and_bound_name_render_at_their_positions() {
    let hello = Position::new(40.0, 40.0, 200.0, 30.0);
    let name = Position::new(40.0, 100.0, 200.0, 30.0);

    let bound = Template::new("t", "Greeting")
        .with_element(text("greeting", "Hello", hello))
        .with_element(text("name", "Name", name).mapped("customer.firstName"));
    let literal = Template::new("t", "Greeting")
        .with_element(text("greeting", "Hello", hello))
        .with_element(text("name", "Ann", name));

    let data = json!({"customer": {"firstName": "Ann"}});
    let renderer = offline();
    let bound_page = raster(&renderer, &bound, &data).await;
    let literal_page = raster(&renderer, &literal, &data).await;

    assert!(bound_page == literal_page, "bound text should render exactly as the literal 'Ann'");
    assert!(ink(&bound_page, (40, 40, 240, 70)) > 0);
    assert!(ink(&bound_page, (40, 100, 240, 130)) > 0);
    assert_eq!(ink(&bound_page, (0, 140, 595, 842)), 0);
}

#[tokio::test]
async fn missing_mapping_falls_back_to_literal() {
    let position = Position::new(20.0, 20.0, 200.0, 30.0);
    let mapped = Template::new("t", "Fallback").with_element(text("a", "Literal", position).mapped("x"));
    let plain = Template::new("t", "Fallback").with_element(text("a", "Literal", position));

    let renderer = offline();
    let page = renderer.render_page(&mapped, &json!({})).await.unwrap();
    assert!(page.diagnostics.is_empty());
    assert!(ink(&page.image, (20, 20, 220, 50)) > 0);
    assert!(page.image == raster(&renderer, &plain, &json!({})).await);
}

#[tokio::test]
async fn numeric_and_boolean_bindings_render_as_text() {
    let position = Position::new(20.0, 20.0, 200.0, 30.0);
    let renderer = offline();
    for (value, expected) in [(json!(42), "42"), (json!(2.5), "2.5"), (json!(true), "true")] {
        let mapped = Template::new("t", "Scalar").with_element(text("v", "x", position).mapped("v"));
        let literal = Template::new("t", "Scalar").with_element(text("v", expected, position));
        let data = json!({ "v": value });
        assert!(
            raster(&renderer, &mapped, &data).await == raster(&renderer, &literal, &data).await,
            "binding {} should display as {}",
            value,
            expected
        );
    }
}

#[tokio::test]
async fn object_binding_is_reported_and_uses_literal() {
    let position = Position::new(20.0, 20.0, 200.0, 30.0);
    let template = Template::new("t", "Bad type").with_element(text("a", "Literal", position).mapped("customer"));
    let output = offline()
        .render(&template, &json!({"customer": {"name": "Ann"}}))
        .await
        .unwrap();
    assert!(output.document.starts_with(b"%PDF"));
    let kinds: Vec<_> = output.diagnostics.iter().map(|d| d.kind).collect();
    assert_eq!(kinds, vec![DiagnosticKind::BindingType]);
}

// ============================================================================
// PAINT ORDER & DETERMINISM
// ============================================================================

#[tokio::test]
async fn later_element_paints_over_earlier() {
    let a = rect("a", "#ff0000", Position::new(50.0, 50.0, 100.0, 100.0));
    let b = rect("b", "#0000ff", Position::new(100.0, 100.0, 100.0, 100.0));
    let renderer = offline();

    let ab = Template::new("t", "AB").with_element(a.clone()).with_element(b.clone());
    assert_eq!(raster(&renderer, &ab, &json!({})).await.get_pixel(125, 125).0, [0, 0, 255]);

    let ba = Template::new("t", "BA").with_element(b).with_element(a);
    assert_eq!(raster(&renderer, &ba, &json!({})).await.get_pixel(125, 125).0, [255, 0, 0]);
}

#[tokio::test]
async fn repeated_renders_are_byte_identical() {
    let template = Template::new("t", "Repeat")
        .with_element(rect("box", "#336699", Position::new(10.0, 10.0, 80.0, 40.0).rotated(15.0)))
        .with_element(text("title", "Invoice", Position::new(10.0, 80.0, 200.0, 40.0)))
        .with_element(text("who", "", Position::new(10.0, 130.0, 200.0, 40.0)).mapped("customer.name"));
    let data = json!({"customer": {"name": "Ann"}});

    let renderer = offline();
    let first = renderer.render(&template, &data).await.unwrap();
    let second = renderer.render(&template, &data).await.unwrap();
    assert_eq!(first.document, second.document);
}

#[tokio::test]
async fn rendering_does_not_mutate_inputs() {
    let template = Template::new("t", "Pure").with_element(text("a", "x", Position::new(0.0, 0.0, 50.0, 20.0)).mapped("a"));
    let data = json!({"a": "value"});
    let (template_before, data_before) = (template.clone(), data.clone());
    offline().render(&template, &data).await.unwrap();
    assert_eq!(template, template_before);
    assert_eq!(data, data_before);
}

// ============================================================================
// IMAGES
// ============================================================================

#[tokio::test]
async fn delayed_image_keeps_template_order() {
    // [text, image, text] where the image arrives last.
    let source = DelayedImages::new(&[("photo", [0, 160, 0, 255], 80)]);
    let renderer = Renderer::new(Arc::new(source), RenderOptions::default());

    let template = Template::new("t", "Ordered")
        .with_element(text("under", "UNDER", Position::new(20.0, 20.0, 160.0, 30.0)))
        .with_element(image("photo", "photo", Position::new(0.0, 0.0, 200.0, 120.0)))
        .with_element(text("over", "OVER", Position::new(20.0, 70.0, 160.0, 30.0)));

    let page = renderer.render_page(&template, &json!({})).await.unwrap();
    assert!(page.diagnostics.is_empty());
    assert_eq!(ink(&page.image, (20, 20, 180, 50)), 0, "first text must be covered by the image");
    assert_eq!(page.image.get_pixel(5, 5).0, [0, 160, 0]);
    assert!(ink(&page.image, (20, 70, 180, 100)) > 0, "last text must paint over the image");
}

#[tokio::test]
async fn concurrent_fetches_land_in_their_own_slots() {
    // Completion order is fast, medium, slow; paint order must stay slow, medium, fast.
    let source = DelayedImages::new(&[
        ("slow", [255, 0, 0, 255], 90),
        ("medium", [0, 255, 0, 255], 40),
        ("fast", [0, 0, 255, 255], 0),
    ]);
    let renderer = Renderer::new(Arc::new(source), RenderOptions::default());

    let template = Template::new("t", "Stack")
        .with_element(image("slow", "slow", Position::new(0.0, 0.0, 300.0, 100.0)))
        .with_element(image("medium", "medium", Position::new(100.0, 0.0, 200.0, 100.0)))
        .with_element(image("fast", "fast", Position::new(200.0, 0.0, 100.0, 100.0)));

    let img = raster(&renderer, &template, &json!({})).await;
    assert_eq!(img.get_pixel(50, 50).0, [255, 0, 0]);
    assert_eq!(img.get_pixel(150, 50).0, [0, 255, 0]);
    assert_eq!(img.get_pixel(250, 50).0, [0, 0, 255]);
}

#[tokio::test]
async fn bound_image_source_replaces_literal() {
    let source = DelayedImages::new(&[("literal", [255, 0, 0, 255], 0), ("bound", [0, 0, 255, 255], 0)]);
    let renderer = Renderer::new(Arc::new(source), RenderOptions::default());
    let template = Template::new("t", "Bound image")
        .with_element(image("logo", "literal", Position::new(0.0, 0.0, 50.0, 50.0)).mapped("company.logo"));

    let img = raster(&renderer, &template, &json!({"company": {"logo": "bound"}})).await;
    assert_eq!(img.get_pixel(25, 25).0, [0, 0, 255]);

    let img = raster(&renderer, &template, &json!({})).await;
    assert_eq!(img.get_pixel(25, 25).0, [255, 0, 0]);
}

#[tokio::test]
async fn unavailable_image_degrades_only_that_element() {
    let template = Template::new("t", "Broken")
        .with_element(image("logo", "nowhere", Position::new(0.0, 0.0, 50.0, 50.0)))
        .with_element(rect("box", "#000000", Position::new(100.0, 0.0, 50.0, 50.0)));
    let page = offline().render_page(&template, &json!({})).await.unwrap();

    assert_eq!(page.diagnostics.len(), 1);
    assert_eq!(page.diagnostics[0].kind, DiagnosticKind::ResourceUnavailable);
    assert_eq!(page.diagnostics[0].element_id.as_deref(), Some("logo"));
    assert_eq!(page.image.get_pixel(25, 25).0, [255, 255, 255]);
    assert_eq!(page.image.get_pixel(125, 25).0, [0, 0, 0]);
}

// ============================================================================
// VALIDATION
// ============================================================================

#[tokio::test]
async fn invalid_template_aborts_when_validating() {
    let template = Template::from_json(r#"{"id": "t", "pageSize": "tabloid"}"#).unwrap();
    let err = offline().render(&template, &json!({})).await.unwrap_err();
    assert!(matches!(err, FolioError::Validation(_)));

    let lenient = Renderer::new(
        Arc::new(OfflineImageSource),
        RenderOptions {
            validate: false,
            ..Default::default()
        },
    );
    let output = lenient.render(&template, &json!({})).await.unwrap();
    assert_eq!(media_box(&output.document), vec![0.0, 0.0, 595.0, 842.0]);
    assert_eq!(output.diagnostics[0].kind, DiagnosticKind::InvalidPage);
}
