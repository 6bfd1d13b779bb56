//! # Render Pipeline
//!
//! Orchestrates one render: validate, bind, render each element, wait for
//! every image fetch, composite in template order, encode.
//!
//! Image fetches are the only suspension point. Each one runs as a task in
//! a [`JoinSet`] owned by the render; the pipeline awaits them all before
//! compositing and writes each result back into the slot of the element that
//! asked for it, so paint order is template order regardless of which fetch
//! finishes first. Dropping a render mid-flight aborts its fetches.
//!
//! Only a validation failure (with validation enabled) aborts a render.
//! Every other problem degrades the affected element and is reported in the
//! returned diagnostics.

use image::RgbImage;
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::binding::Binding;
use crate::compose::{PageSurface, encode_png};
use crate::config::RenderOptions;
use crate::error::{Diagnostic, DiagnosticKind, FolioError, Result};
use crate::pdf;
use crate::render::{ElementRenderer, Primitive, Rendered};
use crate::resource::{DefaultImageSource, ImageSource};
use crate::template::{Element, PageGeometry, Template};

/// A rendered document and the conditions recovered from along the way.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    /// Single-page PDF.
    pub document: Vec<u8>,
    pub diagnostics: Vec<Diagnostic>,
}

/// A composed page before encoding.
#[derive(Debug, Clone)]
pub struct PageRender {
    pub image: RgbImage,
    pub geometry: PageGeometry,
    pub diagnostics: Vec<Diagnostic>,
}

impl PageRender {
    /// Encode the page as a PDF.
    pub fn into_output(self) -> Result<RenderOutput> {
        let document = pdf::encode(&self.image, &self.geometry)?;
        Ok(RenderOutput {
            document,
            diagnostics: self.diagnostics,
        })
    }

    /// Encode the page as a PNG preview.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        encode_png(&self.image)
    }
}

/// Renders templates against data contexts.
///
/// Holds no per-render state, so one `Renderer` can serve concurrent renders.
#[derive(Clone)]
pub struct Renderer {
    elements: ElementRenderer,
    options: RenderOptions,
}

impl Renderer {
    pub fn new(images: Arc<dyn ImageSource>, options: RenderOptions) -> Self {
        Self {
            elements: ElementRenderer::new(images),
            options,
        }
    }

    /// Renderer backed by [`DefaultImageSource`] (data URIs, HTTP, files).
    pub fn with_default_source(options: RenderOptions) -> Result<Self> {
        let images = DefaultImageSource::new(&options)?;
        Ok(Self::new(Arc::new(images), options))
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render `template` against `data` into a single-page PDF.
    pub async fn render(&self, template: &Template, data: &Value) -> Result<RenderOutput> {
        self.render_page(template, data).await?.into_output()
    }

    /// Render `template` against `data` into a page raster.
    pub async fn render_page(&self, template: &Template, data: &Value) -> Result<PageRender> {
        log::debug!(
            "rendering template '{}' ({} elements)",
            template.id,
            template.elements.len()
        );
        let mut diagnostics = Vec::new();

        if self.options.validate {
            template.validate()?;
        }
        let geometry = match template.try_page_geometry() {
            Some(geometry) => geometry,
            None => {
                let message = format!(
                    "unusable page '{}' / '{}', using A4 portrait",
                    template.page_size, template.orientation
                );
                log::warn!("{}", message);
                diagnostics.push(Diagnostic::for_template(DiagnosticKind::InvalidPage, message));
                PageGeometry::A4_PORTRAIT
            }
        };

        // Synchronous pass: one slot per element, images left pending.
        let mut slots = Vec::with_capacity(template.elements.len());
        let mut pending = Vec::new();
        let mut fetches = JoinSet::new();
        for (index, element) in template.elements.iter().enumerate() {
            let binding = Binding::resolve(data, element.data_mapping.as_deref());
            let primitive = match self.render_element(element, binding.value(), &mut diagnostics) {
                Some(Rendered::Ready(primitive)) => primitive,
                Some(Rendered::Deferred(fetch)) => {
                    pending.push(index);
                    fetches.spawn(async move { (index, fetch.await) });
                    Primitive::Empty
                }
                None => Primitive::Empty,
            };
            slots.push(primitive);
        }

        // Barrier: every fetch lands in its own slot before painting starts.
        if !pending.is_empty() {
            log::debug!("awaiting {} image fetches", pending.len());
        }
        let mut outcomes = Vec::with_capacity(pending.len());
        while let Some(joined) = fetches.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(join_err) => log::warn!("image fetch task failed: {}", join_err),
            }
        }
        // Diagnostics follow template order, not completion order.
        outcomes.sort_by_key(|(index, _)| *index);
        let mut outcomes = outcomes.into_iter().peekable();
        for index in pending {
            let element = &template.elements[index];
            let result = match outcomes.next_if(|(done, _)| *done == index) {
                Some((_, result)) => result,
                None => Err(FolioError::ResourceUnavailable("image fetch aborted".into())),
            };
            slots[index] = match result {
                Ok(primitive) => primitive,
                Err(err) => {
                    degrade(element, &err, &mut diagnostics);
                    Primitive::Empty
                }
            };
        }

        let mut surface = PageSurface::new(&geometry, self.options.background);
        for (element, primitive) in template.elements.iter().zip(&slots) {
            if let Err(err) = surface.paint(primitive) {
                degrade(element, &err, &mut diagnostics);
            }
        }

        Ok(PageRender {
            image: surface.into_image(),
            geometry,
            diagnostics,
        })
    }

    /// Render one element, falling back to its literal properties when the
    /// bound value does not fit. `None` means the element paints nothing.
    fn render_element(
        &self,
        element: &Element,
        bound: Option<&Value>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Rendered> {
        match self.elements.render(element, bound, diagnostics) {
            Ok(rendered) => Some(rendered),
            Err(err @ FolioError::BindingType(_)) if bound.is_some() => {
                degrade(element, &err, diagnostics);
                self.render_element(element, None, diagnostics)
            }
            Err(err) => {
                degrade(element, &err, diagnostics);
                None
            }
        }
    }
}

fn degrade(element: &Element, err: &FolioError, diagnostics: &mut Vec<Diagnostic>) {
    log::warn!("element '{}' ({}): {}", element.id, element.type_name(), err);
    diagnostics.push(Diagnostic::from_error(&element.id, err));
}
