//! # Folio - Template Rendering Library
//!
//! Folio renders page templates, positioned and typed elements bound to a
//! JSON data context, into single-page PDF documents. It provides:
//!
//! - **Template model**: pages, elements, and editor-side mutation
//! - **Data binding**: dotted/indexed paths into arbitrary JSON
//! - **Rendering**: per-element primitives, an anti-aliased page compositor,
//!   and a deterministic PDF encoder
//! - **Image fetching**: data URIs, HTTP with caching, and local files
//!
//! ## Quick Start
//!
//! ```no_run
//! use folio::{RenderOptions, Renderer, Template};
//! use serde_json::json;
//!
//! # async fn example() -> folio::error::Result<()> {
//! let template = Template::from_json(&std::fs::read_to_string("invoice.json")?)?;
//! let data = json!({"customer": {"firstName": "Ann"}});
//!
//! let renderer = Renderer::with_default_source(RenderOptions::default())?;
//! let output = renderer.render(&template, &data).await?;
//! std::fs::write("invoice.pdf", &output.document)?;
//!
//! for diagnostic in &output.diagnostics {
//!     eprintln!("warning: {}", diagnostic);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`template`] | Template and element model |
//! | [`binding`] | Path resolution and value coercion |
//! | [`render`] | Element to primitive rendering |
//! | [`compose`] | Page compositor |
//! | [`pdf`] | Document encoder |
//! | [`pipeline`] | Render orchestration |
//! | [`resource`] | Image fetching |
//! | [`server`] | HTTP API |
//! | [`error`] | Error and diagnostic types |

pub mod binding;
pub mod compose;
pub mod config;
pub mod error;
pub mod pdf;
pub mod pipeline;
pub mod render;
pub mod resource;
pub mod server;
pub mod shader;
pub mod template;
pub mod text;

// Re-exports for convenience
pub use config::{RenderOptions, ServerConfig};
pub use error::{Diagnostic, DiagnosticKind, FolioError};
pub use pipeline::{PageRender, RenderOutput, Renderer};
pub use template::{Element, ElementKind, Position, Template};
