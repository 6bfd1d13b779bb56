//! # Rendering Module
//!
//! Turns template elements into drawable primitives.
//!
//! ## Modules
//!
//! - [`element`]: Per-type element renderer (text, shapes, tables, images)
//! - [`primitive`]: The drawable primitives handed to the compositor
//! - [`color`]: CSS-style color parsing

pub mod color;
pub mod element;
pub mod primitive;

pub use color::Color;
pub use element::{ElementRenderer, ImageFetch, Rendered};
pub use primitive::{ImageBox, Primitive, Shape, ShapeKind, TableGrid, TextBox};
