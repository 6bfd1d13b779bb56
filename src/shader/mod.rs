//! # Shader Primitives
//!
//! Small per-pixel building blocks used by the page compositor. Primitives
//! are painted by walking the page pixels they may touch, mapping each pixel
//! into the primitive's local (unrotated) space, and evaluating a coverage
//! function there.
//!
//! ## Categories
//!
//! - [`transform`]: Rotation about a pivot, local/page mapping, bounds
//! - [`distance`]: Signed distance fields and anti-aliased coverage
//! - [`blend`]: Interpolation and source-over compositing

pub mod blend;
pub mod distance;
pub mod transform;

pub use blend::*;
pub use distance::*;
pub use transform::*;
