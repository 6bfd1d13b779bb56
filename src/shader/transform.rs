//! Coordinate transformation functions.
//!
//! Page space has its origin at the top-left with y growing downwards, so a
//! positive angle turns clockwise on the page.

use std::f32::consts::PI;

/// Rotate a point around the origin.
///
/// # Parameters
/// - `x`, `y`: Point coordinates
/// - `angle`: Rotation angle in radians
#[inline]
pub fn rotate(x: f32, y: f32, angle: f32) -> (f32, f32) {
    let cos_a = angle.cos();
    let sin_a = angle.sin();
    (x * cos_a - y * sin_a, x * sin_a + y * cos_a)
}

/// Rotate a point around the origin (angle in degrees).
#[inline]
pub fn rotate_deg(x: f32, y: f32, angle_deg: f32) -> (f32, f32) {
    rotate(x, y, angle_deg * PI / 180.0)
}

/// An axis-aligned box in page space, rotated about its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Degrees, about (x, y).
    pub angle: f32,
}

impl Frame {
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Map a page point into frame-local coordinates (origin at the pivot).
    #[inline]
    pub fn to_local(&self, px: f32, py: f32) -> (f32, f32) {
        let (dx, dy) = (px - self.x, py - self.y);
        if self.angle == 0.0 {
            (dx, dy)
        } else {
            rotate_deg(dx, dy, -self.angle)
        }
    }

    /// Map a frame-local point to page coordinates.
    #[inline]
    pub fn to_page(&self, lx: f32, ly: f32) -> (f32, f32) {
        let (rx, ry) = if self.angle == 0.0 {
            (lx, ly)
        } else {
            rotate_deg(lx, ly, self.angle)
        };
        (self.x + rx, self.y + ry)
    }

    /// Page-space bounding box `(min_x, min_y, max_x, max_y)` of the local
    /// rectangle grown by `margin` on every side.
    pub fn page_bounds(&self, margin: f32) -> (f32, f32, f32, f32) {
        let corners = [
            (-margin, -margin),
            (self.width + margin, -margin),
            (-margin, self.height + margin),
            (self.width + margin, self.height + margin),
        ];
        corners.iter().fold(
            (f32::MAX, f32::MAX, f32::MIN, f32::MIN),
            |(x0, y0, x1, y1), &(lx, ly)| {
                let (px, py) = self.to_page(lx, ly);
                (x0.min(px), y0.min(py), x1.max(px), y1.max(py))
            },
        )
    }
}
