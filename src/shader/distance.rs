//! Signed distance fields for shape coverage.
//!
//! Distances are negative inside a shape, positive outside, in points.

/// Signed distance from a point to a rounded rectangle.
///
/// The rectangle spans `[0, width] x [0, height]`; `radius` is clamped to
/// half the shorter side.
#[inline]
pub fn sdf_round_rect(x: f32, y: f32, width: f32, height: f32, radius: f32) -> f32 {
    let hw = width / 2.0;
    let hh = height / 2.0;
    let r = radius.clamp(0.0, hw.min(hh));
    let qx = (x - hw).abs() - (hw - r);
    let qy = (y - hh).abs() - (hh - r);
    let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
    let inside = qx.max(qy).min(0.0);
    outside + inside - r
}

/// Approximate signed distance from a point to an ellipse inscribed in
/// `[0, width] x [0, height]`.
///
/// Uses the first-order gradient approximation, exact on circles and
/// accurate near the boundary, which is all anti-aliasing needs.
#[inline]
pub fn sdf_ellipse(x: f32, y: f32, width: f32, height: f32) -> f32 {
    let rx = width / 2.0;
    let ry = height / 2.0;
    if rx <= 0.0 || ry <= 0.0 {
        return f32::MAX;
    }
    let px = x - rx;
    let py = y - ry;
    let k0 = ((px / rx).powi(2) + (py / ry).powi(2)).sqrt();
    let k1 = ((px / (rx * rx)).powi(2) + (py / (ry * ry)).powi(2)).sqrt();
    if k1 == 0.0 {
        return -rx.min(ry);
    }
    k0 * (k0 - 1.0) / k1
}

/// Fill coverage for a signed distance: 1 inside, 0 outside, a one-point
/// ramp across the edge.
#[inline]
pub fn fill_coverage(d: f32) -> f32 {
    (0.5 - d).clamp(0.0, 1.0)
}

/// Coverage of a stroke of `width` centered on the shape's edge.
#[inline]
pub fn stroke_coverage(d: f32, width: f32) -> f32 {
    if width <= 0.0 {
        return 0.0;
    }
    (width / 2.0 + 0.5 - d.abs()).clamp(0.0, 1.0).min(width)
}
