//! Blending and interpolation functions.

/// Linear interpolation between two values.
///
/// Returns `a` when `t=0`, `b` when `t=1`, and linear blend in between.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Source-over compositing of a straight-alpha RGBA color onto an opaque
/// RGB destination, with `coverage` scaling the source alpha.
#[inline]
pub fn blend_over(dst: [u8; 3], src: [u8; 4], coverage: f32) -> [u8; 3] {
    let alpha = (src[3] as f32 / 255.0) * coverage.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return dst;
    }
    if alpha >= 1.0 {
        return [src[0], src[1], src[2]];
    }
    let mix = |d: u8, s: u8| lerp(d as f32, s as f32, alpha).round().clamp(0.0, 255.0) as u8;
    [mix(dst[0], src[0]), mix(dst[1], src[1]), mix(dst[2], src[2])]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp() {
        assert!((lerp(0.0, 10.0, 0.25) - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_blend_over_opaque_replaces() {
        assert_eq!(blend_over([255, 255, 255], [255, 0, 0, 255], 1.0), [255, 0, 0]);
    }

    #[test]
    fn test_blend_over_transparent_keeps() {
        assert_eq!(blend_over([1, 2, 3], [255, 0, 0, 0], 1.0), [1, 2, 3]);
        assert_eq!(blend_over([1, 2, 3], [255, 0, 0, 255], 0.0), [1, 2, 3]);
    }

    #[test]
    fn test_blend_over_half() {
        assert_eq!(blend_over([255, 255, 255], [0, 0, 0, 255], 0.5), [128, 128, 128]);
    }
}
