//! Pure geometric helpers over keypoints. All distances are in pixels and all
//! angles in degrees.

use super::pose::Keypoint;

/// Returned for zero-length rays so callers never see NaN.
pub const DEGENERATE_ANGLE: f32 = 180.0;

const EPSILON: f32 = 1e-6;

/// Angle at vertex `b` formed by the rays b→a and b→c, in [0, 180].
pub fn angle(a: &Keypoint, b: &Keypoint, c: &Keypoint) -> f32 {
    let (v1x, v1y) = (a.x - b.x, a.y - b.y);
    let (v2x, v2y) = (c.x - b.x, c.y - b.y);

    let mag1 = (v1x * v1x + v1y * v1y).sqrt();
    let mag2 = (v2x * v2x + v2y * v2y).sqrt();
    if !(mag1 > EPSILON && mag2 > EPSILON) {
        return DEGENERATE_ANGLE;
    }

    let cos = ((v1x * v2x + v1y * v2y) / (mag1 * mag2)).clamp(-1.0, 1.0);
    let degrees = cos.acos().to_degrees();
    if degrees.is_finite() {
        degrees
    } else {
        DEGENERATE_ANGLE
    }
}

pub fn distance(a: &Keypoint, b: &Keypoint) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// Signed vertical offset, positive when `b` is below `a`
pub fn vertical_distance(a: &Keypoint, b: &Keypoint) -> f32 {
    b.y - a.y
}

/// Signed horizontal offset, positive when `b` is right of `a`
pub fn horizontal_distance(a: &Keypoint, b: &Keypoint) -> f32 {
    b.x - a.x
}

/// True when `a` sits above `b` by more than `margin` pixels.
pub fn is_above(a: &Keypoint, b: &Keypoint, margin: f32) -> bool {
    a.y < b.y - margin
}

/// Inclination of the segment a→b from the horizontal, in [0, 90].
pub fn incline(a: &Keypoint, b: &Keypoint) -> f32 {
    let dx = horizontal_distance(a, b).abs();
    let dy = vertical_distance(a, b).abs();
    if dx <= EPSILON && dy <= EPSILON {
        return 0.0;
    }
    dy.atan2(dx).to_degrees()
}

pub fn midpoint(a: &Keypoint, b: &Keypoint) -> Keypoint {
    Keypoint::new(
        (a.x + b.x) / 2.0,
        (a.y + b.y) / 2.0,
        a.confidence.min(b.confidence),
    )
}

pub fn in_tolerance(measured: f32, target: f32, tolerance: f32) -> bool {
    (measured - target).abs() <= tolerance
}

/// `value / reference`, or None when the reference is too small to divide by.
pub fn ratio(value: f32, reference: f32) -> Option<f32> {
    if reference.abs() <= EPSILON {
        None
    } else {
        Some(value / reference)
    }
}
