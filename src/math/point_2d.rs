use std::f64::consts::TAU;

use super::{Point2, Vector2, ANGLE_TOLERANCE, TOLERANCE_SQ};

/// Constructs a vector from polar coordinates.
#[must_use]
pub fn polar(radius: f64, angle: f64) -> Vector2 {
    Vector2::new(radius * angle.cos(), radius * angle.sin())
}

/// Returns the angle of a vector in `[0, 2*pi)`.
#[must_use]
pub fn angle_of(v: &Vector2) -> f64 {
    normalize_angle(v.y.atan2(v.x))
}

/// Returns the angle of the direction from `from` to `to`, in `[0, 2*pi)`.
#[must_use]
pub fn angle_to(from: &Point2, to: &Point2) -> f64 {
    normalize_angle((to.y - from.y).atan2(to.x - from.x))
}

/// Normalizes an angle into `[0, 2*pi)`.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    // rem_euclid can return exactly TAU when the input is a tiny negative.
    if a >= TAU {
        a - TAU
    } else {
        a
    }
}

/// Swept angle from `angle1` to `angle2` in the given run direction.
///
/// `reversed = false` sweeps counter-clockwise, `reversed = true` clockwise.
/// A sub-tolerance sweep denotes a full turn, so the result is in `(0, 2*pi]`.
#[must_use]
pub fn angle_between(angle1: f64, angle2: f64, reversed: bool) -> f64 {
    let raw = if reversed {
        normalize_angle(angle1 - angle2)
    } else {
        normalize_angle(angle2 - angle1)
    };
    if raw < ANGLE_TOLERANCE {
        TAU
    } else {
        raw
    }
}

/// Checks whether `angle` lies on the sweep from `angle1` to `angle2`
/// in the given run direction, padded by the angular tolerance.
#[must_use]
pub fn is_angle_between(angle: f64, angle1: f64, angle2: f64, reversed: bool) -> bool {
    let sweep = angle_between(angle1, angle2, reversed);
    let offset = if reversed {
        normalize_angle(angle1 - angle)
    } else {
        normalize_angle(angle - angle1)
    };
    offset <= sweep + ANGLE_TOLERANCE || offset >= TAU - ANGLE_TOLERANCE
}

/// Rotates `p` about `center` by `angle` radians.
#[must_use]
pub fn rotate_about(p: &Point2, center: &Point2, angle: f64) -> Point2 {
    rotate_about_dir(p, center, &Vector2::new(angle.cos(), angle.sin()))
}

/// Rotates `p` about `center` by a precomputed unit vector `(cos, sin)`.
#[must_use]
pub fn rotate_about_dir(p: &Point2, center: &Point2, unit: &Vector2) -> Point2 {
    let d = p - center;
    Point2::new(
        center.x + d.x * unit.x - d.y * unit.y,
        center.y + d.x * unit.y + d.y * unit.x,
    )
}

/// Scales `p` about `center` by per-axis `factors`.
#[must_use]
pub fn scale_about(p: &Point2, center: &Point2, factors: &Vector2) -> Point2 {
    Point2::new(
        center.x + (p.x - center.x) * factors.x,
        center.y + (p.y - center.y) * factors.y,
    )
}

/// Mirrors `p` across the line through `p1` and `p2`.
///
/// Returns `None` when the axis is degenerate (`p1 ≈ p2`).
#[must_use]
pub fn mirror_across(p: &Point2, p1: &Point2, p2: &Point2) -> Option<Point2> {
    let axis = p2 - p1;
    let len_sq = axis.norm_squared();
    if len_sq < TOLERANCE_SQ {
        return None;
    }
    let t = (p - p1).dot(&axis) / len_sq;
    let foot = p1 + axis * t;
    Some(Point2::new(2.0 * foot.x - p.x, 2.0 * foot.y - p.y))
}
