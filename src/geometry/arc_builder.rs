//! Arc construction from drafting constraints.
//!
//! Every builder resolves its constraints to the canonical
//! `{center, radius, angle1, angle2, reversed}` record, or `None` for
//! degenerate input (collinear points, sub-tolerance radius, arc length
//! shorter than the chord).

use std::f64::consts::PI;

use crate::math::{point_2d, Point2, Vector2, ANGLE_TOLERANCE, TOLERANCE};

use super::curve::Arc;

/// Canonical arc parameters produced by the builders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcData {
    pub center: Point2,
    pub radius: f64,
    pub angle1: f64,
    pub angle2: f64,
    pub reversed: bool,
}

impl ArcData {
    #[must_use]
    pub fn into_arc(self) -> Arc {
        Arc::new(self.center, self.radius, self.angle1, self.angle2, self.reversed)
    }
}

/// Namespace for the constraint solvers.
pub struct ArcBuilder;

impl ArcBuilder {
    /// Arc through three points; `None` for collinear input.
    #[must_use]
    pub fn from_3_points(p1: &Point2, p2: &Point2, p3: &Point2) -> Option<ArcData> {
        let center = circumcenter(p1, p2, p3)?;
        let radius = (p1 - center).norm();
        if radius < TOLERANCE {
            return None;
        }
        let angle1 = point_2d::angle_to(&center, p1);
        let angle2 = point_2d::angle_to(&center, p3);
        let mid = point_2d::angle_to(&center, p2);
        // Run in whichever direction passes through the middle point.
        let reversed = !point_2d::is_angle_between(mid, angle1, angle2, false);
        Some(ArcData {
            center,
            radius,
            angle1,
            angle2,
            reversed,
        })
    }

    /// Arc from a start point, start tangent direction and radius; the
    /// end point picks between the two candidate centers and caps the
    /// sweep.
    #[must_use]
    pub fn from_2p_direction_radius(
        start: &Point2,
        end: &Point2,
        direction: f64,
        radius: f64,
    ) -> Option<ArcData> {
        if radius < TOLERANCE || (end - start).norm() < TOLERANCE {
            return None;
        }
        let normal = point_2d::polar(1.0, direction + PI / 2.0);
        let c1 = start + normal * radius;
        let c2 = start - normal * radius;
        let center = if (c1 - end).norm() <= (c2 - end).norm() {
            c1
        } else {
            c2
        };

        let angle1 = point_2d::angle_to(&center, start);
        let angle2 = point_2d::angle_to(&center, end);
        Some(ArcData {
            center,
            radius,
            angle1,
            angle2,
            reversed: start_tangent_is_reversed(angle1, direction),
        })
    }

    /// Arc from a start point, start tangent direction and included
    /// angle. Both rotation senses of the construction are tried and the
    /// one ending nearer the requested end point wins.
    #[must_use]
    pub fn from_2p_direction_angle(
        start: &Point2,
        end: &Point2,
        direction: f64,
        angle: f64,
    ) -> Option<ArcData> {
        let chord = end - start;
        if chord.norm() < TOLERANCE
            || angle < ANGLE_TOLERANCE
            || angle > 2.0 * PI - ANGLE_TOLERANCE
        {
            return None;
        }
        let chord_angle = point_2d::angle_of(&chord);
        let normal_dir = point_2d::polar(1.0, direction + PI / 2.0);

        // The chord subtends `angle` at the center, so the line end ->
        // center leans (pi - angle)/2 against the chord; the start normal
        // supplies the tangent constraint.
        let mut best: Option<(ArcData, f64)> = None;
        for sense in [1.0, -1.0] {
            let lean = point_2d::polar(1.0, chord_angle + sense * (PI - angle) / 2.0);
            let Some(center) = intersect_rays(start, &normal_dir, end, &lean) else {
                continue;
            };
            let radius = (center - start).norm();
            if radius < TOLERANCE {
                continue;
            }
            let angle1 = point_2d::angle_to(&center, start);
            let reversed = start_tangent_is_reversed(angle1, direction);
            let angle2 =
                point_2d::normalize_angle(if reversed { angle1 - angle } else { angle1 + angle });
            let data = ArcData {
                center,
                radius,
                angle1,
                angle2,
                reversed,
            };
            let miss = (center + point_2d::polar(radius, angle2) - end).norm();
            if best.as_ref().is_none_or(|(_, m)| miss < *m) {
                best = Some((data, miss));
            }
        }

        if best.is_none() && (angle - PI).abs() < ANGLE_TOLERANCE {
            // Half turn: the construction lines run parallel, but the
            // center is simply the chord midpoint.
            let center = start.lerp(end, 0.5);
            let radius = chord.norm() / 2.0;
            let angle1 = point_2d::angle_to(&center, start);
            let reversed = start_tangent_is_reversed(angle1, direction);
            let angle2 =
                point_2d::normalize_angle(if reversed { angle1 - PI } else { angle1 + PI });
            return Some(ArcData {
                center,
                radius,
                angle1,
                angle2,
                reversed,
            });
        }
        best.map(|(data, _)| data)
    }

    /// Arc from two points and a bulge (`tan` of a quarter of the
    /// included angle); the bulge sign encodes the run direction.
    #[must_use]
    pub fn from_2p_bulge(start: &Point2, end: &Point2, bulge: f64) -> Option<ArcData> {
        let chord = end - start;
        let chord_len = chord.norm();
        if chord_len < TOLERANCE || bulge.abs() < TOLERANCE {
            return None;
        }

        let radius = chord_len * 0.25 * (bulge + 1.0 / bulge).abs();
        if radius < TOLERANCE {
            return None;
        }

        // Distance from the chord midpoint to the center, signed towards
        // the left of the chord for counter-clockwise arcs.
        let sagitta_ratio = (1.0 - bulge * bulge) / (2.0 * bulge);
        let mid = start.lerp(end, 0.5);
        let left = Vector2::new(-chord.y, chord.x) / chord_len;
        let center = mid + left * (sagitta_ratio * chord_len * 0.5);

        Some(ArcData {
            center,
            radius,
            angle1: point_2d::angle_to(&center, start),
            angle2: point_2d::angle_to(&center, end),
            reversed: bulge < 0.0,
        })
    }

    /// Arc from two points and a total arc length; `None` when the
    /// requested length does not exceed the chord.
    #[must_use]
    pub fn from_2p_length(start: &Point2, end: &Point2, length: f64) -> Option<ArcData> {
        let chord = end - start;
        let chord_len = chord.norm();
        if chord_len < TOLERANCE || length <= chord_len + TOLERANCE {
            return None;
        }

        // chord = 2 r sin(theta/2) and length = r * theta give
        // sin(theta/2) / (theta/2) = chord/length, monotone on (0, 2*pi).
        let target = chord_len / length;
        let mut lo = ANGLE_TOLERANCE;
        let mut hi = 2.0 * PI - ANGLE_TOLERANCE;
        for _ in 0..60 {
            let mid = 0.5 * (lo + hi);
            let value = (mid / 2.0).sin() / (mid / 2.0);
            if value > target {
                lo = mid;
            } else {
                hi = mid;
            }
            if hi - lo < ANGLE_TOLERANCE {
                break;
            }
        }
        let theta = 0.5 * (lo + hi);
        let radius = length / theta;
        if radius < TOLERANCE {
            return None;
        }

        let mid = start.lerp(end, 0.5);
        let left = Vector2::new(-chord.y, chord.x) / chord_len;
        let center = mid + left * (radius * (theta / 2.0).cos());
        Some(ArcData {
            center,
            radius,
            angle1: point_2d::angle_to(&center, start),
            angle2: point_2d::angle_to(&center, end),
            reversed: false,
        })
    }
}

/// Circumcenter of three points via the perpendicular-bisector system;
/// `None` for collinear input.
fn circumcenter(p1: &Point2, p2: &Point2, p3: &Point2) -> Option<Point2> {
    let d1 = p2 - p1;
    let d2 = p3 - p2;
    let det = d1.x * d2.y - d1.y * d2.x;
    let scale = d1.norm() * d2.norm();
    if det.abs() < TOLERANCE * scale.max(1.0) {
        return None;
    }
    let m1 = p1.lerp(p2, 0.5);
    let m2 = p2.lerp(p3, 0.5);
    // Solve m1 + t*perp(d1) = m2 + s*perp(d2).
    let w = m2 - m1;
    let t = (w.x * d2.x + w.y * d2.y) / det;
    Some(Point2::new(m1.x - t * d1.y, m1.y + t * d1.x))
}

/// Ray/ray intersection (unbounded); `None` when parallel.
fn intersect_rays(p1: &Point2, d1: &Vector2, p2: &Point2, d2: &Vector2) -> Option<Point2> {
    let det = d1.x * d2.y - d1.y * d2.x;
    if det.abs() < TOLERANCE {
        return None;
    }
    let w = p2 - p1;
    let t = (w.x * d2.y - w.y * d2.x) / det;
    Some(p1 + d1 * t)
}

/// Whether the counter-clockwise start tangent disagrees with the
/// requested direction.
fn start_tangent_is_reversed(angle1: f64, direction: f64) -> bool {
    let ccw_tangent = Vector2::new(-angle1.sin(), angle1.cos());
    ccw_tangent.dot(&point_2d::polar(1.0, direction)) < 0.0
}
