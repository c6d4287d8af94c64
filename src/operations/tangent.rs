//! Tangency recovery for curve pairs whose direct intersection comes up
//! empty.
//!
//! A curve grazing another can slip through the root solvers when the
//! double root is blurred by rounding. The recovery pass offsets one
//! curve towards the other and bisects the offset magnitude between the
//! "no intersections" and "two intersections" regimes; the two points
//! collapse onto the touch point as the offset shrinks.

use crate::geometry::curve::{Curve, Entity};
use crate::math::point_set::PointSet;
use crate::math::{Point2, TOLERANCE};

use super::intersect::{solve_pair_ordered, ON_ENTITY_TOL};

/// Alternating-projection rounds used to find the closest approach.
const PROJECTION_ROUNDS: usize = 10;

/// Bracket growth attempts before giving up.
const BRACKET_STEPS: usize = 10;

/// Bisection cap.
const MAX_BISECTIONS: usize = 50;

/// Largest closest-approach gap still treated as a rounding-lost
/// tangency; anything wider is a genuine miss.
const MAX_RECOVERY_GAP: f64 = 1e-5;

/// Attempts to recover a tangency between `a` and `b`.
///
/// Returns a single point flagged tangent, or an empty set when the
/// curves do not come close enough to touch.
#[must_use]
pub(crate) fn recover_tangent(a: &Entity, b: &Entity) -> PointSet {
    recover(a, b).map_or_else(PointSet::new, |p| {
        let mut out = PointSet::new();
        out.push(p);
        out.set_tangent(true);
        out
    })
}

fn recover(a: &Entity, b: &Entity) -> Option<Point2> {
    // Closest-approach seed by alternating projection between the
    // unbounded supports.
    let b_box = b.bounding_box();
    let anchor = Point2::new(
        (b_box.min.x + b_box.max.x) / 2.0,
        (b_box.min.y + b_box.max.y) / 2.0,
    );
    let mut p = a
        .nearest_point(&anchor, false)
        .or_else(|| a.middle_point())
        .or_else(|| a.start_point())?;
    for _ in 0..PROJECTION_ROUNDS {
        let q = b.nearest_point(&p, false)?;
        p = a.nearest_point(&q, false)?;
    }
    let q = b.nearest_point(&p, false)?;
    let gap = (p - q).norm();
    if gap > MAX_RECOVERY_GAP {
        return None;
    }

    // Grow the offset until the shifted curve crosses `a`.
    let mut lo = 0.0;
    let mut hi = gap.max(TOLERANCE * 1e2);
    let mut bracketed = false;
    for _ in 0..BRACKET_STEPS {
        let hits = offset_hits(a, b, &p, hi);
        match hits.len() {
            0 => {
                lo = hi;
                hi *= 1.5;
            }
            1 => return finish(a, &[hits.points()[0]]),
            _ => {
                bracketed = true;
                break;
            }
        }
    }
    if !bracketed {
        return None;
    }

    // Shrink the crossing offset back towards the touch configuration.
    let mut last_pair: Option<(Point2, Point2)> = None;
    for _ in 0..MAX_BISECTIONS {
        let mid = 0.5 * (lo + hi);
        let hits = offset_hits(a, b, &p, mid);
        match hits.len() {
            0 => lo = mid,
            1 => return finish(a, &[hits.points()[0]]),
            _ => {
                let (u, v) = closest_pair(&hits);
                if (u - v).norm() < ON_ENTITY_TOL {
                    return finish(a, &[u, v]);
                }
                last_pair = Some((u, v));
                hi = mid;
            }
        }
        if hi - lo < TOLERANCE {
            break;
        }
    }
    let (u, v) = last_pair?;
    finish(a, &[u, v])
}

/// Intersections of `a` with `b` offset by `distance` towards the seed
/// point `toward` (a point on `a`).
fn offset_hits(a: &Entity, b: &Entity, toward: &Point2, distance: f64) -> PointSet {
    b.offset(toward, distance)
        .map_or_else(PointSet::new, |shifted| solve_pair_ordered(a, &shifted))
}

/// The two closest members of a hit set.
fn closest_pair(hits: &PointSet) -> (Point2, Point2) {
    let pts = hits.points();
    let mut best = (pts[0], pts[1]);
    let mut best_d = (pts[0] - pts[1]).norm_squared();
    for i in 0..pts.len() {
        for j in i + 1..pts.len() {
            let d = (pts[i] - pts[j]).norm_squared();
            if d < best_d {
                best_d = d;
                best = (pts[i], pts[j]);
            }
        }
    }
    best
}

/// Averages the converged points and snaps the result back onto `a`.
fn finish(a: &Entity, pts: &[Point2]) -> Option<Point2> {
    #[allow(clippy::cast_precision_loss)]
    let n = pts.len() as f64;
    let sum = pts
        .iter()
        .fold(Point2::origin(), |acc, p| acc + p.coords);
    let mean = Point2::new(sum.x / n, sum.y / n);
    a.nearest_point(&mean, false).or(Some(mean))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::curve::{Circle, Ellipse, Line};
    use crate::math::Vector2;

    #[test]
    fn recovers_line_circle_grazing() {
        let c = Entity::Circle(Circle::new(Point2::new(0.0, 0.0), 1.0));
        let l = Entity::Line(Line::new(
            Point2::new(-4.0, 1.0 + 5e-8),
            Point2::new(4.0, 1.0 + 5e-8),
        ));
        let hits = recover_tangent(&c, &l);
        assert_eq!(hits.len(), 1);
        assert!(hits.is_tangent());
        assert!((hits.points()[0] - Point2::new(0.0, 1.0)).norm() < 1e-4);
    }

    #[test]
    fn recovers_ellipse_line_grazing() {
        let e = Entity::Ellipse(Ellipse::full(
            Point2::new(0.0, 0.0),
            Vector2::new(2.0, 0.0),
            0.5,
        ));
        let l = Entity::Line(Line::new(
            Point2::new(-4.0, 1.0 + 1e-7),
            Point2::new(4.0, 1.0 + 1e-7),
        ));
        let hits = recover_tangent(&e, &l);
        assert_eq!(hits.len(), 1, "{hits:?}");
        assert!((hits.points()[0] - Point2::new(0.0, 1.0)).norm() < 1e-3, "{hits:?}");
    }

    #[test]
    fn distant_curves_yield_nothing() {
        let c1 = Entity::Circle(Circle::new(Point2::new(0.0, 0.0), 1.0));
        let c2 = Entity::Circle(Circle::new(Point2::new(10.0, 0.0), 1.0));
        assert!(recover_tangent(&c1, &c2).is_empty());
    }
}
