//! Pairwise curve intersection.
//!
//! The dispatcher picks the fastest correct algorithm per type pair,
//! falls back to the generic conic solver, and recovers tangencies by
//! offset bisection when direct intersection finds nothing. One
//! canonical pair ordering is applied once at the entry point; every
//! solver below assumes it.

use crate::geometry::curve::{Curve, Ellipse, Entity, Line, Parabola, Spline};
use crate::math::point_set::PointSet;
use crate::math::{bezier_2d, quadratic, Point2, Vector2, ANGLE_TOLERANCE, TOLERANCE};

use super::tangent;

/// Distance within which a computed intersection counts as on-entity.
pub(crate) const ON_ENTITY_TOL: f64 = 1e-6;

/// Intersects two entities.
///
/// With `restrict_to_extent` the result is confined to both entities'
/// extents and the tangent bit is set when the curves touch without
/// crossing; without it the supporting curves are intersected.
#[must_use]
pub fn intersect(e1: &Entity, e2: &Entity, restrict_to_extent: bool) -> PointSet {
    if e1 == e2 {
        return PointSet::new();
    }
    if restrict_to_extent && !e1.bounding_box().intersects(&e2.bounding_box()) {
        return PointSet::new();
    }

    // Canonical ordering; all results are symmetric point sets.
    let (a, b) = if e1.kind_rank() <= e2.kind_rank() {
        (e1, e2)
    } else {
        (e2, e1)
    };

    let mut hits = solve_pair(a, b);

    let line_line = matches!((a, b), (Entity::Line(_), Entity::Line(_)));
    let has_spline = matches!(a, Entity::Spline(_)) || matches!(b, Entity::Spline(_));
    if hits.is_empty() && !line_line && !has_spline {
        hits = tangent::recover_tangent(a, b);
    }

    if restrict_to_extent {
        hits.retain(|p| a.is_point_on(p, ON_ENTITY_TOL) && b.is_point_on(p, ON_ENTITY_TOL));
        if !hits.is_tangent() {
            let tangent_here = hits.iter().any(|p| {
                match (a.tangent_direction(p), b.tangent_direction(p)) {
                    (Some(t1), Some(t2)) => {
                        (t1.x * t2.y - t1.y * t2.x).abs() < ANGLE_TOLERANCE
                    }
                    _ => false,
                }
            });
            hits.set_tangent(tangent_here);
        }
    }
    hits
}

/// Core dispatch over the canonically ordered pair; intersects the
/// supporting curves.
pub(crate) fn solve_pair(a: &Entity, b: &Entity) -> PointSet {
    match (a, b) {
        (Entity::Line(l1), Entity::Line(l2)) => line_line(l1, l2),
        (Entity::Line(l), Entity::Circle(c)) => line_circle(l, &c.center(), c.radius()),
        (Entity::Line(l), Entity::Arc(arc)) => line_circle(l, &arc.center(), arc.radius()),
        (Entity::Circle(c1), Entity::Circle(c2)) => {
            circle_circle(&c1.center(), c1.radius(), &c2.center(), c2.radius())
        }
        (Entity::Circle(c), Entity::Arc(arc)) => {
            circle_circle(&c.center(), c.radius(), &arc.center(), arc.radius())
        }
        (Entity::Arc(a1), Entity::Arc(a2)) => {
            circle_circle(&a1.center(), a1.radius(), &a2.center(), a2.radius())
        }
        (Entity::Ellipse(e1), Entity::Ellipse(e2)) => ellipse_ellipse(e1, e2),
        (Entity::Spline(s), other) | (other, Entity::Spline(s)) => spline_any(s, other),
        (x, y) => generic(x, y),
    }
}

/// Closed-form line/line intersection on the supports; zero-length
/// segments are explicitly rejected.
fn line_line(l1: &Line, l2: &Line) -> PointSet {
    let mut out = PointSet::new();
    let (Some(d1), Some(d2)) = (l1.direction(), l2.direction()) else {
        return out;
    };
    let cross = d1.x * d2.y - d1.y * d2.x;
    if cross.abs() < TOLERANCE {
        return out;
    }
    let w = l2.start() - l1.start();
    let t = (w.x * d2.y - w.y * d2.x) / cross;
    out.push(l1.start() + d1 * t);
    out
}

/// Line/circle intersection by projecting the center onto the line and
/// comparing against the radius with a radius-relative tolerance.
fn line_circle(l: &Line, center: &Point2, radius: f64) -> PointSet {
    let mut out = PointSet::new();
    if radius < TOLERANCE {
        return out;
    }
    let Some(dir) = l.direction() else {
        return out;
    };
    let t = (center - l.start()).dot(&dir);
    let foot = l.start() + dir * t;
    let dist = (center - foot).norm();

    let tol = TOLERANCE.max(1e-9 * radius);
    if dist > radius + tol {
        return out;
    }
    if (dist - radius).abs() <= tol {
        out.push(foot);
        out.set_tangent(true);
        return out;
    }
    let half = (radius * radius - dist * dist).sqrt();
    out.push(foot + dir * half);
    out.push(foot - dir * half);
    out
}

/// Circle/circle intersection via the radical line. Tangent
/// configurations (`|d - (r1+r2)|` or `|d - |r1-r2||` within tolerance)
/// yield exactly one point, flagged tangent.
fn circle_circle(c1: &Point2, r1: f64, c2: &Point2, r2: f64) -> PointSet {
    let mut out = PointSet::new();
    if r1 < TOLERANCE || r2 < TOLERANCE {
        return out;
    }
    let d = c2 - c1;
    let dist = d.norm();
    if dist < TOLERANCE {
        // Concentric: no intersection (or infinitely many).
        return out;
    }

    let tol = TOLERANCE.max(1e-9 * (r1 + r2));
    if dist > r1 + r2 + tol || dist < (r1 - r2).abs() - tol {
        return out;
    }

    // Signed distance from c1 to the radical line along c1 -> c2.
    let a = (r1 * r1 - r2 * r2 + dist * dist) / (2.0 * dist);
    let h_sq = r1 * r1 - a * a;
    let mid = c1 + d * (a / dist);

    let tangent_cfg =
        (dist - (r1 + r2)).abs() <= tol || (dist - (r1 - r2).abs()).abs() <= tol;
    if tangent_cfg || h_sq <= tol * (r1 + r2) {
        out.push(mid);
        out.set_tangent(true);
        return out;
    }

    let h = h_sq.sqrt();
    let perp = Vector2::new(-d.y, d.x) * (h / dist);
    out.push(mid + perp);
    out.push(mid - perp);
    out
}

/// Ellipse/ellipse intersection: one ellipse is affinely normalized to a
/// circle, the conic system is solved there, and the points are mapped
/// back.
fn ellipse_ellipse(e1: &Ellipse, e2: &Ellipse) -> PointSet {
    let mut out = PointSet::new();
    let (Some(_), Some(q2)) = (e1.quadratic(), e2.quadratic()) else {
        return out;
    };
    let phi = e1.axis_angle();
    let ratio = e1.ratio();
    let center = e1.center();

    let circle_q = quadratic::Quadratic::circle(&Point2::origin(), e1.major_radius());
    let q2_local = q2
        .translated(&-center.coords)
        .rotated(-phi)
        .scaled(&Vector2::new(1.0, 1.0 / ratio));

    let local_hits = quadratic::intersect(&circle_q, &q2_local);
    out.set_tangent(local_hits.is_tangent());
    let (s, c) = phi.sin_cos();
    for p in &local_hits {
        let l = Vector2::new(p.x, p.y * ratio);
        out.push(center + Vector2::new(l.x * c - l.y * s, l.x * s + l.y * c));
    }
    out
}

/// Segment-wise treatment of a spline against anything (including
/// another spline): each quadratic-Bezier piece is intersected through
/// its supporting parabola (or line, for collinear control points) and
/// the hits are confined to the piece.
fn spline_any(s: &Spline, other: &Entity) -> PointSet {
    let mut out = PointSet::new();
    for i in 0..s.segment_count() {
        let (p0, p1, p2) = s.segment(i);
        let piece: Entity = if bezier_2d::is_degenerate(&p0, &p1, &p2) {
            Entity::Line(Line::new(p0, p2))
        } else {
            Entity::Parabola(Parabola::new([p0, p1, p2]))
        };
        let hits = if let Entity::Spline(other_spline) = other {
            // Spline/spline recurses one level: the piece is not a spline.
            spline_any(other_spline, &piece)
        } else {
            solve_pair_ordered(&piece, other)
        };
        for p in &hits {
            if piece.is_point_on(p, ON_ENTITY_TOL) {
                out.push_unique(*p, ON_ENTITY_TOL);
            }
        }
    }
    out
}

/// Re-sorts a pair into canonical order before dispatching.
pub(crate) fn solve_pair_ordered(a: &Entity, b: &Entity) -> PointSet {
    if a.kind_rank() <= b.kind_rank() {
        solve_pair(a, b)
    } else {
        solve_pair(b, a)
    }
}

/// Generic fallback on the implicit conic forms.
fn generic(a: &Entity, b: &Entity) -> PointSet {
    let (Some(qa), Some(qb)) = (a.quadratic(), b.quadratic()) else {
        return PointSet::new();
    };
    quadratic::intersect(&qa, &qb)
}
