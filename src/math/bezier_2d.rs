//! Quadratic-Bezier segment math shared by the parabola and spline
//! entities and the spline fitter.
//!
//! A segment is the curve `B(t) = (1-t)^2*P0 + 2t(1-t)*P1 + t^2*P2` for
//! `t` in `[0, 1]`.

use super::roots::solve_cubic;
use super::{Point2, Vector2, TOLERANCE, TOLERANCE_SQ};

const EPS: f64 = 1e-12;

/// Evaluates the segment at `t`.
#[must_use]
pub fn eval(p0: &Point2, p1: &Point2, p2: &Point2, t: f64) -> Point2 {
    let s = 1.0 - t;
    Point2::new(
        s * s * p0.x + 2.0 * s * t * p1.x + t * t * p2.x,
        s * s * p0.y + 2.0 * s * t * p1.y + t * t * p2.y,
    )
}

/// First derivative at `t`.
#[must_use]
pub fn derivative(p0: &Point2, p1: &Point2, p2: &Point2, t: f64) -> Vector2 {
    ((p1 - p0) * (1.0 - t) + (p2 - p1) * t) * 2.0
}

/// De Casteljau subdivision at `t`, returning the two halves.
#[must_use]
pub fn split(p0: &Point2, p1: &Point2, p2: &Point2, t: f64) -> ([Point2; 3], [Point2; 3]) {
    let q0 = p0 + (p1 - p0) * t;
    let q1 = p1 + (p2 - p1) * t;
    let m = q0 + (q1 - q0) * t;
    ([*p0, q0, m], [m, q1, *p2])
}

/// Arc length from `0` to `t` via the closed-form antiderivative of
/// `|B'(s)|`.
#[must_use]
pub fn arc_length(p0: &Point2, p1: &Point2, p2: &Point2, t: f64) -> f64 {
    let d1 = p1 - p0;
    let e = (p2 - p1) - d1;
    // |B'(s)|^2 = 4*(|e|^2 s^2 + 2 d1.e s + |d1|^2)
    let a = 4.0 * e.norm_squared();
    let b = 8.0 * d1.dot(&e);
    let c = 4.0 * d1.norm_squared();
    sqrt_poly_integral(a, b, c, t)
}

/// Total length of the segment.
#[must_use]
pub fn length(p0: &Point2, p1: &Point2, p2: &Point2) -> f64 {
    arc_length(p0, p1, p2, 1.0)
}

/// Integral of `sqrt(a*s^2 + b*s + c)` over `[0, t]`.
fn sqrt_poly_integral(a: f64, b: f64, c: f64, t: f64) -> f64 {
    if a < EPS {
        if b.abs() < EPS {
            return c.max(0.0).sqrt() * t;
        }
        let hi = (b * t + c).max(0.0);
        return 2.0 / (3.0 * b) * (hi.powf(1.5) - c.max(0.0).powf(1.5));
    }

    let k = 4.0 * a * c - b * b;
    let sa = a.sqrt();
    if k.abs() < EPS * (4.0 * a * c).abs().max(b * b).max(1.0) {
        // Perfect square: |B'| = sqrt(a)*|s + b/(2a)| (cusp at the root).
        let h = b / (2.0 * a);
        let part = |s: f64| {
            let u = s + h;
            0.5 * sa * u * u.abs()
        };
        return part(t) - part(0.0);
    }

    let antiderivative = |s: f64| {
        let q = (a * s * s + b * s + c).max(0.0);
        let u = 2.0 * a * s + b;
        u * q.sqrt() / (4.0 * a) + k / (8.0 * a * sa) * (u / k.abs().sqrt()).asinh()
    };
    antiderivative(t) - antiderivative(0.0)
}

/// Inverts the arc length: returns `t` with `arc_length(t) = s`.
///
/// Starts from the uniform-speed guess and applies up to three Newton
/// corrections.
#[must_use]
pub fn param_at_length(p0: &Point2, p1: &Point2, p2: &Point2, s: f64) -> f64 {
    let total = length(p0, p1, p2);
    if total < TOLERANCE {
        return 0.0;
    }
    let mut t = (s / total).clamp(0.0, 1.0);
    for _ in 0..3 {
        let speed = derivative(p0, p1, p2, t).norm();
        if speed < TOLERANCE {
            break;
        }
        t = (t - (arc_length(p0, p1, p2, t) - s) / speed).clamp(0.0, 1.0);
    }
    t
}

/// The `x*dy` line integral of the segment (Green's-theorem area term).
#[must_use]
pub fn area_line_integral(p0: &Point2, p1: &Point2, p2: &Point2) -> f64 {
    let ax = p0.x - 2.0 * p1.x + p2.x;
    let bx = 2.0 * (p1.x - p0.x);
    let cx = p0.x;
    let ay = p0.y - 2.0 * p1.y + p2.y;
    let by = 2.0 * (p1.y - p0.y);
    2.0 * ax * ay / 4.0 + (ax * by + 2.0 * bx * ay) / 3.0 + (bx * by + 2.0 * cx * ay) / 2.0
        + cx * by
}

/// Segment parameter closest to `point`, over the closed interval.
#[must_use]
pub fn nearest_t(p0: &Point2, p1: &Point2, p2: &Point2, point: &Point2) -> f64 {
    // d/dt |B(t) - p|^2 = 2 (B(t) - p) . B'(t), a cubic in t.
    let alpha = p0.coords - 2.0 * p1.coords + p2.coords;
    let beta = (p1 - p0) * 2.0;
    let gamma = p0 - point;

    let c3 = 2.0 * alpha.norm_squared();
    let c2 = 3.0 * alpha.dot(&beta);
    let c1 = beta.norm_squared() + 2.0 * gamma.dot(&alpha);
    let c0 = gamma.dot(&beta);

    let mut best_t = 0.0;
    let mut best = (eval(p0, p1, p2, 0.0) - point).norm_squared();
    for t in solve_cubic(c3, c2, c1, c0)
        .into_iter()
        .chain([1.0])
        .map(|t| t.clamp(0.0, 1.0))
    {
        let d = (eval(p0, p1, p2, t) - point).norm_squared();
        if d < best {
            best = d;
            best_t = t;
        }
    }
    best_t
}

/// Parameters where the curve tangent passes through `point`.
#[must_use]
pub fn tangent_ts_through(p0: &Point2, p1: &Point2, p2: &Point2, point: &Point2) -> Vec<f64> {
    let alpha = p0.coords - 2.0 * p1.coords + p2.coords;
    let beta = (p1 - p0) * 2.0;
    let gamma = p0 - point;

    let cross = |u: &Vector2, v: &Vector2| u.x * v.y - u.y * v.x;
    // cross(B(t) - p, B'(t)) collapses to a quadratic in t.
    let qa = -cross(&alpha, &beta);
    let qb = 2.0 * cross(&gamma, &alpha);
    let qc = cross(&gamma, &beta);
    super::roots::solve_quadratic(qa, qb, qc)
}

/// Axis-aligned extent of the segment (tight, via derivative roots).
#[must_use]
pub fn extent(p0: &Point2, p1: &Point2, p2: &Point2) -> (Point2, Point2) {
    let mut min = Point2::new(p0.x.min(p2.x), p0.y.min(p2.y));
    let mut max = Point2::new(p0.x.max(p2.x), p0.y.max(p2.y));

    let d1 = p1 - p0;
    let e = (p2 - p1) - d1;
    for (num, den, axis) in [(d1.x, e.x, 0), (d1.y, e.y, 1)] {
        if den.abs() < EPS {
            continue;
        }
        let t = -num / den;
        if t > 0.0 && t < 1.0 {
            let p = eval(p0, p1, p2, t);
            let v = if axis == 0 { p.x } else { p.y };
            if axis == 0 {
                min.x = min.x.min(v);
                max.x = max.x.max(v);
            } else {
                min.y = min.y.min(v);
                max.y = max.y.max(v);
            }
        }
    }
    (min, max)
}

/// Whether the three control points are collinear within tolerance, i.e.
/// the segment degenerates to a line.
#[must_use]
pub fn is_degenerate(p0: &Point2, p1: &Point2, p2: &Point2) -> bool {
    let u = p1 - p0;
    let v = p2 - p0;
    (u.x * v.y - u.y * v.x).abs() < TOLERANCE
        || (p2 - p0).norm_squared() < TOLERANCE_SQ
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn seg() -> (Point2, Point2, Point2) {
        (
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 2.0),
            Point2::new(2.0, 0.0),
        )
    }

    #[test]
    fn eval_endpoints_and_middle() {
        let (p0, p1, p2) = seg();
        assert!((eval(&p0, &p1, &p2, 0.0) - p0).norm() < TOLERANCE);
        assert!((eval(&p0, &p1, &p2, 1.0) - p2).norm() < TOLERANCE);
        let m = eval(&p0, &p1, &p2, 0.5);
        assert!((m - Point2::new(1.0, 1.0)).norm() < TOLERANCE, "{m:?}");
    }

    #[test]
    fn split_halves_join() {
        let (p0, p1, p2) = seg();
        let (left, right) = split(&p0, &p1, &p2, 0.3);
        assert!((left[2] - right[0]).norm() < TOLERANCE);
        assert!((left[2] - eval(&p0, &p1, &p2, 0.3)).norm() < TOLERANCE);
        // The left half at local t=1/2 equals the original at 0.15.
        let probe = eval(&left[0], &left[1], &left[2], 0.5);
        assert!((probe - eval(&p0, &p1, &p2, 0.15)).norm() < 1e-9);
    }

    #[test]
    fn straight_segment_length_is_chord() {
        let p0 = Point2::new(0.0, 0.0);
        let p1 = Point2::new(1.0, 1.0);
        let p2 = Point2::new(2.0, 2.0);
        let len = length(&p0, &p1, &p2);
        assert!((len - 8.0_f64.sqrt()).abs() < 1e-9, "len={len}");
    }

    #[test]
    fn curved_length_matches_sampling() {
        let (p0, p1, p2) = seg();
        let mut sampled = 0.0;
        let n = 20_000;
        let mut prev = p0;
        for i in 1..=n {
            let t = f64::from(i) / f64::from(n);
            let p = eval(&p0, &p1, &p2, t);
            sampled += (p - prev).norm();
            prev = p;
        }
        let closed = length(&p0, &p1, &p2);
        assert!((closed - sampled).abs() < 1e-6, "closed={closed} sampled={sampled}");
    }

    #[test]
    fn param_at_length_round_trip() {
        let (p0, p1, p2) = seg();
        let total = length(&p0, &p1, &p2);
        for frac in [0.1, 0.35, 0.5, 0.8] {
            let t = param_at_length(&p0, &p1, &p2, frac * total);
            let back = arc_length(&p0, &p1, &p2, t);
            assert!((back - frac * total).abs() < 1e-6, "frac={frac} t={t}");
        }
    }

    #[test]
    fn area_term_of_straight_edge() {
        // A straight vertical edge x=2 from y=0 to y=3: integral = 2*3.
        let p0 = Point2::new(2.0, 0.0);
        let p1 = Point2::new(2.0, 1.5);
        let p2 = Point2::new(2.0, 3.0);
        assert!((area_line_integral(&p0, &p1, &p2) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn nearest_t_apex() {
        let (p0, p1, p2) = seg();
        // Directly above the apex of the symmetric segment.
        let t = nearest_t(&p0, &p1, &p2, &Point2::new(1.0, 3.0));
        assert!((t - 0.5).abs() < 1e-9, "t={t}");
    }

    #[test]
    fn nearest_t_clamps_to_endpoint() {
        let (p0, p1, p2) = seg();
        let t = nearest_t(&p0, &p1, &p2, &Point2::new(-3.0, -0.5));
        assert!(t.abs() < TOLERANCE, "t={t}");
    }

    #[test]
    fn tangent_params_from_external_point() {
        let (p0, p1, p2) = seg();
        // From far below the chord there are two tangent parameters.
        let ts = tangent_ts_through(&p0, &p1, &p2, &Point2::new(1.0, -2.0));
        assert_eq!(ts.len(), 2, "{ts:?}");
        for t in ts {
            let b = eval(&p0, &p1, &p2, t);
            let d = derivative(&p0, &p1, &p2, t);
            let to_p = Point2::new(1.0, -2.0) - b;
            assert!((to_p.x * d.y - to_p.y * d.x).abs() < 1e-8);
        }
    }

    #[test]
    fn extent_includes_apex() {
        let (p0, p1, p2) = seg();
        let (min, max) = extent(&p0, &p1, &p2);
        assert!(min.y.abs() < TOLERANCE);
        assert!((max.y - 1.0).abs() < 1e-9, "max.y={}", max.y);
        assert!((max.x - 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn collinear_controls_are_degenerate() {
        let p0 = Point2::new(0.0, 0.0);
        let p1 = Point2::new(1.0, 1.0);
        let p2 = Point2::new(2.0, 2.0);
        assert!(is_degenerate(&p0, &p1, &p2));
        let (q0, q1, q2) = seg();
        assert!(!is_degenerate(&q0, &q1, &q2));
    }
}
