//! Implicit second-degree planar curves and their pairwise intersection.
//!
//! Every curve entity can export this form, which makes it the universal
//! fallback representation when no specialized intersection algorithm
//! applies.

use super::point_set::PointSet;
use super::roots::{solve_quadratic, solve_quartic};
use super::{Point2, Vector2, TOLERANCE};

/// Coefficient magnitude below which a term is treated as absent.
const COEFF_EPS: f64 = 1e-12;

/// Residual bound for accepting a candidate point on a normalized conic.
const VERIFY_EPS: f64 = 1e-7;

/// A conic `a*x^2 + b*xy + c*y^2 + d*x + e*y + f = 0`.
///
/// A line degenerates to `(0, 0, 0, d, e, f)`. Instances are immutable;
/// the affine maps return new values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadratic {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Quadratic {
    #[must_use]
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// The line through `p1` and `p2`; `None` when the points coincide.
    #[must_use]
    pub fn line(p1: &Point2, p2: &Point2) -> Option<Self> {
        if (p2 - p1).norm_squared() < super::TOLERANCE_SQ {
            return None;
        }
        Some(Self::new(
            0.0,
            0.0,
            0.0,
            p1.y - p2.y,
            p2.x - p1.x,
            p1.x * p2.y - p2.x * p1.y,
        ))
    }

    /// The circle of the given center and radius.
    #[must_use]
    pub fn circle(center: &Point2, radius: f64) -> Self {
        Self::new(
            1.0,
            0.0,
            1.0,
            -2.0 * center.x,
            -2.0 * center.y,
            center.x * center.x + center.y * center.y - radius * radius,
        )
    }

    /// Whether all second-degree terms are negligible.
    #[must_use]
    pub fn is_linear(&self) -> bool {
        self.a.abs() < COEFF_EPS && self.b.abs() < COEFF_EPS && self.c.abs() < COEFF_EPS
    }

    /// Evaluates the implicit form at `p`.
    #[must_use]
    pub fn eval(&self, p: &Point2) -> f64 {
        self.a * p.x * p.x
            + self.b * p.x * p.y
            + self.c * p.y * p.y
            + self.d * p.x
            + self.e * p.y
            + self.f
    }

    /// The curve rotated about the origin by `angle`.
    #[must_use]
    pub fn rotated(&self, angle: f64) -> Self {
        let ct = angle.cos();
        let st = angle.sin();
        Self::new(
            self.a * ct * ct - self.b * ct * st + self.c * st * st,
            2.0 * (self.a - self.c) * ct * st + self.b * (ct * ct - st * st),
            self.a * st * st + self.b * ct * st + self.c * ct * ct,
            self.d * ct - self.e * st,
            self.d * st + self.e * ct,
            self.f,
        )
    }

    /// The curve translated by `v`.
    #[must_use]
    pub fn translated(&self, v: &Vector2) -> Self {
        Self::new(
            self.a,
            self.b,
            self.c,
            self.d - 2.0 * self.a * v.x - self.b * v.y,
            self.e - self.b * v.x - 2.0 * self.c * v.y,
            self.a * v.x * v.x + self.b * v.x * v.y + self.c * v.y * v.y - self.d * v.x
                - self.e * v.y
                + self.f,
        )
    }

    /// The curve scaled about the origin by per-axis `factors`.
    ///
    /// Factors must be non-zero; a zero factor collapses the curve.
    #[must_use]
    pub fn scaled(&self, factors: &Vector2) -> Self {
        let fx = factors.x;
        let fy = factors.y;
        Self::new(
            self.a / (fx * fx),
            self.b / (fx * fy),
            self.c / (fy * fy),
            self.d / fx,
            self.e / fy,
            self.f,
        )
    }

    /// Divides out the largest coefficient magnitude, so residual tests
    /// are comparable across inputs.
    #[must_use]
    fn normalized(&self) -> Self {
        let m = self
            .a
            .abs()
            .max(self.b.abs())
            .max(self.c.abs())
            .max(self.d.abs())
            .max(self.e.abs())
            .max(self.f.abs());
        if m < COEFF_EPS {
            return *self;
        }
        Self::new(
            self.a / m,
            self.b / m,
            self.c / m,
            self.d / m,
            self.e / m,
            self.f / m,
        )
    }
}

/// Intersects two implicit curves; the universal fallback solver.
///
/// Lines, line/conic and conic/conic pairs are all handled; conic/conic
/// pairs eliminate `y` down to a quartic in `x`. Near-zero leading
/// coefficients demote to lower-degree solvers instead of dividing by a
/// near-zero pivot. A line/conic double root sets the tangent bit.
#[must_use]
pub fn intersect(q1: &Quadratic, q2: &Quadratic) -> PointSet {
    let q1 = q1.normalized();
    let q2 = q2.normalized();

    match (q1.is_linear(), q2.is_linear()) {
        (true, true) => intersect_lines(&q1, &q2),
        (true, false) => intersect_line_conic(&q1, &q2),
        (false, true) => intersect_line_conic(&q2, &q1),
        (false, false) => intersect_conics(&q1, &q2),
    }
}

fn intersect_lines(l1: &Quadratic, l2: &Quadratic) -> PointSet {
    let mut out = PointSet::new();
    let det = l1.d * l2.e - l2.d * l1.e;
    let scale = (l1.d.abs() + l1.e.abs()) * (l2.d.abs() + l2.e.abs());
    if det.abs() <= COEFF_EPS * scale.max(1.0) {
        return out;
    }
    out.push(Point2::new(
        (l1.e * l2.f - l2.e * l1.f) / det,
        (l2.d * l1.f - l1.d * l2.f) / det,
    ));
    out
}

fn intersect_line_conic(line: &Quadratic, conic: &Quadratic) -> PointSet {
    let mut out = PointSet::new();
    let (d, e, f) = (line.d, line.e, line.f);
    if d.abs() < COEFF_EPS && e.abs() < COEFF_EPS {
        return out;
    }

    // Base point and direction of the line d*x + e*y + f = 0.
    let (p0, u) = if d.abs() >= e.abs() {
        (Point2::new(-f / d, 0.0), Vector2::new(-e, d))
    } else {
        (Point2::new(0.0, -f / e), Vector2::new(-e, d))
    };

    let qa = conic.a * u.x * u.x + conic.b * u.x * u.y + conic.c * u.y * u.y;
    let qb = 2.0 * conic.a * p0.x * u.x
        + conic.b * (p0.x * u.y + p0.y * u.x)
        + 2.0 * conic.c * p0.y * u.y
        + conic.d * u.x
        + conic.e * u.y;
    let qc = conic.eval(&p0);

    let roots = solve_quadratic(qa, qb, qc);
    let double_root = roots.len() == 1 && qa.abs() > COEFF_EPS;
    for t in roots {
        out.push(p0 + u * t);
    }
    out.set_tangent(double_root);
    out
}

/// Degree of a conic viewed as a polynomial in `y`.
fn degree_in_y(q: &Quadratic) -> usize {
    if q.c.abs() > COEFF_EPS {
        2
    } else if q.b.abs() > COEFF_EPS || q.e.abs() > COEFF_EPS {
        1
    } else {
        0
    }
}

// Small dense polynomials in x, ascending coefficients.

fn poly_mul(p: &[f64], q: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; p.len() + q.len() - 1];
    for (i, pi) in p.iter().enumerate() {
        for (j, qj) in q.iter().enumerate() {
            out[i + j] += pi * qj;
        }
    }
    out
}

fn poly_sub(p: &[f64], q: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; p.len().max(q.len())];
    for (i, v) in p.iter().enumerate() {
        out[i] += v;
    }
    for (i, v) in q.iter().enumerate() {
        out[i] -= v;
    }
    out
}

fn poly_add(p: &[f64], q: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; p.len().max(q.len())];
    for (i, v) in p.iter().enumerate() {
        out[i] += v;
    }
    for (i, v) in q.iter().enumerate() {
        out[i] += v;
    }
    out
}

fn solve_poly(p: &[f64]) -> Vec<f64> {
    let mut c = [0.0; 5];
    for (i, v) in p.iter().enumerate().take(5) {
        c[i] = *v;
    }
    solve_quartic(c[4], c[3], c[2], c[1], c[0])
}

fn intersect_conics(q1: &Quadratic, q2: &Quadratic) -> PointSet {
    // View each conic as A*y^2 + B(x)*y + C(x) = 0.
    let a1 = [q1.c];
    let b1 = [q1.e, q1.b];
    let c1 = [q1.f, q1.d, q1.a];
    let a2 = [q2.c];
    let b2 = [q2.e, q2.b];
    let c2 = [q2.f, q2.d, q2.a];

    let xs = match (degree_in_y(q1), degree_in_y(q2)) {
        (2, 2) => {
            // Bezout resultant: (A1*C2 - A2*C1)^2 - (A1*B2 - A2*B1)(B1*C2 - B2*C1).
            let ac = poly_sub(&poly_mul(&a1, &c2), &poly_mul(&a2, &c1));
            let ab = poly_sub(&poly_mul(&a1, &b2), &poly_mul(&a2, &b1));
            let bc = poly_sub(&poly_mul(&b1, &c2), &poly_mul(&b2, &c1));
            solve_poly(&poly_sub(&poly_mul(&ac, &ac), &poly_mul(&ab, &bc)))
        }
        (2, 1) => solve_poly(&eliminate_linear(&a1, &b1, &c1, &b2, &c2)),
        (1, 2) => solve_poly(&eliminate_linear(&a2, &b2, &c2, &b1, &c1)),
        (1, 1) => solve_poly(&poly_sub(&poly_mul(&b1, &c2), &poly_mul(&b2, &c1))),
        (0, _) => solve_poly(&c1),
        (_, 0) => solve_poly(&c2),
        _ => unreachable!("degree_in_y returns only 0, 1, or 2"),
    };

    let mut out = PointSet::new();
    for x in xs {
        for y in candidate_ys(q1, q2, x) {
            let p = Point2::new(x, y);
            let r1 = q1.eval(&p).abs();
            let r2 = q2.eval(&p).abs();
            let scale = 1.0 + p.coords.norm_squared();
            if r1 < VERIFY_EPS * scale && r2 < VERIFY_EPS * scale {
                out.push_unique(p, TOLERANCE.max(1e-8 * scale.sqrt()));
            }
        }
    }
    out
}

/// Substitutes `y = -C2/B2` (a conic linear in `y`) into a full conic.
fn eliminate_linear(a1: &[f64], b1: &[f64], c1: &[f64], b2: &[f64], c2: &[f64]) -> Vec<f64> {
    // A1*C2^2 - B1*C2*B2 + C1*B2^2
    let t1 = poly_mul(a1, &poly_mul(c2, c2));
    let t2 = poly_mul(b1, &poly_mul(c2, b2));
    let t3 = poly_mul(c1, &poly_mul(b2, b2));
    poly_sub(&poly_add(&t1, &t3), &t2)
}

/// Candidate `y` values for a shared root at abscissa `x`.
fn candidate_ys(q1: &Quadratic, q2: &Quadratic, x: f64) -> Vec<f64> {
    let a1 = q1.c;
    let b1 = q1.b * x + q1.e;
    let c1 = q1.a * x * x + q1.d * x + q1.f;
    let a2 = q2.c;
    let b2 = q2.b * x + q2.e;
    let c2 = q2.a * x * x + q2.d * x + q2.f;

    // Linear elimination of the y^2 term gives the shared root directly.
    let den = a1 * b2 - a2 * b1;
    if den.abs() > 1e-9 * (a1.abs() + a2.abs() + b1.abs() + b2.abs()).max(1.0) {
        return vec![(a2 * c1 - a1 * c2) / den];
    }

    // Fall back to the roots of whichever equation is non-degenerate.
    let mut ys = solve_quadratic(a1, b1, c1);
    ys.extend(solve_quadratic(a2, b2, c2));
    ys
}
