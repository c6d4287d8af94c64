//! Fits an interpolating piecewise-quadratic spline through an ordered
//! point sequence.
//!
//! The curve interpolates each digitized point at the mid-span parameter
//! of its segment, which for the midpoint-chain construction gives the
//! relation `(c[i-1] + 6*c[i] + c[i+1]) / 8 = p[i]`: a tridiagonal
//! system, plus two corner entries when the sequence is closed. Open
//! chains pin the first and last control point to the end digitized
//! points and taper the border rows to `(2, 5, 1) / 8`.

use crate::geometry::curve::Spline;
use crate::math::{Point2, Vector2, TOLERANCE};

/// Fits a spline through `points`; `None` for fewer than three points or
/// coincident closed-loop input.
#[must_use]
pub fn fit(points: &[Point2], closed: bool) -> Option<Spline> {
    let control = fit_control_points(points, closed)?;
    Some(Spline::interpolated(points.to_vec(), control, closed))
}

/// Control points interpolating `points`, without building the entity.
#[must_use]
pub fn fit_control_points(points: &[Point2], closed: bool) -> Option<Vec<Point2>> {
    let n = points.len();
    if n < 3 {
        return None;
    }
    if closed {
        fit_closed(points)
    } else {
        fit_open(points)
    }
}

fn fit_open(points: &[Point2]) -> Option<Vec<Point2>> {
    let n = points.len();
    let first = points[0];
    let last = points[n - 1];

    if n == 3 {
        // Single segment (c0, c1, c2): B(1/2) = (c0 + 2*c1 + c2)/4.
        let c1 = (points[1] * 4.0 - first.coords - last.coords).coords / 2.0;
        return Some(vec![first, Point2::from(c1), last]);
    }

    // Unknowns c[1]..c[n-2].
    let m = n - 2;
    let mut lower = vec![1.0; m];
    let mut diag = vec![6.0; m];
    let mut upper = vec![1.0; m];
    let mut rhs: Vec<Vector2> = (1..=m).map(|i| points[i].coords * 8.0).collect();

    diag[0] = 5.0;
    lower[0] = 0.0;
    rhs[0] -= first.coords * 2.0;
    diag[m - 1] = 5.0;
    upper[m - 1] = 0.0;
    rhs[m - 1] -= last.coords * 2.0;

    let interior = solve_tridiagonal(&lower, &diag, &upper, &rhs)?;

    let mut control = Vec::with_capacity(n);
    control.push(first);
    control.extend(interior.into_iter().map(Point2::from));
    control.push(last);
    Some(control)
}

fn fit_closed(points: &[Point2]) -> Option<Vec<Point2>> {
    let n = points.len();
    if n == 3 {
        // The cyclic matrix is fully dense for three points; solve in
        // closed form: sum + 5*c[i] = 8*p[i] with sum = p0 + p1 + p2.
        let sum = points[0].coords + points[1].coords + points[2].coords;
        return Some(
            points
                .iter()
                .map(|p| Point2::from((p.coords * 8.0 - sum) / 5.0))
                .collect(),
        );
    }

    let lower = vec![1.0; n];
    let diag = vec![6.0; n];
    let upper = vec![1.0; n];
    let rhs: Vec<Vector2> = points.iter().map(|p| p.coords * 8.0).collect();
    let solution = solve_cyclic_tridiagonal(&lower, &diag, &upper, 1.0, 1.0, &rhs)?;
    Some(solution.into_iter().map(Point2::from).collect())
}

/// Thomas algorithm; the component arithmetic runs on `Vector2` right-hand
/// sides directly.
fn solve_tridiagonal(
    lower: &[f64],
    diag: &[f64],
    upper: &[f64],
    rhs: &[Vector2],
) -> Option<Vec<Vector2>> {
    let n = diag.len();
    let mut c_prime = vec![0.0; n];
    let mut d_prime = vec![Vector2::zeros(); n];

    let mut pivot = diag[0];
    if pivot.abs() < TOLERANCE {
        return None;
    }
    c_prime[0] = upper[0] / pivot;
    d_prime[0] = rhs[0] / pivot;

    for i in 1..n {
        pivot = diag[i] - lower[i] * c_prime[i - 1];
        if pivot.abs() < TOLERANCE {
            return None;
        }
        c_prime[i] = upper[i] / pivot;
        d_prime[i] = (rhs[i] - d_prime[i - 1] * lower[i]) / pivot;
    }

    let mut x = d_prime;
    for i in (0..n - 1).rev() {
        let next = x[i + 1];
        x[i] -= next * c_prime[i];
    }
    Some(x)
}

/// Cyclic Thomas via the Sherman-Morrison rank-one correction.
///
/// `alpha` is the top-right corner entry, `beta` the bottom-left one.
fn solve_cyclic_tridiagonal(
    lower: &[f64],
    diag: &[f64],
    upper: &[f64],
    alpha: f64,
    beta: f64,
    rhs: &[Vector2],
) -> Option<Vec<Vector2>> {
    let n = diag.len();
    if n < 4 {
        return None;
    }

    let gamma = -diag[0];
    let mut diag_mod = diag.to_vec();
    diag_mod[0] -= gamma;
    diag_mod[n - 1] -= alpha * beta / gamma;

    let y = solve_tridiagonal(lower, &diag_mod, upper, rhs)?;

    // Correction column u = (gamma, 0, ..., 0, beta); the scalar solve
    // rides in the x component.
    let mut u = vec![Vector2::zeros(); n];
    u[0].x = gamma;
    u[n - 1].x = beta;
    let z: Vec<f64> = solve_tridiagonal(lower, &diag_mod, upper, &u)?
        .into_iter()
        .map(|v| v.x)
        .collect();

    let v_dot = |vals: &[Vector2]| vals[0] + vals[n - 1] * (alpha / gamma);
    let vz = z[0] + z[n - 1] * (alpha / gamma);
    let numerator = v_dot(&y);
    let denominator = 1.0 + vz;
    if denominator.abs() < TOLERANCE {
        return None;
    }
    let factor = numerator / denominator;

    Some(
        y.into_iter()
            .zip(z)
            .map(|(yi, zi)| yi - factor * zi)
            .collect(),
    )
}
