//! Real-root solvers for polynomials up to degree four.
//!
//! Every solver demotes to the next-lower degree when the leading
//! coefficient is negligible instead of dividing by a near-zero pivot.
//! Only real roots are returned; a double root within tolerance appears
//! once.

use std::f64::consts::PI;

/// Coefficient magnitude below which a term is treated as absent.
const COEFF_EPS: f64 = 1e-12;

/// Solves `a*x^2 + b*x + c = 0`.
#[must_use]
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a.abs() < COEFF_EPS {
        if b.abs() < COEFF_EPS {
            return vec![];
        }
        return vec![-c / b];
    }

    let discriminant = b * b - 4.0 * a * c;
    let eps = COEFF_EPS * (b * b).max(4.0 * (a * c).abs()).max(1.0);
    if discriminant < -eps {
        vec![]
    } else if discriminant < eps {
        vec![-b / (2.0 * a)]
    } else {
        let sqrt_d = discriminant.sqrt();
        // Citardauq for the root where -b and the radical cancel.
        let q = -0.5 * (b + b.signum() * sqrt_d);
        let mut r = if q.abs() > COEFF_EPS {
            vec![q / a, c / q]
        } else {
            vec![(-b - sqrt_d) / (2.0 * a), (-b + sqrt_d) / (2.0 * a)]
        };
        r.sort_by(f64::total_cmp);
        r
    }
}

/// Solves `a*x^3 + b*x^2 + c*x + d = 0` (Cardano on the depressed cubic).
#[must_use]
pub fn solve_cubic(a: f64, b: f64, c: f64, d: f64) -> Vec<f64> {
    if a.abs() < COEFF_EPS {
        return solve_quadratic(b, c, d);
    }

    // Normalize to x^3 + p2*x^2 + p1*x + p0, then depress with x = t - p2/3.
    let p2 = b / a;
    let p1 = c / a;
    let p0 = d / a;
    let shift = p2 / 3.0;

    let p = p1 - p2 * p2 / 3.0;
    let q = p0 - p2 * p1 / 3.0 + 2.0 * p2 * p2 * p2 / 27.0;

    let discriminant = q * q / 4.0 + p * p * p / 27.0;
    let eps = COEFF_EPS * (q * q).max((p * p * p).abs()).max(1.0);

    let mut roots = if discriminant > eps {
        let sqrt_d = discriminant.sqrt();
        let u = (-q / 2.0 + sqrt_d).cbrt();
        let v = (-q / 2.0 - sqrt_d).cbrt();
        vec![u + v - shift]
    } else if discriminant < -eps {
        // Three distinct real roots.
        let m = (-p / 3.0).sqrt();
        let theta = (3.0 * q / (2.0 * p * m)).clamp(-1.0, 1.0).acos();
        (0..3)
            .map(|k| {
                #[allow(clippy::cast_precision_loss)]
                let angle = (theta + 2.0 * PI * k as f64) / 3.0;
                2.0 * m * angle.cos() - shift
            })
            .collect()
    } else if q.abs() < COEFF_EPS && p.abs() < COEFF_EPS {
        // Triple root.
        vec![-shift]
    } else {
        // Double root plus a simple one.
        let u = (-q / 2.0).cbrt();
        vec![2.0 * u - shift, -u - shift]
    };

    roots.sort_by(f64::total_cmp);
    roots.dedup_by(|x, y| (*x - *y).abs() < COEFF_EPS);
    roots
}

/// Solves `a*x^4 + b*x^3 + c*x^2 + d*x + e = 0` (Ferrari, via the
/// resolvent cubic).
#[must_use]
pub fn solve_quartic(a: f64, b: f64, c: f64, d: f64, e: f64) -> Vec<f64> {
    if a.abs() < COEFF_EPS {
        return solve_cubic(b, c, d, e);
    }

    // Normalize and depress with x = y - b/(4a):
    // y^4 + p*y^2 + q*y + r = 0
    let b = b / a;
    let c = c / a;
    let d = d / a;
    let e = e / a;
    let shift = b / 4.0;

    let p = c - 3.0 * b * b / 8.0;
    let q = d - b * c / 2.0 + b * b * b / 8.0;
    let r = e - b * d / 4.0 + b * b * c / 16.0 - 3.0 * b * b * b * b / 256.0;

    let mut roots = if q.abs() < COEFF_EPS {
        // Biquadratic: z^2 + p*z + r = 0 with z = y^2.
        let mut ys = Vec::new();
        for z in solve_quadratic(1.0, p, r) {
            if z > COEFF_EPS {
                let y = z.sqrt();
                ys.push(y);
                ys.push(-y);
            } else if z > -COEFF_EPS {
                ys.push(0.0);
            }
        }
        ys
    } else {
        // Resolvent cubic: 8m^3 + 8p*m^2 + (2p^2 - 8r)m - q^2 = 0.
        // Any real root m > 0 completes the square:
        //   (y^2 + p/2 + m)^2 = 2m*(y - q/(4m))^2
        let ms = solve_cubic(8.0, 8.0 * p, 2.0 * p * p - 8.0 * r, -q * q);
        let m = ms.into_iter().filter(|m| *m > COEFF_EPS).reduce(f64::max);
        if let Some(m) = m {
            let s = (2.0 * m).sqrt();
            let t = q / (2.0 * s);
            let mut ys = solve_quadratic(1.0, -s, p / 2.0 + m + t);
            ys.extend(solve_quadratic(1.0, s, p / 2.0 + m - t));
            ys
        } else {
            // The resolvent is negative at zero and positive at infinity,
            // so a positive root always exists; missing it is a numerical
            // failure of the cubic solver.
            tracing::warn!(p, q, r, "quartic resolvent yielded no positive root");
            Vec::new()
        }
    };

    for y in &mut roots {
        *y -= shift;
    }
    roots.sort_by(f64::total_cmp);
    roots.dedup_by(|x, y| (*x - *y).abs() < 1e-8);
    roots
}
