use std::f64::consts::TAU;

use rand::Rng;

use super::{Point2, Vector2, TOLERANCE, TOLERANCE_SQ};

/// Computes the signed area of a polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Cross product of `(b - a)` and `(c - a)`.
#[must_use]
pub fn cross_2d(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Convex hull by Graham's scan, counter-clockwise from the
/// lowest-leftmost input point.
///
/// Inputs of two or fewer points are returned unchanged. Collinear
/// boundary points are pruned; on polar-angle ties the farther point is
/// kept.
#[must_use]
pub fn convex_hull(points: &[Point2]) -> Vec<Point2> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let mut seed = points[0];
    for p in &points[1..] {
        if p.y < seed.y - TOLERANCE || ((p.y - seed.y).abs() < TOLERANCE && p.x < seed.x) {
            seed = *p;
        }
    }

    let mut rest: Vec<Point2> = points
        .iter()
        .copied()
        .filter(|p| (p - seed).norm_squared() > TOLERANCE_SQ)
        .collect();
    rest.sort_by(|p, q| {
        let ap = (p.y - seed.y).atan2(p.x - seed.x);
        let aq = (q.y - seed.y).atan2(q.x - seed.x);
        ap.total_cmp(&aq)
            .then((p - seed).norm_squared().total_cmp(&(q - seed).norm_squared()))
    });
    // Equal-angle runs are sorted near-to-far; the scan pops the nearer
    // ones, keeping the farther point.

    let mut hull = vec![seed];
    for p in rest {
        while hull.len() >= 2 {
            let top = hull[hull.len() - 1];
            let below = hull[hull.len() - 2];
            if cross_2d(&below, &top, &p) > TOLERANCE {
                break;
            }
            hull.pop();
        }
        hull.push(p);
    }
    hull
}

/// Even-odd point-in-polygon test against a set of contours.
///
/// Casts a ray at a uniformly random angle and counts edge crossings over
/// every contour; the test runs twice with independent angles and keeps
/// the smaller crossing count, so a ray that grazes a vertex or runs
/// along an edge cannot flip the parity.
#[must_use]
pub fn point_in_polygon(point: &Point2, contours: &[Vec<Point2>]) -> bool {
    let mut rng = rand::thread_rng();
    let c1 = count_ray_crossings(point, contours, rng.gen_range(0.0..TAU));
    let c2 = count_ray_crossings(point, contours, rng.gen_range(0.0..TAU));
    c1.min(c2) % 2 == 1
}

fn count_ray_crossings(point: &Point2, contours: &[Vec<Point2>], angle: f64) -> usize {
    let u = Vector2::new(angle.cos(), angle.sin());
    let mut crossings = 0;
    for contour in contours {
        let n = contour.len();
        if n < 2 {
            continue;
        }
        for i in 0..n {
            let a = contour[i];
            let b = contour[(i + 1) % n];
            let d = b - a;
            let det = u.x * d.y - u.y * d.x;
            if det.abs() < TOLERANCE {
                continue;
            }
            let w = a - point;
            let t = (w.x * d.y - w.y * d.x) / det;
            let s = (w.x * u.y - w.y * u.x) / det;
            // Half-open edge parameter so shared vertices count once.
            if t > TOLERANCE && (-TOLERANCE..1.0 - TOLERANCE).contains(&s) {
                crossings += 1;
            }
        }
    }
    crossings
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn square() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn signed_area_ccw_square() {
        let area = signed_area_2d(&square());
        assert!((area - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_cw_square() {
        let mut pts = square();
        pts.reverse();
        assert!((signed_area_2d(&pts) + 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_degenerate() {
        assert!(signed_area_2d(&[Point2::new(0.0, 0.0)]).abs() < TOLERANCE);
        assert!(signed_area_2d(&[]).abs() < TOLERANCE);
    }

    // ── convex hull ──

    #[test]
    fn hull_of_square_with_interior_point() {
        let mut pts = square();
        pts.push(Point2::new(0.5, 0.5));
        let hull = convex_hull(&pts);
        assert_eq!(hull.len(), 4, "{hull:?}");
        assert!((signed_area_2d(&hull) - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn hull_starts_at_lowest_leftmost() {
        let pts = vec![
            Point2::new(2.0, 1.0),
            Point2::new(0.0, 0.0),
            Point2::new(1.0, -1.0),
            Point2::new(3.0, 0.5),
        ];
        let hull = convex_hull(&pts);
        assert!((hull[0] - Point2::new(1.0, -1.0)).norm() < TOLERANCE);
        assert!(signed_area_2d(&hull) > 0.0, "hull must be CCW");
    }

    #[test]
    fn hull_prunes_collinear_points() {
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        let hull = convex_hull(&pts);
        assert_eq!(hull.len(), 4, "{hull:?}");
    }

    #[test]
    fn hull_stable_for_two_points() {
        let pts = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)];
        assert_eq!(convex_hull(&pts).len(), 2);
    }

    // ── point in polygon ──

    #[test]
    fn point_inside_square() {
        let contours = vec![square()];
        assert!(point_in_polygon(&Point2::new(0.5, 0.5), &contours));
    }

    #[test]
    fn point_outside_square() {
        let contours = vec![square()];
        assert!(!point_in_polygon(&Point2::new(1.5, 0.5), &contours));
    }

    #[test]
    fn point_in_square_with_hole() {
        let outer = square();
        let inner: Vec<Point2> = vec![
            Point2::new(0.25, 0.25),
            Point2::new(0.75, 0.25),
            Point2::new(0.75, 0.75),
            Point2::new(0.25, 0.75),
        ];
        let contours = vec![outer, inner];
        // Inside the hole: even crossings.
        assert!(!point_in_polygon(&Point2::new(0.5, 0.5), &contours));
        // Between the contours: odd.
        assert!(point_in_polygon(&Point2::new(0.1, 0.5), &contours));
    }

    #[test]
    fn classification_is_stable_across_random_rays() {
        let contours = vec![square()];
        for _ in 0..20 {
            assert!(point_in_polygon(&Point2::new(0.25, 0.75), &contours));
            assert!(!point_in_polygon(&Point2::new(-0.25, 0.75), &contours));
        }
    }
}
