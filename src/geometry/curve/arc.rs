use std::f64::consts::FRAC_PI_2;

use crate::error::{GeometryError, Result};
use crate::math::point_set::PointSet;
use crate::math::quadratic::Quadratic;
use crate::math::{point_2d, Point2, Vector2, TOLERANCE};

use super::{BoundingBox2, Circle, Curve, Transform};

/// A circular arc.
///
/// `angle1`/`angle2` are stored in `[0, 2*pi)`; the `reversed` flag alone
/// encodes the run direction (counter-clockwise when unset, clockwise when
/// set) — reversing an arc never swaps the angles. Equal angles denote a
/// full-turn arc, never a zero-length one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    center: Point2,
    radius: f64,
    angle1: f64,
    angle2: f64,
    reversed: bool,
}

impl Arc {
    #[must_use]
    pub fn new(center: Point2, radius: f64, angle1: f64, angle2: f64, reversed: bool) -> Self {
        let mut arc = Self {
            center,
            radius,
            angle1,
            angle2,
            reversed,
        };
        arc.correct_angles();
        arc
    }

    /// Like [`Arc::new`] but rejects a sub-tolerance radius.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is not positive.
    pub fn try_new(
        center: Point2,
        radius: f64,
        angle1: f64,
        angle2: f64,
        reversed: bool,
    ) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(GeometryError::Degenerate("arc radius must be positive".into()).into());
        }
        Ok(Self::new(center, radius, angle1, angle2, reversed))
    }

    /// Renormalizes both angles into `[0, 2*pi)`. Must run after any
    /// angle edit; the constructors and transforms do so.
    pub fn correct_angles(&mut self) {
        self.angle1 = point_2d::normalize_angle(self.angle1);
        self.angle2 = point_2d::normalize_angle(self.angle2);
    }

    #[must_use]
    pub fn center(&self) -> Point2 {
        self.center
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[must_use]
    pub fn angle1(&self) -> f64 {
        self.angle1
    }

    #[must_use]
    pub fn angle2(&self) -> f64 {
        self.angle2
    }

    #[must_use]
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.radius >= TOLERANCE
    }

    /// Subtended angle in `(0, 2*pi]`.
    #[must_use]
    pub fn sweep(&self) -> f64 {
        point_2d::angle_between(self.angle1, self.angle2, self.reversed)
    }

    /// Whether the polar angle `a` lies on the arc.
    #[must_use]
    pub fn contains_angle(&self, a: f64) -> bool {
        point_2d::is_angle_between(a, self.angle1, self.angle2, self.reversed)
    }

    /// The same geometry run in the opposite direction.
    ///
    /// Only the flag flips; the stored angles stay put.
    #[must_use]
    pub fn reversed_arc(&self) -> Self {
        Self {
            reversed: !self.reversed,
            ..*self
        }
    }

    /// The supporting full circle.
    #[must_use]
    pub fn support(&self) -> Circle {
        Circle::new(self.center, self.radius)
    }

    #[must_use]
    pub fn point_at_angle(&self, a: f64) -> Point2 {
        self.center + point_2d::polar(self.radius, a)
    }

    /// Polar angle at `fraction` of the run (0 = start, 1 = end).
    fn angle_at_fraction(&self, fraction: f64) -> f64 {
        let delta = self.sweep() * fraction;
        point_2d::normalize_angle(if self.reversed {
            self.angle1 - delta
        } else {
            self.angle1 + delta
        })
    }
}

impl Curve for Arc {
    fn start_point(&self) -> Option<Point2> {
        self.is_valid().then(|| self.point_at_angle(self.angle1))
    }

    fn end_point(&self) -> Option<Point2> {
        self.is_valid().then(|| self.point_at_angle(self.angle2))
    }

    fn is_closed(&self) -> bool {
        false
    }

    fn length(&self) -> f64 {
        if self.is_valid() {
            self.radius * self.sweep()
        } else {
            0.0
        }
    }

    fn bounding_box(&self) -> BoundingBox2 {
        let mut b = BoundingBox2::empty();
        if !self.is_valid() {
            return b;
        }
        if let (Some(s), Some(e)) = (self.start_point(), self.end_point()) {
            b.expand(&s);
            b.expand(&e);
        }
        // Axis extremes reached inside the sweep.
        for quadrant in 0..4 {
            let a = f64::from(quadrant) * FRAC_PI_2;
            if self.contains_angle(a) {
                b.expand(&self.point_at_angle(a));
            }
        }
        b
    }

    fn middle_point(&self) -> Option<Point2> {
        self.is_valid()
            .then(|| self.point_at_angle(self.angle_at_fraction(0.5)))
    }

    fn nearest_point(&self, point: &Point2, on_entity_only: bool) -> Option<Point2> {
        if !self.is_valid() {
            return None;
        }
        let d = point - self.center;
        if d.norm() < TOLERANCE {
            return None;
        }
        let a = point_2d::angle_of(&d);
        if !on_entity_only || self.contains_angle(a) {
            return Some(self.point_at_angle(a));
        }
        self.nearest_endpoint(point)
    }

    fn nearest_middle(&self, point: &Point2, count: usize) -> Option<Point2> {
        if !self.is_valid() {
            return None;
        }
        let count = count.max(1);
        #[allow(clippy::cast_precision_loss)]
        let candidates: Vec<Point2> = (1..=count)
            .map(|i| self.point_at_angle(self.angle_at_fraction(i as f64 / (count + 1) as f64)))
            .collect();
        PointSet::from_points(candidates)
            .closest_to(point)
            .map(|(_, p)| p)
    }

    fn tangent_direction(&self, point: &Point2) -> Option<Vector2> {
        if !self.is_valid() {
            return None;
        }
        let d = point - self.center;
        if d.norm() < TOLERANCE {
            return None;
        }
        let a = point_2d::angle_of(&d);
        let ccw = Vector2::new(-a.sin(), a.cos());
        Some(if self.reversed { -ccw } else { ccw })
    }

    fn tangent_points(&self, point: &Point2) -> PointSet {
        let mut out = self.support().tangent_points(point);
        let center = self.center;
        out.retain(|p| {
            let a = point_2d::angle_to(&center, p);
            self.contains_angle(a)
        });
        out
    }

    fn quadratic(&self) -> Option<Quadratic> {
        self.support().quadratic()
    }

    fn area_line_integral(&self) -> f64 {
        // Antiderivative of x(t)*y'(t) on x = cx + r*cos t, y = cy + r*sin t.
        let r = self.radius;
        let cx = self.center.x;
        let antiderivative =
            |t: f64| cx * r * t.sin() + r * r * (t / 2.0 + (2.0 * t).sin() / 4.0);
        let t0 = self.angle1;
        let t1 = if self.reversed {
            self.angle1 - self.sweep()
        } else {
            self.angle1 + self.sweep()
        };
        antiderivative(t1) - antiderivative(t0)
    }

    fn offset(&self, side_point: &Point2, distance: f64) -> Option<Self> {
        if !self.is_valid() {
            return None;
        }
        let inside = (side_point - self.center).norm() < self.radius;
        let radius = if inside {
            self.radius - distance
        } else {
            self.radius + distance
        };
        (radius >= TOLERANCE)
            .then(|| Self::new(self.center, radius, self.angle1, self.angle2, self.reversed))
    }

    fn offset_two_sides(&self, distance: f64) -> (Option<Self>, Option<Self>) {
        if !self.is_valid() {
            return (None, None);
        }
        let make = |radius: f64| {
            (radius >= TOLERANCE)
                .then(|| Self::new(self.center, radius, self.angle1, self.angle2, self.reversed))
        };
        (make(self.radius + distance), make(self.radius - distance))
    }
}

impl Transform for Arc {
    fn translated(&self, v: &Vector2) -> Self {
        Self::new(
            self.center + v,
            self.radius,
            self.angle1,
            self.angle2,
            self.reversed,
        )
    }

    fn rotated(&self, center: &Point2, angle: f64) -> Self {
        Self::new(
            point_2d::rotate_about(&self.center, center, angle),
            self.radius,
            self.angle1 + angle,
            self.angle2 + angle,
            self.reversed,
        )
    }

    fn scaled(&self, center: &Point2, factors: &Vector2) -> Self {
        self.remapped(|p| point_2d::scale_about(p, center, factors), self.radius * factors.x.abs())
    }

    fn mirrored(&self, p1: &Point2, p2: &Point2) -> Option<Self> {
        if (p2 - p1).norm() < TOLERANCE {
            return None;
        }
        Some(self.remapped(|p| point_2d::mirror_across(p, p1, p2).unwrap_or(*p), self.radius))
    }
}

impl Arc {
    /// Rebuilds the arc from mapped anchor points: the angles are
    /// recovered from the mapped start/end, and the run direction from
    /// whichever flag keeps the mapped middle point on the arc.
    fn remapped(&self, map: impl Fn(&Point2) -> Point2, radius: f64) -> Self {
        let center = map(&self.center);
        let start = map(&self.point_at_angle(self.angle1));
        let end = map(&self.point_at_angle(self.angle2));
        let middle = map(&self.point_at_angle(self.angle_at_fraction(0.5)));

        let angle1 = point_2d::angle_to(&center, &start);
        let angle2 = point_2d::angle_to(&center, &end);
        let middle_angle = point_2d::angle_to(&center, &middle);

        let keeps_middle =
            point_2d::is_angle_between(middle_angle, angle1, angle2, self.reversed);
        let reversed = if keeps_middle {
            self.reversed
        } else {
            !self.reversed
        };
        Self::new(center, radius, angle1, angle2, reversed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::{PI, TAU};

    fn upper_half() -> Arc {
        // CCW from (1,0) to (-1,0) through (0,1).
        Arc::new(Point2::new(0.0, 0.0), 1.0, 0.0, PI, false)
    }

    #[test]
    fn try_new_rejects_zero_radius() {
        assert!(Arc::try_new(Point2::new(0.0, 0.0), 0.0, 0.0, PI, false).is_err());
    }

    #[test]
    fn angles_normalized_on_construction() {
        let a = Arc::new(Point2::new(0.0, 0.0), 1.0, -FRAC_PI_2, TAU + 1.0, false);
        assert!((a.angle1() - 3.0 * FRAC_PI_2).abs() < 1e-9);
        assert!((a.angle2() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn equal_angles_denote_full_turn() {
        let a = Arc::new(Point2::new(0.0, 0.0), 2.0, 1.0, 1.0, false);
        assert!((a.sweep() - TAU).abs() < 1e-9);
        assert!((a.length() - 2.0 * TAU).abs() < 1e-9);
    }

    #[test]
    fn endpoints_and_middle() {
        let a = upper_half();
        assert!((a.start_point().unwrap() - Point2::new(1.0, 0.0)).norm() < 1e-9);
        assert!((a.end_point().unwrap() - Point2::new(-1.0, 0.0)).norm() < 1e-9);
        assert!((a.middle_point().unwrap() - Point2::new(0.0, 1.0)).norm() < 1e-9);
    }

    #[test]
    fn reversed_flag_swaps_run_not_angles() {
        let a = upper_half().reversed_arc();
        assert!((a.angle1()).abs() < 1e-9);
        assert!((a.angle2() - PI).abs() < 1e-9);
        // Same endpoints, opposite middle: the reversed arc runs through
        // the lower half.
        assert!((a.middle_point().unwrap() - Point2::new(0.0, -1.0)).norm() < 1e-9);
        assert!((a.sweep() - PI).abs() < 1e-9);
    }

    #[test]
    fn nearest_point_on_arc() {
        let a = upper_half();
        let p = a.nearest_point(&Point2::new(0.0, 3.0), true).unwrap();
        assert!((p - Point2::new(0.0, 1.0)).norm() < 1e-9);
    }

    #[test]
    fn nearest_point_falls_back_to_endpoint() {
        let a = upper_half();
        // Below the arc's angular range: nearest endpoint wins.
        let p = a.nearest_point(&Point2::new(0.4, -2.0), true).unwrap();
        assert!((p - Point2::new(1.0, 0.0)).norm() < 1e-9, "{p:?}");
        // Unrestricted, the supporting circle is used.
        let p = a.nearest_point(&Point2::new(0.0, -2.0), false).unwrap();
        assert!((p - Point2::new(0.0, -1.0)).norm() < 1e-9, "{p:?}");
    }

    #[test]
    fn bounding_box_includes_quadrant_extreme() {
        let a = upper_half();
        let b = a.bounding_box();
        assert!((b.max.y - 1.0).abs() < 1e-9);
        assert!((b.min.y).abs() < 1e-9);
        assert!((b.min.x + 1.0).abs() < 1e-9);
    }

    #[test]
    fn length_of_quarter_arc() {
        let a = Arc::new(Point2::new(0.0, 0.0), 2.0, 0.0, FRAC_PI_2, false);
        assert!((a.length() - PI).abs() < 1e-9);
    }

    #[test]
    fn tangent_direction_respects_reversal() {
        let a = upper_half();
        let t = a.tangent_direction(&Point2::new(1.0, 0.0)).unwrap();
        assert!((t - Vector2::new(0.0, 1.0)).norm() < 1e-9);
        let t = a.reversed_arc().tangent_direction(&Point2::new(1.0, 0.0)).unwrap();
        assert!((t - Vector2::new(0.0, -1.0)).norm() < 1e-9);
    }

    #[test]
    fn tangent_points_filtered_to_sweep() {
        let a = upper_half();
        // From (0, 2) both circle tangent points lie on the upper half.
        assert_eq!(a.tangent_points(&Point2::new(0.0, 2.0)).len(), 2);
        // From (0, -2) they lie on the lower half, outside the arc.
        assert_eq!(a.tangent_points(&Point2::new(0.0, -2.0)).len(), 0);
    }

    #[test]
    fn area_integral_of_semicircle_contour() {
        // Upper semicircle run CCW plus its base chord encloses pi/2.
        let a = upper_half();
        let chord = super::super::Line::new(Point2::new(-1.0, 0.0), Point2::new(1.0, 0.0));
        let total = a.area_line_integral() + chord.area_line_integral();
        assert!((total - PI / 2.0).abs() < 1e-9, "total={total}");
    }

    #[test]
    fn offset_outward_keeps_angles() {
        let a = upper_half();
        let o = a.offset(&Point2::new(0.0, 5.0), 0.5).unwrap();
        assert!((o.radius() - 1.5).abs() < 1e-9);
        assert!((o.angle1() - a.angle1()).abs() < 1e-9);
        assert!((o.angle2() - a.angle2()).abs() < 1e-9);
    }

    #[test]
    fn rotate_idempotence() {
        let a = upper_half();
        let r = a.rotated(&Point2::new(2.0, 2.0), 0.0);
        let (b1, b2) = (a.bounding_box(), r.bounding_box());
        assert!((b1.min - b2.min).norm() < 1e-9);
        assert!((b1.max - b2.max).norm() < 1e-9);
        assert!((a.length() - r.length()).abs() < 1e-9);
    }

    #[test]
    fn rotate_quarter_turn_moves_angles() {
        let a = upper_half().rotated(&Point2::new(0.0, 0.0), FRAC_PI_2);
        assert!((a.angle1() - FRAC_PI_2).abs() < 1e-9);
        assert!((a.angle2() - 3.0 * FRAC_PI_2).abs() < 1e-9);
        assert!((a.middle_point().unwrap() - Point2::new(-1.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn mirror_flips_run_direction() {
        let a = upper_half();
        // Mirror across the x axis: the arc now runs through (0, -1).
        let m = a
            .mirrored(&Point2::new(-5.0, 0.0), &Point2::new(5.0, 0.0))
            .unwrap();
        assert!((m.middle_point().unwrap() - Point2::new(0.0, -1.0)).norm() < 1e-9);
        assert!(m.is_reversed() != a.is_reversed());
        assert!((m.length() - a.length()).abs() < 1e-9);
    }

    #[test]
    fn uniform_scale_scales_length() {
        let a = upper_half();
        let s = a.scaled(&Point2::new(0.0, 0.0), &Vector2::new(2.0, 2.0));
        assert!((s.radius() - 2.0).abs() < 1e-9);
        assert!((s.length() - 2.0 * a.length()).abs() < 1e-9);
    }
}
