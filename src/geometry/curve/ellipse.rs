use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::error::{GeometryError, Result};
use crate::math::point_set::PointSet;
use crate::math::quadratic::Quadratic;
use crate::math::roots::solve_quartic;
use crate::math::{point_2d, Matrix2, Point2, Vector2, ANGLE_TOLERANCE, TOLERANCE};

use super::{BoundingBox2, Circle, Curve, Transform};

/// Fixed subdivision count for the arc-length quadrature.
const LENGTH_STEPS: usize = 128;

/// Newton iteration cap for the near-circular closest-point fallback.
const NEWTON_STEPS: usize = 20;

/// An ellipse or elliptic arc.
///
/// `major_axis` points from the center to a major-axis endpoint; `ratio`
/// is minor/major, kept in `(0, 1]` — a constructor input above 1 is
/// normalized by [`Ellipse::switch_major_minor`]. `angle1`/`angle2` are
/// eccentric-anomaly parameters in `[0, 2*pi)`; equal angles denote the
/// full ellipse. The `reversed` flag alone encodes the run direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Ellipse {
    center: Point2,
    major_axis: Vector2,
    ratio: f64,
    angle1: f64,
    angle2: f64,
    reversed: bool,
}

impl Ellipse {
    #[must_use]
    pub fn new(
        center: Point2,
        major_axis: Vector2,
        ratio: f64,
        angle1: f64,
        angle2: f64,
        reversed: bool,
    ) -> Self {
        let mut e = Self {
            center,
            major_axis,
            ratio,
            angle1: point_2d::normalize_angle(angle1),
            angle2: point_2d::normalize_angle(angle2),
            reversed,
        };
        if e.ratio > 1.0 + TOLERANCE {
            e = e.switch_major_minor();
        }
        e
    }

    /// Full ellipse.
    #[must_use]
    pub fn full(center: Point2, major_axis: Vector2, ratio: f64) -> Self {
        Self::new(center, major_axis, ratio, 0.0, 0.0, false)
    }

    /// Like [`Ellipse::new`] but rejects collapsed axes.
    ///
    /// # Errors
    ///
    /// Returns an error if the major axis or the ratio is sub-tolerance.
    pub fn try_new(
        center: Point2,
        major_axis: Vector2,
        ratio: f64,
        angle1: f64,
        angle2: f64,
        reversed: bool,
    ) -> Result<Self> {
        if major_axis.norm() < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        if ratio < TOLERANCE {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "ratio",
                value: ratio,
                min: TOLERANCE,
                max: 1.0,
            }
            .into());
        }
        Ok(Self::new(center, major_axis, ratio, angle1, angle2, reversed))
    }

    #[must_use]
    pub fn center(&self) -> Point2 {
        self.center
    }

    #[must_use]
    pub fn major_axis(&self) -> Vector2 {
        self.major_axis
    }

    #[must_use]
    pub fn ratio(&self) -> f64 {
        self.ratio
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
    pub fn major_radius(&self) -> f64 {
        self.major_axis.norm()
    }

    #[must_use]
    pub fn minor_radius(&self) -> f64 {
        self.major_axis.norm() * self.ratio
    }

    /// Rotation of the major axis against the x axis.
    #[must_use]
    pub fn axis_angle(&self) -> f64 {
        point_2d::angle_of(&self.major_axis)
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.major_radius() >= TOLERANCE && self.ratio >= TOLERANCE
    }

    /// Whether this is a full ellipse rather than an elliptic arc.
    #[must_use]
    pub fn is_full(&self) -> bool {
        point_2d::normalize_angle(self.angle2 - self.angle1) < ANGLE_TOLERANCE
            || TAU - point_2d::normalize_angle(self.angle2 - self.angle1) < ANGLE_TOLERANCE
    }

    /// Subtended parameter sweep in `(0, 2*pi]`.
    #[must_use]
    pub fn sweep(&self) -> f64 {
        point_2d::angle_between(self.angle1, self.angle2, self.reversed)
    }

    /// Whether the eccentric parameter `t` lies on the arc.
    #[must_use]
    pub fn contains_param(&self, t: f64) -> bool {
        self.is_full() || point_2d::is_angle_between(t, self.angle1, self.angle2, self.reversed)
    }

    /// Swaps the roles of the axes, the only operation allowed to see a
    /// ratio above 1; the result is normalized back into `(0, 1]`.
    #[must_use]
    pub fn switch_major_minor(&self) -> Self {
        let perp = Vector2::new(-self.major_axis.y, self.major_axis.x);
        Self {
            center: self.center,
            // The co-vertex vector has length major * ratio.
            major_axis: perp * self.ratio,
            ratio: 1.0 / self.ratio,
            angle1: point_2d::normalize_angle(self.angle1 - FRAC_PI_2),
            angle2: point_2d::normalize_angle(self.angle2 - FRAC_PI_2),
            reversed: self.reversed,
        }
    }

    /// Maps a world point into the axis-aligned local frame.
    #[must_use]
    pub fn to_local(&self, p: &Point2) -> Vector2 {
        let phi = self.axis_angle();
        let d = p - self.center;
        let (s, c) = phi.sin_cos();
        Vector2::new(d.x * c + d.y * s, -d.x * s + d.y * c)
    }

    fn from_local(&self, v: &Vector2) -> Point2 {
        let phi = self.axis_angle();
        let (s, c) = phi.sin_cos();
        self.center + Vector2::new(v.x * c - v.y * s, v.x * s + v.y * c)
    }

    /// Point at eccentric parameter `t`.
    #[must_use]
    pub fn point_at_param(&self, t: f64) -> Point2 {
        let a = self.major_radius();
        let b = self.minor_radius();
        self.from_local(&Vector2::new(a * t.cos(), b * t.sin()))
    }

    /// Eccentric parameter of a point assumed on (or near) the ellipse.
    #[must_use]
    pub fn param_of(&self, p: &Point2) -> f64 {
        let l = self.to_local(p);
        point_2d::normalize_angle((l.y / self.minor_radius()).atan2(l.x / self.major_radius()))
    }

    fn param_at_fraction(&self, fraction: f64) -> f64 {
        let delta = self.sweep() * fraction;
        point_2d::normalize_angle(if self.reversed {
            self.angle1 - delta
        } else {
            self.angle1 + delta
        })
    }

    /// Parameter of the closest point on the unbounded ellipse.
    fn nearest_param(&self, point: &Point2) -> Option<f64> {
        let a = self.major_radius();
        let b = self.minor_radius();
        let l = self.to_local(point);
        if l.norm() < TOLERANCE {
            return None;
        }

        // Near-circular ellipses make the quartic ill-conditioned; go
        // straight to Newton there.
        if (a - b).abs() < TOLERANCE.max(1e-8 * a) {
            return Some(point_2d::normalize_angle(l.y.atan2(l.x)));
        }

        let e = a * a - b * b;
        let k = a * l.x;
        let m = b * l.y;

        // Quartic in u = cos(t) from the stationarity condition
        // e*sin(t)*cos(t) - k*sin(t) + m*cos(t) = 0.
        let roots = solve_quartic(
            e * e,
            -2.0 * e * k,
            k * k + m * m - e * e,
            2.0 * e * k,
            -k * k,
        );

        let mut candidates = Vec::new();
        for u in roots {
            if u.abs() > 1.0 + 1e-9 {
                continue;
            }
            let u = u.clamp(-1.0, 1.0);
            let den = e * u - k;
            if den.abs() > 1e-9 {
                candidates.push((-m * u / den).atan2(u));
            } else {
                let s = (1.0 - u * u).max(0.0).sqrt();
                candidates.push(s.atan2(u));
                candidates.push((-s).atan2(u));
            }
        }
        if candidates.is_empty() {
            // The stationarity quartic always has a real root; recover
            // with Newton from the scaled-angle guess.
            tracing::debug!("ellipse closest-point quartic found no roots, using Newton");
            candidates.push(self.newton_param(&l));
        }

        let mut best: Option<(f64, f64)> = None;
        for t in candidates {
            let d = (self.point_at_param(t) - point).norm_squared();
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((t, d));
            }
        }
        best.map(|(t, _)| point_2d::normalize_angle(t))
    }

    /// Newton-Raphson on the stationarity condition, used when the
    /// quartic is ill-conditioned.
    fn newton_param(&self, local: &Vector2) -> f64 {
        let a = self.major_radius();
        let b = self.minor_radius();
        let e = a * a - b * b;
        let k = a * local.x;
        let m = b * local.y;
        let mut t = (a * local.y).atan2(b * local.x);
        for _ in 0..NEWTON_STEPS {
            let (s, c) = t.sin_cos();
            let g = e * s * c - k * s + m * c;
            let dg = e * (c * c - s * s) - k * c - m * s;
            if dg.abs() < TOLERANCE {
                break;
            }
            let step = g / dg;
            t -= step;
            if step.abs() < ANGLE_TOLERANCE {
                break;
            }
        }
        t
    }
}

impl Curve for Ellipse {
    fn start_point(&self) -> Option<Point2> {
        (self.is_valid() && !self.is_full()).then(|| self.point_at_param(self.angle1))
    }

    fn end_point(&self) -> Option<Point2> {
        (self.is_valid() && !self.is_full()).then(|| self.point_at_param(self.angle2))
    }

    fn is_closed(&self) -> bool {
        self.is_full()
    }

    fn length(&self) -> f64 {
        if !self.is_valid() {
            return 0.0;
        }
        // No closed form exists; composite Simpson over the speed
        // sqrt(a^2 sin^2 + b^2 cos^2) with a fixed step count.
        let a = self.major_radius();
        let b = self.minor_radius();
        let sweep = if self.is_full() { TAU } else { self.sweep() };
        let t0 = self.angle1;
        let dir = if self.reversed { -1.0 } else { 1.0 };
        let speed = |i: usize| {
            #[allow(clippy::cast_precision_loss)]
            let t = t0 + dir * sweep * (i as f64) / (LENGTH_STEPS as f64);
            let (s, c) = t.sin_cos();
            (a * a * s * s + b * b * c * c).sqrt()
        };
        let mut sum = speed(0) + speed(LENGTH_STEPS);
        for i in 1..LENGTH_STEPS {
            sum += speed(i) * if i % 2 == 0 { 2.0 } else { 4.0 };
        }
        #[allow(clippy::cast_precision_loss)]
        let h = sweep / (LENGTH_STEPS as f64);
        sum * h / 3.0
    }

    fn bounding_box(&self) -> BoundingBox2 {
        let mut bb = BoundingBox2::empty();
        if !self.is_valid() {
            return bb;
        }
        if let (Some(s), Some(e)) = (self.start_point(), self.end_point()) {
            bb.expand(&s);
            bb.expand(&e);
        }
        // Parameters of the axis-aligned extremes.
        let a = self.major_radius();
        let b = self.minor_radius();
        let phi = self.axis_angle();
        let tx = (-b * phi.sin()).atan2(a * phi.cos());
        let ty = (b * phi.cos()).atan2(a * phi.sin());
        for t in [tx, tx + PI, ty, ty + PI] {
            let t = point_2d::normalize_angle(t);
            if self.contains_param(t) {
                bb.expand(&self.point_at_param(t));
            }
        }
        bb
    }

    fn middle_point(&self) -> Option<Point2> {
        (self.is_valid() && !self.is_full())
            .then(|| self.point_at_param(self.param_at_fraction(0.5)))
    }

    fn nearest_point(&self, point: &Point2, on_entity_only: bool) -> Option<Point2> {
        if !self.is_valid() {
            return None;
        }
        let t = self.nearest_param(point)?;
        if !on_entity_only || self.contains_param(t) {
            return Some(self.point_at_param(t));
        }
        self.nearest_endpoint(point)
    }

    fn nearest_middle(&self, point: &Point2, count: usize) -> Option<Point2> {
        if !self.is_valid() || self.is_full() {
            return None;
        }
        let count = count.max(1);
        #[allow(clippy::cast_precision_loss)]
        let candidates: Vec<Point2> = (1..=count)
            .map(|i| self.point_at_param(self.param_at_fraction(i as f64 / (count + 1) as f64)))
            .collect();
        PointSet::from_points(candidates)
            .closest_to(point)
            .map(|(_, p)| p)
    }

    fn tangent_direction(&self, point: &Point2) -> Option<Vector2> {
        if !self.is_valid() {
            return None;
        }
        let t = self.nearest_param(point)?;
        let a = self.major_radius();
        let b = self.minor_radius();
        let (s, c) = t.sin_cos();
        let local = Vector2::new(-a * s, b * c);
        let len = local.norm();
        if len < TOLERANCE {
            return None;
        }
        let world = self.from_local(&(local / len)) - self.center;
        Some(if self.reversed { -world } else { world })
    }

    fn tangent_points(&self, point: &Point2) -> PointSet {
        let mut out = PointSet::new();
        if !self.is_valid() {
            return out;
        }
        // Squeeze the minor axis to turn the ellipse into a circle; the
        // affine map preserves tangency.
        let a = self.major_radius();
        let l = self.to_local(point);
        let scaled = Point2::new(l.x, l.y / self.ratio);
        let circle = Circle::new(Point2::origin(), a);
        for p in circle.tangent_points(&scaled) {
            let back = Vector2::new(p.x, p.y * self.ratio);
            let world = self.from_local(&back);
            if self.contains_param(self.param_of(&world)) {
                out.push(world);
            }
        }
        out
    }

    fn quadratic(&self) -> Option<Quadratic> {
        if !self.is_valid() {
            return None;
        }
        let a = self.major_radius();
        let b = self.minor_radius();
        Some(
            Quadratic::new(1.0 / (a * a), 0.0, 1.0 / (b * b), 0.0, 0.0, -1.0)
                .rotated(self.axis_angle())
                .translated(&self.center.coords),
        )
    }

    fn area_line_integral(&self) -> f64 {
        if !self.is_valid() {
            return 0.0;
        }
        let a = self.major_radius();
        let b = self.minor_radius();
        let phi = self.axis_angle();
        let (sp, cp) = phi.sin_cos();
        let (ca, cb, cc, cd) = (a * cp, b * sp, a * sp, b * cp);
        let cx = self.center.x;
        let antiderivative = |t: f64| {
            let (s, c) = t.sin_cos();
            cx * cc * c + cx * cd * s - (ca * cc + cb * cd) * s * s / 2.0
                + ca * cd * (t / 2.0 + (2.0 * t).sin() / 4.0)
                + cb * cc * (t / 2.0 - (2.0 * t).sin() / 4.0)
        };
        let sweep = if self.is_full() { TAU } else { self.sweep() };
        let t0 = self.angle1;
        let t1 = if self.reversed { t0 - sweep } else { t0 + sweep };
        antiderivative(t1) - antiderivative(t0)
    }

    fn offset(&self, side_point: &Point2, distance: f64) -> Option<Self> {
        if !self.is_valid() {
            return None;
        }
        let a = self.major_radius();
        let b = self.minor_radius();
        let l = self.to_local(side_point);
        let inside = (l.x / a).powi(2) + (l.y / b).powi(2) < 1.0;
        let delta = if inside { -distance } else { distance };
        let (na, nb) = (a + delta, b + delta);
        if na < TOLERANCE || nb < TOLERANCE {
            return None;
        }
        // Shifting both semi-axes approximates the true (non-elliptic)
        // offset curve.
        Some(Self::new(
            self.center,
            self.major_axis * (na / a),
            nb / na,
            self.angle1,
            self.angle2,
            self.reversed,
        ))
    }

    fn offset_two_sides(&self, distance: f64) -> (Option<Self>, Option<Self>) {
        if !self.is_valid() {
            return (None, None);
        }
        let a = self.major_radius();
        let b = self.minor_radius();
        let make = |delta: f64| {
            let (na, nb) = (a + delta, b + delta);
            (na >= TOLERANCE && nb >= TOLERANCE).then(|| {
                Self::new(
                    self.center,
                    self.major_axis * (na / a),
                    nb / na,
                    self.angle1,
                    self.angle2,
                    self.reversed,
                )
            })
        };
        (make(distance), make(-distance))
    }
}

impl Transform for Ellipse {
    fn translated(&self, v: &Vector2) -> Self {
        Self {
            center: self.center + v,
            ..self.clone()
        }
    }

    fn rotated(&self, center: &Point2, angle: f64) -> Self {
        // Eccentric parameters are frame-relative, so the angles ride
        // along with the axis.
        Self {
            center: point_2d::rotate_about(&self.center, center, angle),
            major_axis: point_2d::rotate_about(
                &Point2::from(self.major_axis),
                &Point2::origin(),
                angle,
            )
            .coords,
            ..self.clone()
        }
    }

    fn scaled(&self, center: &Point2, factors: &Vector2) -> Self {
        self.remapped(
            |p| point_2d::scale_about(p, center, factors),
            |v| Vector2::new(v.x * factors.x, v.y * factors.y),
        )
    }

    fn mirrored(&self, p1: &Point2, p2: &Point2) -> Option<Self> {
        if (p2 - p1).norm() < TOLERANCE {
            return None;
        }
        let origin = point_2d::mirror_across(&Point2::origin(), p1, p2)?;
        Some(self.remapped(
            |p| point_2d::mirror_across(p, p1, p2).unwrap_or(*p),
            |v| point_2d::mirror_across(&Point2::from(*v), p1, p2).unwrap_or_else(Point2::origin) - origin,
        ))
    }
}

impl Ellipse {
    /// Rebuilds the ellipse under an affine map given as a point map and
    /// its linear part. The image of the axes is a conjugate-diameter
    /// pair; the principal axes are recovered from its Gram matrix, and
    /// the arc range from the mapped start/middle/end points.
    fn remapped(
        &self,
        map: impl Fn(&Point2) -> Point2,
        linear: impl Fn(&Vector2) -> Vector2,
    ) -> Self {
        let minor_vec = Vector2::new(-self.major_axis.y, self.major_axis.x) * self.ratio;
        let f1 = linear(&self.major_axis);
        let f2 = linear(&minor_vec);

        let gram = Matrix2::new(
            f1.x * f1.x + f2.x * f2.x,
            f1.x * f1.y + f2.x * f2.y,
            f1.x * f1.y + f2.x * f2.y,
            f1.y * f1.y + f2.y * f2.y,
        );
        let eigen = gram.symmetric_eigen();
        let (hi, lo) = if eigen.eigenvalues[0] >= eigen.eigenvalues[1] {
            (0, 1)
        } else {
            (1, 0)
        };
        let a = eigen.eigenvalues[hi].max(0.0).sqrt();
        let b = eigen.eigenvalues[lo].max(0.0).sqrt();
        let dir = eigen.eigenvectors.column(hi).into_owned();

        let center = map(&self.center);
        let mut out = Self {
            center,
            major_axis: dir * a,
            ratio: if a < TOLERANCE { 0.0 } else { b / a },
            angle1: 0.0,
            angle2: 0.0,
            reversed: self.reversed,
        };
        if self.is_full() {
            return out;
        }

        let start = map(&self.point_at_param(self.angle1));
        let end = map(&self.point_at_param(self.angle2));
        let middle = map(&self.point_at_param(self.param_at_fraction(0.5)));
        out.angle1 = out.param_of(&start);
        out.angle2 = out.param_of(&end);
        let tm = out.param_of(&middle);
        if !point_2d::is_angle_between(tm, out.angle1, out.angle2, out.reversed) {
            out.reversed = !out.reversed;
        }
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn axis_aligned(a: f64, ratio: f64) -> Ellipse {
        Ellipse::full(Point2::new(0.0, 0.0), Vector2::new(a, 0.0), ratio)
    }

    #[test]
    fn try_new_rejects_collapsed_axis() {
        assert!(Ellipse::try_new(
            Point2::new(0.0, 0.0),
            Vector2::new(0.0, 0.0),
            0.5,
            0.0,
            0.0,
            false
        )
        .is_err());
    }

    #[test]
    fn ratio_above_one_is_normalized() {
        let e = Ellipse::full(Point2::new(0.0, 0.0), Vector2::new(1.0, 0.0), 2.0);
        assert!(e.ratio() <= 1.0 + TOLERANCE, "ratio={}", e.ratio());
        assert_relative_eq!(e.major_radius(), 2.0, epsilon = 1e-9);
        assert_relative_eq!(e.minor_radius(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn switch_major_minor_keeps_points() {
        let e = Ellipse::new(
            Point2::new(1.0, 2.0),
            Vector2::new(2.0, 0.0),
            0.5,
            0.3,
            2.0,
            false,
        );
        let s = e.switch_major_minor().switch_major_minor();
        assert!((e.start_point().unwrap() - s.start_point().unwrap()).norm() < 1e-9);
        assert!((e.middle_point().unwrap() - s.middle_point().unwrap()).norm() < 1e-9);
    }

    #[test]
    fn full_ellipse_has_no_endpoints() {
        let e = axis_aligned(2.0, 0.5);
        assert!(e.is_closed());
        assert!(e.start_point().is_none());
        assert!(e.middle_point().is_none());
    }

    #[test]
    fn nearest_point_on_major_axis() {
        let e = axis_aligned(2.0, 0.5);
        let p = e.nearest_point(&Point2::new(5.0, 0.0), true).unwrap();
        assert!((p - Point2::new(2.0, 0.0)).norm() < 1e-7, "{p:?}");
    }

    #[test]
    fn nearest_point_off_axis() {
        let e = axis_aligned(2.0, 0.5);
        let q = Point2::new(1.2, 1.5);
        let p = e.nearest_point(&q, true).unwrap();
        // Verify stationarity: the connection must be normal to the curve.
        let t = e.param_of(&p);
        let tangent = Vector2::new(-2.0 * t.sin(), 1.0 * t.cos());
        let connect = q - p;
        assert!(
            tangent.dot(&connect).abs() < 1e-6,
            "tangent={tangent:?} connect={connect:?}"
        );
    }

    #[test]
    fn nearest_point_near_circular_uses_newton() {
        let e = axis_aligned(1.0, 1.0 - 1e-12);
        let p = e.nearest_point(&Point2::new(3.0, 4.0), true).unwrap();
        assert!((p - Point2::new(0.6, 0.8)).norm() < 1e-6, "{p:?}");
    }

    #[test]
    fn nearest_point_restricted_falls_back_to_endpoint() {
        // Upper half of the ellipse, query point below.
        let e = Ellipse::new(
            Point2::new(0.0, 0.0),
            Vector2::new(2.0, 0.0),
            0.5,
            0.0,
            PI,
            false,
        );
        let p = e.nearest_point(&Point2::new(1.8, -0.5), true).unwrap();
        assert!((p - Point2::new(2.0, 0.0)).norm() < 1e-7, "{p:?}");
    }

    #[test]
    fn tangent_points_via_circle_normalization() {
        let e = axis_aligned(2.0, 0.5);
        let q = Point2::new(4.0, 3.0);
        let pts = e.tangent_points(&q);
        assert_eq!(pts.len(), 2);
        for p in pts.points() {
            // Tangent direction at p must be parallel to (q - p).
            let t = e.param_of(p);
            let tangent = Vector2::new(-2.0 * t.sin(), 1.0 * t.cos());
            let to_q = q - p;
            let cross = tangent.x * to_q.y - tangent.y * to_q.x;
            assert!(cross.abs() < 1e-6, "p={p:?} cross={cross}");
        }
    }

    #[test]
    fn quadratic_form_vanishes_on_curve() {
        let e = Ellipse::new(
            Point2::new(1.0, -2.0),
            Vector2::new(1.5, 1.0),
            0.4,
            0.0,
            0.0,
            false,
        );
        let q = e.quadratic().unwrap();
        for i in 0..8 {
            let t = f64::from(i) * TAU / 8.0;
            let p = e.point_at_param(t);
            assert!(q.eval(&p).abs() < 1e-9, "t={t} residual={}", q.eval(&p));
        }
    }

    #[test]
    fn area_integral_of_full_ellipse() {
        let e = Ellipse::new(
            Point2::new(3.0, 1.0),
            Vector2::new(2.0, 1.0),
            0.5,
            0.0,
            0.0,
            false,
        );
        let a = e.major_radius();
        let b = e.minor_radius();
        assert_relative_eq!(e.area_line_integral(), PI * a * b, epsilon = 1e-9);
    }

    #[test]
    fn length_of_circle_case_matches() {
        let e = axis_aligned(2.0, 1.0);
        assert_relative_eq!(e.length(), TAU * 2.0, epsilon = 1e-6);
    }

    #[test]
    fn length_of_half_ellipse_is_half() {
        let full = axis_aligned(2.0, 0.5);
        let half = Ellipse::new(
            Point2::new(0.0, 0.0),
            Vector2::new(2.0, 0.0),
            0.5,
            0.0,
            PI,
            false,
        );
        // Symmetric halves: exactly half the circumference.
        assert_relative_eq!(half.length(), full.length() / 2.0, epsilon = 1e-6);
    }

    #[test]
    fn rotation_preserves_shape() {
        let e = Ellipse::new(
            Point2::new(0.0, 0.0),
            Vector2::new(2.0, 0.0),
            0.5,
            0.5,
            2.5,
            false,
        );
        let r = e.rotated(&Point2::new(0.0, 0.0), FRAC_PI_2);
        assert_relative_eq!(r.length(), e.length(), epsilon = 1e-9);
        let s = e.start_point().unwrap();
        let expect = point_2d::rotate_about(&s, &Point2::new(0.0, 0.0), FRAC_PI_2);
        assert!((r.start_point().unwrap() - expect).norm() < 1e-9);
    }

    #[test]
    fn uniform_scale_keeps_ratio() {
        let e = axis_aligned(2.0, 0.5);
        let s = e.scaled(&Point2::new(0.0, 0.0), &Vector2::new(3.0, 3.0));
        assert_relative_eq!(s.major_radius(), 6.0, epsilon = 1e-9);
        assert_relative_eq!(s.ratio(), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn anisotropic_scale_recomputes_axes() {
        // Squashing a circle-ratio ellipse along y produces ratio 1/2.
        let e = axis_aligned(2.0, 1.0);
        let s = e.scaled(&Point2::new(0.0, 0.0), &Vector2::new(1.0, 0.5));
        assert_relative_eq!(s.major_radius(), 2.0, epsilon = 1e-9);
        assert_relative_eq!(s.ratio(), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn anisotropic_scale_rotated_frame() {
        // Scale a tilted ellipse and verify mapped points stay on it.
        let e = Ellipse::new(
            Point2::new(1.0, 1.0),
            Vector2::new(1.0, 1.0),
            0.5,
            0.0,
            0.0,
            false,
        );
        let factors = Vector2::new(2.0, 0.7);
        let s = e.scaled(&Point2::new(0.0, 0.0), &factors);
        let q = s.quadratic().unwrap();
        for i in 0..12 {
            let t = f64::from(i) * TAU / 12.0;
            let mapped = point_2d::scale_about(
                &e.point_at_param(t),
                &Point2::new(0.0, 0.0),
                &factors,
            );
            assert!(q.eval(&mapped).abs() < 1e-7, "t={t} res={}", q.eval(&mapped));
        }
    }

    #[test]
    fn mirror_arc_keeps_middle_on_curve() {
        let e = Ellipse::new(
            Point2::new(0.0, 0.0),
            Vector2::new(2.0, 0.0),
            0.5,
            0.0,
            PI,
            false,
        );
        let m = e
            .mirrored(&Point2::new(0.0, -1.0), &Point2::new(0.0, 1.0))
            .unwrap();
        let mid = e.middle_point().unwrap();
        let expect = point_2d::mirror_across(&mid, &Point2::new(0.0, -1.0), &Point2::new(0.0, 1.0))
            .unwrap();
        assert!((m.middle_point().unwrap() - expect).norm() < 1e-7);
    }

    #[test]
    fn offset_shifts_both_semi_axes() {
        let e = axis_aligned(2.0, 0.5);
        let o = e.offset(&Point2::new(5.0, 0.0), 0.5).unwrap();
        assert_relative_eq!(o.major_radius(), 2.5, epsilon = 1e-9);
        assert_relative_eq!(o.minor_radius(), 1.5, epsilon = 1e-9);
        let inner = e.offset(&Point2::new(0.0, 0.0), 0.5).unwrap();
        assert_relative_eq!(inner.minor_radius(), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn offset_collapse_is_none() {
        let e = axis_aligned(2.0, 0.5);
        assert!(e.offset(&Point2::new(0.0, 0.0), 1.5).is_none());
    }
}
