use crate::error::{GeometryError, Result};
use crate::math::point_set::PointSet;
use crate::math::quadratic::Quadratic;
use crate::math::roots::solve_cubic;
use crate::math::{bezier_2d, point_2d, Point2, Vector2, TOLERANCE};

use super::{BoundingBox2, Curve, Transform};

/// A parabola segment defined by three quadratic-Bezier control points.
///
/// Collinear control points degenerate to a straight segment and make the
/// curve queries return `None`/empty. The canonical frame (`4h*y = x^2`)
/// is derived from the control points on demand: `vertex`, a unit
/// transverse direction, and the opening axis whose magnitude is the
/// focal parameter `h` (`focus = vertex + axis`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parabola {
    points: [Point2; 3],
}

/// Canonical frame of the supporting parabola.
#[derive(Debug, Clone, Copy)]
struct Frame {
    vertex: Point2,
    /// Unit transverse direction (local x).
    ex: Vector2,
    /// Unit opening direction (local y); `(ex, ey)` is right-handed.
    ey: Vector2,
    /// Focal parameter.
    h: f64,
    /// Bezier parameter of the vertex.
    t_vertex: f64,
    /// Signed speed along `ex` at the vertex: `x = (t - t_vertex) * x_unit`.
    x_unit: f64,
}

impl Parabola {
    #[must_use]
    pub fn new(points: [Point2; 3]) -> Self {
        Self { points }
    }

    /// Like [`Parabola::new`] but rejects collinear control points.
    ///
    /// # Errors
    ///
    /// Returns an error if the control points are collinear.
    pub fn try_new(points: [Point2; 3]) -> Result<Self> {
        if bezier_2d::is_degenerate(&points[0], &points[1], &points[2]) {
            return Err(GeometryError::Degenerate(
                "parabola control points are collinear".into(),
            )
            .into());
        }
        Ok(Self::new(points))
    }

    #[must_use]
    pub fn points(&self) -> &[Point2; 3] {
        &self.points
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        !bezier_2d::is_degenerate(&self.points[0], &self.points[1], &self.points[2])
    }

    #[must_use]
    pub fn vertex(&self) -> Option<Point2> {
        self.frame().map(|f| f.vertex)
    }

    /// The axis vector; its magnitude is the focal parameter.
    #[must_use]
    pub fn axis(&self) -> Option<Vector2> {
        self.frame().map(|f| f.ey * f.h)
    }

    #[must_use]
    pub fn focus(&self) -> Option<Point2> {
        self.frame().map(|f| f.vertex + f.ey * f.h)
    }

    #[must_use]
    pub fn point_at(&self, t: f64) -> Point2 {
        bezier_2d::eval(&self.points[0], &self.points[1], &self.points[2], t)
    }

    fn derivative_at(&self, t: f64) -> Vector2 {
        bezier_2d::derivative(&self.points[0], &self.points[1], &self.points[2], t)
    }

    fn frame(&self) -> Option<Frame> {
        if !self.is_valid() {
            return None;
        }
        let [p0, p1, p2] = self.points;
        // Second derivative direction is the opening axis.
        let e = (p0 - 2.0 * p1.coords + p2.coords).coords;
        let e_len_sq = e.norm_squared();
        let a = p1 - p0;
        let t_vertex = -a.dot(&e) / e_len_sq;

        let deriv = self.derivative_at(t_vertex);
        let speed = deriv.norm();
        let vertex = self.point_at(t_vertex);

        let ey = e / e_len_sq.sqrt();
        let mut ex = deriv / speed;
        // Keep the frame right-handed so the canonical conic rotates in.
        if ex.x * ey.y - ex.y * ey.x < 0.0 {
            ex = -ex;
        }
        let x_unit = deriv.dot(&ex);
        let h = speed * speed / (4.0 * e_len_sq.sqrt());

        Some(Frame {
            vertex,
            ex,
            ey,
            h,
            t_vertex,
            x_unit,
        })
    }

    fn to_frame(frame: &Frame, p: &Point2) -> Vector2 {
        let d = p - frame.vertex;
        Vector2::new(d.dot(&frame.ex), d.dot(&frame.ey))
    }

    fn from_frame(frame: &Frame, local: &Vector2) -> Point2 {
        frame.vertex + frame.ex * local.x + frame.ey * local.y
    }

    /// Bezier parameter of the unrestricted closest point.
    fn nearest_param(&self, point: &Point2) -> Option<f64> {
        let frame = self.frame()?;
        let l = Self::to_frame(&frame, point);
        let h = frame.h;
        // Stationarity of the squared distance on 4h*y = x^2:
        // x^3 + (8h^2 - 4h*y0)*x - 8h^2*x0 = 0.
        let roots = solve_cubic(
            1.0,
            0.0,
            8.0 * h * h - 4.0 * h * l.y,
            -8.0 * h * h * l.x,
        );
        let mut best: Option<(f64, f64)> = None;
        for x in roots {
            let cand = Self::from_frame(&frame, &Vector2::new(x, x * x / (4.0 * h)));
            let d = (cand - point).norm_squared();
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((frame.t_vertex + x / frame.x_unit, d));
            }
        }
        best.map(|(t, _)| t)
    }
}

impl Curve for Parabola {
    fn start_point(&self) -> Option<Point2> {
        Some(self.points[0])
    }

    fn end_point(&self) -> Option<Point2> {
        Some(self.points[2])
    }

    fn is_closed(&self) -> bool {
        false
    }

    fn length(&self) -> f64 {
        bezier_2d::length(&self.points[0], &self.points[1], &self.points[2])
    }

    fn bounding_box(&self) -> BoundingBox2 {
        let (min, max) = bezier_2d::extent(&self.points[0], &self.points[1], &self.points[2]);
        BoundingBox2::new(min, max)
    }

    fn middle_point(&self) -> Option<Point2> {
        // Half way by arc length, like the circular entities.
        let [p0, p1, p2] = self.points;
        let t = bezier_2d::param_at_length(&p0, &p1, &p2, self.length() / 2.0);
        Some(self.point_at(t))
    }

    fn nearest_point(&self, point: &Point2, on_entity_only: bool) -> Option<Point2> {
        if !self.is_valid() {
            return None;
        }
        if on_entity_only {
            let [p0, p1, p2] = self.points;
            return Some(self.point_at(bezier_2d::nearest_t(&p0, &p1, &p2, point)));
        }
        self.nearest_param(point).map(|t| self.point_at(t))
    }

    fn nearest_middle(&self, point: &Point2, count: usize) -> Option<Point2> {
        if !self.is_valid() {
            return None;
        }
        let count = count.max(1);
        #[allow(clippy::cast_precision_loss)]
        let candidates: Vec<Point2> = (1..=count)
            .map(|i| self.point_at(i as f64 / (count + 1) as f64))
            .collect();
        PointSet::from_points(candidates)
            .closest_to(point)
            .map(|(_, p)| p)
    }

    fn tangent_direction(&self, point: &Point2) -> Option<Vector2> {
        let t = self.nearest_param(point)?;
        let d = self.derivative_at(t);
        let len = d.norm();
        (len >= TOLERANCE).then(|| d / len)
    }

    fn tangent_points(&self, point: &Point2) -> PointSet {
        let mut out = PointSet::new();
        if !self.is_valid() {
            return out;
        }
        let [p0, p1, p2] = self.points;
        for t in bezier_2d::tangent_ts_through(&p0, &p1, &p2, point) {
            if (-TOLERANCE..=1.0 + TOLERANCE).contains(&t) {
                out.push(self.point_at(t));
            }
        }
        out
    }

    fn quadratic(&self) -> Option<Quadratic> {
        let frame = self.frame()?;
        let psi = point_2d::angle_of(&frame.ex);
        Some(
            Quadratic::new(1.0, 0.0, 0.0, 0.0, -4.0 * frame.h, 0.0)
                .rotated(psi)
                .translated(&frame.vertex.coords),
        )
    }

    fn area_line_integral(&self) -> f64 {
        bezier_2d::area_line_integral(&self.points[0], &self.points[1], &self.points[2])
    }

    fn offset(&self, side_point: &Point2, distance: f64) -> Option<Self> {
        if !self.is_valid() {
            return None;
        }
        let [p0, p1, p2] = self.points;
        let t = bezier_2d::nearest_t(&p0, &p1, &p2, side_point);
        let d = self.derivative_at(t);
        let normal = Vector2::new(-d.y, d.x);
        let side = (side_point - self.point_at(t)).dot(&normal);
        let signed = if side < 0.0 { -distance } else { distance };
        self.shifted(signed)
    }

    fn offset_two_sides(&self, distance: f64) -> (Option<Self>, Option<Self>) {
        (self.shifted(distance), self.shifted(-distance))
    }
}

impl Parabola {
    /// Control-polygon offset (Tiller-Hanson): both polygon legs move by
    /// the signed distance along their left normals; the middle control
    /// point is the intersection of the shifted legs. Positive distances
    /// shift towards the left of the run direction.
    fn shifted(&self, signed_distance: f64) -> Option<Self> {
        let [p0, p1, p2] = self.points;
        let leg1 = p1 - p0;
        let leg2 = p2 - p1;
        let (l1, l2) = (leg1.norm(), leg2.norm());
        if l1 < TOLERANCE || l2 < TOLERANCE {
            return None;
        }
        let n1 = Vector2::new(-leg1.y, leg1.x) / l1 * signed_distance;
        let n2 = Vector2::new(-leg2.y, leg2.x) / l2 * signed_distance;

        let q0 = p0 + n1;
        let q2 = p2 + n2;
        // Intersect the two shifted legs for the new middle control.
        let cross = leg1.x * leg2.y - leg1.y * leg2.x;
        if cross.abs() < TOLERANCE {
            return None;
        }
        let w = (p1 + n2) - (p1 + n1);
        let s = (w.x * leg2.y - w.y * leg2.x) / cross;
        let q1 = p1 + n1 + leg1 * s;
        Some(Self::new([q0, q1, q2]))
    }
}

impl Transform for Parabola {
    fn translated(&self, v: &Vector2) -> Self {
        Self::new(self.points.map(|p| p + v))
    }

    fn rotated(&self, center: &Point2, angle: f64) -> Self {
        Self::new(self.points.map(|p| point_2d::rotate_about(&p, center, angle)))
    }

    fn scaled(&self, center: &Point2, factors: &Vector2) -> Self {
        Self::new(self.points.map(|p| point_2d::scale_about(&p, center, factors)))
    }

    fn mirrored(&self, p1: &Point2, p2: &Point2) -> Option<Self> {
        if (p2 - p1).norm() < TOLERANCE {
            return None;
        }
        Some(Self::new(self.points.map(|p| {
            point_2d::mirror_across(&p, p1, p2).unwrap_or(p)
        })))
    }
}
