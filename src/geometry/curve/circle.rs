use std::f64::consts::{PI, TAU};

use crate::error::{GeometryError, Result};
use crate::math::point_set::PointSet;
use crate::math::quadratic::Quadratic;
use crate::math::{point_2d, Point2, Vector2, TOLERANCE};

use super::{BoundingBox2, Curve, Transform};

/// A full circle.
///
/// A sub-tolerance radius invalidates all queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    center: Point2,
    radius: f64,
}

impl Circle {
    #[must_use]
    pub fn new(center: Point2, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Like [`Circle::new`] but rejects a sub-tolerance radius.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is not positive.
    pub fn try_new(center: Point2, radius: f64) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(
                GeometryError::Degenerate("circle radius must be positive".into()).into(),
            );
        }
        Ok(Self::new(center, radius))
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
    pub fn is_valid(&self) -> bool {
        self.radius >= TOLERANCE
    }
}

impl Curve for Circle {
    fn start_point(&self) -> Option<Point2> {
        None
    }

    fn end_point(&self) -> Option<Point2> {
        None
    }

    fn is_closed(&self) -> bool {
        true
    }

    fn length(&self) -> f64 {
        if self.is_valid() {
            TAU * self.radius
        } else {
            0.0
        }
    }

    fn bounding_box(&self) -> BoundingBox2 {
        let r = Vector2::new(self.radius, self.radius);
        BoundingBox2::new(self.center - r, self.center + r)
    }

    fn middle_point(&self) -> Option<Point2> {
        None
    }

    fn nearest_point(&self, point: &Point2, _on_entity_only: bool) -> Option<Point2> {
        if !self.is_valid() {
            return None;
        }
        let d = point - self.center;
        let len = d.norm();
        if len < TOLERANCE {
            // The whole circle is equidistant from its center.
            return None;
        }
        Some(self.center + d * (self.radius / len))
    }

    fn nearest_middle(&self, _point: &Point2, _count: usize) -> Option<Point2> {
        None
    }

    fn tangent_direction(&self, point: &Point2) -> Option<Vector2> {
        if !self.is_valid() {
            return None;
        }
        let d = point - self.center;
        let len = d.norm();
        if len < TOLERANCE {
            return None;
        }
        // Counter-clockwise run direction.
        Some(Vector2::new(-d.y / len, d.x / len))
    }

    fn tangent_points(&self, point: &Point2) -> PointSet {
        let mut out = PointSet::new();
        if !self.is_valid() {
            return out;
        }
        let d = (point - self.center).norm();
        if d < self.radius - TOLERANCE {
            // No tangent line from an interior point.
            return out;
        }
        if (d - self.radius).abs() <= TOLERANCE {
            if let Some(p) = self.nearest_point(point, false) {
                out.push(p);
            }
            return out;
        }
        let base = point_2d::angle_to(&self.center, point);
        let alpha = (self.radius / d).clamp(-1.0, 1.0).acos();
        out.push(self.center + point_2d::polar(self.radius, base + alpha));
        out.push(self.center + point_2d::polar(self.radius, base - alpha));
        out
    }

    fn quadratic(&self) -> Option<Quadratic> {
        if !self.is_valid() {
            return None;
        }
        Some(Quadratic::circle(&self.center, self.radius))
    }

    fn area_line_integral(&self) -> f64 {
        PI * self.radius * self.radius
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
        (radius >= TOLERANCE).then(|| Self::new(self.center, radius))
    }

    fn offset_two_sides(&self, distance: f64) -> (Option<Self>, Option<Self>) {
        if !self.is_valid() {
            return (None, None);
        }
        let outer = self.radius + distance;
        let inner = self.radius - distance;
        (
            (outer >= TOLERANCE).then(|| Self::new(self.center, outer)),
            (inner >= TOLERANCE).then(|| Self::new(self.center, inner)),
        )
    }
}

impl Transform for Circle {
    fn translated(&self, v: &Vector2) -> Self {
        Self::new(self.center + v, self.radius)
    }

    fn rotated(&self, center: &Point2, angle: f64) -> Self {
        Self::new(point_2d::rotate_about(&self.center, center, angle), self.radius)
    }

    fn scaled(&self, center: &Point2, factors: &Vector2) -> Self {
        // A circle stays a circle; the x factor wins under (slightly)
        // anisotropic scaling, matching interactive stretch behavior.
        Self::new(
            point_2d::scale_about(&self.center, center, factors),
            self.radius * factors.x.abs(),
        )
    }

    fn mirrored(&self, p1: &Point2, p2: &Point2) -> Option<Self> {
        Some(Self::new(
            point_2d::mirror_across(&self.center, p1, p2)?,
            self.radius,
        ))
    }
}
