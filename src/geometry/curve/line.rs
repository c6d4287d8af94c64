use crate::error::{GeometryError, Result};
use crate::math::point_set::PointSet;
use crate::math::quadratic::Quadratic;
use crate::math::{point_2d, Point2, Vector2, TOLERANCE, TOLERANCE_SQ};

use super::{BoundingBox2, Curve, Transform};

/// A line segment between two points.
///
/// A zero-length segment is representable (drawings contain them) but
/// degenerate: direction-dependent queries return `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    start: Point2,
    end: Point2,
}

impl Line {
    #[must_use]
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    /// Like [`Line::new`] but rejects sub-tolerance segments.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment is shorter than the tolerance.
    pub fn try_new(start: Point2, end: Point2) -> Result<Self> {
        if (end - start).norm_squared() < TOLERANCE_SQ {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(Self::new(start, end))
    }

    #[must_use]
    pub fn start(&self) -> Point2 {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> Point2 {
        self.end
    }

    /// Unit direction from start to end; `None` for a zero-length segment.
    #[must_use]
    pub fn direction(&self) -> Option<Vector2> {
        let d = self.end - self.start;
        let len = d.norm();
        if len < TOLERANCE {
            None
        } else {
            Some(d / len)
        }
    }

    /// Left-pointing unit normal.
    #[must_use]
    pub fn normal(&self) -> Option<Vector2> {
        self.direction().map(|d| Vector2::new(-d.y, d.x))
    }

    /// Projection parameter of `point`, with `0` at start and `1` at end.
    #[must_use]
    fn projection_parameter(&self, point: &Point2) -> Option<f64> {
        let d = self.end - self.start;
        let len_sq = d.norm_squared();
        if len_sq < TOLERANCE_SQ {
            return None;
        }
        Some((point - self.start).dot(&d) / len_sq)
    }

    fn point_at(&self, t: f64) -> Point2 {
        self.start + (self.end - self.start) * t
    }
}

impl Curve for Line {
    fn start_point(&self) -> Option<Point2> {
        Some(self.start)
    }

    fn end_point(&self) -> Option<Point2> {
        Some(self.end)
    }

    fn is_closed(&self) -> bool {
        false
    }

    fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    fn bounding_box(&self) -> BoundingBox2 {
        BoundingBox2::from_points(&[self.start, self.end])
    }

    fn middle_point(&self) -> Option<Point2> {
        Some(self.point_at(0.5))
    }

    fn nearest_point(&self, point: &Point2, on_entity_only: bool) -> Option<Point2> {
        let t = self.projection_parameter(point)?;
        let t = if on_entity_only { t.clamp(0.0, 1.0) } else { t };
        Some(self.point_at(t))
    }

    fn nearest_middle(&self, point: &Point2, count: usize) -> Option<Point2> {
        let count = count.max(1);
        if self.length() < TOLERANCE {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let candidates: Vec<Point2> = (1..=count)
            .map(|i| self.point_at(i as f64 / (count + 1) as f64))
            .collect();
        PointSet::from_points(candidates)
            .closest_to(point)
            .map(|(_, p)| p)
    }

    fn tangent_direction(&self, _point: &Point2) -> Option<Vector2> {
        self.direction()
    }

    fn tangent_points(&self, _point: &Point2) -> PointSet {
        // A line has no tangent points from an external point.
        PointSet::new()
    }

    fn quadratic(&self) -> Option<Quadratic> {
        Quadratic::line(&self.start, &self.end)
    }

    fn area_line_integral(&self) -> f64 {
        // Trapezoid term of the shoelace formula.
        (self.start.x + self.end.x) * 0.5 * (self.end.y - self.start.y)
    }

    fn offset(&self, side_point: &Point2, distance: f64) -> Option<Self> {
        let dir = self.direction()?;
        let normal = Vector2::new(-dir.y, dir.x);
        let to_side = side_point - self.start;
        let side = if dir.x * to_side.y - dir.y * to_side.x < 0.0 {
            -1.0
        } else {
            1.0
        };
        let shift = normal * (side * distance);
        Some(Self::new(self.start + shift, self.end + shift))
    }

    fn offset_two_sides(&self, distance: f64) -> (Option<Self>, Option<Self>) {
        match self.normal() {
            Some(n) => (
                Some(Self::new(self.start + n * distance, self.end + n * distance)),
                Some(Self::new(self.start - n * distance, self.end - n * distance)),
            ),
            None => (None, None),
        }
    }
}

impl Transform for Line {
    fn translated(&self, v: &Vector2) -> Self {
        Self::new(self.start + v, self.end + v)
    }

    fn rotated(&self, center: &Point2, angle: f64) -> Self {
        Self::new(
            point_2d::rotate_about(&self.start, center, angle),
            point_2d::rotate_about(&self.end, center, angle),
        )
    }

    fn scaled(&self, center: &Point2, factors: &Vector2) -> Self {
        Self::new(
            point_2d::scale_about(&self.start, center, factors),
            point_2d::scale_about(&self.end, center, factors),
        )
    }

    fn mirrored(&self, p1: &Point2, p2: &Point2) -> Option<Self> {
        Some(Self::new(
            point_2d::mirror_across(&self.start, p1, p2)?,
            point_2d::mirror_across(&self.end, p1, p2)?,
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn horizontal() -> Line {
        Line::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0))
    }

    #[test]
    fn try_new_rejects_zero_length() {
        let p = Point2::new(1.0, 1.0);
        assert!(Line::try_new(p, p).is_err());
    }

    #[test]
    fn nearest_point_perpendicular_projection() {
        let l = horizontal();
        let p = l.nearest_point(&Point2::new(5.0, 3.0), true).unwrap();
        assert!((p - Point2::new(5.0, 0.0)).norm() < TOLERANCE);
    }

    #[test]
    fn nearest_point_clamps_to_extent() {
        let l = horizontal();
        let p = l.nearest_point(&Point2::new(-5.0, 0.0), true).unwrap();
        assert!(p.x.abs() < TOLERANCE);
        // Unrestricted projection leaves the segment.
        let p = l.nearest_point(&Point2::new(-5.0, 1.0), false).unwrap();
        assert!((p.x + 5.0).abs() < TOLERANCE);
    }

    #[test]
    fn nearest_point_degenerate_segment() {
        let p = Point2::new(2.0, 2.0);
        let l = Line::new(p, p);
        assert!(l.nearest_point(&Point2::new(0.0, 0.0), true).is_none());
    }

    #[test]
    fn nearest_endpoint_picks_closer() {
        let l = horizontal();
        let e = l.nearest_endpoint(&Point2::new(8.0, 1.0)).unwrap();
        assert!((e - Point2::new(10.0, 0.0)).norm() < TOLERANCE);
    }

    #[test]
    fn nearest_middle_thirds() {
        let l = horizontal();
        // Two interior snap points at x = 10/3 and 20/3.
        let m = l.nearest_middle(&Point2::new(4.0, 0.0), 2).unwrap();
        assert!((m.x - 10.0 / 3.0).abs() < 1e-9, "m={m:?}");
    }

    #[test]
    fn offset_toward_side_point() {
        let l = horizontal();
        let above = l.offset(&Point2::new(5.0, 2.0), 1.0).unwrap();
        assert!((above.start() - Point2::new(0.0, 1.0)).norm() < TOLERANCE);
        let below = l.offset(&Point2::new(5.0, -2.0), 1.0).unwrap();
        assert!((below.start() - Point2::new(0.0, -1.0)).norm() < TOLERANCE);
    }

    #[test]
    fn offset_two_sides_symmetric() {
        let l = horizontal();
        let (a, b) = l.offset_two_sides(0.5);
        assert!((a.unwrap().start().y - 0.5).abs() < TOLERANCE);
        assert!((b.unwrap().start().y + 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn area_term_matches_shoelace() {
        // Closed CCW triangle: the segment terms must sum to the area.
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(0.0, 2.0),
        ];
        let mut area = 0.0;
        for i in 0..3 {
            area += Line::new(pts[i], pts[(i + 1) % 3]).area_line_integral();
        }
        assert!((area - 2.0).abs() < 1e-9, "area={area}");
    }

    #[test]
    fn rotate_zero_is_identity() {
        let l = horizontal();
        let r = l.rotated(&Point2::new(3.0, 3.0), 0.0);
        assert!((r.start() - l.start()).norm() < TOLERANCE);
        assert!((r.end() - l.end()).norm() < TOLERANCE);
    }

    #[test]
    fn mirror_across_vertical_axis() {
        let l = horizontal();
        let m = l
            .mirrored(&Point2::new(5.0, -1.0), &Point2::new(5.0, 1.0))
            .unwrap();
        assert!((m.start() - Point2::new(10.0, 0.0)).norm() < TOLERANCE);
        assert!((m.end() - Point2::new(0.0, 0.0)).norm() < TOLERANCE);
    }
}
