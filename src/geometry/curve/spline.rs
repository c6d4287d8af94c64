use crate::math::point_set::PointSet;
use crate::math::quadratic::Quadratic;
use crate::math::{bezier_2d, point_2d, Point2, Vector2, TOLERANCE};
use crate::operations::spline_fit;

use super::{BoundingBox2, Curve, Transform};

/// A piecewise-quadratic spline through digitized points.
///
/// The curve is a chain of quadratic Bezier segments built from the
/// control points: each segment runs between midpoints of consecutive
/// control points (open chains pin the first and last control point as
/// curve endpoints), which makes the chain C1 at every joint by
/// construction.
///
/// `points` holds the digitized input the control points were fitted
/// to. Once `cut` is set (after a trim/split) re-deriving the control
/// points from the digitized points is permanently disabled.
#[derive(Debug, Clone, PartialEq)]
pub struct Spline {
    points: Vec<Point2>,
    control: Vec<Point2>,
    closed: bool,
    cut: bool,
}

impl Spline {
    /// Builds a spline directly from control points. There is no
    /// digitized source, so the result is born with the `cut` flag set.
    #[must_use]
    pub fn from_control_points(control: Vec<Point2>, closed: bool) -> Self {
        Self {
            points: Vec::new(),
            control,
            closed,
            cut: true,
        }
    }

    /// Used by the fitter: digitized points plus the control points
    /// interpolating them.
    pub(crate) fn interpolated(points: Vec<Point2>, control: Vec<Point2>, closed: bool) -> Self {
        Self {
            points,
            control,
            closed,
            cut: false,
        }
    }

    #[must_use]
    pub fn digitized_points(&self) -> &[Point2] {
        &self.points
    }

    #[must_use]
    pub fn control_points(&self) -> &[Point2] {
        &self.control
    }

    #[must_use]
    pub fn is_cut(&self) -> bool {
        self.cut
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.control.len() >= 3
    }

    /// Re-derives the control points from the digitized points.
    ///
    /// Returns `None` once the spline has been cut, or when there is no
    /// digitized source to refit from.
    #[must_use]
    pub fn refitted(&self) -> Option<Self> {
        if self.cut {
            return None;
        }
        spline_fit::fit(&self.points, self.closed)
    }

    #[must_use]
    pub fn segment_count(&self) -> usize {
        let n = self.control.len();
        if n < 3 {
            0
        } else if self.closed {
            n
        } else {
            n - 2
        }
    }

    /// Control triple of segment `i`.
    #[must_use]
    pub fn segment(&self, i: usize) -> (Point2, Point2, Point2) {
        let c = &self.control;
        let n = c.len();
        if self.closed {
            let prev = c[(i + n - 1) % n];
            let cur = c[i];
            let next = c[(i + 1) % n];
            (prev.lerp(&cur, 0.5), cur, cur.lerp(&next, 0.5))
        } else {
            let count = n - 2;
            let start = if i == 0 { c[0] } else { c[i].lerp(&c[i + 1], 0.5) };
            let end = if i == count - 1 {
                c[n - 1]
            } else {
                c[i + 1].lerp(&c[i + 2], 0.5)
            };
            (start, c[i + 1], end)
        }
    }

    /// Point at the global parameter `t` in `[0, segment_count]`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Option<Point2> {
        let count = self.segment_count();
        if count == 0 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let t = t.clamp(0.0, count as f64);
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let seg = (t.floor() as usize).min(count - 1);
        #[allow(clippy::cast_precision_loss)]
        let local = t - seg as f64;
        let (p0, p1, p2) = self.segment(seg);
        Some(bezier_2d::eval(&p0, &p1, &p2, local))
    }

    /// Global parameter of the closest point on the spline.
    fn nearest_param(&self, point: &Point2) -> Option<f64> {
        let count = self.segment_count();
        if count == 0 {
            return None;
        }
        let mut best: Option<(f64, f64)> = None;
        for i in 0..count {
            let (p0, p1, p2) = self.segment(i);
            let t = bezier_2d::nearest_t(&p0, &p1, &p2, point);
            let d = (bezier_2d::eval(&p0, &p1, &p2, t) - point).norm_squared();
            #[allow(clippy::cast_precision_loss)]
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((i as f64 + t, d));
            }
        }
        best.map(|(t, _)| t)
    }

    /// Point at arc length `s` from the start of the run.
    #[must_use]
    pub fn point_at_length(&self, s: f64) -> Option<Point2> {
        let count = self.segment_count();
        if count == 0 {
            return None;
        }
        let mut remaining = s.max(0.0);
        for i in 0..count {
            let (p0, p1, p2) = self.segment(i);
            let len = bezier_2d::length(&p0, &p1, &p2);
            if remaining <= len || i == count - 1 {
                let t = bezier_2d::param_at_length(&p0, &p1, &p2, remaining.min(len));
                return Some(bezier_2d::eval(&p0, &p1, &p2, t));
            }
            remaining -= len;
        }
        None
    }

    /// Splits the spline at the point nearest `at`.
    ///
    /// An open spline yields two halves meeting at the cut point; a
    /// closed one is opened at the cut point (second half `None`). Both
    /// results carry the `cut` flag, so they can never be refitted from
    /// the original digitized points.
    #[must_use]
    pub fn cut(&self, at: &Point2) -> Option<(Self, Option<Self>)> {
        let count = self.segment_count();
        let t_cut = self.nearest_param(at)?;
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let seg = (t_cut.floor() as usize).min(count - 1);
        #[allow(clippy::cast_precision_loss)]
        let local = t_cut - seg as f64;
        let (p0, p1, p2) = self.segment(seg);
        // The exact cut point comes from De Casteljau subdivision of the
        // containing segment.
        let (left_half, _) = bezier_2d::split(&p0, &p1, &p2, local.clamp(0.0, 1.0));
        let cut_point = left_half[2];

        if self.closed {
            // Walk one full loop from the cut, interpolating the former
            // mid-span nodes in run order.
            #[allow(clippy::cast_precision_loss)]
            let period = count as f64;
            #[allow(clippy::cast_precision_loss)]
            let mut node_ts: Vec<f64> = (0..count).map(|i| i as f64 + 0.5).collect();
            node_ts.sort_by(|a, b| {
                (a - t_cut)
                    .rem_euclid(period)
                    .total_cmp(&(b - t_cut).rem_euclid(period))
            });
            let mut samples = vec![cut_point];
            for t in node_ts {
                if let Some(p) = self.point_at(t) {
                    samples.push(p);
                }
            }
            samples.push(cut_point);
            return Self::cut_piece(samples).map(|s| (s, None));
        }

        let mut left = vec![self.point_at(0.0)?];
        let mut right = vec![cut_point];
        for i in 0..count {
            #[allow(clippy::cast_precision_loss)]
            let node_t = i as f64 + 0.5;
            if let Some(p) = self.point_at(node_t) {
                if node_t < t_cut {
                    left.push(p);
                } else {
                    right.push(p);
                }
            }
        }
        left.push(cut_point);
        #[allow(clippy::cast_precision_loss)]
        right.push(self.point_at(count as f64)?);

        Some((Self::cut_piece(left)?, Some(Self::cut_piece(right)?)))
    }

    /// Builds a cut result interpolating `samples`, padding degenerate
    /// sample runs so the fit stays well-posed.
    fn cut_piece(mut samples: Vec<Point2>) -> Option<Self> {
        samples.dedup_by(|a, b| (*a - *b).norm() < TOLERANCE);
        while samples.len() < 3 {
            if samples.len() < 2 {
                return None;
            }
            let mid = samples[0].lerp(&samples[1], 0.5);
            samples.insert(1, mid);
        }
        let mut piece = spline_fit::fit(&samples, false)?;
        piece.cut = true;
        Some(piece)
    }

    /// Offset by a signed distance along the left normal of the run
    /// direction. Sampled displacement plus refit: an approximation for
    /// non-linear segments.
    fn offset_signed(&self, signed_distance: f64) -> Option<Self> {
        let count = self.segment_count();
        if count == 0 {
            return None;
        }
        let mut displaced = Vec::new();
        let samples_per_segment = 2;
        let total = count * samples_per_segment + usize::from(!self.closed);
        for i in 0..total {
            #[allow(clippy::cast_precision_loss)]
            let t = i as f64 / samples_per_segment as f64;
            let p = self.point_at(t)?;
            let seg = if i == total - 1 && !self.closed {
                count - 1
            } else {
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let s = (t.floor() as usize).min(count - 1);
                s
            };
            let (p0, p1, p2) = self.segment(seg);
            #[allow(clippy::cast_precision_loss)]
            let local = (t - seg as f64).clamp(0.0, 1.0);
            let d = bezier_2d::derivative(&p0, &p1, &p2, local);
            let len = d.norm();
            if len < TOLERANCE {
                return None;
            }
            let normal = Vector2::new(-d.y, d.x) / len;
            displaced.push(p + normal * signed_distance);
        }
        let mut out = spline_fit::fit(&displaced, self.closed)?;
        out.cut = self.cut;
        Some(out)
    }
}

impl Curve for Spline {
    fn start_point(&self) -> Option<Point2> {
        (!self.closed && self.is_valid()).then(|| self.control[0])
    }

    fn end_point(&self) -> Option<Point2> {
        (!self.closed && self.is_valid()).then(|| self.control[self.control.len() - 1])
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn length(&self) -> f64 {
        (0..self.segment_count())
            .map(|i| {
                let (p0, p1, p2) = self.segment(i);
                bezier_2d::length(&p0, &p1, &p2)
            })
            .sum()
    }

    fn bounding_box(&self) -> BoundingBox2 {
        let mut bb = BoundingBox2::empty();
        for i in 0..self.segment_count() {
            let (p0, p1, p2) = self.segment(i);
            let (min, max) = bezier_2d::extent(&p0, &p1, &p2);
            bb = bb.union(&BoundingBox2::new(min, max));
        }
        bb
    }

    fn middle_point(&self) -> Option<Point2> {
        if self.closed || !self.is_valid() {
            return None;
        }
        self.point_at_length(self.length() / 2.0)
    }

    fn nearest_point(&self, point: &Point2, _on_entity_only: bool) -> Option<Point2> {
        // The spline has no unbounded support curve; both modes coincide.
        let t = self.nearest_param(point)?;
        self.point_at(t)
    }

    fn nearest_middle(&self, point: &Point2, count: usize) -> Option<Point2> {
        if !self.is_valid() {
            return None;
        }
        let count = count.max(1);
        let total = self.length();
        #[allow(clippy::cast_precision_loss)]
        let candidates: Vec<Point2> = (1..=count)
            .filter_map(|i| self.point_at_length(total * i as f64 / (count + 1) as f64))
            .collect();
        PointSet::from_points(candidates)
            .closest_to(point)
            .map(|(_, p)| p)
    }

    fn tangent_direction(&self, point: &Point2) -> Option<Vector2> {
        let t = self.nearest_param(point)?;
        let count = self.segment_count();
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let seg = (t.floor() as usize).min(count - 1);
        let (p0, p1, p2) = self.segment(seg);
        #[allow(clippy::cast_precision_loss)]
        let d = bezier_2d::derivative(&p0, &p1, &p2, t - seg as f64);
        let len = d.norm();
        (len >= TOLERANCE).then(|| d / len)
    }

    fn tangent_points(&self, point: &Point2) -> PointSet {
        let mut out = PointSet::new();
        for i in 0..self.segment_count() {
            let (p0, p1, p2) = self.segment(i);
            for t in bezier_2d::tangent_ts_through(&p0, &p1, &p2, point) {
                if (-TOLERANCE..=1.0 + TOLERANCE).contains(&t) {
                    out.push_unique(bezier_2d::eval(&p0, &p1, &p2, t), 1e-8);
                }
            }
        }
        out
    }

    fn quadratic(&self) -> Option<Quadratic> {
        // No single conic carries a piecewise curve.
        None
    }

    fn area_line_integral(&self) -> f64 {
        (0..self.segment_count())
            .map(|i| {
                let (p0, p1, p2) = self.segment(i);
                bezier_2d::area_line_integral(&p0, &p1, &p2)
            })
            .sum()
    }

    fn offset(&self, side_point: &Point2, distance: f64) -> Option<Self> {
        let t = self.nearest_param(side_point)?;
        let p = self.point_at(t)?;
        let tangent = self.tangent_direction(&p)?;
        let normal = Vector2::new(-tangent.y, tangent.x);
        let side = (side_point - p).dot(&normal);
        self.offset_signed(if side < 0.0 { -distance } else { distance })
    }

    fn offset_two_sides(&self, distance: f64) -> (Option<Self>, Option<Self>) {
        (self.offset_signed(distance), self.offset_signed(-distance))
    }
}

impl Transform for Spline {
    fn translated(&self, v: &Vector2) -> Self {
        self.mapped(|p| p + v)
    }

    fn rotated(&self, center: &Point2, angle: f64) -> Self {
        self.mapped(|p| point_2d::rotate_about(&p, center, angle))
    }

    fn scaled(&self, center: &Point2, factors: &Vector2) -> Self {
        self.mapped(|p| point_2d::scale_about(&p, center, factors))
    }

    fn mirrored(&self, p1: &Point2, p2: &Point2) -> Option<Self> {
        if (p2 - p1).norm() < TOLERANCE {
            return None;
        }
        Some(self.mapped(|p| point_2d::mirror_across(&p, p1, p2).unwrap_or(p)))
    }
}

impl Spline {
    /// Affine maps commute with the (linear) fit, so mapping digitized
    /// and control points together keeps them consistent.
    fn mapped(&self, map: impl Fn(Point2) -> Point2) -> Self {
        Self {
            points: self.points.iter().copied().map(&map).collect(),
            control: self.control.iter().copied().map(&map).collect(),
            closed: self.closed,
            cut: self.cut,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::spline_fit;

    fn wave() -> Spline {
        spline_fit::fit(
            &[
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(2.0, 0.0),
                Point2::new(3.0, -1.0),
                Point2::new(4.0, 0.0),
            ],
            false,
        )
        .unwrap()
    }

    fn ring() -> Spline {
        spline_fit::fit(
            &[
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(0.0, 1.0),
            ],
            true,
        )
        .unwrap()
    }

    #[test]
    fn open_spline_endpoints_are_digitized_ends() {
        let s = wave();
        assert!((s.start_point().unwrap() - Point2::new(0.0, 0.0)).norm() < 1e-9);
        assert!((s.end_point().unwrap() - Point2::new(4.0, 0.0)).norm() < 1e-9);
        assert!(!s.is_closed());
    }

    #[test]
    fn closed_spline_has_no_endpoints() {
        let s = ring();
        assert!(s.is_closed());
        assert!(s.start_point().is_none());
        assert!(s.middle_point().is_none());
    }

    #[test]
    fn joints_are_c1() {
        let s = wave();
        for i in 0..s.segment_count() - 1 {
            let (a0, a1, a2) = s.segment(i);
            let (b0, b1, b2) = s.segment(i + 1);
            assert!((a2 - b0).norm() < 1e-12, "joint {i} not shared");
            let din = bezier_2d::derivative(&a0, &a1, &a2, 1.0);
            let dout = bezier_2d::derivative(&b0, &b1, &b2, 0.0);
            assert!((din - dout).norm() < 1e-9, "joint {i}: {din:?} vs {dout:?}");
        }
    }

    #[test]
    fn nearest_point_hits_digitized_node() {
        let s = wave();
        let p = s.nearest_point(&Point2::new(1.0, 1.5), true).unwrap();
        assert!((p - Point2::new(1.0, 1.0)).norm() < 0.15, "{p:?}");
    }

    #[test]
    fn tangent_direction_runs_forward() {
        let s = wave();
        let t = s.tangent_direction(&Point2::new(0.0, 0.0)).unwrap();
        assert!(t.x > 0.0, "{t:?}");
    }

    #[test]
    fn cut_halves_meet_at_cut_point_and_refuse_refit() {
        let s = wave();
        let (left, right) = s.cut(&Point2::new(2.0, 0.0)).unwrap();
        let right = right.unwrap();
        assert!(left.is_cut());
        assert!(right.is_cut());
        assert!(left.refitted().is_none());
        let le = left.end_point().unwrap();
        let rs = right.start_point().unwrap();
        assert!((le - rs).norm() < 1e-9, "{le:?} vs {rs:?}");
        assert!((le - Point2::new(2.0, 0.0)).norm() < 0.1, "{le:?}");
        // The halves still start/end where the original did.
        assert!((left.start_point().unwrap() - Point2::new(0.0, 0.0)).norm() < 1e-9);
        assert!((right.end_point().unwrap() - Point2::new(4.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn cutting_a_closed_spline_opens_it() {
        let s = ring();
        let (opened, rest) = s.cut(&Point2::new(0.5, -0.2)).unwrap();
        assert!(rest.is_none());
        assert!(!opened.is_closed());
        assert!(opened.is_cut());
        let start = opened.start_point().unwrap();
        let end = opened.end_point().unwrap();
        assert!((start - end).norm() < 1e-9);
    }

    #[test]
    fn uncut_spline_refits() {
        let s = wave();
        let r = s.refitted().unwrap();
        assert_eq!(r.control_points().len(), s.control_points().len());
    }

    #[test]
    fn raw_control_spline_is_born_cut() {
        let s = Spline::from_control_points(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 2.0),
                Point2::new(2.0, 0.0),
            ],
            false,
        );
        assert!(s.is_cut());
        assert!(s.refitted().is_none());
    }

    #[test]
    fn offset_keeps_roughly_constant_distance() {
        let s = wave();
        let o = s.offset(&Point2::new(2.0, 3.0), 0.25).unwrap();
        // Probe a few points of the offset against the original.
        for probe in [
            Point2::new(0.5, 0.8),
            Point2::new(2.0, 0.3),
            Point2::new(3.5, -0.2),
        ] {
            let po = o.nearest_point(&probe, true).unwrap();
            let ps = s.nearest_point(&po, true).unwrap();
            let d = (po - ps).norm();
            assert!((d - 0.25).abs() < 0.08, "probe {probe:?}: d={d}");
        }
    }

    #[test]
    fn rotate_idempotence_on_length() {
        let s = wave();
        let r = s.rotated(&Point2::new(1.0, 1.0), 0.0);
        assert!((s.length() - r.length()).abs() < 1e-9);
        let r = s.rotated(&Point2::new(1.0, 1.0), 1.0);
        assert!((s.length() - r.length()).abs() < 1e-9);
    }

    #[test]
    fn area_integral_of_closed_ring() {
        // Documented fitting behavior: the smooth interpolant through the
        // four unit-square corners bulges outside the square; the exact
        // enclosed area of this fit is 40/27.
        let s = ring();
        let area = s.area_line_integral();
        assert!((area - 40.0 / 27.0).abs() < 1e-9, "area={area}");
    }

    #[test]
    fn area_converges_to_square_with_denser_input() {
        // Sixteen points along the unit square boundary: the fit hugs
        // the edges and the enclosed area approaches 1.
        let mut pts = Vec::new();
        for i in 0..4 {
            let f = f64::from(i) / 4.0;
            pts.push(Point2::new(f, 0.0));
        }
        for i in 0..4 {
            let f = f64::from(i) / 4.0;
            pts.push(Point2::new(1.0, f));
        }
        for i in 0..4 {
            let f = f64::from(i) / 4.0;
            pts.push(Point2::new(1.0 - f, 1.0));
        }
        for i in 0..4 {
            let f = f64::from(i) / 4.0;
            pts.push(Point2::new(0.0, 1.0 - f));
        }
        let s = spline_fit::fit(&pts, true).unwrap();
        let area = s.area_line_integral();
        assert!((area - 1.0).abs() < 0.05, "area={area}");
    }
}
