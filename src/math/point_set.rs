use super::{Point2, TOLERANCE};

/// An ordered collection of intersection / snap points.
///
/// The uniform result type for "zero or more points" queries. `tangent` is
/// set when at least one member stems from a double (degenerate) root, i.e.
/// the curves touch rather than cross there. Insertion order is preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet {
    points: Vec<Point2>,
    tangent: bool,
}

impl PointSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set from points, with the tangent bit cleared.
    #[must_use]
    pub fn from_points(points: Vec<Point2>) -> Self {
        Self {
            points,
            tangent: false,
        }
    }

    pub fn push(&mut self, point: Point2) {
        self.points.push(point);
    }

    /// Appends a point unless an existing member lies within `tol` of it.
    pub fn push_unique(&mut self, point: Point2, tol: f64) {
        if !self.points.iter().any(|p| (p - point).norm() < tol) {
            self.points.push(point);
        }
    }

    pub fn extend(&mut self, other: PointSet) {
        self.tangent |= other.tangent;
        self.points.extend(other.points);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    #[must_use]
    pub fn is_tangent(&self) -> bool {
        self.tangent
    }

    pub fn set_tangent(&mut self, tangent: bool) {
        self.tangent = tangent;
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point2> {
        self.points.iter()
    }

    /// Keeps only the points satisfying the predicate.
    pub fn retain(&mut self, f: impl FnMut(&Point2) -> bool) {
        self.points.retain(f);
    }

    /// Returns the member closest to `point` together with its index.
    #[must_use]
    pub fn closest_to(&self, point: &Point2) -> Option<(usize, Point2)> {
        let mut best: Option<(usize, Point2)> = None;
        let mut best_dist = f64::INFINITY;
        for (i, p) in self.points.iter().enumerate() {
            let d = (p - point).norm_squared();
            if d < best_dist {
                best_dist = d;
                best = Some((i, *p));
            }
        }
        best
    }

    /// Set equality up to reordering, within the distance tolerance.
    ///
    /// Intended for symmetry checks in tests; ignores the tangent bit.
    #[must_use]
    pub fn same_points(&self, other: &PointSet) -> bool {
        self.len() == other.len()
            && self.points.iter().all(|p| {
                other
                    .points
                    .iter()
                    .any(|q| (p - q).norm() < TOLERANCE * 1e4)
            })
    }
}

impl IntoIterator for PointSet {
    type Item = Point2;
    type IntoIter = std::vec::IntoIter<Point2>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl<'a> IntoIterator for &'a PointSet {
    type Item = &'a Point2;
    type IntoIter = std::slice::Iter<'a, Point2>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl FromIterator<Point2> for PointSet {
    fn from_iter<T: IntoIterator<Item = Point2>>(iter: T) -> Self {
        Self::from_points(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn closest_returns_index_and_point() {
        let mut set = PointSet::new();
        set.push(Point2::new(5.0, 0.0));
        set.push(Point2::new(1.0, 1.0));
        set.push(Point2::new(-3.0, 0.5));
        let (i, p) = set.closest_to(&Point2::new(0.0, 0.0)).unwrap();
        assert_eq!(i, 1);
        assert!((p - Point2::new(1.0, 1.0)).norm() < TOLERANCE);
    }

    #[test]
    fn closest_on_empty_is_none() {
        assert!(PointSet::new().closest_to(&Point2::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn push_unique_skips_duplicates() {
        let mut set = PointSet::new();
        set.push_unique(Point2::new(1.0, 0.0), 1e-8);
        set.push_unique(Point2::new(1.0, 1e-12), 1e-8);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn extend_propagates_tangent_bit() {
        let mut a = PointSet::from_points(vec![Point2::new(0.0, 0.0)]);
        let mut b = PointSet::from_points(vec![Point2::new(1.0, 0.0)]);
        b.set_tangent(true);
        a.extend(b);
        assert!(a.is_tangent());
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn same_points_ignores_order() {
        let a = PointSet::from_points(vec![Point2::new(1.0, 0.0), Point2::new(-1.0, 0.0)]);
        let b = PointSet::from_points(vec![Point2::new(-1.0, 0.0), Point2::new(1.0, 0.0)]);
        assert!(a.same_points(&b));
    }
}
