mod arc;
mod circle;
mod ellipse;
mod line;
mod parabola;
mod spline;

pub use arc::Arc;
pub use circle::Circle;
pub use ellipse::Ellipse;
pub use line::Line;
pub use parabola::Parabola;
pub use spline::Spline;

use crate::math::point_set::PointSet;
use crate::math::quadratic::Quadratic;
use crate::math::{Point2, Vector2, TOLERANCE};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox2 {
    pub min: Point2,
    pub max: Point2,
}

impl BoundingBox2 {
    #[must_use]
    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    /// The smallest box containing all `points`; empty input gives an
    /// inverted box that unions as a neutral element.
    #[must_use]
    pub fn from_points(points: &[Point2]) -> Self {
        let mut b = Self::empty();
        for p in points {
            b.expand(p);
        }
        b
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point2::new(f64::INFINITY, f64::INFINITY),
            max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn expand(&mut self, p: &Point2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Overlap test padded by the distance tolerance.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x + TOLERANCE
            && other.min.x <= self.max.x + TOLERANCE
            && self.min.y <= other.max.y + TOLERANCE
            && other.min.y <= self.max.y + TOLERANCE
    }
}

/// The query contract shared by every curve entity.
///
/// Queries never mutate; degenerate entity data (sub-tolerance radius,
/// zero-length segment, collapsed axis ratio) makes the affected queries
/// return `None` or an empty set rather than divide by a near-zero value.
pub trait Curve {
    /// Start point; `None` for closed curves (full circles/ellipses,
    /// closed splines).
    fn start_point(&self) -> Option<Point2>;

    /// End point; `None` for closed curves.
    fn end_point(&self) -> Option<Point2>;

    fn is_closed(&self) -> bool;

    fn length(&self) -> f64;

    fn bounding_box(&self) -> BoundingBox2;

    /// The point halfway along the curve; `None` for closed curves.
    fn middle_point(&self) -> Option<Point2>;

    /// Nearest point on the curve. With `on_entity_only` the result is
    /// confined to the entity's extent, otherwise the unbounded support
    /// curve is used.
    fn nearest_point(&self, point: &Point2, on_entity_only: bool) -> Option<Point2>;

    /// Nearest of the two endpoints.
    fn nearest_endpoint(&self, point: &Point2) -> Option<Point2> {
        match (self.start_point(), self.end_point()) {
            (Some(s), Some(e)) => {
                if (s - point).norm_squared() <= (e - point).norm_squared() {
                    Some(s)
                } else {
                    Some(e)
                }
            }
            (Some(p), None) | (None, Some(p)) => Some(p),
            (None, None) => None,
        }
    }

    /// Nearest of `count` equally spaced interior snap points.
    fn nearest_middle(&self, point: &Point2, count: usize) -> Option<Point2>;

    /// Unit tangent at the on-curve point nearest to `point`, oriented
    /// along the run direction.
    fn tangent_direction(&self, point: &Point2) -> Option<Vector2>;

    /// The 0-2 points at which a tangent line through `point` touches the
    /// curve.
    fn tangent_points(&self, point: &Point2) -> PointSet;

    /// The implicit conic form, when the curve has one.
    fn quadratic(&self) -> Option<Quadratic>;

    /// The `x*dy` line integral along the curve's run direction, the
    /// entity's contribution to a Green's-theorem contour area.
    fn area_line_integral(&self) -> f64;

    /// Offset by `distance` towards the side of `side_point`.
    fn offset(&self, side_point: &Point2, distance: f64) -> Option<Self>
    where
        Self: Sized;

    /// Both one-sided offsets.
    fn offset_two_sides(&self, distance: f64) -> (Option<Self>, Option<Self>)
    where
        Self: Sized;
}

/// Value-producing structural edits; derived quantities are recomputed by
/// construction.
pub trait Transform: Sized {
    fn translated(&self, v: &Vector2) -> Self;
    fn rotated(&self, center: &Point2, angle: f64) -> Self;
    fn scaled(&self, center: &Point2, factors: &Vector2) -> Self;
    /// Mirror across the line through `p1` and `p2`; `None` when the axis
    /// is degenerate.
    fn mirrored(&self, p1: &Point2, p2: &Point2) -> Option<Self>;
}

/// Closed variant over every curve entity, dispatched by pattern match.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Line(Line),
    Circle(Circle),
    Arc(Arc),
    Ellipse(Ellipse),
    Parabola(Parabola),
    Spline(Spline),
}

macro_rules! dispatch {
    ($self:expr, $inner:ident => $body:expr) => {
        match $self {
            Entity::Line($inner) => $body,
            Entity::Circle($inner) => $body,
            Entity::Arc($inner) => $body,
            Entity::Ellipse($inner) => $body,
            Entity::Parabola($inner) => $body,
            Entity::Spline($inner) => $body,
        }
    };
}

macro_rules! dispatch_wrap {
    ($self:expr, $inner:ident => $body:expr) => {
        match $self {
            Entity::Line($inner) => Entity::Line($body),
            Entity::Circle($inner) => Entity::Circle($body),
            Entity::Arc($inner) => Entity::Arc($body),
            Entity::Ellipse($inner) => Entity::Ellipse($body),
            Entity::Parabola($inner) => Entity::Parabola($body),
            Entity::Spline($inner) => Entity::Spline($body),
        }
    };
}

macro_rules! dispatch_wrap_opt {
    ($self:expr, $inner:ident => $body:expr) => {
        match $self {
            Entity::Line($inner) => $body.map(Entity::Line),
            Entity::Circle($inner) => $body.map(Entity::Circle),
            Entity::Arc($inner) => $body.map(Entity::Arc),
            Entity::Ellipse($inner) => $body.map(Entity::Ellipse),
            Entity::Parabola($inner) => $body.map(Entity::Parabola),
            Entity::Spline($inner) => $body.map(Entity::Spline),
        }
    };
}

impl Entity {
    /// Rank used for the one canonical pair ordering in the intersection
    /// dispatcher.
    #[must_use]
    pub fn kind_rank(&self) -> u8 {
        match self {
            Entity::Line(_) => 0,
            Entity::Circle(_) => 1,
            Entity::Arc(_) => 2,
            Entity::Ellipse(_) => 3,
            Entity::Parabola(_) => 4,
            Entity::Spline(_) => 5,
        }
    }

    /// Whether `point` lies on the entity within `tol`.
    #[must_use]
    pub fn is_point_on(&self, point: &Point2, tol: f64) -> bool {
        self.nearest_point(point, true)
            .is_some_and(|p| (p - point).norm() <= tol)
    }
}

impl Curve for Entity {
    fn start_point(&self) -> Option<Point2> {
        dispatch!(self, e => e.start_point())
    }

    fn end_point(&self) -> Option<Point2> {
        dispatch!(self, e => e.end_point())
    }

    fn is_closed(&self) -> bool {
        dispatch!(self, e => e.is_closed())
    }

    fn length(&self) -> f64 {
        dispatch!(self, e => e.length())
    }

    fn bounding_box(&self) -> BoundingBox2 {
        dispatch!(self, e => e.bounding_box())
    }

    fn middle_point(&self) -> Option<Point2> {
        dispatch!(self, e => e.middle_point())
    }

    fn nearest_point(&self, point: &Point2, on_entity_only: bool) -> Option<Point2> {
        dispatch!(self, e => e.nearest_point(point, on_entity_only))
    }

    fn nearest_endpoint(&self, point: &Point2) -> Option<Point2> {
        dispatch!(self, e => e.nearest_endpoint(point))
    }

    fn nearest_middle(&self, point: &Point2, count: usize) -> Option<Point2> {
        dispatch!(self, e => e.nearest_middle(point, count))
    }

    fn tangent_direction(&self, point: &Point2) -> Option<Vector2> {
        dispatch!(self, e => e.tangent_direction(point))
    }

    fn tangent_points(&self, point: &Point2) -> PointSet {
        dispatch!(self, e => e.tangent_points(point))
    }

    fn quadratic(&self) -> Option<Quadratic> {
        dispatch!(self, e => e.quadratic())
    }

    fn area_line_integral(&self) -> f64 {
        dispatch!(self, e => e.area_line_integral())
    }

    fn offset(&self, side_point: &Point2, distance: f64) -> Option<Self> {
        dispatch_wrap_opt!(self, e => e.offset(side_point, distance))
    }

    fn offset_two_sides(&self, distance: f64) -> (Option<Self>, Option<Self>) {
        match self {
            Entity::Line(e) => {
                let (a, b) = e.offset_two_sides(distance);
                (a.map(Entity::Line), b.map(Entity::Line))
            }
            Entity::Circle(e) => {
                let (a, b) = e.offset_two_sides(distance);
                (a.map(Entity::Circle), b.map(Entity::Circle))
            }
            Entity::Arc(e) => {
                let (a, b) = e.offset_two_sides(distance);
                (a.map(Entity::Arc), b.map(Entity::Arc))
            }
            Entity::Ellipse(e) => {
                let (a, b) = e.offset_two_sides(distance);
                (a.map(Entity::Ellipse), b.map(Entity::Ellipse))
            }
            Entity::Parabola(e) => {
                let (a, b) = e.offset_two_sides(distance);
                (a.map(Entity::Parabola), b.map(Entity::Parabola))
            }
            Entity::Spline(e) => {
                let (a, b) = e.offset_two_sides(distance);
                (a.map(Entity::Spline), b.map(Entity::Spline))
            }
        }
    }
}

impl Transform for Entity {
    fn translated(&self, v: &Vector2) -> Self {
        dispatch_wrap!(self, e => e.translated(v))
    }

    fn rotated(&self, center: &Point2, angle: f64) -> Self {
        dispatch_wrap!(self, e => e.rotated(center, angle))
    }

    fn scaled(&self, center: &Point2, factors: &Vector2) -> Self {
        dispatch_wrap!(self, e => e.scaled(center, factors))
    }

    fn mirrored(&self, p1: &Point2, p2: &Point2) -> Option<Self> {
        dispatch_wrap_opt!(self, e => e.mirrored(p1, p2))
    }
}

impl From<Line> for Entity {
    fn from(e: Line) -> Self {
        Entity::Line(e)
    }
}

impl From<Circle> for Entity {
    fn from(e: Circle) -> Self {
        Entity::Circle(e)
    }
}

impl From<Arc> for Entity {
    fn from(e: Arc) -> Self {
        Entity::Arc(e)
    }
}

impl From<Ellipse> for Entity {
    fn from(e: Ellipse) -> Self {
        Entity::Ellipse(e)
    }
}

impl From<Parabola> for Entity {
    fn from(e: Parabola) -> Self {
        Entity::Parabola(e)
    }
}

impl From<Spline> for Entity {
    fn from(e: Spline) -> Self {
        Entity::Spline(e)
    }
}
