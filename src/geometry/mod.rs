pub mod arc_builder;
pub mod curve;

pub use arc_builder::{ArcBuilder, ArcData};
pub use curve::{Arc, BoundingBox2, Circle, Curve, Ellipse, Entity, Line, Parabola, Spline, Transform};
