pub mod bezier_2d;
pub mod point_2d;
pub mod point_set;
pub mod polygon_2d;
pub mod quadratic;
pub mod roots;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 2x2 matrix type.
pub type Matrix2 = nalgebra::Matrix2<f64>;

/// Global geometric tolerance for floating-point distance comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Tolerance for squared-distance comparisons.
pub const TOLERANCE_SQ: f64 = 1e-20;

/// Tolerance for angle comparisons, in radians.
pub const ANGLE_TOLERANCE: f64 = 1e-8;
