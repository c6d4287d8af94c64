pub mod intersect;
pub mod spline_fit;
pub mod tangent;
