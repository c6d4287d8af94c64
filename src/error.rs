use thiserror::Error;

/// Top-level error type for the Draftis geometry kernel.
#[derive(Debug, Error)]
pub enum DraftisError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Errors raised when constructing malformed primitives.
///
/// Expected geometric degeneracy during queries (parallel lines, disjoint
/// circles, collinear constraint points) never errors; queries return
/// `None` or an empty point set instead. These variants exist for callers
/// that require a well-formed entity up front.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to kernel operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("operation failed: {0}")]
    Failed(String),
}

/// Convenience type alias for results using [`DraftisError`].
pub type Result<T> = std::result::Result<T, DraftisError>;
