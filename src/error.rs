use thiserror::Error;

/// Top-level error type for the trenchgen synthesis engine.
#[derive(Debug, Error)]
pub enum TrenchError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Triangulation(#[from] TriangulationError),
}

/// Errors raised while validating a scene specification.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("centerline needs at least 2 points, got {0}")]
    CenterlineTooShort(usize),

    #[error("centerline points {first} and {second} are coincident")]
    CoincidentCenterlinePoints { first: usize, second: usize },

    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to polygon triangulation.
#[derive(Debug, Error)]
pub enum TriangulationError {
    #[error("polygon needs at least 3 vertices, got {0}")]
    InvalidPolygon(usize),
}

/// Convenience type alias for results using [`TrenchError`].
pub type Result<T> = std::result::Result<T, TrenchError>;
