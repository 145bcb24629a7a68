use thiserror::Error;

/// Crate-wide error type.
///
/// Construction-time validation failures and pool misuse propagate to the
/// caller; numeric degeneracies are normally caught close to their source
/// (a primitive with a non-invertible transform falls back to an identity
/// inverse instead of aborting the render).
#[derive(Debug, Error)]
pub enum TracerError {
    #[error("cannot normalize a vector with magnitude {0:e}")]
    DegenerateVector(f64),

    #[error("matrix is not invertible (determinant {0:e})")]
    NonInvertibleMatrix(f64),

    #[error("{name} must be positive, got {value}")]
    NonPositiveParameter { name: &'static str, value: f64 },

    #[error("cone angle must lie strictly between 0 and PI/2 radians, got {0}")]
    AngleOutOfRange(f64),

    #[error("axis vector has near-zero length")]
    DegenerateAxis,

    #[error("triangle vertices are collinear")]
    DegenerateTriangle,

    #[error("pixel ({x}, {y}) lies outside the {width}x{height} image")]
    PixelOutOfRange {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("tile buffer holds {got} pixels, expected {expected}")]
    TileBufferMismatch { expected: usize, got: usize },

    #[error("cannot enqueue work on a stopped thread pool")]
    PoolStopped,

    #[error("scene description error: {0}")]
    Scene(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TracerError>;
