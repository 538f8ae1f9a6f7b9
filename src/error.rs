use thiserror::Error;

/// Top-level error type for the curvis geometry kernel.
#[derive(Debug, Error)]
pub enum CurvisError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error(transparent)]
    Range(#[from] RangeError),

    #[error(transparent)]
    Input(#[from] InputError),
}

/// Structurally impossible geometric input.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("too few distinct points: {count} (at least 2 required)")]
    TooFewPoints { count: usize },

    #[error("consecutive duplicate point at index {index}")]
    DuplicatePoint { index: usize },

    #[error("required points coincide")]
    CoincidentPoints,

    #[error("polyline endpoints are {gap} apart, exceeds concatenation tolerance {tolerance}")]
    DisjointEndpoints { gap: f64, tolerance: f64 },

    #[error("no polylines supplied for concatenation")]
    EmptyConcatenation,

    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Out-of-domain numeric parameter.
#[derive(Debug, Error)]
pub enum ArgumentError {
    #[error("{parameter} = {value} is not finite")]
    NonFinite { parameter: &'static str, value: f64 },

    #[error("{parameter} = {value} must be positive")]
    NonPositive { parameter: &'static str, value: f64 },

    #[error("{parameter} = {value} must not be negative")]
    Negative { parameter: &'static str, value: f64 },

    #[error("{parameter} = {value} is below the minimum of {minimum}")]
    BelowMinimum {
        parameter: &'static str,
        value: usize,
        minimum: usize,
    },

    #[error("minimum filter value {minimum} must be below maximum filter value {maximum}")]
    InvertedThresholds { minimum: f64, maximum: f64 },
}

/// Query argument outside its valid interval.
#[derive(Debug, Error)]
pub enum RangeError {
    #[error("distance {value} is outside [0, {length}]")]
    DistanceOutOfRange { value: f64, length: f64 },

    #[error("fraction {value} is outside [0, 1]")]
    FractionOutOfRange { value: f64 },

    #[error("range start {from} exceeds range end {to}")]
    ReversedRange { from: f64, to: f64 },

    #[error("point index {index} is out of range for {len} points")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("segment index {index} is out of range for {count} segments")]
    SegmentOutOfRange { index: usize, count: usize },
}

/// Unsupported external input.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("unsupported path command: {0}")]
    UnsupportedCommand(&'static str),
}

/// Convenience type alias for results using [`CurvisError`].
pub type Result<T> = std::result::Result<T, CurvisError>;
