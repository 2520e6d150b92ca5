//! Input-contract errors for every grid computation in this crate.

use std::fmt;

use thiserror::Error;

/// Which coordinate axis an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordAxis {
    Latitude,
    Longitude,
}

impl fmt::Display for CoordAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordAxis::Latitude => f.write_str("latitude"),
            CoordAxis::Longitude => f.write_str("longitude"),
        }
    }
}

/// Caller supplied input that the computation cannot work with.
///
/// Nothing here is recoverable: every variant is a violation of the input
/// contract and no partial result is produced.
#[derive(Debug, Error, PartialEq)]
pub enum InvalidInputError {
    #[error("{axis} axis needs at least 2 values, got {len}")]
    TooFewCoordinates { axis: CoordAxis, len: usize },
    #[error("{axis} axis has non-finite value {value} at index {index}")]
    NonFiniteCoordinate { axis: CoordAxis, index: usize, value: f64 },
    #[error("sphere radius must be finite and positive, got {0}")]
    InvalidRadius(f64),
    #[error("grid has zero total area")]
    ZeroTotalArea,
    #[error("total grid area is not finite ({0}); radius or coordinate span too large")]
    NonFiniteArea(f64),
    #[error("shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch { expected: (usize, usize), found: (usize, usize) },
    #[error("ensemble is empty")]
    EmptyEnsemble,
    #[error("field has no finite values to average")]
    NoValidCells,
    #[error("malformed field: {0}")]
    MalformedField(String),
}

pub type Result<T> = std::result::Result<T, InvalidInputError>;
