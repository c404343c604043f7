//! Error types for domain construction and spatial operators.

use mpd_core::LawError;
use std::fmt;

/// Errors arising from domain construction or finite-difference operators.
#[derive(Debug, Clone, PartialEq)]
pub enum SpaceError {
    /// A domain was constructed with no axes.
    EmptyDomain,
    /// An axis has no coordinates.
    EmptyAxis {
        /// Index of the offending axis.
        axis: usize,
    },
    /// A coordinate is NaN or infinite.
    NonFiniteCoordinate {
        /// Index of the offending axis.
        axis: usize,
        /// Position of the coordinate within the axis.
        index: usize,
    },
    /// Coordinates along an axis are not strictly increasing.
    NonMonotonicAxis {
        /// Index of the offending axis.
        axis: usize,
        /// Position of the first coordinate that does not exceed its predecessor.
        index: usize,
    },
    /// A sample sequence and its coordinate sequence differ in length.
    LengthMismatch {
        /// Number of samples.
        values: usize,
        /// Number of coordinates.
        coordinates: usize,
    },
    /// An array's shape does not fit the domain.
    ShapeMismatch {
        /// Human-readable description of the expected layout.
        expected: String,
        /// The shape that was supplied.
        actual: Vec<usize>,
    },
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDomain => write!(f, "domain must have at least one axis"),
            Self::EmptyAxis { axis } => write!(f, "axis {axis} has no coordinates"),
            Self::NonFiniteCoordinate { axis, index } => {
                write!(f, "coordinate {index} on axis {axis} is not finite")
            }
            Self::NonMonotonicAxis { axis, index } => {
                write!(
                    f,
                    "axis {axis} is not strictly increasing at coordinate {index}"
                )
            }
            Self::LengthMismatch {
                values,
                coordinates,
            } => {
                write!(
                    f,
                    "{values} samples supplied for {coordinates} coordinates"
                )
            }
            Self::ShapeMismatch { expected, actual } => {
                write!(f, "array shape {actual:?} does not fit domain: expected {expected}")
            }
        }
    }
}

impl std::error::Error for SpaceError {}

impl From<SpaceError> for LawError {
    fn from(e: SpaceError) -> Self {
        LawError::Space {
            reason: e.to_string(),
        }
    }
}
