//! Error types for state access and relaxation.

use crate::config::ConfigError;
use mpd_core::{Dimension, LawError};
use std::error::Error;
use std::fmt;

/// Errors from reading, writing, evaluating, or interpolating a [`State`](crate::State).
#[derive(Clone, Debug, PartialEq)]
pub enum StateError {
    /// The model declares no quantity with this name.
    UnknownQuantity {
        /// Requested name.
        name: String,
    },
    /// The model declares no law with this name.
    UnknownLaw {
        /// Requested name.
        name: String,
    },
    /// The quantity is declared but currently has no value.
    Unset {
        /// Requested name.
        name: String,
    },
    /// A value cannot be broadcast to, or does not match, the quantity's shape.
    ShapeMismatch {
        /// Quantity being written or combined.
        quantity: String,
        /// Required shape.
        expected: Vec<usize>,
        /// Supplied shape.
        actual: Vec<usize>,
    },
    /// A uniform quantity was given a value that varies across the domain.
    NonUniform {
        /// Quantity being written.
        quantity: String,
    },
    /// In-place mutable access was requested for a uniform quantity.
    UniformInPlace {
        /// Requested name.
        name: String,
    },
    /// Two states live on different domains.
    DomainMismatch,
    /// Two states declare a shared quantity with incompatible dimensions.
    DimensionMismatch {
        /// Shared quantity.
        quantity: String,
        /// Dimension in this state's model.
        this: Dimension,
        /// Dimension in the other state's model.
        other: Dimension,
    },
    /// `interpolate` was given an empty parameter range.
    InvalidInterpolationRange {
        /// Range start.
        begin: f64,
        /// Range end.
        end: f64,
    },
    /// A derived quantity's compute function failed.
    Derived {
        /// The derived quantity.
        quantity: String,
        /// The underlying failure.
        source: LawError,
    },
    /// A law function failed.
    Law {
        /// Name of the failing law.
        law: String,
        /// The underlying failure.
        source: LawError,
    },
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownQuantity { name } => write!(f, "unknown quantity '{name}'"),
            Self::UnknownLaw { name } => write!(f, "unknown law '{name}'"),
            Self::Unset { name } => write!(f, "quantity '{name}' is unset"),
            Self::ShapeMismatch {
                quantity,
                expected,
                actual,
            } => write!(
                f,
                "quantity '{quantity}': shape {actual:?} does not fit {expected:?}"
            ),
            Self::NonUniform { quantity } => {
                write!(f, "quantity '{quantity}' is uniform but the value varies over the domain")
            }
            Self::UniformInPlace { name } => {
                write!(f, "quantity '{name}' is uniform and cannot be edited in place")
            }
            Self::DomainMismatch => write!(f, "states are defined over different domains"),
            Self::DimensionMismatch {
                quantity,
                this,
                other,
            } => write!(
                f,
                "quantity '{quantity}' has dimension [{this}] here and [{other}] in the other state"
            ),
            Self::InvalidInterpolationRange { begin, end } => {
                write!(f, "interpolation range [{begin}, {end}] is empty")
            }
            Self::Derived { quantity, source } => {
                write!(f, "derived quantity '{quantity}' failed: {source}")
            }
            Self::Law { law, source } => write!(f, "law '{law}' failed: {source}"),
        }
    }
}

impl Error for StateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Law { source, .. } | Self::Derived { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A cyclic step exhausted its iteration cap without converging.
///
/// Recoverable: the state holds the values of the last pass and the
/// caller may retry with a looser tolerance or a larger cap.
#[derive(Clone, Debug, PartialEq)]
pub struct NonConvergenceError {
    /// Name of the step.
    pub step: String,
    /// Passes executed.
    pub iterations: usize,
    /// Maximum absolute residual after the last pass. NaN if the residual was not finite.
    pub residual: f64,
}

impl fmt::Display for NonConvergenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step '{}' did not converge after {} iterations (residual {:e})",
            self.step, self.iterations, self.residual
        )
    }
}

impl Error for NonConvergenceError {}

/// Errors from [`State::solve`](crate::State::solve).
#[derive(Clone, Debug, PartialEq)]
pub enum SolveError {
    /// The solver configuration is invalid.
    Config(ConfigError),
    /// The model declares no step with this name.
    UnknownStep {
        /// Requested name.
        name: String,
    },
    /// The cancel token fired before a pass.
    Cancelled {
        /// Passes completed before cancellation.
        iterations: usize,
    },
    /// The iteration cap was exhausted.
    NonConvergence(NonConvergenceError),
    /// A substep or residual evaluation failed.
    State(StateError),
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid solver configuration: {e}"),
            Self::UnknownStep { name } => write!(f, "unknown computation step '{name}'"),
            Self::Cancelled { iterations } => {
                write!(f, "solve cancelled after {iterations} iterations")
            }
            Self::NonConvergence(e) => write!(f, "{e}"),
            Self::State(e) => write!(f, "{e}"),
        }
    }
}

impl Error for SolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::NonConvergence(e) => Some(e),
            Self::State(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for SolveError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<NonConvergenceError> for SolveError {
    fn from(e: NonConvergenceError) -> Self {
        Self::NonConvergence(e)
    }
}

impl From<StateError> for SolveError {
    fn from(e: StateError) -> Self {
        Self::State(e)
    }
}
