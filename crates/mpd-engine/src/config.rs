//! Solver configuration and its validation.

use std::error::Error;
use std::fmt;

/// Tolerance and iteration cap for relaxation.
///
/// A pass converges when the maximum absolute residual of the step's
/// convergence law is strictly below `tolerance`. Cyclic steps give up
/// after `max_iterations` passes.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfig {
    /// Convergence threshold on the maximum absolute residual. Default: 1e-3.
    pub tolerance: f64,
    /// Maximum number of relaxation passes. Default: 10 000.
    pub max_iterations: usize,
}

impl SolverConfig {
    /// A configuration with the given tolerance and iteration cap.
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Check that the tolerance is finite and positive and the cap is non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(ConfigError::InvalidTolerance {
                value: self.tolerance,
            });
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        Ok(())
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-3,
            max_iterations: 10_000,
        }
    }
}

/// Errors from [`SolverConfig::validate`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The tolerance is NaN, infinite, zero, or negative.
    InvalidTolerance {
        /// The rejected tolerance.
        value: f64,
    },
    /// The iteration cap is zero.
    ZeroIterations,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTolerance { value } => {
                write!(f, "tolerance must be finite and positive, got {value}")
            }
            Self::ZeroIterations => write!(f, "max_iterations must be at least 1"),
        }
    }
}

impl Error for ConfigError {}
