//! Error types for quantity declarations and law functions.

use std::error::Error;
use std::fmt;

/// Errors raised while evaluating a law's compute or residual function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LawError {
    /// The law read a quantity that is unknown or unset in the state.
    MissingQuantity {
        /// Name of the missing quantity.
        name: String,
    },
    /// A finite-difference operator rejected its input.
    Space {
        /// Description of the operator failure.
        reason: String,
    },
    /// Operands could not be combined because their shapes differ.
    ShapeMismatch {
        /// Description of the shapes involved.
        reason: String,
    },
    /// Any other evaluation failure reported by the law body.
    EvaluationFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
}

impl fmt::Display for LawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingQuantity { name } => write!(f, "quantity '{name}' is not available"),
            Self::Space { reason } => write!(f, "space operator failed: {reason}"),
            Self::ShapeMismatch { reason } => write!(f, "shape mismatch: {reason}"),
            Self::EvaluationFailed { reason } => write!(f, "evaluation failed: {reason}"),
        }
    }
}

impl Error for LawError {}

/// Errors from checking or resolving a [`QuantityDecl`](crate::QuantityDecl).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuantityError {
    /// The declaration has an empty name.
    EmptyName,
    /// The initial value does not have the declared tensor shape.
    InitialValueShape {
        /// Offending quantity.
        quantity: String,
        /// Declared tensor shape.
        expected: Vec<usize>,
        /// Shape of the initial value.
        actual: Vec<usize>,
    },
    /// `is_field` and `is_uniform` were both given and disagree.
    ContradictoryFlags {
        /// Offending quantity.
        quantity: String,
        /// Supplied `is_field`.
        is_field: bool,
        /// Supplied `is_uniform`.
        is_uniform: bool,
    },
    /// Neither `is_field` nor `is_uniform` was given.
    MissingClass {
        /// Offending quantity.
        quantity: String,
    },
}

impl fmt::Display for QuantityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "quantity name must not be empty"),
            Self::InitialValueShape {
                quantity,
                expected,
                actual,
            } => write!(
                f,
                "quantity '{quantity}' initial value has shape {actual:?}, tensor shape is {expected:?}"
            ),
            Self::ContradictoryFlags {
                quantity,
                is_field,
                is_uniform,
            } => write!(
                f,
                "quantity '{quantity}' has contradictory flags is_field={is_field} and is_uniform={is_uniform}"
            ),
            Self::MissingClass { quantity } => {
                write!(f, "quantity '{quantity}' declares neither is_field nor is_uniform")
            }
        }
    }
}

impl Error for QuantityError {}
