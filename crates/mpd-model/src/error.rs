//! Load-time error types for model assembly and graph validation.

use mpd_core::{Dimension, QuantityError};
use std::error::Error;
use std::fmt;

/// Errors from dependency-edge validation.
///
/// `MalformedEdge` is the malformed-graph condition: an edge names a
/// quantity or law that is not declared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphError {
    /// An edge names an undeclared quantity or law.
    MalformedEdge {
        /// Quantity end of the edge.
        quantity: String,
        /// Law end of the edge.
        law: String,
        /// Which end is unknown.
        reason: String,
    },
    /// An edge joins a law to a quantity the law does not use.
    EdgeNotUsedByLaw {
        /// Quantity end of the edge.
        quantity: String,
        /// Law end of the edge.
        law: String,
    },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedEdge {
                quantity,
                law,
                reason,
            } => write!(f, "malformed edge ({quantity}, {law}): {reason}"),
            Self::EdgeNotUsedByLaw { quantity, law } => {
                write!(f, "edge ({quantity}, {law}): law does not use '{quantity}'")
            }
        }
    }
}

impl Error for GraphError {}

/// Errors detected while assembling a [`Model`](crate::Model).
///
/// Returned by [`ModelBuilder::build`](crate::ModelBuilder::build). The
/// first failing check wins; a rejected model is never partially usable.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigurationError {
    /// A declaration has an empty name.
    EmptyName {
        /// Declaration kind (`"quantity"`, `"law"`, `"step"`, `"derived quantity"`).
        kind: &'static str,
    },
    /// The same name is declared twice in one namespace.
    DuplicateDeclaration {
        /// Declaration kind.
        kind: &'static str,
        /// Repeated name.
        name: String,
        /// Namespace holding both declarations.
        namespace: String,
    },
    /// The same name is declared in two namespaces, so lookup by name is ambiguous.
    AmbiguousName {
        /// Declaration kind.
        kind: &'static str,
        /// Repeated name.
        name: String,
        /// Namespace of the first declaration.
        first: String,
        /// Namespace of the second declaration.
        second: String,
    },
    /// A lookup by name found nothing.
    UnknownDeclaration {
        /// Declaration kind.
        kind: &'static str,
        /// Requested name.
        name: String,
    },
    /// A quantity declaration is malformed, e.g. its initial value does
    /// not have its tensor shape.
    InvalidQuantity {
        /// Offending quantity.
        quantity: String,
        /// What is wrong with it.
        source: QuantityError,
    },
    /// A law or step refers to an undeclared quantity.
    UnknownQuantity {
        /// Name of the law or step holding the reference.
        owner: String,
        /// The unknown quantity.
        quantity: String,
    },
    /// A step refers to an undeclared law.
    UnknownLaw {
        /// Step holding the reference.
        step: String,
        /// The unknown law.
        law: String,
    },
    /// A law was declared without a residual function.
    MissingResidual {
        /// Offending law.
        law: String,
    },
    /// A step solves a law for a quantity the law has no compute function for.
    MissingSolvable {
        /// Step holding the substep.
        step: String,
        /// Law of the substep.
        law: String,
        /// Quantity of the substep.
        quantity: String,
    },
    /// Two quantities a law requires to share a dimension carry incompatible tags.
    DimensionMismatch {
        /// Law declaring the requirement.
        law: String,
        /// First quantity.
        first: String,
        /// Tag of the first quantity.
        first_dimension: Dimension,
        /// Second quantity.
        second: String,
        /// Tag of the second quantity.
        second_dimension: Dimension,
    },
    /// A derived quantity is declared constant, so it could never be refreshed.
    DerivedConstant {
        /// Offending quantity.
        quantity: String,
    },
    /// A step has no substeps.
    EmptyStep {
        /// Offending step.
        step: String,
    },
    /// A step assigns a constant quantity.
    WritesConstant {
        /// Offending step.
        step: String,
        /// The constant quantity.
        quantity: String,
    },
    /// A connected step has a substep whose law ignores the previous substep's quantity.
    DisconnectedStep {
        /// Offending step.
        step: String,
        /// Law that breaks the chain.
        law: String,
        /// Quantity it was expected to use.
        quantity: String,
    },
    /// The declared dependency edges are invalid.
    Graph(GraphError),
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName { kind } => write!(f, "{kind} declared with an empty name"),
            Self::DuplicateDeclaration {
                kind,
                name,
                namespace,
            } => write!(f, "{kind} '{name}' declared twice in namespace '{namespace}'"),
            Self::AmbiguousName {
                kind,
                name,
                first,
                second,
            } => write!(
                f,
                "{kind} '{name}' declared in both '{first}' and '{second}'"
            ),
            Self::UnknownDeclaration { kind, name } => write!(f, "no {kind} named '{name}'"),
            Self::InvalidQuantity { quantity, source } => {
                write!(f, "invalid quantity '{quantity}': {source}")
            }
            Self::UnknownQuantity { owner, quantity } => {
                write!(f, "'{owner}' refers to unknown quantity '{quantity}'")
            }
            Self::UnknownLaw { step, law } => {
                write!(f, "step '{step}' refers to unknown law '{law}'")
            }
            Self::MissingResidual { law } => write!(f, "law '{law}' has no residual function"),
            Self::MissingSolvable {
                step,
                law,
                quantity,
            } => write!(
                f,
                "step '{step}' solves law '{law}' for '{quantity}', which is not a solvable of that law"
            ),
            Self::DimensionMismatch {
                law,
                first,
                first_dimension,
                second,
                second_dimension,
            } => write!(
                f,
                "law '{law}' requires '{first}' [{first_dimension}] and '{second}' [{second_dimension}] to share a dimension"
            ),
            Self::DerivedConstant { quantity } => {
                write!(f, "derived quantity '{quantity}' is declared constant")
            }
            Self::EmptyStep { step } => write!(f, "step '{step}' has no substeps"),
            Self::WritesConstant { step, quantity } => {
                write!(f, "step '{step}' writes constant quantity '{quantity}'")
            }
            Self::DisconnectedStep {
                step,
                law,
                quantity,
            } => write!(
                f,
                "step '{step}' is not connected: law '{law}' does not use '{quantity}'"
            ),
            Self::Graph(e) => write!(f, "invalid dependency graph: {e}"),
        }
    }
}

impl Error for ConfigurationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Graph(e) => Some(e),
            Self::InvalidQuantity { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<GraphError> for ConfigurationError {
    fn from(e: GraphError) -> Self {
        Self::Graph(e)
    }
}
