//! Quantity declarations and their dimension tags.

use crate::error::QuantityError;
use crate::value::{Shape, Value};
use ndarray::IxDyn;
use std::fmt;

/// Opaque unit-family tag attached to a quantity (e.g. `"VolumeDensity"`).
///
/// Tags are compared for equality and never computed on. The empty tag
/// means "unspecified" and is compatible with every other tag, which is
/// how legacy declarations with a blank dimension are admitted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Dimension(String);

impl Dimension {
    /// Tag used for dimensionless quantities.
    pub const DIMENSIONLESS: &'static str = "dimensionless";

    /// Create a tag from a unit-family name.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The dimensionless tag.
    pub fn dimensionless() -> Self {
        Self(Self::DIMENSIONLESS.to_string())
    }

    /// The unspecified (empty) tag.
    pub fn unspecified() -> Self {
        Self(String::new())
    }

    /// Whether this tag is the unspecified tag.
    pub fn is_unspecified(&self) -> bool {
        self.0.is_empty()
    }

    /// The raw tag string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Two tags are compatible when they are equal or either is unspecified.
    pub fn is_compatible(&self, other: &Dimension) -> bool {
        self.is_unspecified() || other.is_unspecified() || self == other
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unspecified() {
            write!(f, "unspecified")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Declaration of a quantity registered in a model.
///
/// Quantities are the unit of state. Each has a dimension tag, a
/// constant/variable class, a field/uniform class, a tensor shape (empty
/// for scalars) and an initial value whose shape equals the tensor shape.
/// A state broadcasts the initial value over the whole spatial domain,
/// so uniform quantities still occupy one sample per grid point.
#[derive(Clone, Debug, PartialEq)]
pub struct QuantityDecl {
    /// Name, unique within the owning model.
    pub name: String,
    /// Identifier of the owning namespace.
    pub namespace: String,
    /// Unit-family tag.
    pub dimension: Dimension,
    /// Fixed for the life of a state; computation steps may not write it.
    pub is_constant: bool,
    /// One value per grid point (`true`) or one value for the whole domain.
    pub is_field: bool,
    /// Per-point tensor shape. Empty for scalars.
    pub tensor_shape: Shape,
    /// Initial value with shape `tensor_shape`.
    pub initial_value: Value,
}

impl QuantityDecl {
    /// A variable scalar field quantity with an unspecified dimension,
    /// initialised to zero.
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            dimension: Dimension::unspecified(),
            is_constant: false,
            is_field: true,
            tensor_shape: Shape::new(),
            initial_value: Value::zeros(IxDyn(&[])),
        }
    }

    /// Set the dimension tag.
    pub fn with_dimension(mut self, dimension: Dimension) -> Self {
        self.dimension = dimension;
        self
    }

    /// Mark the quantity constant.
    pub fn constant(mut self) -> Self {
        self.is_constant = true;
        self
    }

    /// Mark the quantity uniform over the domain.
    pub fn uniform(mut self) -> Self {
        self.is_field = false;
        self
    }

    /// Set the tensor shape and reset the initial value to zeros of that shape.
    pub fn with_tensor_shape(mut self, shape: &[usize]) -> Self {
        self.tensor_shape = Shape::from_slice(shape);
        self.initial_value = Value::zeros(IxDyn(shape));
        self
    }

    /// Set a scalar initial value (tensor shape must be empty).
    pub fn with_initial_scalar(mut self, value: f64) -> Self {
        self.initial_value = Value::from_elem(IxDyn(&[]), value);
        self
    }

    /// Set the initial value. Its shape is checked by [`validate`](Self::validate).
    pub fn with_initial_value(mut self, value: Value) -> Self {
        self.initial_value = value;
        self
    }

    /// Resolve the field/uniform class from the two legacy vocabularies.
    ///
    /// Older declarations carry `is_uniform`, newer ones `is_field`, and
    /// some carry both. Exactly one agreeing answer is required.
    pub fn with_legacy_flags(
        mut self,
        is_field: Option<bool>,
        is_uniform: Option<bool>,
    ) -> Result<Self, QuantityError> {
        self.is_field = match (is_field, is_uniform) {
            (Some(f), None) => f,
            (None, Some(u)) => !u,
            (Some(f), Some(u)) if f != u => f,
            (Some(f), Some(u)) => {
                return Err(QuantityError::ContradictoryFlags {
                    quantity: self.name,
                    is_field: f,
                    is_uniform: u,
                })
            }
            (None, None) => return Err(QuantityError::MissingClass { quantity: self.name }),
        };
        Ok(self)
    }

    /// Check structural invariants of the declaration.
    pub fn validate(&self) -> Result<(), QuantityError> {
        if self.name.is_empty() {
            return Err(QuantityError::EmptyName);
        }
        if self.initial_value.shape() != self.tensor_shape.as_slice() {
            return Err(QuantityError::InitialValueShape {
                quantity: self.name.clone(),
                expected: self.tensor_shape.to_vec(),
                actual: self.initial_value.shape().to_vec(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for QuantityDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "quantity {}::{} [{}] {} {}",
            self.namespace,
            self.name,
            self.dimension,
            if self.is_constant { "constant" } else { "variable" },
            if self.is_field { "field" } else { "uniform" },
        )?;
        if !self.tensor_shape.is_empty() {
            write!(f, " shape {:?}", self.tensor_shape.as_slice())?;
        }
        Ok(())
    }
}
