//! The spatial state container.
//!
//! A [`State`] owns one array per declared quantity, each of shape
//! `domain.shape ++ tensor_shape`. Uniform quantities also occupy the
//! domain shape so every law operand lines up point for point, but must
//! hold the same sample at every point. Writes broadcast their input to
//! the quantity's full shape.
//!
//! Every declared quantity keeps its slot for the life of the state, so
//! unsetting and setting a value never changes iteration order.

use crate::error::StateError;
use indexmap::IndexMap;
use mpd_core::{broadcast_to, full_shape, QuantityReader, Value};
use mpd_law::{Law, LawContext};
use mpd_model::Model;
use mpd_space::Domain;
use ndarray::{ArrayViewMut, IxDyn, Slice};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Values of every quantity of a model over one spatial domain.
///
/// The model is shared read-only; the arrays are owned, so cloning a
/// state deep-copies its values.
#[derive(Clone, Debug)]
pub struct State {
    model: Arc<Model>,
    domain: Domain,
    values: IndexMap<String, Option<Value>>,
}

impl State {
    /// Create a state seeded with every quantity's initial value.
    pub fn create(model: Arc<Model>, domain: Domain) -> Result<Self, StateError> {
        let domain_shape = domain.shape();
        let mut values = IndexMap::with_capacity(model.quantities().len());
        for decl in model.quantities().iter() {
            let shape = full_shape(&domain_shape, &decl.tensor_shape);
            let value = broadcast_to(&decl.initial_value, &shape).ok_or_else(|| {
                StateError::ShapeMismatch {
                    quantity: decl.name.clone(),
                    expected: shape.to_vec(),
                    actual: decl.initial_value.shape().to_vec(),
                }
            })?;
            values.insert(decl.name.clone(), Some(value));
        }
        Ok(Self {
            model,
            domain,
            values,
        })
    }

    /// The shared model.
    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    /// The spatial domain.
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Names of the quantities that currently have a value, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.values
            .iter()
            .filter(|(_, slot)| slot.is_some())
            .map(|(name, _)| name.as_str())
    }

    /// Full shape of a declared quantity on this state's domain.
    pub fn shape_of(&self, name: &str) -> Result<Vec<usize>, StateError> {
        let decl = self
            .model
            .quantity(name)
            .ok_or_else(|| StateError::UnknownQuantity {
                name: name.to_string(),
            })?;
        Ok(full_shape(&self.domain.shape(), &decl.tensor_shape).to_vec())
    }

    /// Current value of a quantity.
    pub fn get(&self, name: &str) -> Result<&Value, StateError> {
        match self.values.get(name) {
            Some(Some(v)) => Ok(v),
            _ => Err(self.missing(name)),
        }
    }

    /// Mutable view of a field quantity's value, for in-place edits.
    ///
    /// The view cannot change the array's shape. Uniform quantities are
    /// refused since a per-point edit would break their uniformity; use
    /// [`State::set`] for them.
    pub fn get_mut(&mut self, name: &str) -> Result<ArrayViewMut<'_, f64, IxDyn>, StateError> {
        if !self.is_set(name) {
            return Err(self.missing(name));
        }
        if self.model.quantity(name).is_some_and(|d| !d.is_field) {
            return Err(StateError::UniformInPlace {
                name: name.to_string(),
            });
        }
        self.values
            .get_mut(name)
            .and_then(Option::as_mut)
            .map(|v| v.view_mut())
            .ok_or_else(|| StateError::Unset {
                name: name.to_string(),
            })
    }

    /// Assign a quantity, broadcasting `value` to its full shape.
    ///
    /// A uniform quantity only accepts values that are constant across
    /// the domain axes. Constants may be set directly; only computation
    /// steps are barred from writing them.
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), StateError> {
        let shape = self.shape_of(name)?;
        let is_field = self.model.quantity(name).is_some_and(|d| d.is_field);
        let value = if value.shape() == shape.as_slice() {
            value
        } else {
            broadcast_to(&value, &shape).ok_or_else(|| StateError::ShapeMismatch {
                quantity: name.to_string(),
                expected: shape.clone(),
                actual: value.shape().to_vec(),
            })?
        };
        if !is_field && !is_uniform_over(&value, self.domain.ndim()) {
            return Err(StateError::NonUniform {
                quantity: name.to_string(),
            });
        }
        match self.values.get_mut(name) {
            Some(slot) => *slot = Some(value),
            None => {
                self.values.insert(name.to_string(), Some(value));
            }
        }
        Ok(())
    }

    /// Assign the same scalar at every sample of a quantity.
    pub fn set_scalar(&mut self, name: &str, value: f64) -> Result<(), StateError> {
        self.set(name, Value::from_elem(IxDyn(&[]), value))
    }

    /// Clear a quantity's value, returning it if it was set.
    ///
    /// The quantity keeps its position; a later [`State::set`] refills it.
    pub fn unset(&mut self, name: &str) -> Result<Option<Value>, StateError> {
        if self.model.quantity(name).is_none() {
            return Err(StateError::UnknownQuantity {
                name: name.to_string(),
            });
        }
        Ok(self.values.get_mut(name).and_then(Option::take))
    }

    /// Whether a quantity currently has a value.
    pub fn is_set(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(Some(_)))
    }

    /// Evaluate a law's residual against the current values.
    pub fn residual(&self, law: &str) -> Result<Value, StateError> {
        let law = self.law(law)?;
        law.test(&self.context()).map_err(|source| StateError::Law {
            law: law.name().to_string(),
            source,
        })
    }

    /// Evaluate a law's compute function for `quantity` without assigning it.
    pub fn evaluate(&self, law: &str, quantity: &str) -> Result<Value, StateError> {
        let law = self.law(law)?;
        law.compute(quantity, &self.context())
            .map_err(|source| StateError::Law {
                law: law.name().to_string(),
                source,
            })
    }

    /// Evaluate a law's compute function for `quantity` and assign the result.
    pub fn apply(&mut self, law: &str, quantity: &str) -> Result<(), StateError> {
        let value = self.evaluate(law, quantity)?;
        self.set(quantity, value)
    }

    /// Recompute every derived quantity from the current values.
    ///
    /// Runs in quantity declaration order, so a derived quantity may read
    /// one declared before it and sees the refreshed value. Stops at the
    /// first failure; quantities refreshed before it keep their new values.
    pub fn update(&mut self) -> Result<(), StateError> {
        let model = Arc::clone(&self.model);
        let mut refreshed = 0usize;
        for decl in model.quantities().iter() {
            let Some(derived) = model.derived(&decl.name) else {
                continue;
            };
            let value = derived
                .compute(&self.context())
                .map_err(|source| StateError::Derived {
                    quantity: decl.name.clone(),
                    source,
                })?;
            self.set(&decl.name, value)?;
            refreshed += 1;
        }
        trace!(refreshed, "derived quantities updated");
        Ok(())
    }

    /// Blend towards `other`: `value * (1 - lambda) + other * lambda`.
    ///
    /// Quantities unset in either state are skipped, as are quantities
    /// `other`'s model does not declare. `lambda = 0` leaves this state
    /// untouched and `lambda = 1` copies `other`'s values exactly. All
    /// checks run before any value changes.
    pub fn interpolate01(&mut self, other: &State, lambda: f64) -> Result<(), StateError> {
        if self.domain != other.domain {
            return Err(StateError::DomainMismatch);
        }

        let spatial = self.domain.ndim();
        let mut shared = Vec::new();
        for (name, slot) in &self.values {
            let (Some(value), Some(Some(theirs))) = (slot, other.values.get(name)) else {
                continue;
            };
            if let (Some(a), Some(b)) = (self.model.quantity(name), other.model.quantity(name)) {
                if !a.dimension.is_compatible(&b.dimension) {
                    return Err(StateError::DimensionMismatch {
                        quantity: name.clone(),
                        this: a.dimension.clone(),
                        other: b.dimension.clone(),
                    });
                }
                if !a.is_field && !is_uniform_over(theirs, spatial) {
                    return Err(StateError::NonUniform {
                        quantity: name.clone(),
                    });
                }
            }
            if value.shape() != theirs.shape() {
                return Err(StateError::ShapeMismatch {
                    quantity: name.clone(),
                    expected: value.shape().to_vec(),
                    actual: theirs.shape().to_vec(),
                });
            }
            shared.push(name.clone());
        }

        if lambda == 0.0 {
            return Ok(());
        }
        for name in shared {
            let (Some(Some(mine)), Some(Some(theirs))) =
                (self.values.get_mut(&name), other.values.get(&name))
            else {
                continue;
            };
            if lambda == 1.0 {
                mine.assign(theirs);
            } else {
                mine.zip_mut_with(theirs, |a, &b| *a = *a * (1.0 - lambda) + b * lambda);
            }
        }
        Ok(())
    }

    /// Blend towards `other` with `lambda` remapped from `[begin, end]` to `[0, 1]`.
    pub fn interpolate(
        &mut self,
        other: &State,
        begin: f64,
        end: f64,
        lambda: f64,
    ) -> Result<(), StateError> {
        if begin == end {
            return Err(StateError::InvalidInterpolationRange { begin, end });
        }
        self.interpolate01(other, (lambda - begin) / (end - begin))
    }

    /// Copy every shared, set quantity from `other`.
    pub fn copy_from(&mut self, other: &State) -> Result<(), StateError> {
        self.interpolate01(other, 1.0)
    }

    /// Copy every shared, set quantity into `other`.
    pub fn copy_to(&self, other: &mut State) -> Result<(), StateError> {
        other.copy_from(self)
    }

    fn law(&self, name: &str) -> Result<&Law, StateError> {
        self.model.law(name).ok_or_else(|| StateError::UnknownLaw {
            name: name.to_string(),
        })
    }

    fn context(&self) -> LawContext<'_> {
        LawContext::new(self, &self.domain)
    }

    fn missing(&self, name: &str) -> StateError {
        if self.model.quantity(name).is_some() {
            StateError::Unset {
                name: name.to_string(),
            }
        } else {
            StateError::UnknownQuantity {
                name: name.to_string(),
            }
        }
    }
}

/// Whether `value` holds one sample repeated over its leading `spatial` axes.
///
/// NaN samples count as equal to each other.
fn is_uniform_over(value: &Value, spatial: usize) -> bool {
    let first = value.slice_each_axis(|desc| {
        if desc.axis.index() < spatial {
            Slice::from(0..1)
        } else {
            Slice::from(..)
        }
    });
    let Some(first) = first.broadcast(value.raw_dim()) else {
        return false;
    };
    value
        .iter()
        .zip(first.iter())
        .all(|(a, b)| a == b || (a.is_nan() && b.is_nan()))
}

impl QuantityReader for State {
    fn read(&self, name: &str) -> Option<&Value> {
        self.values.get(name).and_then(Option::as_ref)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "state over {:?}", self.domain.shape().as_slice())?;
        for (name, slot) in &self.values {
            match slot {
                Some(value) => writeln!(f, "{name}: {value}")?,
                None => writeln!(f, "{name}: unset")?,
            }
        }
        Ok(())
    }
}
