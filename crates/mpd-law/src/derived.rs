//! Derived quantities: values recomputed from other quantities on request.
//!
//! A derived quantity is not solved by any computation step. Its value is
//! a pure function of other quantities, refreshed when the state is told
//! to update. Typical uses are convenience combinations such as a thermal
//! voltage `k * T / q` that laws then read like any other quantity.

use crate::context::LawContext;
use crate::law::LawFn;
use mpd_core::{LawError, Value};
use std::fmt;

/// A compute function attached to a declared quantity.
///
/// # Examples
///
/// ```
/// use mpd_law::DerivedQuantity;
///
/// let kt = DerivedQuantity::new("thermal_energy", "demo", |ctx| {
///     Ok(ctx.get("boltzmann_constant")? * ctx.get("temperature")?)
/// })
/// .uses("boltzmann_constant")
/// .uses("temperature");
///
/// assert_eq!(kt.quantity(), "thermal_energy");
/// assert_eq!(kt.used_quantities(), &["boltzmann_constant", "temperature"]);
/// ```
pub struct DerivedQuantity {
    quantity: String,
    namespace: String,
    used_quantities: Vec<String>,
    compute: LawFn,
}

impl DerivedQuantity {
    /// Attach `compute` to `quantity`.
    pub fn new<F>(quantity: impl Into<String>, namespace: impl Into<String>, compute: F) -> Self
    where
        F: Fn(&LawContext<'_>) -> Result<Value, LawError> + Send + Sync + 'static,
    {
        Self {
            quantity: quantity.into(),
            namespace: namespace.into(),
            used_quantities: Vec::new(),
            compute: Box::new(compute),
        }
    }

    /// Declare a quantity the compute function reads. Repeats are ignored.
    pub fn uses(mut self, quantity: impl Into<String>) -> Self {
        let quantity = quantity.into();
        if !self.used_quantities.contains(&quantity) {
            self.used_quantities.push(quantity);
        }
        self
    }

    /// Name of the quantity this function produces.
    pub fn quantity(&self) -> &str {
        &self.quantity
    }

    /// Identifier of the owning namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Quantities read by the compute function, in declaration order.
    pub fn used_quantities(&self) -> &[String] {
        &self.used_quantities
    }

    /// Evaluate the compute function.
    pub fn compute(&self, ctx: &LawContext<'_>) -> Result<Value, LawError> {
        (self.compute)(ctx)
    }
}

impl fmt::Debug for DerivedQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedQuantity")
            .field("quantity", &self.quantity)
            .field("namespace", &self.namespace)
            .field("used_quantities", &self.used_quantities)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for DerivedQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "derived {}::{} from [{}]",
            self.namespace,
            self.quantity,
            self.used_quantities.join(", ")
        )
    }
}
