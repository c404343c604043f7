//! The [`Law`] type and its builder.
//!
//! A law relates an ordered set of quantities. For every quantity it can
//! be solved for it stores exactly one pure compute function, and it
//! stores one residual ("law test") function that evaluates to zero
//! wherever the relation holds. Law functions never mutate state; the
//! engine assigns their results.

use crate::context::LawContext;
use indexmap::IndexMap;
use mpd_core::{LawError, Value};
use std::fmt;

/// A law compute or residual function.
///
/// Must be pure: same inputs produce identical outputs.
pub type LawFn = Box<dyn Fn(&LawContext<'_>) -> Result<Value, LawError> + Send + Sync>;

/// A named relation between quantities.
///
/// Construct with [`Law::builder`].
///
/// # Examples
///
/// ```
/// use mpd_law::Law;
///
/// let product = Law::builder("product_law", "demo")
///     .uses("a")
///     .uses("b")
///     .uses("c")
///     .solvable("c", |ctx| Ok(ctx.get("a")? * ctx.get("b")?))
///     .solvable("a", |ctx| Ok(ctx.get("c")? / ctx.get("b")?))
///     .residual(|ctx| Ok(ctx.get("a")? * ctx.get("b")? - ctx.get("c")?))
///     .build();
///
/// assert!(product.is_solvable("a"));
/// assert!(!product.is_solvable("b"));
/// assert_eq!(product.used_quantities(), &["a", "b", "c"]);
/// ```
pub struct Law {
    name: String,
    namespace: String,
    used_quantities: Vec<String>,
    solvables: IndexMap<String, LawFn>,
    residual: Option<LawFn>,
    same_dimension: Vec<(String, String)>,
}

impl Law {
    /// Start building a law.
    pub fn builder(name: impl Into<String>, namespace: impl Into<String>) -> LawBuilder {
        LawBuilder {
            law: Law {
                name: name.into(),
                namespace: namespace.into(),
                used_quantities: Vec::new(),
                solvables: IndexMap::new(),
                residual: None,
                same_dimension: Vec::new(),
            },
        }
    }

    /// Law name, unique within the owning model.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifier of the owning namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Quantities related by this law, in declaration order.
    pub fn used_quantities(&self) -> &[String] {
        &self.used_quantities
    }

    /// Whether the law relates `quantity`.
    pub fn uses_quantity(&self, quantity: &str) -> bool {
        self.used_quantities.iter().any(|q| q == quantity)
    }

    /// Quantities this law can be solved for, in declaration order.
    pub fn solvables(&self) -> impl Iterator<Item = &str> + '_ {
        self.solvables.keys().map(String::as_str)
    }

    /// Whether the law has a compute function for `quantity`.
    pub fn is_solvable(&self, quantity: &str) -> bool {
        self.solvables.contains_key(quantity)
    }

    /// Whether a residual function was supplied.
    pub fn has_residual(&self) -> bool {
        self.residual.is_some()
    }

    /// Quantity pairs that must carry compatible dimension tags.
    pub fn same_dimension_pairs(&self) -> &[(String, String)] {
        &self.same_dimension
    }

    /// Evaluate the compute function for `quantity`.
    pub fn compute(&self, quantity: &str, ctx: &LawContext<'_>) -> Result<Value, LawError> {
        let f = self
            .solvables
            .get(quantity)
            .ok_or_else(|| LawError::EvaluationFailed {
                reason: format!("law '{}' cannot be solved for '{quantity}'", self.name),
            })?;
        f(ctx)
    }

    /// Evaluate the residual function.
    pub fn test(&self, ctx: &LawContext<'_>) -> Result<Value, LawError> {
        let f = self
            .residual
            .as_ref()
            .ok_or_else(|| LawError::EvaluationFailed {
                reason: format!("law '{}' has no residual", self.name),
            })?;
        f(ctx)
    }
}

impl fmt::Debug for Law {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Law")
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .field("used_quantities", &self.used_quantities)
            .field("solvables", &self.solvables.keys().collect::<Vec<_>>())
            .field("has_residual", &self.residual.is_some())
            .field("same_dimension", &self.same_dimension)
            .finish()
    }
}

impl fmt::Display for Law {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "law {}::{}({}) solvable for [{}]",
            self.namespace,
            self.name,
            self.used_quantities.join(", "),
            self.solvables.keys().map(String::as_str).collect::<Vec<_>>().join(", "),
        )
    }
}

/// Builder for [`Law`].
///
/// Registering a solvable also registers the quantity as used, so the
/// solvable table can never name a quantity the law does not relate.
pub struct LawBuilder {
    law: Law,
}

impl LawBuilder {
    /// Declare a quantity related by the law. Repeats are ignored.
    pub fn uses(mut self, quantity: impl Into<String>) -> Self {
        let quantity = quantity.into();
        if !self.law.uses_quantity(&quantity) {
            self.law.used_quantities.push(quantity);
        }
        self
    }

    /// Register the compute function for `quantity`, replacing any earlier one.
    pub fn solvable<F>(self, quantity: impl Into<String>, f: F) -> Self
    where
        F: Fn(&LawContext<'_>) -> Result<Value, LawError> + Send + Sync + 'static,
    {
        let quantity = quantity.into();
        let mut builder = self.uses(quantity.clone());
        builder.law.solvables.insert(quantity, Box::new(f));
        builder
    }

    /// Register the residual function.
    pub fn residual<F>(mut self, f: F) -> Self
    where
        F: Fn(&LawContext<'_>) -> Result<Value, LawError> + Send + Sync + 'static,
    {
        self.law.residual = Some(Box::new(f));
        self
    }

    /// Require `a` and `b` to carry compatible dimension tags.
    pub fn same_dimension(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.law.same_dimension.push((a.into(), b.into()));
        self
    }

    /// Finish the law.
    ///
    /// A law without a residual can be built but is rejected when the
    /// model is assembled.
    pub fn build(self) -> Law {
        self.law
    }
}
