//! The validated [`Model`] and its [`ModelBuilder`].
//!
//! [`ModelBuilder::build`] runs once, before any state exists. It checks
//! the declarations in a fixed order and returns the first failure:
//!
//! 1. names (empty, duplicated, or ambiguous across namespaces)
//! 2. quantity initial-value shapes
//! 3. law usage lists and residuals
//! 4. `same_dimension` requirements
//! 5. derived quantities
//! 6. computation steps
//! 7. dependency edges

use crate::error::{ConfigurationError, GraphError};
use crate::graph::{self, Cycle, Edge};
use crate::registry::Registry;
use mpd_core::QuantityDecl;
use mpd_law::{ComputationStep, DerivedQuantity, Law};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// An immutable, validated set of declarations.
///
/// Shared read-only between states through `Arc<Model>`.
#[derive(Debug)]
pub struct Model {
    quantities: Registry<QuantityDecl>,
    laws: Registry<Law>,
    derived: Registry<DerivedQuantity>,
    steps: Registry<ComputationStep>,
    edges: Vec<Edge>,
}

impl Model {
    /// Start assembling a model.
    pub fn builder() -> ModelBuilder {
        ModelBuilder::new()
    }

    /// Declared quantities.
    pub fn quantities(&self) -> &Registry<QuantityDecl> {
        &self.quantities
    }

    /// Declared laws.
    pub fn laws(&self) -> &Registry<Law> {
        &self.laws
    }

    /// Declared derived quantities, keyed by the quantity they produce.
    pub fn derived_quantities(&self) -> &Registry<DerivedQuantity> {
        &self.derived
    }

    /// Declared computation steps.
    pub fn steps(&self) -> &Registry<ComputationStep> {
        &self.steps
    }

    /// Declared dependency edges.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Look up a quantity.
    pub fn quantity(&self, name: &str) -> Option<&QuantityDecl> {
        self.quantities.get(name)
    }

    /// Look up a law.
    pub fn law(&self, name: &str) -> Option<&Law> {
        self.laws.get(name)
    }

    /// The compute function of a derived quantity, if `name` is one.
    pub fn derived(&self, name: &str) -> Option<&DerivedQuantity> {
        self.derived.get(name)
    }

    /// Look up a computation step.
    pub fn step(&self, name: &str) -> Option<&ComputationStep> {
        self.steps.get(name)
    }

    /// Quantities that states may change.
    pub fn variable_quantities(&self) -> impl Iterator<Item = &QuantityDecl> + '_ {
        self.quantities.iter().filter(|q| !q.is_constant)
    }

    /// Quantities fixed for the life of a state.
    pub fn constant_quantities(&self) -> impl Iterator<Item = &QuantityDecl> + '_ {
        self.quantities.iter().filter(|q| q.is_constant)
    }

    /// Quantities with one value per grid point.
    pub fn field_quantities(&self) -> impl Iterator<Item = &QuantityDecl> + '_ {
        self.quantities.iter().filter(|q| q.is_field)
    }

    /// Quantities with one value for the whole domain.
    pub fn uniform_quantities(&self) -> impl Iterator<Item = &QuantityDecl> + '_ {
        self.quantities.iter().filter(|q| !q.is_field)
    }

    /// One edge per law and used quantity, in declaration order.
    pub fn inferred_edges(&self) -> Vec<Edge> {
        inferred_edges(&self.laws)
    }

    /// Declared edges whose quantity is not constant.
    pub fn variable_edges(&self) -> Vec<Edge> {
        self.edges
            .iter()
            .filter(|e| self.quantity(&e.quantity).is_some_and(|q| !q.is_constant))
            .cloned()
            .collect()
    }

    /// Distinct cycles of the declared dependency graph.
    pub fn enumerate_cycles(&self) -> BTreeSet<Cycle> {
        graph::enumerate_cycles(&self.edges, |law, q| self.law_uses(law, q))
    }

    /// Distinct cycles of an arbitrary subgraph.
    ///
    /// The edges are validated against this model's declarations first.
    pub fn enumerate_cycles_in(&self, edges: &[Edge]) -> Result<BTreeSet<Cycle>, GraphError> {
        graph::validate_edges(edges, &self.quantities, &self.laws)?;
        Ok(graph::enumerate_cycles(edges, |law, q| self.law_uses(law, q)))
    }

    fn law_uses(&self, law: &str, quantity: &str) -> bool {
        self.laws
            .get(law)
            .is_some_and(|l| l.uses_quantity(quantity))
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "model: {} quantities, {} laws, {} steps, {} edges",
            self.quantities.len(),
            self.laws.len(),
            self.steps.len(),
            self.edges.len()
        )?;
        for q in self.quantities.iter() {
            writeln!(f, "  {q}")?;
        }
        for l in self.laws.iter() {
            writeln!(f, "  {l}")?;
        }
        for d in self.derived.iter() {
            writeln!(f, "  {d}")?;
        }
        for s in self.steps.iter() {
            writeln!(f, "  {s}")?;
        }
        Ok(())
    }
}

fn inferred_edges(laws: &Registry<Law>) -> Vec<Edge> {
    laws.iter()
        .flat_map(|l| {
            l.used_quantities()
                .iter()
                .map(move |q| Edge::new(q.clone(), l.name()))
        })
        .collect()
}

// ── Builder ────────────────────────────────────────────────────────

/// Collects declarations and validates them into a [`Model`].
///
/// # Examples
///
/// ```
/// use mpd_core::QuantityDecl;
/// use mpd_law::{ComputationStep, Law};
/// use mpd_model::Model;
///
/// let model = Model::builder()
///     .quantity(QuantityDecl::new("a", "demo"))
///     .quantity(QuantityDecl::new("b", "demo").constant().with_initial_scalar(2.0))
///     .law(
///         Law::builder("double", "demo")
///             .uses("b")
///             .solvable("a", |ctx| Ok(ctx.get("b")? * 2.0))
///             .residual(|ctx| Ok(ctx.get("a")? - &(ctx.get("b")? * 2.0)))
///             .build(),
///     )
///     .step(ComputationStep::builder("once", "demo").substep("double", "a").build())
///     .infer_edges()
///     .build()
///     .unwrap();
///
/// assert_eq!(model.quantities().len(), 2);
/// assert!(model.enumerate_cycles().is_empty());
/// ```
#[derive(Default)]
pub struct ModelBuilder {
    quantities: Vec<QuantityDecl>,
    laws: Vec<Law>,
    derived: Vec<DerivedQuantity>,
    steps: Vec<ComputationStep>,
    edges: Vec<Edge>,
    infer_edges: bool,
}

impl ModelBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a quantity.
    pub fn quantity(mut self, decl: QuantityDecl) -> Self {
        self.quantities.push(decl);
        self
    }

    /// Declare a law.
    pub fn law(mut self, law: Law) -> Self {
        self.laws.push(law);
        self
    }

    /// Attach a compute function to a declared quantity.
    pub fn derived(mut self, derived: DerivedQuantity) -> Self {
        self.derived.push(derived);
        self
    }

    /// Declare a computation step.
    pub fn step(mut self, step: ComputationStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Declare a dependency edge.
    pub fn edge(mut self, quantity: impl Into<String>, law: impl Into<String>) -> Self {
        self.edges.push(Edge::new(quantity, law));
        self
    }

    /// Declare several dependency edges.
    pub fn edges(mut self, edges: impl IntoIterator<Item = Edge>) -> Self {
        self.edges.extend(edges);
        self
    }

    /// Use one edge per law and used quantity in place of authored edges.
    pub fn infer_edges(mut self) -> Self {
        self.infer_edges = true;
        self
    }

    /// Validate every declaration and freeze the model.
    pub fn build(self) -> Result<Arc<Model>, ConfigurationError> {
        let mut quantities = Registry::new();
        for q in self.quantities {
            quantities.insert(q)?;
        }
        let mut laws = Registry::new();
        for l in self.laws {
            laws.insert(l)?;
        }
        let mut derived = Registry::new();
        for d in self.derived {
            derived.insert(d)?;
        }
        let mut steps = Registry::new();
        for s in self.steps {
            steps.insert(s)?;
        }

        for q in quantities.iter() {
            check_initial_value(q)?;
        }
        for law in laws.iter() {
            check_law(law, &quantities)?;
        }
        for law in laws.iter() {
            check_same_dimension(law, &quantities)?;
        }
        for d in derived.iter() {
            check_derived(d, &quantities)?;
        }
        for step in steps.iter() {
            check_step(step, &quantities, &laws)?;
        }

        let edges = if self.infer_edges {
            inferred_edges(&laws)
        } else {
            self.edges
        };
        graph::validate_edges(&edges, &quantities, &laws)?;
        warn_unlinked_usage(&edges, &laws);

        debug!(
            quantities = quantities.len(),
            laws = laws.len(),
            derived = derived.len(),
            steps = steps.len(),
            edges = edges.len(),
            "model assembled"
        );

        Ok(Arc::new(Model {
            quantities,
            laws,
            derived,
            steps,
            edges,
        }))
    }
}

fn check_initial_value(q: &QuantityDecl) -> Result<(), ConfigurationError> {
    q.validate()
        .map_err(|source| ConfigurationError::InvalidQuantity {
            quantity: q.name.clone(),
            source,
        })
}

fn check_law(law: &Law, quantities: &Registry<QuantityDecl>) -> Result<(), ConfigurationError> {
    if let Some(q) = law
        .used_quantities()
        .iter()
        .find(|q| !quantities.contains(q))
    {
        return Err(ConfigurationError::UnknownQuantity {
            owner: law.name().to_string(),
            quantity: q.clone(),
        });
    }
    if !law.has_residual() {
        return Err(ConfigurationError::MissingResidual {
            law: law.name().to_string(),
        });
    }
    Ok(())
}

fn check_same_dimension(
    law: &Law,
    quantities: &Registry<QuantityDecl>,
) -> Result<(), ConfigurationError> {
    for (a, b) in law.same_dimension_pairs() {
        let lookup = |name: &String| {
            quantities
                .get(name)
                .ok_or_else(|| ConfigurationError::UnknownQuantity {
                    owner: law.name().to_string(),
                    quantity: name.clone(),
                })
        };
        let (qa, qb) = (lookup(a)?, lookup(b)?);
        if !qa.dimension.is_compatible(&qb.dimension) {
            return Err(ConfigurationError::DimensionMismatch {
                law: law.name().to_string(),
                first: a.clone(),
                first_dimension: qa.dimension.clone(),
                second: b.clone(),
                second_dimension: qb.dimension.clone(),
            });
        }
    }
    Ok(())
}

fn check_derived(
    derived: &DerivedQuantity,
    quantities: &Registry<QuantityDecl>,
) -> Result<(), ConfigurationError> {
    let target = quantities.try_get(derived.quantity())?;
    if target.is_constant {
        return Err(ConfigurationError::DerivedConstant {
            quantity: target.name.clone(),
        });
    }
    if let Some(q) = derived
        .used_quantities()
        .iter()
        .find(|q| !quantities.contains(q))
    {
        return Err(ConfigurationError::UnknownQuantity {
            owner: derived.quantity().to_string(),
            quantity: q.clone(),
        });
    }
    Ok(())
}

fn check_step(
    step: &ComputationStep,
    quantities: &Registry<QuantityDecl>,
    laws: &Registry<Law>,
) -> Result<(), ConfigurationError> {
    if step.substeps.is_empty() {
        return Err(ConfigurationError::EmptyStep {
            step: step.name.clone(),
        });
    }

    for sub in &step.substeps {
        let law = laws
            .get(&sub.law)
            .ok_or_else(|| ConfigurationError::UnknownLaw {
                step: step.name.clone(),
                law: sub.law.clone(),
            })?;
        let decl = quantities
            .get(&sub.quantity)
            .ok_or_else(|| ConfigurationError::UnknownQuantity {
                owner: step.name.clone(),
                quantity: sub.quantity.clone(),
            })?;
        if !law.is_solvable(&sub.quantity) {
            return Err(ConfigurationError::MissingSolvable {
                step: step.name.clone(),
                law: sub.law.clone(),
                quantity: sub.quantity.clone(),
            });
        }
        if decl.is_constant {
            return Err(ConfigurationError::WritesConstant {
                step: step.name.clone(),
                quantity: sub.quantity.clone(),
            });
        }
    }

    for q in &step.used_quantities {
        if !quantities.contains(q) {
            return Err(ConfigurationError::UnknownQuantity {
                owner: step.name.clone(),
                quantity: q.clone(),
            });
        }
    }

    if step.is_connected {
        let mut links: Vec<(&str, &str)> = step
            .substeps
            .windows(2)
            .map(|w| (w[1].law.as_str(), w[0].quantity.as_str()))
            .collect();
        if step.is_cyclic {
            if let (Some(first), Some(last)) = (step.substeps.first(), step.substeps.last()) {
                links.push((first.law.as_str(), last.quantity.as_str()));
            }
        }
        for (law, quantity) in links {
            if !laws.get(law).is_some_and(|l| l.uses_quantity(quantity)) {
                return Err(ConfigurationError::DisconnectedStep {
                    step: step.name.clone(),
                    law: law.to_string(),
                    quantity: quantity.to_string(),
                });
            }
        }
    }

    if let Some(law) = &step.convergence_law {
        if !laws.contains(law) {
            return Err(ConfigurationError::UnknownLaw {
                step: step.name.clone(),
                law: law.clone(),
            });
        }
    }

    Ok(())
}

fn warn_unlinked_usage(edges: &[Edge], laws: &Registry<Law>) {
    if edges.is_empty() {
        return;
    }
    for law in laws.iter() {
        let unlinked: Vec<&str> = law
            .used_quantities()
            .iter()
            .filter(|q| {
                !edges
                    .iter()
                    .any(|e| e.law == law.name() && &e.quantity == *q)
            })
            .map(String::as_str)
            .collect();
        if !unlinked.is_empty() && unlinked.len() < law.used_quantities().len() {
            warn!(
                law = law.name(),
                quantities = ?unlinked,
                "law uses quantities that have no dependency edge"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpd_core::{Dimension, QuantityError};
    use ndarray::arr1;

    fn copy_law(name: &str, from: &str, to: &str) -> Law {
        let (f, t) = (from.to_string(), to.to_string());
        Law::builder(name, "ns")
            .uses(from)
            .solvable(to, move |ctx| Ok(ctx.get(&f)?.clone()))
            .residual(move |ctx| Ok(ctx.get(&t)?.clone()))
            .build()
    }

    fn base() -> ModelBuilder {
        Model::builder()
            .quantity(QuantityDecl::new("a", "ns"))
            .quantity(QuantityDecl::new("b", "ns"))
            .quantity(QuantityDecl::new("k", "ns").constant())
    }

    #[test]
    fn empty_model_builds() {
        let model = Model::builder().build().unwrap();
        assert!(model.quantities().is_empty());
        assert!(model.enumerate_cycles().is_empty());
    }

    #[test]
    fn ambiguous_name_across_namespaces() {
        let err = base()
            .quantity(QuantityDecl::new("a", "other"))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::AmbiguousName { .. }));
    }

    #[test]
    fn initial_value_shape_checked() {
        let err = base()
            .quantity(
                QuantityDecl::new("v", "ns")
                    .with_tensor_shape(&[2])
                    .with_initial_value(arr1(&[1.0, 2.0, 3.0]).into_dyn()),
            )
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InvalidQuantity {
                ref quantity,
                source: QuantityError::InitialValueShape { .. },
            } if quantity == "v"
        ));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn law_with_unknown_quantity() {
        let err = base().law(copy_law("l", "zzz", "a")).build().unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownQuantity {
                owner: "l".into(),
                quantity: "zzz".into()
            }
        );
    }

    #[test]
    fn law_without_residual() {
        let law = Law::builder("l", "ns")
            .solvable("a", |ctx| Ok(ctx.get("b")?.clone()))
            .build();
        assert_eq!(
            base().law(law).build().unwrap_err(),
            ConfigurationError::MissingResidual { law: "l".into() }
        );
    }

    #[test]
    fn dimension_mismatch_detected() {
        let law = Law::builder("l", "ns")
            .uses("x")
            .solvable("y", |ctx| Ok(ctx.get("x")?.clone()))
            .residual(|ctx| Ok(ctx.get("x")? - ctx.get("y")?))
            .same_dimension("x", "y")
            .build();
        let err = Model::builder()
            .quantity(QuantityDecl::new("x", "ns").with_dimension(Dimension::new("Energy")))
            .quantity(QuantityDecl::new("y", "ns").with_dimension(Dimension::new("Length")))
            .law(law)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::DimensionMismatch { .. }));
    }

    #[test]
    fn unspecified_dimension_passes() {
        let law = Law::builder("l", "ns")
            .uses("x")
            .solvable("y", |ctx| Ok(ctx.get("x")?.clone()))
            .residual(|ctx| Ok(ctx.get("x")? - ctx.get("y")?))
            .same_dimension("x", "y")
            .build();
        let model = Model::builder()
            .quantity(QuantityDecl::new("x", "ns").with_dimension(Dimension::new("Energy")))
            .quantity(QuantityDecl::new("y", "ns"))
            .law(law)
            .build();
        assert!(model.is_ok());
    }

    #[test]
    fn step_checks() {
        let step = |b: mpd_law::ComputationStepBuilder| {
            base().law(copy_law("l", "a", "b")).step(b.build())
        };

        assert_eq!(
            step(ComputationStep::builder("s", "ns")).build().unwrap_err(),
            ConfigurationError::EmptyStep { step: "s".into() }
        );
        assert!(matches!(
            step(ComputationStep::builder("s", "ns").substep("nope", "b"))
                .build()
                .unwrap_err(),
            ConfigurationError::UnknownLaw { .. }
        ));
        assert!(matches!(
            step(ComputationStep::builder("s", "ns").substep("l", "a"))
                .build()
                .unwrap_err(),
            ConfigurationError::MissingSolvable { .. }
        ));
        assert!(matches!(
            step(ComputationStep::builder("s", "ns").substep("l", "b").convergence_law("x"))
                .build()
                .unwrap_err(),
            ConfigurationError::UnknownLaw { .. }
        ));
        assert!(step(ComputationStep::builder("s", "ns").substep("l", "b"))
            .build()
            .is_ok());
    }

    #[test]
    fn step_with_undeclared_quantities() {
        let step = |b: mpd_law::ComputationStepBuilder| {
            base().law(copy_law("l", "a", "b")).step(b.build())
        };
        let unknown = ConfigurationError::UnknownQuantity {
            owner: "s".into(),
            quantity: "zzz".into(),
        };

        assert_eq!(
            step(ComputationStep::builder("s", "ns").substep("l", "zzz"))
                .build()
                .unwrap_err(),
            unknown
        );
        assert_eq!(
            step(
                ComputationStep::builder("s", "ns")
                    .substep("l", "b")
                    .uses("zzz")
            )
            .build()
            .unwrap_err(),
            unknown
        );
    }

    #[test]
    fn derived_quantities_checked() {
        let twice = |target: &str, input: &str| {
            DerivedQuantity::new(target, "ns", |ctx| Ok(ctx.get("a")? * 2.0)).uses(input)
        };

        let model = base().derived(twice("b", "a")).build().unwrap();
        assert_eq!(model.derived_quantities().len(), 1);
        assert!(model.derived("b").is_some());
        assert!(model.derived("a").is_none());
        assert!(model.to_string().contains("derived ns::b from [a]"));

        assert_eq!(
            base().derived(twice("zzz", "a")).build().unwrap_err(),
            ConfigurationError::UnknownDeclaration {
                kind: "quantity",
                name: "zzz".into()
            }
        );
        assert_eq!(
            base().derived(twice("b", "zzz")).build().unwrap_err(),
            ConfigurationError::UnknownQuantity {
                owner: "b".into(),
                quantity: "zzz".into()
            }
        );
        assert_eq!(
            base().derived(twice("k", "a")).build().unwrap_err(),
            ConfigurationError::DerivedConstant { quantity: "k".into() }
        );
        assert!(matches!(
            base()
                .derived(twice("b", "a"))
                .derived(twice("b", "a"))
                .build()
                .unwrap_err(),
            ConfigurationError::DuplicateDeclaration {
                kind: "derived quantity",
                ..
            }
        ));
    }

    #[test]
    fn step_may_not_write_constant() {
        let law = Law::builder("lk", "ns")
            .uses("a")
            .solvable("k", |ctx| Ok(ctx.get("a")?.clone()))
            .residual(|ctx| Ok(ctx.get("a")? - ctx.get("k")?))
            .build();
        let err = base()
            .law(law)
            .step(ComputationStep::builder("s", "ns").substep("lk", "k").build())
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::WritesConstant {
                step: "s".into(),
                quantity: "k".into()
            }
        );
    }

    #[test]
    fn connected_cyclic_step_must_close() {
        // l1: a -> b, l2: b -> a closes; l3: k -> a does not.
        let ok = base()
            .law(copy_law("l1", "a", "b"))
            .law(copy_law("l2", "b", "a"))
            .step(
                ComputationStep::builder("s", "ns")
                    .substep("l1", "b")
                    .substep("l2", "a")
                    .cyclic()
                    .connected()
                    .build(),
            )
            .build();
        assert!(ok.is_ok());

        let err = base()
            .law(copy_law("l1", "a", "b"))
            .law(copy_law("l3", "k", "a"))
            .step(
                ComputationStep::builder("s", "ns")
                    .substep("l1", "b")
                    .substep("l3", "a")
                    .connected()
                    .build(),
            )
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::DisconnectedStep {
                step: "s".into(),
                law: "l3".into(),
                quantity: "b".into()
            }
        );
    }

    #[test]
    fn edges_validated() {
        let err = base()
            .law(copy_law("l", "a", "b"))
            .edge("k", "l")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::Graph(GraphError::EdgeNotUsedByLaw { .. })
        ));
    }

    #[test]
    fn inferred_and_variable_edges() {
        let model = base()
            .law(
                Law::builder("l", "ns")
                    .uses("k")
                    .uses("a")
                    .solvable("b", |ctx| Ok(ctx.get("a")? * ctx.get("k")?))
                    .residual(|ctx| Ok(ctx.get("b")?.clone()))
                    .build(),
            )
            .infer_edges()
            .build()
            .unwrap();
        assert_eq!(
            model.edges(),
            &[Edge::new("k", "l"), Edge::new("a", "l"), Edge::new("b", "l")]
        );
        assert_eq!(model.inferred_edges(), model.edges());
        assert_eq!(
            model.variable_edges(),
            vec![Edge::new("a", "l"), Edge::new("b", "l")]
        );
        assert_eq!(model.variable_quantities().count(), 2);
        assert_eq!(model.constant_quantities().count(), 1);
        assert_eq!(model.field_quantities().count(), 3);
        assert_eq!(model.uniform_quantities().count(), 0);
    }

    #[test]
    fn enumerate_cycles_in_rejects_unknown_names() {
        let model = base().law(copy_law("l", "a", "b")).build().unwrap();
        assert!(matches!(
            model.enumerate_cycles_in(&[Edge::new("a", "missing")]),
            Err(GraphError::MalformedEdge { .. })
        ));
        assert!(model
            .enumerate_cycles_in(&[Edge::new("a", "l")])
            .unwrap()
            .is_empty());
    }

    #[test]
    fn display_summarises() {
        let model = base().build().unwrap();
        let s = model.to_string();
        assert!(s.starts_with("model: 3 quantities, 0 laws, 0 steps, 0 edges"));
        assert!(s.contains("quantity ns::k"));
    }
}
