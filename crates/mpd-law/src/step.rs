//! Computation steps: ordered substeps solved as one relaxation pass.

use std::fmt;

/// One `(law, quantity)` pair of a computation step.
///
/// Executing the substep evaluates the law's compute function for the
/// quantity and assigns the result to the state immediately.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Substep {
    /// Name of the law to evaluate.
    pub law: String,
    /// Name of the quantity the law is solved for.
    pub quantity: String,
}

impl Substep {
    /// Create a substep.
    pub fn new(law: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            law: law.into(),
            quantity: quantity.into(),
        }
    }
}

impl fmt::Display for Substep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.law, self.quantity)
    }
}

/// An ordered sequence of substeps describing one relaxation pass.
///
/// A cyclic step is repeated until its convergence law's residual falls
/// below tolerance; an acyclic step runs a single pass. When
/// `is_connected` is set, each substep's law must use the quantity
/// written by the previous substep, which the model checks at load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComputationStep {
    /// Step name, unique within the owning model.
    pub name: String,
    /// Identifier of the owning namespace.
    pub namespace: String,
    /// Substeps in execution order.
    pub substeps: Vec<Substep>,
    /// Whether the step closes a dependency cycle and needs relaxation.
    pub is_cyclic: bool,
    /// Whether consecutive substeps must form a connected chain.
    pub is_connected: bool,
    /// Informational list of quantities the step touches.
    pub used_quantities: Vec<String>,
    /// Law whose residual decides convergence. Defaults to the last substep's law.
    pub convergence_law: Option<String>,
}

impl ComputationStep {
    /// Start building a step.
    pub fn builder(
        name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> ComputationStepBuilder {
        ComputationStepBuilder {
            step: ComputationStep {
                name: name.into(),
                namespace: namespace.into(),
                substeps: Vec::new(),
                is_cyclic: false,
                is_connected: false,
                used_quantities: Vec::new(),
                convergence_law: None,
            },
        }
    }

    /// The law whose residual decides convergence.
    ///
    /// `None` only for a step without substeps.
    pub fn convergence_law(&self) -> Option<&str> {
        self.convergence_law
            .as_deref()
            .or_else(|| self.substeps.last().map(|s| s.law.as_str()))
    }

    /// Quantities assigned by the step, in substep order.
    pub fn written_quantities(&self) -> impl Iterator<Item = &str> + '_ {
        self.substeps.iter().map(|s| s.quantity.as_str())
    }

    /// Laws evaluated by the step, in substep order.
    pub fn laws(&self) -> impl Iterator<Item = &str> + '_ {
        self.substeps.iter().map(|s| s.law.as_str())
    }
}

impl fmt::Display for ComputationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {}::{}", self.namespace, self.name)?;
        if self.is_cyclic {
            write!(f, " (cyclic)")?;
        }
        for (i, s) in self.substeps.iter().enumerate() {
            write!(f, "\n  {}. {s}", i + 1)?;
        }
        Ok(())
    }
}

/// Builder for [`ComputationStep`].
pub struct ComputationStepBuilder {
    step: ComputationStep,
}

impl ComputationStepBuilder {
    /// Append a substep solving `law` for `quantity`.
    pub fn substep(mut self, law: impl Into<String>, quantity: impl Into<String>) -> Self {
        self.step.substeps.push(Substep::new(law, quantity));
        self
    }

    /// Mark the step cyclic.
    pub fn cyclic(mut self) -> Self {
        self.step.is_cyclic = true;
        self
    }

    /// Require consecutive substeps to be connected.
    pub fn connected(mut self) -> Self {
        self.step.is_connected = true;
        self
    }

    /// Record a quantity the step touches.
    pub fn uses(mut self, quantity: impl Into<String>) -> Self {
        self.step.used_quantities.push(quantity.into());
        self
    }

    /// Decide convergence with `law` instead of the last substep's law.
    pub fn convergence_law(mut self, law: impl Into<String>) -> Self {
        self.step.convergence_law = Some(law.into());
        self
    }

    /// Finish the step.
    pub fn build(self) -> ComputationStep {
        self.step
    }
}
