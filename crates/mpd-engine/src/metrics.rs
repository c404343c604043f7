//! Outcome of a successful relaxation.

/// Summary of a converged solve.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SolveReport {
    /// Name of the solved step.
    pub step: String,
    /// Number of passes executed, including the converging one.
    pub iterations: usize,
    /// Maximum absolute residual after the final pass.
    pub residual: f64,
    /// Wall-clock time for the whole solve, in microseconds.
    pub elapsed_us: u64,
}
