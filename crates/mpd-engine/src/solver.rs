//! Gauss–Seidel relaxation of computation steps.
//!
//! A pass evaluates every substep of a step in declared order, assigning
//! each result before the next substep reads the state. Cyclic steps
//! repeat passes until the convergence law's residual is below tolerance
//! or the iteration cap is reached. Acyclic steps run exactly one pass.

use crate::cancel::CancelToken;
use crate::config::SolverConfig;
use crate::error::{NonConvergenceError, SolveError};
use crate::metrics::SolveReport;
use crate::state::State;
use mpd_core::max_abs;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace, warn};

impl State {
    /// Relax `step` until converged or `max_iterations` passes have run.
    ///
    /// Shorthand for [`solve_with`](State::solve_with) without a cancel token.
    pub fn solve(
        &mut self,
        step: &str,
        tolerance: f64,
        max_iterations: usize,
    ) -> Result<SolveReport, SolveError> {
        self.solve_with(step, &SolverConfig::new(tolerance, max_iterations), None)
    }

    /// Relax `step` under `config`, checking `cancel` before every pass.
    ///
    /// On [`SolveError::NonConvergence`] or [`SolveError::Cancelled`] the
    /// state keeps the values of the last completed pass.
    pub fn solve_with(
        &mut self,
        step: &str,
        config: &SolverConfig,
        cancel: Option<&CancelToken>,
    ) -> Result<SolveReport, SolveError> {
        config.validate()?;
        let model = Arc::clone(self.model());
        let step = model.step(step).ok_or_else(|| SolveError::UnknownStep {
            name: step.to_string(),
        })?;

        let passes = if step.is_cyclic {
            config.max_iterations
        } else {
            1
        };
        let convergence_law = step.convergence_law();
        debug!(
            step = %step.name,
            substeps = step.substeps.len(),
            cyclic = step.is_cyclic,
            tolerance = config.tolerance,
            max_iterations = passes,
            "solve started"
        );

        let start = Instant::now();
        let mut residual = f64::NAN;
        for pass in 1..=passes {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                debug!(step = %step.name, iterations = pass - 1, "solve cancelled");
                return Err(SolveError::Cancelled {
                    iterations: pass - 1,
                });
            }

            for sub in &step.substeps {
                self.apply(&sub.law, &sub.quantity)?;
            }
            residual = match convergence_law {
                Some(law) => max_abs(&self.residual(law)?),
                None => 0.0,
            };
            trace!(step = %step.name, pass, residual, "relaxation pass");

            if residual < config.tolerance {
                let report = SolveReport {
                    step: step.name.clone(),
                    iterations: pass,
                    residual,
                    elapsed_us: start.elapsed().as_micros() as u64,
                };
                debug!(
                    step = %report.step,
                    iterations = report.iterations,
                    residual = report.residual,
                    elapsed_us = report.elapsed_us,
                    "solve converged"
                );
                return Ok(report);
            }
        }

        warn!(
            step = %step.name,
            iterations = passes,
            residual,
            tolerance = config.tolerance,
            "solve did not converge"
        );
        Err(NonConvergenceError {
            step: step.name.clone(),
            iterations: passes,
            residual,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::error::StateError;
    use mpd_space::Domain;
    use mpd_test_utils::fixtures::{halving_model, never_converging_model, product_model};

    fn line(n: usize) -> Domain {
        Domain::linspace(0.0, 1.0, n).unwrap()
    }

    #[test]
    fn halving_converges_on_tenth_pass() {
        let mut s = State::create(halving_model(), line(3)).unwrap();
        let report = s.solve("halving", 1e-3, 100).unwrap();
        assert_eq!(report.step, "halving");
        assert_eq!(report.iterations, 10);
        assert_eq!(report.residual, 2f64.powi(-10));
        assert!(s.get("x").unwrap().iter().all(|&x| x == 2.0 - 2f64.powi(-9)));
    }

    #[test]
    fn cap_exhausted_reports_last_residual() {
        let mut s = State::create(never_converging_model(), line(3)).unwrap();
        let err = s.solve("runaway", 1e-3, 7).unwrap_err();
        assert_eq!(
            err,
            SolveError::NonConvergence(NonConvergenceError {
                step: "runaway".into(),
                iterations: 7,
                residual: 1.0,
            })
        );
        assert!(s.get("x").unwrap().iter().all(|&x| x == 7.0));
    }

    #[test]
    fn acyclic_step_runs_once() {
        let mut s = State::create(product_model(), line(2)).unwrap();
        s.set_scalar("a", 2.0).unwrap();
        s.set_scalar("b", 3.0).unwrap();
        let report = s.solve("product", 1e-9, 50).unwrap();
        assert_eq!(report.iterations, 1);
        assert_eq!(report.residual, 0.0);
        assert!(s.get("c").unwrap().iter().all(|&c| c == 6.0));
    }

    #[test]
    fn cancelled_before_first_pass() {
        let mut s = State::create(halving_model(), line(3)).unwrap();
        let token = CancelToken::new();
        token.cancel();
        let err = s
            .solve_with("halving", &SolverConfig::default(), Some(&token))
            .unwrap_err();
        assert_eq!(err, SolveError::Cancelled { iterations: 0 });
        assert!(s.get("x").unwrap().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut s = State::create(halving_model(), line(3)).unwrap();
        assert_eq!(
            s.solve("halving", 1e-3, 0),
            Err(SolveError::Config(ConfigError::ZeroIterations))
        );
        assert!(matches!(
            s.solve("halving", f64::NAN, 10),
            Err(SolveError::Config(ConfigError::InvalidTolerance { .. }))
        ));
    }

    #[test]
    fn unknown_step() {
        let mut s = State::create(halving_model(), line(3)).unwrap();
        assert_eq!(
            s.solve("nope", 1e-3, 10),
            Err(SolveError::UnknownStep {
                name: "nope".into()
            })
        );
    }

    #[test]
    fn failing_substep_surfaces_state_error() {
        let mut s = State::create(halving_model(), line(3)).unwrap();
        s.unset("x").unwrap();
        match s.solve("halving", 1e-3, 10) {
            Err(SolveError::State(StateError::Law { law, .. })) => {
                assert_eq!(law, "halving_law")
            }
            other => panic!("expected law failure, got {other:?}"),
        }
    }
}
