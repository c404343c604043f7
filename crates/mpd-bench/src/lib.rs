//! Benchmark profiles for the MPD relaxation engine.
//!
//! - [`drift_diffusion_profile`]: seeded drift–diffusion state ready to relax
//! - [`ring_model`]: `n` laws chained into one loop, for cycle enumeration
//! - [`halving_profile`]: the halving fixed point over a large grid

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;

use mpd_core::QuantityDecl;
use mpd_engine::State;
use mpd_law::Law;
use mpd_model::{ConfigurationError, Model};
use mpd_space::Domain;
use mpd_test_utils::fixtures::{
    drift_diffusion_initial_values, drift_diffusion_model, halving_model, PERMITTIVITY_STEP,
};

/// A drift–diffusion state over `points` samples of `[0, 0.5]` with the
/// initial conditions applied and the permittivity step solved.
pub fn drift_diffusion_profile(points: usize) -> State {
    let domain = Domain::linspace(0.0, 0.5, points).expect("points must be at least 1");
    let mut state = State::create(drift_diffusion_model(), domain).expect("fixture state");
    for (name, value) in drift_diffusion_initial_values() {
        state.set_scalar(name, value).expect("fixture quantity");
    }
    state
        .solve(PERMITTIVITY_STEP, 1e-3, 1)
        .expect("permittivity step is a single pass");
    state
}

/// The halving fixed point over `points` samples.
pub fn halving_profile(points: usize) -> State {
    let domain = Domain::linspace(0.0, 1.0, points).expect("points must be at least 1");
    State::create(halving_model(), domain).expect("fixture state")
}

/// `n` quantities `q0..q{n-1}` and `n` laws where `law_i` relates `q_i`
/// and `q_{i+1}` (wrapping). Edges are inferred, so the graph holds a
/// single loop through every law in each direction.
pub fn ring_model(n: usize) -> Result<Arc<Model>, ConfigurationError> {
    let mut builder = Model::builder();
    for i in 0..n {
        builder = builder.quantity(QuantityDecl::new(format!("q{i}"), "ring"));
    }
    for i in 0..n {
        let next = format!("q{}", (i + 1) % n);
        let this = format!("q{i}");
        let source = this.clone();
        builder = builder.law(
            Law::builder(format!("law{i}"), "ring")
                .uses(this.clone())
                .solvable(next.clone(), move |ctx| Ok(ctx.get(&source)?.clone()))
                .residual(move |ctx| Ok(ctx.get(&next)? - ctx.get(&this)?))
                .build(),
        );
    }
    builder.infer_edges().build()
}
