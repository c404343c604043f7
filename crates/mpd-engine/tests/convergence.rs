//! Integration test: the drift–diffusion relaxation converges.
//!
//! Ten points over `[0, 0.5]` at 200 K with unit relative permittivity,
//! doping 1e-21 and mobility 1e-4. The permittivity step runs first so
//! the displacement law sees a physical permittivity, then `cycle1` is
//! relaxed to a tolerance of 1e-3.

use mpd_core::max_abs;
use mpd_engine::{SolverConfig, State};
use mpd_space::Domain;
use mpd_test_utils::fixtures::{
    drift_diffusion_initial_values, drift_diffusion_model, halving_model, CYCLE_STEP,
    ELECTRIC_CONSTANT, PERMITTIVITY_STEP,
};

const TOLERANCE: f64 = 1e-3;
const MAX_ITERATIONS: usize = 10_000;

fn seeded_state() -> State {
    let domain = Domain::linspace(0.0, 0.5, 10).unwrap();
    let mut state = State::create(drift_diffusion_model(), domain).unwrap();
    for (name, value) in drift_diffusion_initial_values() {
        state.set_scalar(name, value).unwrap();
    }
    state
}

#[test]
fn permittivity_step_is_a_single_pass() {
    let mut state = seeded_state();
    let report = state
        .solve(PERMITTIVITY_STEP, TOLERANCE, MAX_ITERATIONS)
        .unwrap();
    assert_eq!(report.iterations, 1);
    let eps = state.get("absolute_permittivity").unwrap();
    assert!(eps.iter().all(|&e| e == ELECTRIC_CONSTANT));
}

#[test]
fn drift_diffusion_cycle_converges() {
    let mut state = seeded_state();
    state
        .solve(PERMITTIVITY_STEP, TOLERANCE, MAX_ITERATIONS)
        .unwrap();

    let report = state
        .solve_with(
            CYCLE_STEP,
            &SolverConfig::new(TOLERANCE, MAX_ITERATIONS),
            None,
        )
        .unwrap();
    assert_eq!(report.step, CYCLE_STEP);
    assert!(report.iterations >= 1 && report.iterations <= MAX_ITERATIONS);
    assert!(report.residual < TOLERANCE);

    for law in [
        "gauss_law",
        "charge_density_law",
        "electron_density_law",
        "electric_field_law",
        "displacement_law",
    ] {
        let r = max_abs(&state.residual(law).unwrap());
        assert!(r < TOLERANCE, "{law} residual {r} above tolerance");
    }

    let n = state.get("electron_density").unwrap();
    assert_eq!(n.shape(), &[10]);
    assert!(n.iter().all(|v| v.is_finite()));
    let psi = state.get("electrostatic_potential").unwrap();
    assert!(psi.iter().all(|v| v.is_finite()));
}

#[test]
fn constants_survive_relaxation() {
    let mut state = seeded_state();
    let before = state.get("band_energy").unwrap().clone();
    state
        .solve(PERMITTIVITY_STEP, TOLERANCE, MAX_ITERATIONS)
        .unwrap();
    state.solve(CYCLE_STEP, TOLERANCE, MAX_ITERATIONS).unwrap();
    assert_eq!(state.get("band_energy").unwrap(), &before);
}

#[test]
fn halving_reaches_its_fixed_point() {
    let mut state = State::create(halving_model(), Domain::linspace(0.0, 1.0, 5).unwrap())
        .unwrap();
    let report = state.solve("halving", 1e-12, 1_000).unwrap();
    assert_eq!(report.iterations, 40);
    assert!(state
        .get("x")
        .unwrap()
        .iter()
        .all(|&x| (x - 2.0).abs() < 1e-11));
}
