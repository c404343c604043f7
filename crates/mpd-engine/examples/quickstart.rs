//! MPD quickstart: a complete model relaxed from scratch.
//!
//! Demonstrates:
//!   1. Declaring quantities with dimension tags
//!   2. Writing a law solvable for two of its quantities
//!   3. Assembling a model with a cyclic computation step
//!   4. Creating a state over a 1-D domain and relaxing it
//!   5. Inspecting residuals and blending two solutions
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example quickstart

use mpd_core::{max_abs, Dimension, QuantityDecl};
use mpd_engine::{SolveError, State};
use mpd_law::{ComputationStep, Law};
use mpd_model::Model;
use mpd_space::Domain;

// ─── Model ───────────────────────────────────────────────────────
//
// A damped fixed point: `u = (u + s / u) / 2` converges to `sqrt(s)`
// (Heron's method) for any positive start. The source `s` is a field
// set from the coordinates, so every grid point solves its own root.

fn heron_model() -> Result<std::sync::Arc<Model>, Box<dyn std::error::Error>> {
    let model = Model::builder()
        .quantity(
            QuantityDecl::new("u", "demo")
                .with_dimension(Dimension::new("Length"))
                .with_initial_scalar(1.0),
        )
        .quantity(QuantityDecl::new("s", "demo").with_dimension(Dimension::new("Area")))
        .law(
            Law::builder("heron_law", "demo")
                .uses("u")
                .uses("s")
                .solvable("u", |ctx| {
                    let u = ctx.get("u")?;
                    Ok((u + &(ctx.get("s")? / u)) * 0.5)
                })
                .solvable("s", |ctx| Ok(ctx.get("u")?.mapv(|u| u * u)))
                .residual(|ctx| Ok(ctx.get("u")?.mapv(|u| u * u) - ctx.get("s")?))
                .build(),
        )
        .step(
            ComputationStep::builder("root", "demo")
                .substep("heron_law", "u")
                .cyclic()
                .connected()
                .build(),
        )
        .infer_edges()
        .build()?;
    Ok(model)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let model = heron_model()?;
    println!("{model}");

    let domain = Domain::linspace(1.0, 10.0, 10)?;
    let coords: Vec<f64> = domain.axis(0).unwrap_or_default().to_vec();
    let mut state = State::create(model.clone(), domain.clone())?;
    state.set("s", ndarray::arr1(&coords).into_dyn())?;

    // ─── Relax ───────────────────────────────────────────────────
    let report = state.solve("root", 1e-10, 100)?;
    println!(
        "converged in {} passes, residual {:e}, {} us",
        report.iterations, report.residual, report.elapsed_us
    );
    println!("{state}");

    // ─── A cap that is too small ─────────────────────────────────
    let mut rough = State::create(model, domain)?;
    rough.set("s", ndarray::arr1(&coords).into_dyn())?;
    match rough.solve("root", 1e-10, 2) {
        Err(SolveError::NonConvergence(e)) => println!("expected: {e}"),
        other => println!("unexpected: {other:?}"),
    }
    println!(
        "rough residual {:e}",
        max_abs(&rough.residual("heron_law")?)
    );

    // ─── Blend ───────────────────────────────────────────────────
    rough.interpolate01(&state, 0.5)?;
    println!("blended u: {}", rough.get("u")?);

    Ok(())
}
