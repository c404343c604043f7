//! Reusable model fixtures.
//!
//! - [`drift_diffusion_model`]: van Roosbroeck drift–diffusion quantities
//!   and laws with the five-substep `cycle1` relaxation step.
//! - [`product_model`]: `c = a * b`, solvable for every operand.
//! - [`halving_model`]: `x = x / 2 + 1`, converges in a known number of passes.
//! - [`never_converging_model`]: residual pinned at one.
//! - [`thermal_model`]: thermal energy and voltage as derived quantities.

use std::sync::Arc;

use mpd_core::{Dimension, LawError, QuantityDecl, Value};
use mpd_law::{ComputationStep, DerivedQuantity, Law, LawContext};
use mpd_model::{Edge, Model};

pub const NAMESPACE: &str = "van_roosbroeck";

/// Name of the drift–diffusion relaxation step.
pub const CYCLE_STEP: &str = "cycle1";

/// Name of the acyclic step computing the absolute permittivity.
pub const PERMITTIVITY_STEP: &str = "permittivity";

pub const ELEMENTARY_CHARGE: f64 = -1.60217662e-19;
pub const BOLTZMANN_CONSTANT: f64 = 1.38064852e-23;
pub const ELECTRIC_CONSTANT: f64 = 8.85418782e-12;
pub const TEMPERATURE: f64 = 200.0;

// ── Drift–diffusion ────────────────────────────────────────────────

/// The van Roosbroeck drift–diffusion model.
///
/// Constants carry their physical values as initial values; variables
/// start at zero. Seed the variables with [`drift_diffusion_initial_values`].
pub fn drift_diffusion_model() -> Arc<Model> {
    let mut builder = Model::builder();
    for decl in drift_diffusion_quantities() {
        builder = builder.quantity(decl);
    }
    builder
        .law(electron_continuity_eqn())
        .law(electron_current())
        .law(electron_density_law())
        .law(electric_field_law())
        .law(displacement_law())
        .law(charge_density_law())
        .law(gauss_law())
        .law(permittivity_law())
        .step(
            ComputationStep::builder(CYCLE_STEP, NAMESPACE)
                .substep("gauss_law", "charge_density")
                .substep("charge_density_law", "electron_density")
                .substep("electron_density_law", "electrostatic_potential")
                .substep("electric_field_law", "electric_field")
                .substep("displacement_law", "displacement")
                .uses("quasifermi_potential")
                .uses("elementary_charge")
                .uses("band_energy")
                .uses("temperature")
                .uses("boltzmann_constant")
                .uses("band_density")
                .uses("doping_profile")
                .uses("displacement")
                .uses("absolute_permittivity")
                .cyclic()
                .connected()
                .build(),
        )
        .step(
            ComputationStep::builder(PERMITTIVITY_STEP, NAMESPACE)
                .substep("permittivity_law", "absolute_permittivity")
                .build(),
        )
        .edges(drift_diffusion_edges())
        .build()
        .expect("drift-diffusion fixture is a valid model")
}

/// Initial conditions for the drift–diffusion variables, as scalars to be
/// broadcast over the domain.
pub fn drift_diffusion_initial_values() -> Vec<(&'static str, f64)> {
    vec![
        ("doping_profile", 1e-21),
        ("relative_permittivity", 1.0),
        ("electron_mobility", 1e-4),
        ("quasifermi_potential", ELEMENTARY_CHARGE * 0.5),
        ("charge_density", -2.0),
    ]
}

/// The five edges of the charge/potential/field/displacement loop.
pub fn drift_diffusion_cycle_edges() -> Vec<Edge> {
    vec![
        Edge::new("charge_density", "gauss_law"),
        Edge::new("electron_density", "charge_density_law"),
        Edge::new("electrostatic_potential", "electron_density_law"),
        Edge::new("electric_field", "electric_field_law"),
        Edge::new("displacement", "displacement_law"),
    ]
}

/// The full authored edge list of the drift–diffusion model.
pub fn drift_diffusion_edges() -> Vec<Edge> {
    [
        ("electron_mobility", "electron_current"),
        ("electron_density", "electron_current"),
        ("current_density", "electron_current"),
        ("elementary_charge", "electron_current"),
        ("electron_density", "electron_density_law"),
        ("quasifermi_potential", "electron_density_law"),
        ("electrostatic_potential", "electron_density_law"),
        ("band_energy", "electron_density_law"),
        ("band_density", "electron_density_law"),
        ("temperature", "electron_density_law"),
        ("boltzmann_constant", "electron_density_law"),
        ("elementary_charge", "electron_density_law"),
        ("electric_field", "electric_field_law"),
        ("displacement", "displacement_law"),
        ("electric_field", "displacement_law"),
        ("absolute_permittivity", "displacement_law"),
        ("doping_profile", "charge_density_law"),
        ("electron_density", "charge_density_law"),
        ("charge_density", "charge_density_law"),
        ("elementary_charge", "charge_density_law"),
        ("charge_density", "gauss_law"),
        ("absolute_permittivity", "permittivity_law"),
        ("relative_permittivity", "permittivity_law"),
        ("electric_constant", "permittivity_law"),
    ]
    .into_iter()
    .map(|(q, l)| Edge::new(q, l))
    .collect()
}

fn drift_diffusion_quantities() -> Vec<QuantityDecl> {
    let variable = |name: &str, dimension: &str| {
        QuantityDecl::new(name, NAMESPACE).with_dimension(Dimension::new(dimension))
    };
    let constant = |name: &str, dimension: &str, value: f64| {
        variable(name, dimension)
            .constant()
            .with_initial_scalar(value)
    };
    vec![
        variable("electron_mobility", ""),
        variable("doping_profile", "VolumeDensity"),
        variable("electron_density", "VolumeDensity"),
        variable("charge_density", ""),
        variable("displacement", ""),
        variable("quasifermi_potential", "ElectricPotential"),
        variable("electrostatic_potential", "ElectricPotential"),
        variable("electric_field", "ElectricField"),
        variable("current_density", "ElectricCurrentDensity"),
        variable("absolute_permittivity", "ElectricalPermittivity").uniform(),
        variable("relative_permittivity", Dimension::DIMENSIONLESS).uniform(),
        constant("band_energy", "Energy", ELEMENTARY_CHARGE * 5.5),
        constant("band_density", "VolumeDensity", 1e25),
        constant("temperature", "Temperature", TEMPERATURE).uniform(),
        constant("boltzmann_constant", "", BOLTZMANN_CONSTANT).uniform(),
        constant("elementary_charge", "ElectricCharge", ELEMENTARY_CHARGE).uniform(),
        constant("electric_constant", "ElectricalPermittivity", ELECTRIC_CONSTANT).uniform(),
        variable("reference_vector", "ElectricalPermittivity")
            .constant()
            .uniform()
            .with_tensor_shape(&[3])
            .with_initial_value(ndarray::arr1(&[1.1, 2.2, 3.3]).into_dyn()),
    ]
}

fn electron_continuity_eqn() -> Law {
    Law::builder("electron_continuity_eqn", NAMESPACE)
        .uses("current_density")
        .residual(|ctx| Ok(-ctx.divergence("current_density")?))
        .build()
}

fn electron_current() -> Law {
    Law::builder("electron_current", NAMESPACE)
        .uses("current_density")
        .uses("quasifermi_potential")
        .uses("electron_density")
        .uses("electron_mobility")
        .uses("elementary_charge")
        .solvable("current_density", current_density)
        .residual(|ctx| Ok(current_density(ctx)? - ctx.get("current_density")?))
        .build()
}

fn current_density(ctx: &LawContext<'_>) -> Result<Value, LawError> {
    let conductance = ctx.get("elementary_charge")? * ctx.get("electron_mobility")?;
    Ok(conductance * ctx.get("electron_density")? * &ctx.gradient("quasifermi_potential")?)
}

fn electron_density_law() -> Law {
    Law::builder("electron_density_law", NAMESPACE)
        .uses("electron_density")
        .uses("temperature")
        .uses("boltzmann_constant")
        .uses("band_energy")
        .uses("quasifermi_potential")
        .uses("electrostatic_potential")
        .uses("elementary_charge")
        .uses("band_density")
        .solvable("electron_density", boltzmann_density)
        .solvable("electrostatic_potential", |ctx| {
            Ok(potential_drop(ctx)? + ctx.get("quasifermi_potential")?)
        })
        .solvable("quasifermi_potential", |ctx| {
            Ok(ctx.get("electrostatic_potential")? - &potential_drop(ctx)?)
        })
        .residual(|ctx| Ok(boltzmann_density(ctx)? - ctx.get("electron_density")?))
        .build()
}

/// `n = Nc * exp((q * (psi - phi_n) - Ec) / (k * T))`
fn boltzmann_density(ctx: &LawContext<'_>) -> Result<Value, LawError> {
    let kt = ctx.get("boltzmann_constant")? * ctx.get("temperature")?;
    let drop = ctx.get("electrostatic_potential")? - ctx.get("quasifermi_potential")?;
    let energy = ctx.get("elementary_charge")? * &drop - ctx.get("band_energy")?;
    Ok((energy / &kt).mapv(f64::exp) * ctx.get("band_density")?)
}

/// `(ln(n / Nc) * k * T + Ec) / q`, the potential offset implied by the density.
fn potential_drop(ctx: &LawContext<'_>) -> Result<Value, LawError> {
    let kt = ctx.get("boltzmann_constant")? * ctx.get("temperature")?;
    let ln_ratio = (ctx.get("electron_density")? / ctx.get("band_density")?).mapv(f64::ln);
    Ok((ln_ratio * &kt + ctx.get("band_energy")?) / ctx.get("elementary_charge")?)
}

fn electric_field_law() -> Law {
    Law::builder("electric_field_law", NAMESPACE)
        .uses("electric_field")
        .uses("electrostatic_potential")
        .solvable("electric_field", |ctx| Ok(-ctx.gradient("electrostatic_potential")?))
        .residual(|ctx| {
            Ok(-ctx.gradient("electrostatic_potential")? - ctx.get("electric_field")?)
        })
        .build()
}

fn displacement_law() -> Law {
    Law::builder("displacement_law", NAMESPACE)
        .uses("displacement")
        .uses("electric_field")
        .uses("absolute_permittivity")
        .solvable("displacement", |ctx| {
            Ok(ctx.get("absolute_permittivity")? * ctx.get("electric_field")?)
        })
        .solvable("electric_field", |ctx| {
            Ok(ctx.get("displacement")? / ctx.get("absolute_permittivity")?)
        })
        .residual(|ctx| {
            Ok(ctx.get("absolute_permittivity")? * ctx.get("electric_field")?
                - ctx.get("displacement")?)
        })
        .build()
}

fn charge_density_law() -> Law {
    Law::builder("charge_density_law", NAMESPACE)
        .uses("charge_density")
        .uses("electron_density")
        .uses("doping_profile")
        .uses("elementary_charge")
        .solvable("charge_density", charge_density)
        .solvable("electron_density", |ctx| {
            let carriers = ctx.get("charge_density")? / ctx.get("elementary_charge")?;
            Ok(ctx.get("doping_profile")? - &carriers)
        })
        .solvable("doping_profile", |ctx| {
            let carriers = ctx.get("charge_density")? / ctx.get("elementary_charge")?;
            Ok(carriers + ctx.get("electron_density")?)
        })
        .residual(|ctx| Ok(charge_density(ctx)? - ctx.get("charge_density")?))
        .build()
}

/// `rho = q * (N_D - n)`
fn charge_density(ctx: &LawContext<'_>) -> Result<Value, LawError> {
    let net = ctx.get("doping_profile")? - ctx.get("electron_density")?;
    Ok(ctx.get("elementary_charge")? * &net)
}

fn gauss_law() -> Law {
    Law::builder("gauss_law", NAMESPACE)
        .uses("charge_density")
        .uses("displacement")
        .solvable("charge_density", |ctx| ctx.divergence("displacement"))
        .residual(|ctx| Ok(ctx.divergence("displacement")? - ctx.get("charge_density")?))
        .build()
}

fn permittivity_law() -> Law {
    Law::builder("permittivity_law", NAMESPACE)
        .uses("absolute_permittivity")
        .uses("relative_permittivity")
        .uses("electric_constant")
        .solvable("absolute_permittivity", |ctx| {
            Ok(ctx.get("electric_constant")? * ctx.get("relative_permittivity")?)
        })
        .solvable("relative_permittivity", |ctx| {
            Ok(ctx.get("absolute_permittivity")? / ctx.get("electric_constant")?)
        })
        .residual(|ctx| {
            Ok(ctx.get("electric_constant")? * ctx.get("relative_permittivity")?
                - ctx.get("absolute_permittivity")?)
        })
        .same_dimension("absolute_permittivity", "electric_constant")
        .build()
}

// ── Small algebraic models ─────────────────────────────────────────

/// `c = a * b` with `a`, `b` and `c` all solvable, plus an acyclic
/// `product` step computing `c`.
pub fn product_model() -> Arc<Model> {
    Model::builder()
        .quantity(QuantityDecl::new("a", "algebra"))
        .quantity(QuantityDecl::new("b", "algebra"))
        .quantity(QuantityDecl::new("c", "algebra"))
        .law(
            Law::builder("product_law", "algebra")
                .uses("a")
                .uses("b")
                .uses("c")
                .solvable("c", |ctx| Ok(ctx.get("a")? * ctx.get("b")?))
                .solvable("a", |ctx| Ok(ctx.get("c")? / ctx.get("b")?))
                .solvable("b", |ctx| Ok(ctx.get("c")? / ctx.get("a")?))
                .residual(|ctx| Ok(ctx.get("a")? * ctx.get("b")? - ctx.get("c")?))
                .build(),
        )
        .step(
            ComputationStep::builder("product", "algebra")
                .substep("product_law", "c")
                .build(),
        )
        .infer_edges()
        .build()
        .expect("product fixture is a valid model")
}

/// `x = x / 2 + 1` as a cyclic step named `halving`.
///
/// Starting from `x = 0`, the residual after pass `k` is exactly `-2^-k`,
/// so a tolerance of `1e-3` is first met on pass 10.
pub fn halving_model() -> Arc<Model> {
    Model::builder()
        .quantity(QuantityDecl::new("x", "algebra"))
        .law(
            Law::builder("halving_law", "algebra")
                .solvable("x", |ctx| Ok(ctx.get("x")?.mapv(|v| 0.5 * v + 1.0)))
                .residual(|ctx| Ok(ctx.get("x")?.mapv(|v| v - (0.5 * v + 1.0))))
                .build(),
        )
        .step(
            ComputationStep::builder("halving", "algebra")
                .substep("halving_law", "x")
                .cyclic()
                .connected()
                .build(),
        )
        .build()
        .expect("halving fixture is a valid model")
}

/// A cyclic step named `runaway` whose residual is one everywhere.
pub fn never_converging_model() -> Arc<Model> {
    Model::builder()
        .quantity(QuantityDecl::new("x", "algebra"))
        .law(
            Law::builder("runaway_law", "algebra")
                .solvable("x", |ctx| Ok(ctx.get("x")? + 1.0))
                .residual(|ctx| Ok(ctx.get("x")?.mapv(|_| 1.0)))
                .build(),
        )
        .step(
            ComputationStep::builder("runaway", "algebra")
                .substep("runaway_law", "x")
                .cyclic()
                .build(),
        )
        .build()
        .expect("never-converging fixture is a valid model")
}

// ── Derived quantities ─────────────────────────────────────────────

/// `thermal_energy = k * T` and `thermal_voltage = thermal_energy / q`.
///
/// Both are derived; the voltage's function is registered first but the
/// energy is declared first, so a state update refreshes the energy
/// before the voltage reads it. Temperature is a field and starts at
/// [`TEMPERATURE`].
pub fn thermal_model() -> Arc<Model> {
    Model::builder()
        .quantity(
            QuantityDecl::new("temperature", NAMESPACE)
                .with_dimension(Dimension::new("Temperature"))
                .with_initial_scalar(TEMPERATURE),
        )
        .quantity(
            QuantityDecl::new("boltzmann_constant", NAMESPACE)
                .constant()
                .uniform()
                .with_initial_scalar(BOLTZMANN_CONSTANT),
        )
        .quantity(
            QuantityDecl::new("elementary_charge", NAMESPACE)
                .with_dimension(Dimension::new("ElectricCharge"))
                .constant()
                .uniform()
                .with_initial_scalar(ELEMENTARY_CHARGE),
        )
        .quantity(
            QuantityDecl::new("thermal_energy", NAMESPACE)
                .with_dimension(Dimension::new("Energy")),
        )
        .quantity(
            QuantityDecl::new("thermal_voltage", NAMESPACE)
                .with_dimension(Dimension::new("ElectricPotential")),
        )
        .derived(
            DerivedQuantity::new("thermal_voltage", NAMESPACE, |ctx| {
                Ok(ctx.get("thermal_energy")? / ctx.get("elementary_charge")?)
            })
            .uses("thermal_energy")
            .uses("elementary_charge"),
        )
        .derived(
            DerivedQuantity::new("thermal_energy", NAMESPACE, |ctx| {
                Ok(ctx.get("boltzmann_constant")? * ctx.get("temperature")?)
            })
            .uses("boltzmann_constant")
            .uses("temperature"),
        )
        .build()
        .expect("thermal fixture is a valid model")
}
