//! MPD: multi-physics relaxation over named quantities, laws, and
//! computation steps.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all MPD sub-crates. Adding `mpd` as a single dependency is enough for
//! most users.
//!
//! # Quick start
//!
//! ```rust
//! use mpd::prelude::*;
//!
//! // c = a * b, solvable for c.
//! let model = Model::builder()
//!     .quantity(QuantityDecl::new("a", "demo").with_initial_scalar(3.0))
//!     .quantity(QuantityDecl::new("b", "demo").with_initial_scalar(4.0))
//!     .quantity(QuantityDecl::new("c", "demo"))
//!     .law(
//!         Law::builder("product", "demo")
//!             .uses("a")
//!             .uses("b")
//!             .solvable("c", |ctx| Ok(ctx.get("a")? * ctx.get("b")?))
//!             .residual(|ctx| Ok(ctx.get("a")? * ctx.get("b")? - ctx.get("c")?))
//!             .build(),
//!     )
//!     .step(ComputationStep::builder("multiply", "demo").substep("product", "c").build())
//!     .build()
//!     .unwrap();
//!
//! let mut state = State::create(model, Domain::linspace(0.0, 1.0, 5).unwrap()).unwrap();
//! let report = state.solve("multiply", 1e-9, 10).unwrap();
//! assert_eq!(report.iterations, 1);
//! assert!(state.get("c").unwrap().iter().all(|&c| c == 12.0));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `mpd-core` | `Value`, quantity declarations, dimensions, `LawError`, `QuantityError` |
//! | [`space`] | `mpd-space` | Domains and finite-difference operators |
//! | [`law`] | `mpd-law` | Laws, law contexts, derived quantities, computation steps |
//! | [`model`] | `mpd-model` | Registries, model assembly, dependency cycles |
//! | [`engine`] | `mpd-engine` | State container and relaxation solver |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core value types and declarations (`mpd-core`).
pub use mpd_core as types;

/// Spatial domains and finite differences (`mpd-space`).
///
/// [`space::Domain`] plus [`space::derivative_on_space`],
/// [`space::gradient`], and [`space::divergence`].
pub use mpd_space as space;

/// Laws and computation steps (`mpd-law`).
pub use mpd_law as law;

/// Model assembly and validation (`mpd-model`).
///
/// [`model::Model::builder`] checks every cross-reference at build time;
/// [`model::Model::enumerate_cycles`] finds dependency loops.
pub use mpd_model as model;

/// State container and relaxation solver (`mpd-engine`).
pub use mpd_engine as engine;

/// Common imports for typical MPD usage.
///
/// ```rust
/// use mpd::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use mpd_core::{Dimension, QuantityDecl, QuantityReader, Value};

    // Errors
    pub use mpd_core::{LawError, QuantityError};
    pub use mpd_engine::{NonConvergenceError, SolveError, StateError};
    pub use mpd_model::{ConfigurationError, GraphError};
    pub use mpd_space::SpaceError;

    // Space
    pub use mpd_space::Domain;

    // Laws
    pub use mpd_law::{ComputationStep, DerivedQuantity, Law, LawContext};

    // Model
    pub use mpd_model::{Cycle, Edge, Model};

    // Engine
    pub use mpd_engine::{CancelToken, SolveReport, SolverConfig, State};
}
