//! State container and relaxation solver for MPD models.
//!
//! A [`State`] holds one array per declared quantity over a spatial
//! [`Domain`](mpd_space::Domain). Computation steps are solved in place
//! by Gauss–Seidel relaxation: every pass evaluates the step's substeps
//! in order, assigning each result before the next substep reads it,
//! until the convergence law's residual falls below tolerance.
//! [`State::update`] refreshes the model's derived quantities.
//!
//! # Quick start
//!
//! ```
//! use mpd_core::QuantityDecl;
//! use mpd_engine::State;
//! use mpd_law::{ComputationStep, Law};
//! use mpd_model::Model;
//! use mpd_space::Domain;
//!
//! let model = Model::builder()
//!     .quantity(QuantityDecl::new("x", "demo"))
//!     .law(
//!         Law::builder("halving", "demo")
//!             .solvable("x", |ctx| Ok(ctx.get("x")?.mapv(|v| 0.5 * v + 1.0)))
//!             .residual(|ctx| Ok(ctx.get("x")?.mapv(|v| v - (0.5 * v + 1.0))))
//!             .build(),
//!     )
//!     .step(
//!         ComputationStep::builder("relax", "demo")
//!             .substep("halving", "x")
//!             .cyclic()
//!             .build(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let mut state = State::create(model, Domain::linspace(0.0, 1.0, 4).unwrap()).unwrap();
//! let report = state.solve("relax", 1e-6, 100).unwrap();
//! assert_eq!(report.iterations, 20);
//! assert!((state.get("x").unwrap()[[0]] - 2.0).abs() < 1e-5);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cancel;
pub mod config;
pub mod error;
pub mod metrics;
pub mod solver;
pub mod state;

pub use cancel::CancelToken;
pub use config::{ConfigError, SolverConfig};
pub use error::{NonConvergenceError, SolveError, StateError};
pub use metrics::SolveReport;
pub use state::State;
