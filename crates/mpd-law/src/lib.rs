//! Laws and computation steps for MPD models.
//!
//! A [`Law`] is a named relation between quantities. It carries one pure
//! compute function per quantity it can be solved for, plus a residual
//! function that is zero when the relation holds. Law functions read the
//! current values through a [`LawContext`].
//!
//! A [`ComputationStep`] is an ordered list of `(law, quantity)`
//! substeps executed as one Gauss–Seidel relaxation pass.
//!
//! A [`DerivedQuantity`] attaches a compute function to a quantity that
//! no step solves for; the state refreshes it on request.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod context;
pub mod derived;
pub mod law;
pub mod step;

pub use context::LawContext;
pub use derived::DerivedQuantity;
pub use law::{Law, LawBuilder, LawFn};
pub use step::{ComputationStep, ComputationStepBuilder, Substep};
