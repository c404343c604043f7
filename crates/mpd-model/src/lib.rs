//! Model assembly and dependency analysis for MPD.
//!
//! A [`Model`] is the immutable, validated collection of quantity
//! declarations, laws, computation steps and dependency edges. It is
//! assembled with a [`ModelBuilder`], whose `build()` runs every
//! load-time check and fails fast on the first problem.
//!
//! The [`graph`] module treats quantities and laws as the two node kinds
//! of a bipartite graph and enumerates its simple cycles.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod graph;
pub mod model;
pub mod registry;

pub use error::{ConfigurationError, GraphError};
pub use graph::{enumerate_cycles, Cycle, Edge};
pub use model::{Model, ModelBuilder};
pub use registry::{Declaration, Registry};
