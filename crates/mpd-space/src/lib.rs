//! Spatial domains for MPD states.
//!
//! A [`Domain`] is one or more ordered coordinate axes; its shape is the
//! leading shape of every quantity value in a state. The [`ops`] module
//! provides the finite-difference helpers law bodies use to express
//! differential relationships:
//!
//! - [`derivative_on_space`]: forward differences, last slope repeated
//! - [`gradient`]: central differences over every domain axis
//! - [`divergence`]: sum of central-difference partials of a vector field

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod domain;
pub mod error;
pub mod ops;

pub use domain::Domain;
pub use error::SpaceError;
pub use ops::{derivative_on_space, divergence, gradient};
