//! Core types and traits for the MPD relaxation engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the value representation shared by every other crate, quantity
//! declarations with their dimension tags, the error type returned by
//! law functions, and the read trait law functions evaluate against.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod quantity;
pub mod traits;
pub mod value;

pub use error::{LawError, QuantityError};
pub use quantity::{Dimension, QuantityDecl};
pub use traits::QuantityReader;
pub use value::{broadcast_to, full_shape, max_abs, Shape, Value};
