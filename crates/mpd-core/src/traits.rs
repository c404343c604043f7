//! Core abstraction trait for reading quantity values.

use crate::value::Value;

/// Read-only access to quantity values.
///
/// Implemented by the state container to give law functions access to
/// the current values. Returns `None` if the quantity is unknown or
/// currently unset.
pub trait QuantityReader {
    /// Read the current value of a quantity by name.
    fn read(&self, name: &str) -> Option<&Value>;
}
