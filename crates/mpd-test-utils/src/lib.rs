//! Test utilities and mock types for MPD development.
//!
//! Provides a mock implementation of [`QuantityReader`] for evaluating
//! laws without a state, and the [`fixtures`] module of ready-made
//! models shared by tests and benchmarks.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::HashMap;

use mpd_core::{QuantityReader, Value};

/// Mock implementation of [`QuantityReader`].
///
/// Backed by a `HashMap<String, Value>`. Pre-populate quantities with
/// [`set_quantity`](MockQuantityReader::set_quantity) before handing the
/// reader to a law through a `LawContext`.
pub struct MockQuantityReader {
    values: HashMap<String, Value>,
}

impl MockQuantityReader {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Set or replace a quantity's value.
    pub fn set_quantity(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Remove a quantity so reads of it fail.
    pub fn clear_quantity(&mut self, name: &str) {
        self.values.remove(name);
    }
}

impl Default for MockQuantityReader {
    fn default() -> Self {
        Self::new()
    }
}

impl QuantityReader for MockQuantityReader {
    fn read(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn mock_reader_round_trip() {
        let mut r = MockQuantityReader::new();
        r.set_quantity("x", arr1(&[1.0, 2.0]).into_dyn());
        assert_eq!(r.read("x").unwrap().len(), 2);
        r.clear_quantity("x");
        assert!(r.read("x").is_none());
    }
}
