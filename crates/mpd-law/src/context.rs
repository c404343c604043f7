//! Evaluation context passed to law functions.
//!
//! [`LawContext`] pairs read access to the current quantity values with
//! the spatial domain they live on, so a law body can read operands and
//! apply finite-difference operators without touching the state directly.

use mpd_core::{LawError, QuantityReader, Value};
use mpd_space::{derivative_on_space, divergence, gradient, Domain, SpaceError};

/// Execution context handed to every law compute and residual function.
///
/// Uses dynamic dispatch (`&dyn QuantityReader`) so laws stay independent
/// of the state container and can be evaluated against mock readers in
/// tests. During relaxation the reader is the live state, so a substep
/// sees every value assigned by earlier substeps of the same pass.
pub struct LawContext<'a> {
    reads: &'a dyn QuantityReader,
    domain: &'a Domain,
}

impl<'a> LawContext<'a> {
    /// Construct a context over a reader and a domain.
    pub fn new(reads: &'a dyn QuantityReader, domain: &'a Domain) -> Self {
        Self { reads, domain }
    }

    /// The underlying reader.
    pub fn reads(&self) -> &'a dyn QuantityReader {
        self.reads
    }

    /// The spatial domain of the values being read.
    pub fn domain(&self) -> &'a Domain {
        self.domain
    }

    /// Current value of a quantity.
    ///
    /// Fails with [`LawError::MissingQuantity`] if the quantity is unknown
    /// or unset.
    pub fn get(&self, name: &str) -> Result<&'a Value, LawError> {
        self.reads
            .read(name)
            .ok_or_else(|| LawError::MissingQuantity {
                name: name.to_string(),
            })
    }

    /// Forward-difference derivative of a quantity along the first domain axis.
    pub fn derivative(&self, name: &str) -> Result<Value, LawError> {
        let values = self.get(name)?;
        let coords = self.domain.axis(0).ok_or(SpaceError::EmptyDomain)?;
        Ok(derivative_on_space(values, coords)?)
    }

    /// Central-difference gradient of a quantity over the domain.
    pub fn gradient(&self, name: &str) -> Result<Value, LawError> {
        Ok(gradient(self.get(name)?, self.domain)?)
    }

    /// Central-difference divergence of a vector quantity over the domain.
    pub fn divergence(&self, name: &str) -> Result<Value, LawError> {
        Ok(divergence(self.get(name)?, self.domain)?)
    }
}
