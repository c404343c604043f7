//! Insertion-ordered, name-keyed declaration registries.

use crate::error::ConfigurationError;
use indexmap::IndexMap;
use mpd_core::QuantityDecl;
use mpd_law::{ComputationStep, DerivedQuantity, Law};

/// A named declaration that can live in a [`Registry`].
pub trait Declaration {
    /// Human-readable kind used in error messages.
    const KIND: &'static str;

    /// Name, unique within the model.
    fn name(&self) -> &str;

    /// Identifier of the owning namespace.
    fn namespace(&self) -> &str;
}

impl Declaration for QuantityDecl {
    const KIND: &'static str = "quantity";

    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl Declaration for Law {
    const KIND: &'static str = "law";

    fn name(&self) -> &str {
        Law::name(self)
    }

    fn namespace(&self) -> &str {
        Law::namespace(self)
    }
}

impl Declaration for DerivedQuantity {
    const KIND: &'static str = "derived quantity";

    fn name(&self) -> &str {
        self.quantity()
    }

    fn namespace(&self) -> &str {
        DerivedQuantity::namespace(self)
    }
}

impl Declaration for ComputationStep {
    const KIND: &'static str = "step";

    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }
}

/// Declarations of one kind, keyed by bare name in declaration order.
///
/// Namespaces are kept for reporting only. A name may appear once across
/// all namespaces, because states and steps look declarations up by
/// bare name.
#[derive(Debug)]
pub struct Registry<T> {
    items: IndexMap<String, T>,
}

impl<T: Declaration> Registry<T> {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            items: IndexMap::new(),
        }
    }

    /// Register a declaration, rejecting empty and repeated names.
    pub fn insert(&mut self, item: T) -> Result<(), ConfigurationError> {
        if item.name().is_empty() {
            return Err(ConfigurationError::EmptyName { kind: T::KIND });
        }
        if let Some(existing) = self.items.get(item.name()) {
            return Err(if existing.namespace() == item.namespace() {
                ConfigurationError::DuplicateDeclaration {
                    kind: T::KIND,
                    name: item.name().to_string(),
                    namespace: item.namespace().to_string(),
                }
            } else {
                ConfigurationError::AmbiguousName {
                    kind: T::KIND,
                    name: item.name().to_string(),
                    first: existing.namespace().to_string(),
                    second: item.namespace().to_string(),
                }
            });
        }
        self.items.insert(item.name().to_string(), item);
        Ok(())
    }

    /// Look up a declaration by name.
    pub fn get(&self, name: &str) -> Option<&T> {
        self.items.get(name)
    }

    /// Look up a declaration by name, failing with
    /// [`ConfigurationError::UnknownDeclaration`].
    pub fn try_get(&self, name: &str) -> Result<&T, ConfigurationError> {
        self.get(name)
            .ok_or_else(|| ConfigurationError::UnknownDeclaration {
                kind: T::KIND,
                name: name.to_string(),
            })
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    /// Declarations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.values()
    }

    /// Names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.items.keys().map(String::as_str)
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Declaration> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}
