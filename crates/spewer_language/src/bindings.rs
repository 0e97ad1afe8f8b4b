//! Ordered name-to-value bindings.
//!
//! Locals and module globals both use [`Bindings`]. Insertion order is kept,
//! so an observer sees a function's arguments in declaration order.

use std::sync::Arc;

use spewer_foundation::{Inspect, Scope, Value};

/// An insertion-ordered set of bindings.
#[derive(Clone, Debug, Default)]
pub struct Bindings {
    entries: Vec<(Arc<str>, Value)>,
}

impl Bindings {
    /// Creates an empty set of bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value bound to `name`.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(bound, _)| bound.as_ref() == name)
            .map(|(_, value)| value)
    }

    /// Binds `name`, replacing an existing binding in place.
    pub fn set(&mut self, name: &str, value: Value) {
        match self.entries.iter_mut().find(|(bound, _)| bound.as_ref() == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name.into(), value)),
        }
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_ref(), value))
    }
}

impl Scope for Bindings {
    fn get(&self, name: &str) -> Option<&dyn Inspect> {
        self.value(name).map(|value| value as &dyn Inspect)
    }

    fn entries(&self) -> Vec<(&str, &dyn Inspect)> {
        self.iter()
            .map(|(name, value)| (name, value as &dyn Inspect))
            .collect()
    }
}

impl<'a> FromIterator<(&'a str, Value)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (&'a str, Value)>>(iter: I) -> Self {
        let mut bindings = Self::new();
        for (name, value) in iter {
            bindings.set(name, value);
        }
        bindings
    }
}
