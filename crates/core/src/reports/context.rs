//! Immutable data context for section processing.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::formula::Bindings;

/// Named monthly amounts visible to a node.
///
/// Extending a context returns a new value; the original is left untouched,
/// so a node only ever sees the bindings handed to it. Amount vectors are
/// shared between copies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataContext {
    bindings: HashMap<String, Arc<[Decimal]>>,
}

impl DataContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this context with `key` bound to `amounts`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, amounts: impl Into<Arc<[Decimal]>>) -> Self {
        self.bindings.insert(key.into(), amounts.into());
        self
    }

    /// Amounts bound to `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[Decimal]> {
        self.bindings.get(key).map(AsRef::as_ref)
    }

    /// Returns true if `key` is bound.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.bindings.contains_key(key)
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Bindings for DataContext {
    fn amounts(&self, key: &str) -> Option<&[Decimal]> {
        self.get(key)
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<Decimal>)> for DataContext {
    fn from_iter<I: IntoIterator<Item = (K, Vec<Decimal>)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |context, (key, amounts)| context.with(key, amounts))
    }
}
