//! Per-call keyed accumulator.
//!
//! [`AggregationState`] is the only mutable object handed to user hooks. It is
//! created empty at the start of every call and dropped when the call returns,
//! so nothing folded for one window can leak into another. Entries keep their
//! insertion order, which is also the order results are emitted in.

use serde_json::{Map, Value};

/// Keyed records built by folding one batch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AggregationState {
    entries: Map<String, Value>,
}

impl AggregationState {
    /// Create an empty state.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Return the record for `key`, creating it with `factory` on first use.
    pub fn get_or_insert_with<F>(&mut self, key: impl Into<String>, factory: F) -> &mut Value
    where
        F: FnOnce() -> Value,
    {
        self.entries.entry(key).or_insert_with(factory)
    }

    /// Apply `f` to the record for `key`.
    ///
    /// Returns `false`, without calling `f`, when no such record exists.
    pub fn update<F>(&mut self, key: &str, f: F) -> bool
    where
        F: FnOnce(&mut Value),
    {
        self.entries.get_mut(key).map(f).is_some()
    }

    /// Borrow the record for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> { self.entries.get(key) }

    /// Whether a record exists for `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool { self.entries.contains_key(key) }

    /// Insert or replace the record for `key`, returning the previous one.
    ///
    /// A replaced record keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, record: Value) -> Option<Value> {
        self.entries.insert(key.into(), record)
    }

    /// Remove the record for `key`, preserving the order of the others.
    pub fn remove(&mut self, key: &str) -> Option<Value> { self.entries.shift_remove(key) }

    /// Keep only the records for which `keep` returns `true`.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, &mut Value) -> bool,
    {
        self.entries.retain(|key, record| keep(key, record));
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    /// Whether the state holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> { self.entries.keys().map(String::as_str) }

    /// Key and record pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, record)| (key.as_str(), record))
    }

    /// Consume the state, yielding the records in insertion order.
    pub fn into_values(self) -> impl Iterator<Item = Value> {
        self.entries.into_iter().map(|(_, record)| record)
    }
}

impl FromIterator<(String, Value)> for AggregationState {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for AggregationState {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter { self.entries.into_iter() }
}
