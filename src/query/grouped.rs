//! Grouped sequences
//!
//! A `Grouped<K, T>` is the result of a group-by: `(key, sub-Q)` pairs in the
//! order each key first appeared in the input.

use super::Q;

/// Insertion-ordered groups of a `Q`.
#[derive(Debug)]
pub struct Grouped<K, T> {
    groups: Q<(K, Q<T>)>,
}

impl<K, T> Clone for Grouped<K, T> {
    fn clone(&self) -> Self {
        Self {
            groups: self.groups.clone(),
        }
    }
}

impl<K, T> Grouped<K, T> {
    pub(crate) fn new(groups: Vec<(K, Q<T>)>) -> Self {
        Self {
            groups: Q::new(groups),
        }
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if there are no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterate over `(key, sub-Q)` pairs in group order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &Q<T>)> {
        self.groups.iter().map(|(k, q)| (k, q))
    }

    /// Apply `f(key, sub_q)` to each group; one output per group, in order.
    #[must_use]
    pub fn map<U>(&self, mut f: impl FnMut(&K, &Q<T>) -> U) -> Q<U> {
        self.groups.map(|(k, q)| f(k, q))
    }

    /// Concatenate the sub-sequences in group order.
    #[must_use]
    pub fn concat(&self) -> Q<T>
    where
        T: Clone,
    {
        self.groups
            .iter()
            .flat_map(|(_, q)| q.iter().cloned())
            .collect()
    }
}

impl<K: Clone, T> Grouped<K, T> {
    /// Group keys in first-occurrence order.
    #[must_use]
    pub fn keys(&self) -> Q<K> {
        self.groups.map(|(k, _)| k.clone())
    }

    /// Keep the groups matching `predicate`; order preserved.
    #[must_use]
    pub fn filter(&self, mut predicate: impl FnMut(&K, &Q<T>) -> bool) -> Self {
        Self {
            groups: self.groups.filter(|(k, q)| predicate(k, q)),
        }
    }
}

impl<K: PartialEq, T> Grouped<K, T> {
    /// Sub-sequence for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&Q<T>> {
        self.groups.iter().find(|(k, _)| k == key).map(|(_, q)| q)
    }
}
