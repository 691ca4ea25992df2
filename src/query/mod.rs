//! Immutable record queries
//!
//! `Q<T>` is an ordered, immutable sequence. Every operation borrows the
//! sequence and returns a new one, so one base `Q` can feed any number of
//! independent aggregation passes (cloning only bumps a reference count).
//!
//! ## Supported operations
//!
//! - `select` - dotted-path projection (`"args.algorithm"`)
//! - `filter` / `filter_equals` - predicate and conjunctive equality filters
//! - `group` / `group_by_key` - insertion-ordered grouping
//! - `unique` / `sorted` - deduplication and stable sorting
//! - `map` - element-wise transform
//! - `mean` / `std` / `count` - numeric reduction (population std)
//!
//! ## Example
//!
//! ```rust
//! use sweep_report::query::{Field, Q};
//!
//! # fn main() -> sweep_report::Result<()> {
//! let rows = Q::new(vec![
//!     serde_json::json!({"alg": "ERM", "acc": 0.8}),
//!     serde_json::json!({"alg": "IRM", "acc": 0.7}),
//!     serde_json::json!({"alg": "ERM", "acc": 0.9}),
//! ]);
//!
//! let erm = rows.filter_equals("alg", &[Field::from("ERM")])?;
//! let mean = erm.select("acc")?.numbers()?.mean()?;
//! assert!((mean - 0.85).abs() < 1e-12);
//! # Ok(())
//! # }
//! ```

mod field;
mod grouped;
mod path;

pub use field::Field;
pub use grouped::Grouped;
pub use path::{split_paths, Lookup};

use std::hash::Hash;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::{Error, Result};

/// Immutable, cheaply clonable ordered sequence.
#[derive(Debug)]
pub struct Q<T> {
    items: Arc<[T]>,
}

impl<T> Clone for Q<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> Default for Q<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: PartialEq> PartialEq for Q<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items[..] == other.items[..]
    }
}

impl<T> FromIterator<T> for Q<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T> From<Vec<T>> for Q<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<'a, T> IntoIterator for &'a Q<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> Q<T> {
    /// Wrap an owned sequence.
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: Arc::from(items),
        }
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Number of elements (reduction spelling of `len`).
    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Check if the sequence has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over the elements in order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Borrow the elements as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Element at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Element-wise transform; same length and order.
    #[must_use]
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Q<U> {
        self.items.iter().map(f).collect()
    }

    /// First element with the largest score.
    ///
    /// Elements scored `None` or NaN are skipped, so ties and ineligible
    /// elements never displace an earlier maximum. Returns `None` when no
    /// element has a score.
    pub fn argmax(&self, mut score: impl FnMut(&T) -> Option<f64>) -> Option<&T> {
        let mut best: Option<(&T, f64)> = None;
        for item in self.items.iter() {
            let Some(s) = score(item).filter(|s| !s.is_nan()) else {
                continue;
            };
            match best {
                Some((_, b)) if s <= b => {}
                _ => best = Some((item, s)),
            }
        }
        best.map(|(item, _)| item)
    }
}

impl<T: Clone> Q<T> {
    /// Keep the elements matching `predicate`; order preserved.
    #[must_use]
    pub fn filter(&self, mut predicate: impl FnMut(&T) -> bool) -> Self {
        self.items.iter().filter(|item| predicate(item)).cloned().collect()
    }

    /// Copy the elements out into a `Vec`.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.items.to_vec()
    }

    /// Stable sort by a derived key.
    #[must_use]
    pub fn sorted_by_key<K: Ord>(&self, f: impl FnMut(&T) -> K) -> Self {
        let mut items = self.to_vec();
        items.sort_by_key(f);
        Self::new(items)
    }

    /// Group by an arbitrary key; groups appear in first-occurrence order and
    /// each sub-sequence keeps the original relative order.
    #[must_use]
    pub fn group_by_key<K: Eq + Hash + Clone>(&self, mut key: impl FnMut(&T) -> K) -> Grouped<K, T> {
        let mut index: FxHashMap<K, usize> = FxHashMap::default();
        let mut groups: Vec<(K, Vec<T>)> = Vec::new();
        for item in self.items.iter() {
            let k = key(item);
            if let Some(&slot) = index.get(&k) {
                groups[slot].1.push(item.clone());
            } else {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![item.clone()]));
            }
        }
        Grouped::new(groups.into_iter().map(|(k, items)| (k, Q::new(items))).collect())
    }
}

impl<T: Clone + Eq + Hash> Q<T> {
    /// Distinct elements in first-occurrence order.
    #[must_use]
    pub fn unique(&self) -> Self {
        let mut seen: FxHashSet<&T> = FxHashSet::default();
        self.items
            .iter()
            .filter(|item| seen.insert(*item))
            .cloned()
            .collect()
    }
}

impl<T: Clone + Ord> Q<T> {
    /// Ascending natural order; stable for ties.
    #[must_use]
    pub fn sorted(&self) -> Self {
        let mut items = self.to_vec();
        items.sort();
        Self::new(items)
    }
}

impl<T: Lookup> Q<T> {
    /// Project every element to the value at a dotted path.
    ///
    /// # Errors
    ///
    /// Returns `Error::KeyLookup` if any element lacks the path.
    pub fn select(&self, path: &str) -> Result<Q<Field>> {
        self.items
            .iter()
            .map(|item| lookup_required(item, path))
            .collect::<Result<Vec<_>>>()
            .map(Q::new)
    }
}

impl<T: Lookup + Clone> Q<T> {
    /// Keep the elements whose projections equal `values`, path by path.
    ///
    /// `paths` is a comma-separated list (`"dataset, algorithm, test_env"`)
    /// matched positionally against `values`. Equivalent to chaining one
    /// `filter` per path/value pair.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidInput` if the path and value counts differ
    /// - `Error::KeyLookup` if an element lacks one of the paths
    pub fn filter_equals(&self, paths: &str, values: &[Field]) -> Result<Self> {
        let paths = split_paths(paths);
        if paths.len() != values.len() {
            return Err(Error::InvalidInput(format!(
                "filter_equals got {} paths but {} values",
                paths.len(),
                values.len()
            )));
        }

        let mut kept = Vec::new();
        'items: for item in self.items.iter() {
            for (path, expected) in paths.iter().zip(values) {
                if lookup_required(item, path)? != *expected {
                    continue 'items;
                }
            }
            kept.push(item.clone());
        }
        Ok(Self::new(kept))
    }

    /// Group by one path, or by several comma-separated paths.
    ///
    /// With one path the key is the projected value; with several it is a
    /// `Field::List` tuple of the projected values.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidInput` if `paths` names no path
    /// - `Error::KeyLookup` if an element lacks one of the paths
    pub fn group(&self, paths: &str) -> Result<Grouped<Field, T>> {
        let paths = split_paths(paths);
        if paths.is_empty() {
            return Err(Error::InvalidInput("group requires at least one path".to_string()));
        }

        let keys = self
            .items
            .iter()
            .map(|item| {
                if let [single] = paths.as_slice() {
                    lookup_required(item, single)
                } else {
                    paths
                        .iter()
                        .map(|p| lookup_required(item, p))
                        .collect::<Result<Vec<_>>>()
                        .map(Field::List)
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let mut keys = keys.into_iter();
        Ok(self.group_by_key(|_| keys.next().unwrap_or(Field::Null)))
    }
}

impl Q<Field> {
    /// Convert projected values to numbers.
    ///
    /// # Errors
    ///
    /// Returns `Error::TypeMismatch` on the first non-numeric value.
    pub fn numbers(&self) -> Result<Q<f64>> {
        self.items
            .iter()
            .map(|field| {
                field.as_f64().ok_or_else(|| Error::TypeMismatch {
                    expected: "number",
                    found: format!("{} ({field})", field.kind()),
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Q::new)
    }
}

impl Q<f64> {
    /// Sum of the elements (`0.0` when empty).
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.items.iter().sum()
    }

    /// Arithmetic mean.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyReduction` on an empty sequence.
    #[allow(clippy::cast_precision_loss)]
    pub fn mean(&self) -> Result<f64> {
        if self.is_empty() {
            return Err(Error::EmptyReduction { op: "mean" });
        }
        Ok(self.sum() / self.len() as f64)
    }

    /// Population standard deviation (divides by N).
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyReduction` on an empty sequence.
    #[allow(clippy::cast_precision_loss)]
    pub fn std(&self) -> Result<f64> {
        if self.is_empty() {
            return Err(Error::EmptyReduction { op: "std" });
        }
        let mean = self.mean()?;
        let variance = self
            .items
            .iter()
            .map(|x| (x - mean) * (x - mean))
            .sum::<f64>()
            / self.len() as f64;
        Ok(variance.sqrt())
    }
}

fn lookup_required<T: Lookup + ?Sized>(item: &T, path: &str) -> Result<Field> {
    item.lookup(path).ok_or_else(|| Error::KeyLookup {
        path: path.to_string(),
    })
}
