//! Path parameter storage.
//!
//! Parameters live in a `SmallVec` so that the common case (a handful of
//! captures per route) never touches the heap for the container itself.

use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Inline storage backing [`Params`].
///
/// Names are `Arc<str>` because they come from compiled patterns that outlive
/// every request; values are per-request data cut out of the path.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Ordered mapping from parameter name to captured value.
///
/// Insertion order is preserved. Inserting an existing name overwrites its
/// value in place, so the mapping never holds duplicate keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    inner: ParamVec,
}

impl Params {
    /// Create an empty parameter map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a parameter by name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Insert a value, overwriting any previous value under the same name
    pub fn insert(&mut self, name: Arc<str>, value: String) {
        match self.inner.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.inner.push((name, value)),
        }
    }

    /// Remove a parameter, returning its value
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self.inner.iter().position(|(k, _)| k.as_ref() == name)?;
        Some(self.inner.remove(pos).1)
    }

    /// Merge `other` over `self`: values from `other` win on name collisions
    pub fn merge(&mut self, other: Params) {
        for (name, value) in other.inner {
            self.insert(name, value);
        }
    }

    /// Number of parameters held
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// True when no parameters are held
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate over `(name, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_ref(), v.as_str()))
    }

    /// Convert to a `HashMap`
    /// Note: This allocates - use get() in handlers instead
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, String> {
        self.inner
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<Arc<str>>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k.into(), v.into());
        }
        params
    }
}
