use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

/// Dense vertex identifier handed out by a [`KeyRegistry`].
pub type VertexId = u32;

/// External identity of a vertex: an ordered integer triple.
///
/// Plain integers widen to `(x, 0, 0)` and pairs to `(x, y, 0)`, so the
/// integer vertex `5` and the key `(5, 0, 0)` name the same vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompositeKey {
    pub a: i64,
    pub b: i64,
    pub c: i64,
}

impl CompositeKey {
    pub const fn new(a: i64, b: i64, c: i64) -> Self {
        Self { a, b, c }
    }

    pub const fn single(x: i64) -> Self {
        Self::new(x, 0, 0)
    }

    pub const fn pair(x: i64, y: i64) -> Self {
        Self::new(x, y, 0)
    }
}

impl From<i64> for CompositeKey {
    fn from(x: i64) -> Self {
        Self::single(x)
    }
}

impl From<(i64, i64)> for CompositeKey {
    fn from((x, y): (i64, i64)) -> Self {
        Self::pair(x, y)
    }
}

impl From<(i64, i64, i64)> for CompositeKey {
    fn from((a, b, c): (i64, i64, i64)) -> Self {
        Self::new(a, b, c)
    }
}

// Unsuffixed integer literals fall back to i32, so `graph.add_edge(1, 2, 1)`
// and `graph.add_edge((4, 5, 0), (7, 8, 0), 1)` need these.
impl From<i32> for CompositeKey {
    fn from(x: i32) -> Self {
        Self::single(x.into())
    }
}

impl From<(i32, i32)> for CompositeKey {
    fn from((x, y): (i32, i32)) -> Self {
        Self::pair(x.into(), y.into())
    }
}

impl From<(i32, i32, i32)> for CompositeKey {
    fn from((a, b, c): (i32, i32, i32)) -> Self {
        Self::new(a.into(), b.into(), c.into())
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.a, self.b, self.c)
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    ids: HashMap<CompositeKey, VertexId>,
    keys: Vec<CompositeKey>,
}

/// Bidirectional mapping between composite keys and dense ids.
///
/// Ids are allocated in first-seen order starting at 0 and are never reused
/// or reassigned. Allocation goes through a single-writer lock so that a
/// registry reachable through `&Graph` can still hand out ids while several
/// traversals read the same graph.
#[derive(Debug, Default)]
pub struct KeyRegistry {
    inner: RwLock<RegistryInner>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `key`, allocating the next one on first sight.
    pub fn id_of(&self, key: impl Into<CompositeKey>) -> Result<VertexId> {
        self.id_within(key, None)
    }

    /// Like [`id_of`](Self::id_of), but refuse to allocate once `limit`
    /// keys are registered. A refused key is not stored.
    pub fn id_within(&self, key: impl Into<CompositeKey>, limit: Option<usize>) -> Result<VertexId> {
        let key = key.into();
        if let Some(id) = self.lookup(key) {
            return Ok(id);
        }

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        // Another writer may have registered the key between the two locks.
        if let Some(&id) = inner.ids.get(&key) {
            return Ok(id);
        }
        let next = inner.keys.len();
        if let Some(capacity) = limit {
            if next >= capacity {
                return Err(GraphError::CapacityExceeded { id: next, capacity });
            }
        }
        let id = VertexId::try_from(next).map_err(|_| GraphError::IdSpaceExhausted)?;
        inner.keys.push(key);
        inner.ids.insert(key, id);
        tracing::trace!(%key, id, "allocated vertex id");
        Ok(id)
    }

    /// Return the id for `key` without allocating.
    pub fn lookup(&self, key: impl Into<CompositeKey>) -> Option<VertexId> {
        let key = key.into();
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.ids.get(&key).copied()
    }

    /// Resolve a dense id back to the key it was allocated for.
    pub fn key_of(&self, id: VertexId) -> Option<CompositeKey> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.keys.get(id as usize).copied()
    }

    pub fn contains(&self, key: impl Into<CompositeKey>) -> bool {
        self.lookup(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All registered keys in id order.
    pub fn keys(&self) -> Vec<CompositeKey> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).keys.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_dense_in_first_seen_order() {
        let reg = KeyRegistry::new();
        assert_eq!(reg.id_of((4, 5, 0)).unwrap(), 0);
        assert_eq!(reg.id_of(7).unwrap(), 1);
        assert_eq!(reg.id_of((9, 9)).unwrap(), 2);
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn test_id_of_is_idempotent() {
        let reg = KeyRegistry::new();
        let first = reg.id_of((1, 2, 3)).unwrap();
        reg.id_of(42).unwrap();
        assert_eq!(reg.id_of((1, 2, 3)).unwrap(), first);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_distinct_keys_get_distinct_ids() {
        let reg = KeyRegistry::new();
        let keys = [
            CompositeKey::new(1, 0, 0),
            CompositeKey::new(0, 1, 0),
            CompositeKey::new(0, 0, 1),
            CompositeKey::new(-1, 0, 0),
            CompositeKey::new(1, 1, 1),
        ];
        let mut ids: Vec<VertexId> = keys.iter().map(|&k| reg.id_of(k).unwrap()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), keys.len());
    }

    #[test]
    fn test_integer_aliases_trailing_zero_triple() {
        let reg = KeyRegistry::new();
        let id = reg.id_of(5).unwrap();
        assert_eq!(reg.id_of((5, 0, 0)).unwrap(), id);
        assert_eq!(reg.id_of((5, 0)).unwrap(), id);
        assert_ne!(reg.id_of((5, 0, 1)).unwrap(), id);
    }

    #[test]
    fn test_lookup_does_not_allocate() {
        let reg = KeyRegistry::new();
        assert_eq!(reg.lookup(3), None);
        assert!(!reg.contains(3));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_key_of_inverts_id_of() {
        let reg = KeyRegistry::new();
        let id = reg.id_of((7, 8, 0)).unwrap();
        assert_eq!(reg.key_of(id), Some(CompositeKey::new(7, 8, 0)));
        assert_eq!(reg.key_of(id + 1), None);
        assert_eq!(reg.keys(), vec![CompositeKey::new(7, 8, 0)]);
    }

    #[test]
    fn test_id_within_refuses_past_limit() {
        let reg = KeyRegistry::new();
        reg.id_within(1, Some(1)).unwrap();
        assert_eq!(
            reg.id_within(2, Some(1)).unwrap_err(),
            GraphError::CapacityExceeded { id: 1, capacity: 1 }
        );
        // known keys still resolve at the limit
        assert_eq!(reg.id_within(1, Some(1)).unwrap(), 0);
        assert!(!reg.contains(2));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(CompositeKey::new(9, -9, 9).to_string(), "(9, -9, 9)");
    }
}
