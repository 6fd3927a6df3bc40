//! ChainingHashMap: public map that applies a `ResizePolicy` on top of
//! `ChainTable`.

use crate::chain_table::{ChainTable, Iter, Placement};
use crate::policy::{PolicyError, ResizePolicy};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

/// A hash map resolving collisions by separate chaining.
///
/// The bucket count starts at the policy's initial capacity (4 by default),
/// doubles when an insert brings the load factor to 0.75 and drops to a
/// quarter when a removal brings it to 1/8. Every resize is a full rebuild
/// that finishes before the triggering call returns.
///
/// A requested capacity of zero is clamped to one bucket rather than
/// rejected, so the bucket count is never zero.
pub struct ChainingHashMap<K, V, S = DefaultHashBuilder> {
    table: ChainTable<K, V, S>,
    policy: ResizePolicy,
}

impl<K, V> ChainingHashMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, Default::default())
    }

    pub fn with_policy(policy: ResizePolicy) -> Result<Self, PolicyError> {
        Self::with_policy_and_hasher(policy, Default::default())
    }
}

impl<K, V, S> ChainingHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            table: ChainTable::with_capacity_and_hasher(
                crate::policy::DEFAULT_INITIAL_CAPACITY,
                hasher,
            ),
            policy: ResizePolicy::default(),
        }
    }

    /// Map with `max(capacity, 1)` buckets. `clear` returns to this count.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        let policy = ResizePolicy::default().initial_capacity(capacity);
        Self {
            table: ChainTable::with_capacity_and_hasher(policy.capacity(), hasher),
            policy,
        }
    }

    pub fn with_policy_and_hasher(policy: ResizePolicy, hasher: S) -> Result<Self, PolicyError> {
        let policy = policy.validate()?;
        Ok(Self {
            table: ChainTable::with_capacity_and_hasher(policy.capacity(), hasher),
            policy,
        })
    }

    /// Insert `key -> value`. If the key is already present its value is
    /// replaced in place and the previous value returned; the stored key is
    /// kept. Only a new key can trigger a grow.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        match self.table.put(key, value) {
            Placement::Replaced(previous) => Some(previous),
            Placement::Inserted => {
                let capacity = self.table.capacity();
                if self.policy.should_grow(self.table.len(), capacity) {
                    self.resize(self.policy.grown(capacity));
                }
                None
            }
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.get(key)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.get_mut(key)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.get_key_value(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.contains_key(key)
    }

    /// Remove `key` and return its value. A missing key leaves the map
    /// untouched, including its bucket count.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (_, value) = self.table.remove(key)?;
        let capacity = self.table.capacity();
        if self.policy.should_shrink(self.table.len(), capacity) {
            self.resize(self.policy.shrunk(capacity));
        }
        Some(value)
    }

    /// Snapshot of all keys: buckets in index order, each chain in
    /// insertion order. Later mutation does not affect the returned `Vec`.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.table.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Number of entries; same as `len`.
    pub fn size(&self) -> usize {
        self.table.len()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Current number of buckets. Always at least 1.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn load_factor(&self) -> f64 {
        self.table.len() as f64 / self.table.capacity() as f64
    }

    pub fn policy(&self) -> &ResizePolicy {
        &self.policy
    }

    pub fn hasher(&self) -> &S {
        self.table.hasher()
    }

    /// Bucket that `key` maps to under the current bucket count.
    pub fn hash_index<Q>(&self, key: &Q) -> usize
    where
        Q: ?Sized + Hash,
    {
        self.table.hash_index(key)
    }

    /// Chain length of every bucket, in bucket order.
    pub fn bucket_lengths(&self) -> Vec<usize> {
        self.table.bucket_lengths()
    }

    /// Drop all entries and return to the policy's initial bucket count.
    pub fn clear(&mut self) {
        self.table.clear(self.policy.capacity());
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        self.table.iter()
    }

    /// Borrowing counterpart of `keys`.
    pub fn iter_keys(&self) -> Keys<'_, K, V> {
        Keys {
            inner: self.table.iter(),
        }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values {
            inner: self.table.iter(),
        }
    }

    fn resize(&mut self, capacity: usize) {
        let old = self.table.capacity();
        if capacity.max(1) == old {
            return;
        }
        self.table.rebuild(capacity);
        log::debug!(
            "chaining map resized {} -> {} buckets ({} entries)",
            old,
            self.table.capacity(),
            self.table.len()
        );
    }
}

impl<K, V, S> Default for ChainingHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> fmt::Debug for ChainingHashMap<K, V, S>
where
    K: Eq + Hash + fmt::Debug,
    V: fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> Extend<(K, V)> for ChainingHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ChainingHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<'a, K, V, S> IntoIterator for &'a ChainingHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Clone for Keys<'a, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> ExactSizeIterator for Keys<'a, K, V> {}

impl<'a, K, V> Clone for Values<'a, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V> ExactSizeIterator for Values<'a, K, V> {}
