//! ChainTable: structural layer with chained buckets over slot storage.
//!
//! Entries are owned by a `SlotMap`; each bucket is an insertion-ordered
//! list of slot keys. An entry stores the full `u64` hash computed when it
//! was inserted, so `rebuild` only moves slot keys between buckets and
//! never calls `K: Hash` again. This layer has no notion of load factor;
//! callers decide when to `rebuild`.

use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash, Hasher};
use core::iter::Flatten;
use core::slice;
use slotmap::{DefaultKey, SlotMap};

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
}

/// Collision chain: slot keys in insertion order.
type Bucket = Vec<DefaultKey>;

pub struct ChainTable<K, V, S> {
    hasher: S,
    buckets: Vec<Bucket>, // never empty
    slots: SlotMap<DefaultKey, Entry<K, V>>,
}

/// Outcome of `ChainTable::put`.
#[derive(Debug, PartialEq, Eq)]
pub enum Placement<V> {
    /// The key was new; a fresh entry was appended to its bucket.
    Inserted,
    /// The key existed; its value was swapped and the old one handed back.
    Replaced(V),
}

/// Largest bucket count whose bucket array still fits in one allocation.
pub const MAX_CAPACITY: usize = isize::MAX as usize / core::mem::size_of::<Bucket>();

#[inline]
fn clamp_capacity(capacity: usize) -> usize {
    capacity.clamp(1, MAX_CAPACITY)
}

fn empty_buckets(capacity: usize) -> Vec<Bucket> {
    let mut buckets = Vec::with_capacity(capacity);
    buckets.resize_with(capacity, Bucket::new);
    buckets
}

#[inline]
fn reduce(hash: u64, bucket_count: usize) -> usize {
    debug_assert!(bucket_count > 0);
    (hash % bucket_count as u64) as usize
}

impl<K, V, S> ChainTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Create a table with `capacity` empty buckets, clamped to
    /// `1..=MAX_CAPACITY`.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            hasher,
            buckets: empty_buckets(clamp_capacity(capacity)),
            slots: SlotMap::with_key(),
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        let mut h = self.hasher.build_hasher();
        q.hash(&mut h);
        h.finish()
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Bucket index for `q` against the current bucket count.
    pub fn hash_index<Q>(&self, q: &Q) -> usize
    where
        Q: ?Sized + Hash,
    {
        reduce(self.make_hash(q), self.buckets.len())
    }

    // Linear scan of one chain. Returns the position within the bucket and
    // the slot key of the matching entry.
    fn scan<Q>(&self, index: usize, hash: u64, q: &Q) -> Option<(usize, DefaultKey)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.buckets[index]
            .iter()
            .copied()
            .enumerate()
            .find(|&(_, k)| {
                self.slots
                    .get(k)
                    .map(|e| e.hash == hash && e.key.borrow() == q)
                    .unwrap_or(false)
            })
    }

    fn locate<Q>(&self, q: &Q) -> Option<(usize, usize, DefaultKey)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        let index = reduce(hash, self.buckets.len());
        self.scan(index, hash, q).map(|(pos, k)| (index, pos, k))
    }

    /// Insert `key -> value`, or replace the value of an equal key in place.
    /// The stored key is kept on replacement; the passed-in `key` is dropped.
    pub fn put(&mut self, key: K, value: V) -> Placement<V> {
        let hash = self.make_hash(&key);
        let index = reduce(hash, self.buckets.len());
        if let Some((_, k)) = self.scan(index, hash, &key) {
            if let Some(entry) = self.slots.get_mut(k) {
                return Placement::Replaced(core::mem::replace(&mut entry.value, value));
            }
        }
        let k = self.slots.insert(Entry { key, value, hash });
        self.buckets[index].push(k);
        Placement::Inserted
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get_key_value(q).map(|(_, v)| v)
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (_, _, k) = self.locate(q)?;
        self.slots.get(k).map(|e| (&e.key, &e.value))
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (_, _, k) = self.locate(q)?;
        self.slots.get_mut(k).map(|e| &mut e.value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.locate(q).is_some()
    }

    /// Unlink and return the entry for `q`. Chain order of the remaining
    /// entries in that bucket is preserved.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (index, pos, k) = self.locate(q)?;
        // Unlink from the chain first, then release the slot.
        self.buckets[index].remove(pos);
        self.slots.remove(k).map(|e| (e.key, e.value))
    }

    /// Replace the bucket array with `capacity` buckets (clamped to
    /// `1..=MAX_CAPACITY`) and re-place every entry by its stored hash. Old
    /// buckets are walked in index order and each chain front to back, so
    /// entries that share a new bucket keep their relative order.
    pub fn rebuild(&mut self, capacity: usize) {
        let capacity = clamp_capacity(capacity);
        let mut fresh = empty_buckets(capacity);
        for &k in self.buckets.iter().flatten() {
            if let Some(e) = self.slots.get(k) {
                fresh[reduce(e.hash, capacity)].push(k);
            }
        }
        self.buckets = fresh;
    }

    /// Drop every entry and reset to `capacity` empty buckets, clamped as in
    /// `rebuild`.
    pub fn clear(&mut self, capacity: usize) {
        self.buckets = empty_buckets(clamp_capacity(capacity));
        self.slots.clear();
    }

    pub fn bucket_lengths(&self) -> Vec<usize> {
        self.buckets.iter().map(Vec::len).collect()
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            chains: self.buckets.iter().flatten(),
            slots: &self.slots,
            remaining: self.slots.len(),
        }
    }
}

/// Borrowing iterator over `(&K, &V)` in bucket order, chain order within
/// each bucket.
pub struct Iter<'a, K, V> {
    chains: Flatten<slice::Iter<'a, Bucket>>,
    slots: &'a SlotMap<DefaultKey, Entry<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let slots = self.slots;
        let e = self.chains.by_ref().find_map(|&k| slots.get(k))?;
        self.remaining = self.remaining.saturating_sub(1);
        Some((&e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Self {
            chains: self.chains.clone(),
            slots: self.slots,
            remaining: self.remaining,
        }
    }
}
