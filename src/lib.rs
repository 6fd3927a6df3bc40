//! chain-map: a single-threaded hash map using separate chaining, with
//! load-factor driven growth and shrink.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the structural work (hashing, bucket placement, rebuild)
//!   apart from the policy that decides when to resize, so each piece has
//!   a small contract.
//! - Layers:
//!   - ChainTable<K, V, S>: entries in a `SlotMap`, buckets as
//!     insertion-ordered chains of slot keys. Knows how to place, find,
//!     unlink and rebuild; never resizes on its own.
//!   - ResizePolicy: validated thresholds and factors. Defaults: 4 initial
//!     buckets, grow x2 at load 0.75, shrink /4 at load 1/8.
//!   - ChainingHashMap<K, V, S>: public API (`put`, `get`, `remove`,
//!     `keys`, `size`, ...) that consults the policy after each mutation.
//!
//! Constraints
//! - The bucket array is never empty. Every constructor and the rebuild
//!   routine clamp the requested capacity to at least 1, so reducing a hash
//!   modulo the bucket count cannot divide by zero.
//! - `len` always equals the number of slot keys across all chains.
//! - Keys are immutable post-insert; `put` on an existing key swaps only the
//!   value.
//! - Lookups that miss return `None`; removing a missing key is a no-op.
//!
//! Hasher and rehashing invariants
//! - Each entry stores its `u64` hash from insertion time. A rebuild reduces
//!   stored hashes against the new bucket count and moves slot keys only;
//!   `K: Hash` is never invoked after insertion and no entry moves in
//!   memory.
//! - The default hasher is hashbrown's `DefaultHashBuilder`. Any
//!   `BuildHasher` works as long as equal keys hash equally. Collision
//!   resistance is not a goal.
//!
//! Resizing
//! - Resizes are full rebuilds that complete inside the call that triggered
//!   them; no intermediate state is observable. Cost is O(n) per rebuild and
//!   O(1) amortized per operation. There is no incremental rehashing.
//!
//! Notes and non-goals
//! - Not thread-safe beyond what the auto traits of `K`, `V` and `S` give;
//!   callers serialize access.
//! - No ordered iteration, persistence or custom allocators.
//! - Values may be ownership handles such as `Rc<T>` or `Box<T>`; the map
//!   only moves and drops them.

#[cfg(feature = "bench_internal")]
pub mod chain_table;
#[cfg(not(feature = "bench_internal"))]
mod chain_table;
mod chain_table_proptest;
pub mod chaining_hash_map;
pub mod policy;

// Public surface
pub use chain_table::Iter;
pub use chaining_hash_map::{ChainingHashMap, Keys, Values};
pub use policy::{PolicyError, ResizePolicy};
