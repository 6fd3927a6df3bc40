#![cfg(test)]

// Property tests for ChainTable kept inside the crate so they do not
// require feature gates to access internal modules.

use crate::chain_table::{ChainTable, Placement};
use proptest::prelude::*;
use std::collections::hash_map::RandomState;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::Hasher;

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Rebuild(usize),
    Iterate,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            3 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Put(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            1 => idx.clone().prop_map(OpI::Get),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => (0usize..40).prop_map(OpI::Rebuild),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Drives one table through `ops`, checking it against a std HashMap model.
// Invariants after every op:
// - `put` reports Inserted exactly when the model lacked the key, and hands
//   back the model's previous value otherwise.
// - `get`/`contains_key`/`remove` agree with the model.
// - Chain lengths sum to `len`; every live key sits in the bucket its hash
//   reduces to; capacity is never zero.
fn run_state_machine<S: std::hash::BuildHasher>(
    mut sut: ChainTable<Key, i32, S>,
    pool: Vec<String>,
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<Key, i32> = HashMap::new();

    for op in ops {
        match op {
            OpI::Put(i, v) => {
                let k = key_from(&pool, i);
                let prev = model.insert(k.clone(), v);
                match sut.put(k, v) {
                    Placement::Inserted => prop_assert!(prev.is_none()),
                    Placement::Replaced(old) => prop_assert_eq!(Some(old), prev),
                }
            }
            OpI::Remove(i) => {
                let k = key_from(&pool, i);
                let got = sut.remove(&k);
                let want = model.remove(&k);
                prop_assert_eq!(got.map(|(_, v)| v), want);
            }
            OpI::Get(i) => {
                let k = key_from(&pool, i);
                prop_assert_eq!(sut.get(&k), model.get(&k));
            }
            OpI::Contains(s) => {
                let has = sut.contains_key(s.as_str());
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(has, has_model);
            }
            OpI::Mutate(i, d) => {
                let k = key_from(&pool, i);
                if let Some(vr) = sut.get_mut(&k) {
                    *vr = vr.saturating_add(d);
                    let mv = model.get_mut(&k).expect("present in model");
                    *mv = mv.saturating_add(d);
                } else {
                    prop_assert!(!model.contains_key(&k));
                }
            }
            OpI::Rebuild(cap) => {
                sut.rebuild(cap);
                prop_assert_eq!(sut.capacity(), cap.max(1));
            }
            OpI::Iterate => {
                let s_keys: Vec<_> = sut.iter().map(|(k, _)| k.clone()).collect();
                let unique: BTreeSet<_> = s_keys.iter().cloned().collect();
                prop_assert_eq!(s_keys.len(), unique.len(), "iteration yields each key once");
                let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                prop_assert_eq!(unique, m_keys);
            }
        }

        // Post-conditions after each op
        prop_assert!(sut.capacity() >= 1);
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert_eq!(sut.bucket_lengths().iter().sum::<usize>(), model.len());
        let lens = sut.bucket_lengths();
        let mut per_bucket = vec![0usize; sut.capacity()];
        for (k, _) in sut.iter() {
            per_bucket[sut.hash_index(k)] += 1;
        }
        prop_assert_eq!(per_bucket, lens);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let sut = ChainTable::with_capacity_and_hasher(4, RandomState::new());
        run_state_machine(sut, pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl std::hash::BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: Same state-machine invariants as above, under worst-case
// collision behavior (constant hasher). Every entry lands in bucket 0, so
// this stresses equality scanning along a single chain.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut = ChainTable::with_capacity_and_hasher(4, ConstBuildHasher);
        run_state_machine(sut, pool, ops)?;
    }
}
