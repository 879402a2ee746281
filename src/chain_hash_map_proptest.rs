#![cfg(test)]

// Property tests for ChainHashMap kept inside the crate so they can check
// structural invariants (bucket placement, stored hashes, load bounds).

use crate::chain_hash_map::ChainHashMap;
use crate::error::MapError;
use proptest::prelude::*;
use std::cell::Cell;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hasher};
use std::rc::Rc;

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
    Insert(usize, i32),
    InsertWith(usize, i32),
    IndexDefault(usize, i32),
    Remove(usize),
    Find(usize),
    At(usize),
    Contains(String),
    Mutate(usize, i32),
    Iterate,
    Clear,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::InsertWith(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::IndexDefault(i, d)),
            3 => idx.clone().prop_map(OpI::Remove),
            1 => idx.clone().prop_map(OpI::Find),
            1 => idx.clone().prop_map(OpI::At),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Runs one scenario against `sut`, mirroring every step in a std HashMap.
// Invariants exercised across random operation sequences:
// - Inserting a present key keeps the first value; `insert_with` runs its
//   constructor only for absent keys.
// - `find`/`contains_key`/`at` parity with the model, including borrowed
//   `&str` lookups.
// - `remove` returns the model's value; removing an absent key is a no-op.
// - `iter` yields each live entry exactly once.
// - Resizing happens exactly on the load-factor crossings; after each op
//   every entry sits in its bucket and the table is never full.
fn run_scenario<S>(
    mut sut: ChainHashMap<Key, i32, S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError>
where
    S: BuildHasher,
{
    let mut model: HashMap<Key, i32> = HashMap::new();
    let default_calls = Rc::new(Cell::new(0));
    for op in ops {
        let buckets_before = sut.bucket_count();
        let len_before = sut.len();
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(pool, i);
                let already = model.contains_key(&k);
                prop_assert_eq!(sut.insert(k.clone(), v), !already);
                model.entry(k).or_insert(v);
            }
            OpI::InsertWith(i, v) => {
                let k = key_from(pool, i);
                let already = model.contains_key(&k);
                let counter = default_calls.clone();
                let before = counter.get();
                let inserted = sut.insert_with(k.clone(), move || {
                    counter.set(counter.get() + 1);
                    v
                });
                prop_assert_eq!(inserted, !already);
                let expected_calls = if already { before } else { before + 1 };
                prop_assert_eq!(default_calls.get(), expected_calls);
                model.entry(k).or_insert(v);
            }
            OpI::IndexDefault(i, d) => {
                let k = key_from(pool, i);
                let slot = sut.get_or_insert_default(k.clone());
                *slot = slot.wrapping_add(d);
                let mv = model.entry(k).or_default();
                *mv = mv.wrapping_add(d);
            }
            OpI::Remove(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.remove(&k), model.remove(&k));
                prop_assert!(!sut.contains_key(&k));
            }
            OpI::Find(i) => {
                let k = key_from(pool, i);
                let c = sut.find(&k);
                match model.get(&k) {
                    Some(v) => prop_assert_eq!(c.entry(), Some((&k, v))),
                    None => prop_assert!(c == sut.end()),
                }
            }
            OpI::At(i) => {
                let k = key_from(pool, i);
                match model.get(&k) {
                    Some(v) => prop_assert_eq!(sut.at(&k), Ok(v)),
                    None => prop_assert_eq!(sut.at(&k), Err(MapError::NotFound)),
                }
            }
            OpI::Contains(s) => {
                let has = sut.contains_key(s.as_str());
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(has, has_model);
            }
            OpI::Mutate(i, d) => {
                let k = key_from(pool, i);
                if let Some(vr) = sut.get_mut(&k) {
                    *vr = vr.saturating_add(d);
                    let mv = model.get_mut(&k).expect("model tracks live key");
                    *mv = mv.saturating_add(d);
                } else {
                    prop_assert!(!model.contains_key(&k));
                }
            }
            OpI::Iterate => {
                let s_keys: Vec<_> = sut.iter().map(|(k, _)| k.clone()).collect();
                prop_assert_eq!(s_keys.len(), sut.len());
                let s_set: BTreeSet<_> = s_keys.into_iter().collect();
                let m_set: BTreeSet<_> = model.keys().cloned().collect();
                prop_assert_eq!(s_set, m_set);
                for (k, v) in sut.iter() {
                    prop_assert_eq!(model.get(k), Some(v));
                }
            }
            OpI::Clear => {
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.bucket_count(), 1);
            }
        }

        // Post-conditions after each op
        // 1) Size parity
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        // 2) Resize fired exactly when a crossing was hit
        let len = sut.len();
        if len != len_before && len > 0 {
            let crossed = len == buckets_before || len * 4 == buckets_before;
            if crossed {
                prop_assert_eq!(sut.bucket_count(), 2 * len);
            } else {
                prop_assert_eq!(sut.bucket_count(), buckets_before);
            }
        }
        // 3) Structural invariants
        sut.assert_invariants();
    }
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_scenario(ChainHashMap::new(), &pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
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

// Property: same state-machine invariants under worst-case collision
// behavior. Every entry shares one chain, so lookups rely on `Eq` alone.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_scenario(ChainHashMap::with_hasher(ConstBuildHasher), &pool, ops)?;
    }
}

// Property: two full traversals without mutation in between yield the same
// sequence, and the cursor walk from begin() to end() visits len() entries.
proptest! {
    #[test]
    fn prop_traversal_is_stable(keys in proptest::collection::vec(any::<u16>(), 0..200)) {
        let m: ChainHashMap<u16, u16> = keys.iter().map(|&k| (k, k)).collect();
        let first: Vec<u16> = m.keys().copied().collect();
        let second: Vec<u16> = m.keys().copied().collect();
        prop_assert_eq!(&first, &second);

        let mut c = m.begin();
        let mut walked = 0usize;
        while let Some((k, v)) = c.entry() {
            prop_assert_eq!(k, v);
            walked += 1;
            c.move_next();
        }
        prop_assert!(c == m.end());
        prop_assert_eq!(walked, m.len());
        let distinct: BTreeSet<u16> = keys.iter().copied().collect();
        prop_assert_eq!(m.len(), distinct.len());
    }
}

// Property: keys hashed with a deterministic hasher land in the bucket the
// stored hash selects, across every resize in a grow-then-shrink cycle.
proptest! {
    #[test]
    fn prop_grow_then_shrink_keeps_keys(n in 1usize..300) {
        #[derive(Clone, Default)]
        struct Fnv;
        struct FnvHasher(u64);
        impl BuildHasher for Fnv {
            type Hasher = FnvHasher;
            fn build_hasher(&self) -> FnvHasher {
                FnvHasher(0xcbf2_9ce4_8422_2325)
            }
        }
        impl Hasher for FnvHasher {
            fn write(&mut self, bytes: &[u8]) {
                for b in bytes {
                    self.0 ^= u64::from(*b);
                    self.0 = self.0.wrapping_mul(0x100_0000_01b3);
                }
            }
            fn finish(&self) -> u64 {
                self.0
            }
        }

        let mut m: ChainHashMap<usize, usize, Fnv> = ChainHashMap::with_hasher(Fnv);
        for k in 0..n {
            m.insert(k, k);
        }
        m.assert_invariants();
        for k in 0..n {
            prop_assert_eq!(m.get(&k), Some(&k));
        }
        let keep = n / 4;
        for k in keep..n {
            m.remove(&k);
            m.assert_invariants();
        }
        for k in 0..keep {
            prop_assert_eq!(m.get(&k), Some(&k));
        }
        prop_assert_eq!(m.len(), keep);
    }
}
