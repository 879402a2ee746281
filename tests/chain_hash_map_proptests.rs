// Property tests over the public ChainHashMap API.
//
// The bucket count is fully determined by the operation history, so these
// tests replay it with a tiny reference model of the resize rule and
// compare contents against std::collections::HashMap.
use chain_hashmap::{ChainHashMap, MapError};
use proptest::prelude::*;
use std::collections::HashMap;

#[derive(Clone, Debug)]
enum Op {
    Insert(u8, u16),
    Remove(u8),
    Index(u8),
    At(u8),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (any::<u8>(), any::<u16>()).prop_map(|(k, v)| Op::Insert(k, v)),
        3 => any::<u8>().prop_map(Op::Remove),
        1 => any::<u8>().prop_map(Op::Index),
        1 => any::<u8>().prop_map(Op::At),
    ]
}

// Bucket count after `len` changed to `new_len` with `buckets` chains.
fn model_buckets(new_len: usize, buckets: usize) -> usize {
    if new_len == buckets || new_len * 4 == buckets {
        (2 * new_len).max(1)
    } else {
        buckets
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    // Property: contents match the model and the bucket count follows the
    // exact-crossing rule after every operation.
    #[test]
    fn prop_matches_model(ops in proptest::collection::vec(arb_op(), 0..400)) {
        let mut m: ChainHashMap<u8, u16> = ChainHashMap::new();
        let mut model: HashMap<u8, u16> = HashMap::new();
        let mut buckets = 1usize;
        for op in ops {
            let len_before = model.len();
            match op {
                Op::Insert(k, v) => {
                    prop_assert_eq!(m.insert(k, v), !model.contains_key(&k));
                    model.entry(k).or_insert(v);
                }
                Op::Remove(k) => {
                    prop_assert_eq!(m.remove(&k), model.remove(&k));
                }
                Op::Index(k) => {
                    let got = *m.get_or_insert_default(k);
                    prop_assert_eq!(got, *model.entry(k).or_default());
                }
                Op::At(k) => match model.get(&k) {
                    Some(v) => prop_assert_eq!(m.at(&k), Ok(v)),
                    None => prop_assert_eq!(m.at(&k), Err(MapError::NotFound)),
                },
            }
            if model.len() != len_before {
                buckets = model_buckets(model.len(), buckets);
            }
            prop_assert_eq!(m.len(), model.len());
            prop_assert_eq!(m.bucket_count(), buckets);
            prop_assert!(m.len() < m.bucket_count());
        }
        let mut seen: Vec<(u8, u16)> = m.iter().map(|(k, v)| (*k, *v)).collect();
        let mut want: Vec<(u8, u16)> = model.into_iter().collect();
        seen.sort_unstable();
        want.sort_unstable();
        prop_assert_eq!(seen, want);
    }

    // Property: equality ignores insertion order and bucket layout.
    #[test]
    fn prop_eq_ignores_order(pairs in proptest::collection::vec((any::<u8>(), any::<u8>()), 0..64)) {
        let forward: ChainHashMap<u8, u8> = pairs.iter().copied().collect();
        let mut backward: ChainHashMap<u8, u8> = ChainHashMap::new();
        // First occurrence wins, so replay the dedup'd pairs in reverse.
        let mut firsts: Vec<(u8, u8)> = Vec::new();
        for &(k, v) in &pairs {
            if !firsts.iter().any(|(fk, _)| *fk == k) {
                firsts.push((k, v));
            }
        }
        for &(k, v) in firsts.iter().rev() {
            backward.insert(k, v);
        }
        prop_assert_eq!(&forward, &backward);
        prop_assert_eq!(forward.clone(), forward);
    }
}
