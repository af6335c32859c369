//! Randomized oracle tests: replay operation sequences against
//! `std::collections::BTreeMap` and require identical observable behavior,
//! with a full structural integrity check after every mutation.

use std::collections::BTreeMap;

use proptest::prelude::*;
use ramify::{HeapKey, RadixMap};

/// Key bodies draw from a 3-symbol alphabet so sequences collide and share
/// long prefixes; the 0 terminator keeps the key set prefix-free, which the
/// tree requires.
fn key_strategy() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(1u8..=3, 0..6).prop_map(|mut body| {
        body.push(0);
        body
    })
}

#[derive(Debug, Clone)]
enum MapOp {
    Insert(Vec<u8>, u32),
    Remove(Vec<u8>),
    Get(Vec<u8>),
}

fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        4 => (key_strategy(), any::<u32>()).prop_map(|(k, v)| MapOp::Insert(k, v)),
        2 => key_strategy().prop_map(MapOp::Remove),
        2 => key_strategy().prop_map(MapOp::Get),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Replays a random op sequence on both maps and asserts identical
    /// results at every step, with the tree's structural invariants checked
    /// after each mutation.
    #[test]
    fn ops_match_btreemap(ops in proptest::collection::vec(map_op_strategy(), 1..400)) {
        let mut map: RadixMap<HeapKey, u32> = RadixMap::new();
        let mut oracle: BTreeMap<Vec<u8>, u32> = BTreeMap::new();

        for op in &ops {
            match op {
                MapOp::Insert(k, v) => {
                    let key = HeapKey::new_from_vec(k.clone());
                    prop_assert_eq!(map.insert_k(&key, *v), oracle.insert(k.clone(), *v));
                    map.check_integrity();
                }
                MapOp::Remove(k) => {
                    let key = HeapKey::new_from_vec(k.clone());
                    prop_assert_eq!(map.remove_k(&key), oracle.remove(k));
                    map.check_integrity();
                }
                MapOp::Get(k) => {
                    let key = HeapKey::new_from_vec(k.clone());
                    prop_assert_eq!(map.get_k(&key), oracle.get(k));
                }
            }
            prop_assert_eq!(map.len(), oracle.len());
            prop_assert_eq!(map.is_empty(), oracle.is_empty());
        }

        // Iteration must agree in content and order, both ways.
        let got: Vec<(Vec<u8>, u32)> =
            map.iter().map(|(k, v)| (k.as_ref().to_vec(), *v)).collect();
        let want: Vec<(Vec<u8>, u32)> =
            oracle.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(got, want);

        let got_rev: Vec<Vec<u8>> = map.iter_rev().map(|(k, _)| k.as_ref().to_vec()).collect();
        let want_rev: Vec<Vec<u8>> = oracle.keys().rev().cloned().collect();
        prop_assert_eq!(got_rev, want_rev);
    }

    /// In-order iteration yields strictly ascending keys after any insertion
    /// sequence.
    #[test]
    fn iteration_is_strictly_ascending(
        keys in proptest::collection::vec(key_strategy(), 1..300),
    ) {
        let mut map: RadixMap<HeapKey, u32> = RadixMap::new();
        for (i, k) in keys.iter().enumerate() {
            map.insert_k(&HeapKey::new_from_vec(k.clone()), i as u32);
        }
        map.check_integrity();

        let collected: Vec<Vec<u8>> = map.iter().map(|(k, _)| k.as_ref().to_vec()).collect();
        for pair in collected.windows(2) {
            prop_assert!(pair[0] < pair[1], "{:02x?} !< {:02x?}", pair[0], pair[1]);
        }
    }

    /// Lookups never mutate: hammering `get` (hits and misses alike) leaves
    /// iteration output and structure unchanged.
    #[test]
    fn get_is_idempotent(
        keys in proptest::collection::vec(key_strategy(), 1..100),
        probes in proptest::collection::vec(key_strategy(), 1..100),
    ) {
        let mut map: RadixMap<HeapKey, u32> = RadixMap::new();
        for (i, k) in keys.iter().enumerate() {
            map.insert_k(&HeapKey::new_from_vec(k.clone()), i as u32);
        }
        let before: Vec<(Vec<u8>, u32)> =
            map.iter().map(|(k, v)| (k.as_ref().to_vec(), *v)).collect();

        for probe in &probes {
            let key = HeapKey::new_from_vec(probe.clone());
            let first = map.get_k(&key).copied();
            let second = map.get_k(&key).copied();
            prop_assert_eq!(first, second);
        }

        let after: Vec<(Vec<u8>, u32)> =
            map.iter().map(|(k, v)| (k.as_ref().to_vec(), *v)).collect();
        prop_assert_eq!(before, after);
        map.check_integrity();
    }

    /// Inserting N distinct keys, reading each back, then erasing them in an
    /// arbitrary order leaves an empty tree.
    #[test]
    fn insert_get_erase_roundtrip(
        keys in proptest::collection::btree_set(key_strategy(), 1..200),
        seed in any::<u64>(),
    ) {
        let mut map: RadixMap<HeapKey, u64> = RadixMap::new();
        for (i, k) in keys.iter().enumerate() {
            prop_assert_eq!(map.insert_k(&HeapKey::new_from_vec(k.clone()), i as u64), None);
        }
        for (i, k) in keys.iter().enumerate() {
            prop_assert_eq!(map.get_k(&HeapKey::new_from_vec(k.clone())), Some(&(i as u64)));
        }

        // Pseudo-shuffled erase order derived from the seed.
        let mut order: Vec<(u64, &Vec<u8>, u64)> = keys
            .iter()
            .enumerate()
            .map(|(i, k)| (seed.wrapping_mul(0x9e37_79b9_7f4a_7c15).wrapping_add(i as u64).rotate_left(17), k, i as u64))
            .collect();
        order.sort();
        for (_, k, v) in order {
            prop_assert_eq!(map.remove_k(&HeapKey::new_from_vec(k.clone())), Some(v));
            map.check_integrity();
        }
        prop_assert!(map.is_empty());
    }

    /// `range` agrees with the BTreeMap oracle for arbitrary bounds.
    #[test]
    fn ranges_match_btreemap(
        keys in proptest::collection::vec(key_strategy(), 1..200),
        lo in key_strategy(),
        hi in key_strategy(),
    ) {
        let mut map: RadixMap<HeapKey, u32> = RadixMap::new();
        let mut oracle: BTreeMap<Vec<u8>, u32> = BTreeMap::new();
        for (i, k) in keys.iter().enumerate() {
            map.insert_k(&HeapKey::new_from_vec(k.clone()), i as u32);
            oracle.insert(k.clone(), i as u32);
        }

        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        let lo_key = HeapKey::new_from_vec(lo.clone());
        let hi_key = HeapKey::new_from_vec(hi.clone());

        let got: Vec<Vec<u8>> = map
            .range(lo_key.clone()..hi_key.clone())
            .map(|(k, _)| k.as_ref().to_vec())
            .collect();
        let want: Vec<Vec<u8>> = oracle.range(lo.clone()..hi.clone()).map(|(k, _)| k.clone()).collect();
        prop_assert_eq!(got, want);

        let got: Vec<Vec<u8>> = map
            .range(lo_key.clone()..=hi_key.clone())
            .map(|(k, _)| k.as_ref().to_vec())
            .collect();
        let want: Vec<Vec<u8>> =
            oracle.range(lo.clone()..=hi.clone()).map(|(k, _)| k.clone()).collect();
        prop_assert_eq!(got, want);

        let got: Vec<Vec<u8>> = map
            .range(lo_key.clone()..)
            .map(|(k, _)| k.as_ref().to_vec())
            .collect();
        let want: Vec<Vec<u8>> = oracle.range(lo.clone()..).map(|(k, _)| k.clone()).collect();
        prop_assert_eq!(got, want);
    }
}
