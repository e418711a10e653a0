#![cfg(test)]

// Property tests for Dict kept inside the crate so they can check the
// internal counters (taken/filled) alongside the public behavior.

use crate::dict::Dict;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, u32),
    Remove(usize),
    Get(usize),
    Contains(String),
    Iterate,
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (u64, Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,6}", 1..=10).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => (idx.clone(), any::<u32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::Get),
            1 => "[a-z]{0,6}".prop_map(OpI::Contains),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Clear),
        ];
        (
            any::<u64>(),
            Just(pool.clone()),
            proptest::collection::vec(op, 1..120),
        )
    })
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences and permutation
// tables:
// - insert returns the replaced value exactly when the model had the key
//   live; get/contains parity with the model after every op.
// - remove reports presence and tombstones without breaking other keys.
// - iter yields each live entry exactly once (key set parity).
// - Counters: taken == model len, taken <= filled <= capacity, capacity
//   is always the default times a power of two.
proptest! {
    #![proptest_config(ProptestConfig { cases: 96, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((seed, pool, ops) in arb_scenario()) {
        let mut sut = Dict::with_rng(&mut StdRng::seed_from_u64(seed));
        let mut model: HashMap<String, String> = HashMap::new();

        for op in ops {
            match op {
                OpI::Insert(i, v) => {
                    let k = pool[i].clone();
                    let v = format!("v{v}");
                    let replaced = sut.insert(k.clone(), v.clone()).expect("insert ok");
                    let model_prev = model.insert(k, v);
                    prop_assert_eq!(replaced, model_prev);
                }
                OpI::Remove(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.remove(k), model.remove(k).is_some());
                }
                OpI::Get(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.get(k), model.get(k).map(String::as_str));
                }
                OpI::Contains(s) => {
                    prop_assert_eq!(sut.contains_key(&s), model.contains_key(&s));
                }
                OpI::Iterate => {
                    let mut seen: Vec<&str> = sut.iter().map(|(k, _)| k).collect();
                    seen.sort_unstable();
                    prop_assert!(seen.windows(2).all(|w| w[0] != w[1]), "duplicate live key");
                    let mut expected: Vec<&str> = model.keys().map(String::as_str).collect();
                    expected.sort_unstable();
                    prop_assert_eq!(seen, expected);
                }
                OpI::Clear => {
                    sut.clear();
                    model.clear();
                }
            }

            // Post-conditions after each op
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            prop_assert!(sut.len() <= sut.filled());
            prop_assert!(sut.filled() <= sut.capacity());
            let mut cap = sut.capacity();
            while cap % 2 == 0 {
                cap /= 2;
            }
            prop_assert_eq!(cap, 15, "capacity must stay default << k");
        }

        // Every key the model still holds reads back with its latest value.
        for (k, v) in &model {
            prop_assert_eq!(sut.get(k), Some(v.as_str()));
        }
    }
}

// Property: a pure insert workload (no deletions) never loses a key, no
// matter how many resizes the other insertions trigger.
proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]
    #[test]
    fn prop_inserts_survive_resizes(seed in any::<u64>(), n in 1usize..200) {
        let mut sut = Dict::with_rng(&mut StdRng::seed_from_u64(seed));
        for i in 0..n {
            sut.insert(format!("key{i}"), format!("val{i}")).expect("insert ok");
        }
        prop_assert_eq!(sut.len(), n);
        prop_assert_eq!(sut.filled(), n);
        for i in 0..n {
            let expected = format!("val{i}");
            prop_assert_eq!(sut.get(&format!("key{i}")), Some(expected.as_str()));
        }
    }
}
