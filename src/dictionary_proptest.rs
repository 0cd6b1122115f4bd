#![cfg(test)]

// Property tests for Dictionary kept inside the crate so they can check
// internal invariants (bucket placement, live count) after every step.

use crate::dictionary::{Destructor, Dictionary};
use crate::hash::Bkdr;
use core::hash::{BuildHasher, Hasher};
use proptest::prelude::*;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

// Pool-indexed operations: indices shrink to earlier keys, the pool
// shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Set(usize, i32),
    Delete(usize),
    Get(usize),
    Bump(usize, i32),
    Lookup(String),
}

fn arb_scenario(max_pool: usize) -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,6}", 1..=max_pool).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            // Small value range so equal-value sets happen often.
            4 => (idx.clone(), 0i32..4).prop_map(|(i, v)| Op::Set(i, v)),
            2 => idx.clone().prop_map(Op::Delete),
            2 => idx.clone().prop_map(Op::Get),
            1 => (idx.clone(), 1i32..3).prop_map(|(i, d)| Op::Bump(i, d)),
            1 => "[a-z]{0,6}".prop_map(Op::Lookup),
        ];
        proptest::collection::vec(op, 1..300).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Runs the state machine against std's HashMap with a recording destructor.
// Invariants exercised after every op:
// - `get`/`contains_key` agree with the model; `len` matches.
// - Entries sit in the bucket of their stored hash; stored hashes are fresh.
// - The destructor saw exactly the values the model displaced, in order.
// After drop: every remaining model value was released once.
fn run<S: BuildHasher>(hasher: S, pool: Vec<String>, ops: Vec<Op>) -> Result<(), TestCaseError> {
    let released: Rc<RefCell<Vec<i32>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = released.clone();
    let destructor: Destructor<i32> = Rc::new(move |v: i32| sink.borrow_mut().push(v));
    let mut sut = Dictionary::with_hasher_and_destructor(hasher, Some(destructor));
    let mut model: HashMap<String, i32> = HashMap::new();
    let mut expected_released: Vec<i32> = Vec::new();
    let mut class = sut.size_class();

    for op in ops {
        match op {
            Op::Set(i, v) => {
                let k = &pool[i];
                match model.insert(k.clone(), v) {
                    Some(old) if old != v => expected_released.push(old),
                    _ => {}
                }
                sut.set(k, Some(v));
                prop_assert_eq!(sut.get(k), Some(&v));
            }
            Op::Delete(i) => {
                let k = &pool[i];
                if let Some(old) = model.remove(k) {
                    expected_released.push(old);
                }
                sut.set(k, None);
                prop_assert_eq!(sut.get(k), None);
            }
            Op::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k), model.get(k));
            }
            Op::Bump(i, d) => {
                let k = &pool[i];
                if let Some(v) = sut.get_mut(k) {
                    *v += d;
                }
                if let Some(v) = model.get_mut(k) {
                    *v += d;
                }
                prop_assert_eq!(sut.get(k), model.get(k));
            }
            Op::Lookup(s) => {
                prop_assert_eq!(sut.contains_key(&s), model.contains_key(&s));
            }
        }

        sut.check_invariants();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.size_class() >= class, "size class went down");
        class = sut.size_class();
        let seen = released.borrow().clone();
        prop_assert_eq!(seen, expected_released.clone());
    }

    drop(sut);
    let mut at_drop: Vec<i32> = released.borrow()[expected_released.len()..].to_vec();
    let mut remaining: Vec<i32> = model.into_values().collect();
    at_drop.sort_unstable();
    remaining.sort_unstable();
    prop_assert_eq!(at_drop, remaining);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario(160)) {
        run(Bkdr, pool, ops)?;
    }

    #[test]
    fn prop_state_machine_random_state((pool, ops) in arb_scenario(160)) {
        run(hashbrown::hash_map::DefaultHashBuilder::default(), pool, ops)?;
    }
}

// Collision variant: a constant hasher puts every key in one chain, which
// stresses equality resolution and unlinking at every chain position.
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

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario(12)) {
        run(ConstBuildHasher, pool, ops)?;
    }
}
