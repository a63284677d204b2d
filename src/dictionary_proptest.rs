#![cfg(test)]

// State-machine property tests for Dictionary, kept inside the crate next to
// the implementation they exercise.

use crate::config::DictConfig;
use crate::dictionary::Dictionary;
use crate::error::DictError;
use proptest::prelude::*;
use std::cell::Cell;

// Operations name keys by position in a generated key pool rather than by
// value, so a failing run shrinks toward fewer keys and shorter op lists.
// `Contains` takes a free-form string so it also checks keys outside the pool.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Remove(usize),
    Pop(usize, Option<i32>),
    PopItem,
    SetDefault(usize, i32),
    Lookup(usize),
    Contains(String),
    Mutate(usize, i32),
    Iterate,
    Clear,
}

fn arb_config() -> impl Strategy<Value = DictConfig> {
    (1usize..=8, 2usize..=4).prop_map(|(cap, mult)| {
        DictConfig::new()
            .initial_capacity(cap)
            .growth_multiplier(mult)
    })
}

fn arb_scenario() -> impl Strategy<Value = (DictConfig, Vec<String>, Vec<OpI>)> {
    let pool = proptest::collection::vec("[a-z]{0,5}", 1..=12);
    (arb_config(), pool).prop_flat_map(|(config, pool)| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            1 => idx.clone().prop_map(OpI::Remove),
            1 => (idx.clone(), proptest::option::of(any::<i32>())).prop_map(|(i, d)| OpI::Pop(i, d)),
            1 => Just(OpI::PopItem),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::SetDefault(i, v)),
            1 => idx.clone().prop_map(OpI::Lookup),
            1 => prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (config, pool.clone(), ops))
    })
}

/// Ordered model: position in the vector is iteration order.
fn model_write(model: &mut Vec<(String, i32)>, k: &str, v: i32) -> Option<i32> {
    let at = model.iter().position(|(mk, _)| mk == k);
    let prev = at.map(|i| model.remove(i).1);
    model.push((k.to_string(), v));
    prev
}

fn model_remove(model: &mut Vec<(String, i32)>, k: &str) -> Option<i32> {
    let i = model.iter().position(|(mk, _)| mk == k)?;
    Some(model.remove(i).1)
}

fn is_power_of(mut n: usize, base: usize) -> bool {
    while n > 1 && n % base == 0 {
        n /= base;
    }
    n == 1
}

// Property: State-machine equivalence against an ordered Vec model.
// Invariants exercised across random operation sequences:
// - Writes round-trip; an overwrite returns the old value and moves the key last.
// - `remove`/`pop`/`pop_item` agree with the model, including error cases.
// - `set_default_with` runs its factory only on a miss.
// - Iteration order equals model order after any number of rebuilds.
// - `len <= capacity`, and capacity is always initial * multiplier^k.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((config, pool, ops) in arb_scenario()) {
        let mut sut: Dictionary<String, i32> = Dictionary::with_config(config).unwrap();
        let mut model: Vec<(String, i32)> = Vec::new();
        let factory_calls = Cell::new(0);

        for op in ops {
            match op {
                OpI::Insert(i, v) => {
                    let k = &pool[i];
                    let prev = sut.insert(k.clone(), v).unwrap();
                    prop_assert_eq!(prev, model_write(&mut model, k, v));
                    prop_assert_eq!(sut.lookup(k.as_str()), Ok(&v));
                }
                OpI::Remove(i) => {
                    let k = &pool[i];
                    let expected = model_remove(&mut model, k).ok_or(DictError::KeyNotFound);
                    prop_assert_eq!(sut.remove(k.as_str()), expected);
                }
                OpI::Pop(i, default) => {
                    let k = &pool[i];
                    let expected = model_remove(&mut model, k)
                        .or(default)
                        .ok_or(DictError::KeyNotFound);
                    prop_assert_eq!(sut.pop(k.as_str(), default), expected);
                }
                OpI::PopItem => {
                    let expected = model.pop().ok_or(DictError::KeyNotFound);
                    prop_assert_eq!(sut.pop_item(), expected);
                }
                OpI::SetDefault(i, v) => {
                    let k = &pool[i];
                    let before = factory_calls.get();
                    let present = model.iter().any(|(mk, _)| mk == k);
                    let got = *sut
                        .set_default_with(k.clone(), || {
                            factory_calls.set(factory_calls.get() + 1);
                            v
                        })
                        .unwrap();
                    if present {
                        prop_assert_eq!(factory_calls.get(), before);
                    } else {
                        prop_assert_eq!(factory_calls.get(), before + 1);
                        model.push((k.clone(), v));
                    }
                    let stored = model.iter().find(|(mk, _)| mk == k).map(|(_, mv)| *mv);
                    prop_assert_eq!(Some(got), stored);
                }
                OpI::Lookup(i) => {
                    let k = &pool[i];
                    let expected = model.iter().find(|(mk, _)| mk == k).map(|(_, v)| v);
                    prop_assert_eq!(sut.get(k.as_str()), expected);
                    prop_assert_eq!(sut.contains_key(k.as_str()), expected.is_some());
                }
                OpI::Contains(s) => {
                    let has_model = model.iter().any(|(mk, _)| *mk == s);
                    prop_assert_eq!(sut.contains_key(s.as_str()), has_model);
                }
                OpI::Mutate(i, d) => {
                    let k = &pool[i];
                    if let Some(v) = sut.get_mut(k.as_str()) {
                        *v = v.saturating_add(d);
                        let mv = model.iter_mut().find(|(mk, _)| mk == k).map(|(_, mv)| mv);
                        prop_assert!(mv.is_some(), "model must hold a key the dictionary holds");
                        if let Some(mv) = mv {
                            *mv = mv.saturating_add(d);
                        }
                    } else {
                        prop_assert!(!model.iter().any(|(mk, _)| mk == k));
                    }
                }
                OpI::Iterate => {
                    let got: Vec<(String, i32)> =
                        sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                    prop_assert_eq!(&got, &model);
                }
                OpI::Clear => {
                    let cap = sut.capacity();
                    sut.clear();
                    model.clear();
                    prop_assert_eq!(sut.capacity(), cap);
                }
            }

            // Post-conditions after each op
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            prop_assert!(sut.len() <= sut.capacity());
            prop_assert_eq!(sut.capacity() % config.initial_capacity, 0);
            prop_assert!(is_power_of(
                sut.capacity() / config.initial_capacity,
                config.growth_multiplier
            ));
            let keys: Vec<&String> = sut.keys();
            let model_keys: Vec<&String> = model.iter().map(|(k, _)| k).collect();
            prop_assert_eq!(keys, model_keys);
        }
    }
}

// Property: two dictionaries built from the same pairs are equal exactly when
// their write orders agree on the surviving keys.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_equality_tracks_order(
        pairs in proptest::collection::vec(("[a-c]{1,2}", 0i32..4), 0..12),
        rotate in 0usize..12,
    ) {
        let a = Dictionary::from_pairs(pairs.clone()).unwrap();
        let mut rotated = pairs.clone();
        if !rotated.is_empty() {
            let by = rotate % rotated.len();
            rotated.rotate_left(by);
        }
        let b = Dictionary::from_pairs(rotated).unwrap();

        let a_items: Vec<(String, i32)> = a.iter().map(|(k, v)| (k.clone(), *v)).collect();
        let b_items: Vec<(String, i32)> = b.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(a == b, a_items == b_items);
        prop_assert!(a == a.clone());
    }
}
