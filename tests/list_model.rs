//! Property-based tests for ReactiveList.
//!
//! Every operation is applied to a ReactiveList and to a plain Vec; the
//! two must agree, and a formula over the list must see every change.

use proptest::prelude::*;
use reactive_properties::{cloned, eval, list, Property, ReactiveList};

#[derive(Debug, Clone)]
enum Op {
    Push(i32),
    Pop,
    Insert(usize, i32),
    Remove(usize),
    RemoveItem(i32),
    Set(usize, i32),
    Extend(Vec<i32>),
    RetainEven,
    Truncate(usize),
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<i32>().prop_map(Op::Push),
        1 => Just(Op::Pop),
        2 => (any::<usize>(), any::<i32>()).prop_map(|(i, x)| Op::Insert(i, x)),
        2 => any::<usize>().prop_map(Op::Remove),
        1 => (-4..4i32).prop_map(Op::RemoveItem),
        2 => (any::<usize>(), any::<i32>()).prop_map(|(i, x)| Op::Set(i, x)),
        1 => prop::collection::vec(-4..4i32, 0..4).prop_map(Op::Extend),
        1 => Just(Op::RetainEven),
        1 => (0..8usize).prop_map(Op::Truncate),
        1 => Just(Op::Clear),
    ]
}

/// Apply `op` to both sides. Index-based ops are clamped into range so
/// they never panic.
fn apply(op: &Op, xs: &ReactiveList<i32>, model: &mut Vec<i32>) {
    match op {
        Op::Push(x) => {
            xs.push(*x);
            model.push(*x);
        }
        Op::Pop => {
            assert_eq!(xs.pop(), model.pop());
        }
        Op::Insert(i, x) => {
            let i = i % (model.len() + 1);
            xs.insert(i, *x);
            model.insert(i, *x);
        }
        Op::Remove(i) => {
            if model.is_empty() {
                xs.update(|_| ());
            } else {
                let i = i % model.len();
                assert_eq!(xs.remove(i), model.remove(i));
            }
        }
        Op::RemoveItem(x) => {
            let expected = match model.iter().position(|y| y == x) {
                Some(i) => {
                    model.remove(i);
                    true
                }
                None => false,
            };
            assert_eq!(xs.remove_item(x), expected);
        }
        Op::Set(i, x) => {
            if model.is_empty() {
                xs.update(|_| ());
            } else {
                let i = i % model.len();
                let old = std::mem::replace(&mut model[i], *x);
                assert_eq!(xs.set(i, *x), old);
            }
        }
        Op::Extend(items) => {
            xs.extend(items.iter().copied());
            model.extend(items.iter().copied());
        }
        Op::RetainEven => {
            xs.retain(|x| x % 2 == 0);
            model.retain(|x| x % 2 == 0);
        }
        Op::Truncate(n) => {
            xs.truncate(*n);
            model.truncate(*n);
        }
        Op::Clear => {
            xs.clear();
            model.clear();
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn list_matches_vec_model(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let xs = list::<i32>();
        let mut model = Vec::new();
        let sum: Property<i64> = eval(cloned!(xs => move || {
            xs.with(|v| v.iter().map(|&x| i64::from(x)).sum())
        }));

        for op in &ops {
            apply(op, &xs, &mut model);

            prop_assert!(xs.is_dirty(), "{:?} left the list clean", op);
            prop_assert!(sum.is_dirty(), "{:?} did not reach the dependent", op);

            let expected: i64 = model.iter().map(|&x| i64::from(x)).sum();
            prop_assert_eq!(sum.get(), expected);
            prop_assert_eq!(xs.to_vec(), model.clone());
            prop_assert!(!xs.is_dirty());
        }
    }

    #[test]
    fn reads_never_mark_dirty(items in prop::collection::vec(any::<i32>(), 0..16), probe in any::<i32>()) {
        let xs = ReactiveList::from_vec(items.clone());
        xs.len();
        prop_assert!(!xs.is_dirty());

        let stamp = xs.recalculated_at();
        prop_assert_eq!(xs.contains(&probe), items.contains(&probe));
        prop_assert_eq!(xs.index_of(&probe), items.iter().position(|x| *x == probe));
        prop_assert_eq!(xs.first(), items.first().copied());
        prop_assert_eq!(xs.last(), items.last().copied());
        prop_assert_eq!(xs.is_empty(), items.is_empty());

        prop_assert!(!xs.is_dirty());
        prop_assert_eq!(xs.recalculated_at(), stamp);
    }
}
