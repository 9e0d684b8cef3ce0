//! Random call sequences against one poset: every storage invariant holds
//! after each call and a failing call never changes anything.

use poset_store::{Poset, PosetError};
use proptest::prelude::*;

const LABELS: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

#[derive(Debug, Clone)]
enum Op {
    Insert(usize),
    Remove(usize),
    Add(usize, usize),
    Del(usize, usize),
    Clear,
}

fn arb_op() -> impl Strategy<Value = Op> {
    let ix = 0..LABELS.len();
    prop_oneof![
        3 => ix.clone().prop_map(Op::Insert),
        1 => ix.clone().prop_map(Op::Remove),
        5 => (ix.clone(), ix.clone()).prop_map(|(a, b)| Op::Add(a, b)),
        2 => (ix.clone(), ix).prop_map(|(a, b)| Op::Del(a, b)),
        1 => Just(Op::Clear),
    ]
}

fn apply(p: &mut Poset, op: &Op) -> Result<(), PosetError> {
    match *op {
        Op::Insert(i) => p.insert(LABELS[i]).map(drop),
        Op::Remove(i) => p.remove(LABELS[i]).map(drop),
        Op::Add(a, b) => p.add_relation(LABELS[a], LABELS[b]),
        Op::Del(a, b) => p.delete_relation(LABELS[a], LABELS[b]),
        Op::Clear => {
            p.clear();
            Ok(())
        }
    }
}

/// Observable state: elements, ids, and every pair that tests true.
fn state(p: &Poset) -> (Vec<String>, u64, Vec<(String, String)>) {
    let elements: Vec<String> = p.elements().into_iter().map(str::to_string).collect();
    let mut related = Vec::new();
    for x in &elements {
        for y in &elements {
            if p.test(x, y) == Ok(true) {
                related.push((x.clone(), y.clone()));
            }
        }
    }
    (elements, p.next_id(), related)
}

proptest! {
    #[test]
    fn invariants_hold_after_every_call(ops in prop::collection::vec(arb_op(), 1..60)) {
        let mut p = Poset::new();
        for op in &ops {
            let before = state(&p);
            let result = apply(&mut p, op);
            prop_assert_eq!(p.check_invariants(), Ok(()), "after {:?}", op);
            if result.is_err() {
                prop_assert_eq!(state(&p), before, "failed {:?} mutated state", op);
            }
        }
    }

    #[test]
    fn added_relation_is_closed(ops in prop::collection::vec(arb_op(), 1..40), a in 0..6usize, b in 0..6usize) {
        let mut p = Poset::new();
        for op in &ops {
            let _ = apply(&mut p, op);
        }
        if p.add_relation(LABELS[a], LABELS[b]).is_ok() {
            prop_assert_eq!(p.test(LABELS[a], LABELS[b]), Ok(true));
            prop_assert_eq!(p.test(LABELS[b], LABELS[a]), Ok(false));
            for x in p.elements() {
                for y in p.elements() {
                    let via = p.test(x, LABELS[a]) == Ok(true) && p.test(LABELS[b], y) == Ok(true);
                    if via {
                        prop_assert_eq!(p.test(x, y), Ok(true), "{} <= {}", x, y);
                    }
                }
            }
        }
    }

    #[test]
    fn covers_regenerate_the_relation(ops in prop::collection::vec(arb_op(), 1..60)) {
        let mut p = Poset::new();
        for op in &ops {
            let _ = apply(&mut p, op);
        }
        let q = Poset::from_snapshot(&p.snapshot()).unwrap();
        prop_assert_eq!(q.relations(), p.relations());
        prop_assert_eq!(q.linear_extension().map(|o| o.len()), Ok(p.len()));
    }
}
