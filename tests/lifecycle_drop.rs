//! Handles are reference counted: dropping the last handle frees the value,
//! and a dependent keeps its dependencies alive for as long as it exists.

use reactive_properties::{cloned, eval, list, of};
use std::rc::{Rc, Weak};

#[test]
fn dropping_last_handle_frees_state() {
    let p = of(String::from("temp"));
    let weak: Weak<_> = Rc::downgrade(p.state());
    let clone = p.clone();

    drop(p);
    assert!(weak.upgrade().is_some());
    assert_eq!(clone.get(), "temp");

    drop(clone);
    assert!(weak.upgrade().is_none());
}

#[test]
fn dependent_keeps_recorded_dependencies_alive() {
    let base = of(2);
    let base_state = Rc::downgrade(base.state());
    let doubled = eval(cloned!(base => move || base.get() * 2));
    assert_eq!(doubled.get(), 4);

    drop(base);
    assert!(base_state.upgrade().is_some());
    assert_eq!(doubled.get(), 4);

    drop(doubled);
    assert!(base_state.upgrade().is_none());
}

#[test]
fn recorded_state_outlives_formula_replacement_until_next_recompute() {
    let a = of(1);
    let b = of(10);
    let a_state = Rc::downgrade(a.state());

    let pick = eval(cloned!(a => move || a.get()));
    assert_eq!(pick.get(), 1);
    drop(a);

    // The old formula is gone but its dependency list is not.
    pick.set_formula(cloned!(b => move || b.get()));
    assert!(a_state.upgrade().is_some());

    assert_eq!(pick.get(), 10);
    assert!(a_state.upgrade().is_none());
}

#[test]
fn list_state_dropped_with_list() {
    let xs = list::<Vec<u8>>();
    xs.push(vec![1, 2, 3]);
    let weak = Rc::downgrade(xs.state());

    let len = eval(cloned!(xs => move || xs.len()));
    assert_eq!(len.get(), 1);

    drop(xs);
    assert!(weak.upgrade().is_some());
    drop(len);
    assert!(weak.upgrade().is_none());
}
