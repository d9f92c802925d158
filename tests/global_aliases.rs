//! The process-wide dispatcher and its action/filter aliases.
//!
//! Each test uses its own event names; the dispatcher is shared.

use std::sync::{Arc, Mutex};

use hookbus::dispatcher::global::{
    add_action, add_filter, apply_filters, dispatcher, do_action, remove_action, remove_filter,
};
use hookbus::{Callback, Value};

#[test]
fn actions_receive_arguments() {
    let seen: Arc<Mutex<Vec<Value>>> = Arc::default();
    let sink = Arc::clone(&seen);
    add_action(
        "e2e_save.audit",
        Callback::action(move |inv| sink.lock().unwrap().extend(inv.args.to_vec())),
    );

    do_action("e2e_save", vec![Value::from("doc-1")]).unwrap();
    do_action("e2e_save.other", vec![Value::from("doc-2")]).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![Value::from("doc-1")]);

    remove_action("e2e_save.audit", None);
    assert_eq!(dispatcher().callback_count("e2e_save"), 0);
}

#[test]
fn filters_fold_per_event() {
    let double = Callback::new(|inv| Ok(Value::Int(inv.arg(0).as_int().unwrap_or(0) * 2)));
    add_filter("e2e_title e2e_body", double.clone());
    add_filter(
        "e2e_title",
        Callback::new(|inv| Ok(Value::Int(inv.arg(0).as_int().unwrap_or(0) + 1))),
    );

    let out = apply_filters("e2e_title e2e_body", vec![Value::Int(5)]).unwrap();
    assert_eq!(out, vec![Value::Int(11), Value::Int(10)]);

    remove_filter("e2e_title e2e_body", Some(&double));
    let out = apply_filters("e2e_title e2e_body", vec![Value::Int(5)]).unwrap();
    assert_eq!(out, vec![Value::Int(6), Value::Int(5)]);
}

#[test]
fn filter_without_callbacks_returns_input() {
    let out = apply_filters("e2e_untouched", vec![Value::from("raw")]).unwrap();
    assert_eq!(out, vec![Value::from("raw")]);
}
