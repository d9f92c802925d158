//! Observable and Properties working together through their dispatchers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use hookbus::{Callback, Emitter, Observable, Properties, PropertyRef, Value};

fn counter() -> (Arc<AtomicUsize>, Callback) {
    let hits = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&hits);
    let cb = Callback::action(move |_| {
        sink.fetch_add(1, Ordering::SeqCst);
    });
    (hits, cb)
}

#[test]
fn listeners_bound_before_the_property_exists() {
    let props = Properties::new();
    let (early, cb) = counter();
    props.on("change:a", cb);
    props.set("a", "works").unwrap();
    assert_eq!(early.load(Ordering::SeqCst), 1);
}

#[test]
fn removed_property_no_longer_reports_but_keeps_its_own_listeners() {
    let props = Properties::new();
    props.set("a", "works").unwrap();

    let (bag_hits, bag_cb) = counter();
    props.on("change:a change", bag_cb);

    let a = props.observable("a").unwrap();
    let (own_hits, own_cb) = counter();
    a.on("change", own_cb);

    props.remove("a").unwrap();
    a.set("removed").unwrap();

    assert!(props.observable("a").is_none());
    assert_eq!(own_hits.load(Ordering::SeqCst), 1);
    assert_eq!(bag_hits.load(Ordering::SeqCst), 0);
}

#[test]
fn props_pull_and_unpull() {
    let props = Properties::new();
    props.add("master", None).unwrap();
    props.add("slave", None).unwrap();

    assert!(props.pull("slave", &["master".into()]));
    props.set("master", "pulled").unwrap();
    assert_eq!(props.get("slave"), Some(Value::from("pulled")));

    props.set("slave", "freedom").unwrap();
    assert_eq!(props.get("master"), Some(Value::from("pulled")));

    assert!(props.unpull("slave", &["master".into()]));
    props.set("master", "changed").unwrap();
    assert_eq!(props.get("slave"), Some(Value::from("freedom")));
}

#[test]
fn props_sync_and_unsync() {
    let props = Properties::new();
    props.add("yin", None).unwrap();
    props.add("yang", None).unwrap();

    props.sync("yin", &["yang".into()]);
    props.set("yin", 5).unwrap();
    assert_eq!(props.get("yang"), Some(Value::Int(5)));
    props.set("yang", "balance").unwrap();
    assert_eq!(props.get("yin"), Some(Value::from("balance")));

    props.unsync("yin", &["yang".into()]);
    props.set("yin", 2).unwrap();
    props.set("yang", 3).unwrap();
    assert_eq!(props.get("yin"), Some(Value::Int(2)));
    assert_eq!(props.get("yang"), Some(Value::Int(3)));
}

#[test]
fn sync_across_two_bags() {
    let left = Properties::new();
    let right = Properties::new();
    let shared = right.add("theme", Some(Observable::new("light"))).unwrap();
    left.add("theme", None).unwrap();

    left.sync("theme", &[PropertyRef::from(shared)]);
    left.set("theme", "dark").unwrap();
    assert_eq!(right.get("theme"), Some(Value::from("dark")));
    right.set("theme", "sepia").unwrap();
    assert_eq!(left.get("theme"), Some(Value::from("sepia")));
}

#[test]
fn sync_cycle_settles() {
    let a = Observable::empty();
    let b = Observable::empty();
    let c = Observable::empty();
    a.sync([&b]);
    b.sync([&c]);
    c.sync([&a]);

    let (hits, cb) = counter();
    a.on("change", cb);
    c.set(7).unwrap();

    assert_eq!(a.get(), Value::Int(7));
    assert_eq!(b.get(), Value::Int(7));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn chained_pull_propagates() {
    let source = Observable::new(0);
    let middle = Observable::empty();
    let sink = Observable::empty();
    middle.pull([&source]);
    sink.pull([&middle]);

    source.set(3).unwrap();
    assert_eq!(sink.get(), Value::Int(3));
}

#[test]
fn general_change_event_names_the_key() {
    let props = Properties::from_pairs([("x", 1), ("y", 2)]).unwrap();
    let seen: Arc<Mutex<Vec<Value>>> = Arc::default();
    let sink = Arc::clone(&seen);
    props.on("change", Callback::action(move |inv| sink.lock().unwrap().push(inv.arg(0))));

    props.set_all([("y", 20), ("x", 10), ("x", 10)]).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![Value::from("y"), Value::from("x")]);
    assert_eq!(props.keys(), vec!["x", "y"]);
}
