//! Tests for listener removal: `off`, `off_all`, bulk clears.

use std::sync::Arc;

use bubble_emitter::{EventEmitter, Listener};
use regex::Regex;

use super::support::{entries, make_log, recorder};

#[test]
fn off_removes_the_given_listener_only() {
    let emitter: EventEmitter = EventEmitter::new();
    let log = make_log();
    let a = recorder(&log, "a");

    emitter.on("change", [a.clone(), recorder(&log, "b")]);
    emitter.off("change", &a);
    emitter.emit("change", []);

    assert_eq!(entries(&log), vec!["b"]);
}

#[test]
fn off_matches_by_callback_not_by_registration() {
    let emitter: EventEmitter = EventEmitter::new();
    let log = make_log();
    let a = recorder(&log, "a");

    emitter.once("change", a.clone());
    // A different handle to the same callback removes the entry.
    let same = Listener::Callback(match &a {
        Listener::Callback(f) => Arc::clone(f),
        Listener::Delegate(_) => unreachable!(),
    });
    emitter.off("change", same);

    assert!(!emitter.has_listeners());
}

#[test]
fn off_without_listeners_clears_the_queue() {
    let emitter: EventEmitter = EventEmitter::new();
    let log = make_log();

    emitter.on("a", [recorder(&log, "a1"), recorder(&log, "a2")]);
    emitter.on("b", recorder(&log, "b1"));
    emitter.off("a", ());

    assert_eq!(emitter.event_types(), vec!["b"]);
    emitter.emit("a b", []);
    assert_eq!(entries(&log), vec!["b1"]);
}

#[test]
fn removing_the_last_listener_discards_the_registry() {
    let emitter: EventEmitter = EventEmitter::new();
    let a: Listener = Listener::new(|_, _| {});

    emitter.on("a b", &a);
    emitter.off("a", &a);
    assert!(emitter.has_listeners());
    emitter.off("b", &a);
    assert!(!emitter.has_listeners());
    assert_eq!(emitter.listener_count("a"), 0);
}

#[test]
fn removing_unknown_listeners_or_types_is_a_silent_no_op() {
    let emitter: EventEmitter = EventEmitter::new();
    let registered: Listener = Listener::new(|_, _| {});
    let stranger: Listener = Listener::new(|_, _| {});

    // Nothing registered at all.
    emitter.off("a", &stranger);
    emitter.off_all(());

    emitter.on("a", &registered);
    emitter.off("a", &stranger);
    emitter.off("missing", &registered);
    emitter.off("", ());
    emitter.off(Regex::new("^zzz").unwrap(), ());

    assert_eq!(emitter.listener_count("a"), 1);
}

#[test]
fn off_all_removes_a_listener_from_every_queue() {
    let emitter: EventEmitter = EventEmitter::new();
    let log = make_log();
    let shared = recorder(&log, "shared");

    emitter.on("a b c", &shared);
    emitter.on("c", recorder(&log, "c-only"));
    emitter.off_all(&shared);

    assert_eq!(emitter.event_types(), vec!["c"]);
    emitter.emit("*", []);
    assert_eq!(entries(&log), vec!["c-only"]);
}

#[test]
fn off_all_with_no_listeners_clears_everything() {
    let emitter: EventEmitter = EventEmitter::new();
    emitter.on("a b c", Listener::new(|_, _| {}));

    emitter.remove_all_listeners(());

    assert!(!emitter.has_listeners());
    assert!(emitter.event_types().is_empty());
}

#[test]
fn pattern_removal_touches_only_matching_queues() {
    let emitter: EventEmitter = EventEmitter::new();
    let l: Listener = Listener::new(|_, _| {});

    emitter.on("user:add user:remove post:add", &l);
    emitter.remove_listener(Regex::new("^user:").unwrap(), &l);

    assert_eq!(emitter.event_types(), vec!["post:add"]);
}

#[test]
fn multi_name_removal_skips_missing_names() {
    let emitter: EventEmitter = EventEmitter::new();
    let l: Listener = Listener::new(|_, _| {});

    emitter.on("a b", &l);
    emitter.off("b nope a", &l);

    assert!(!emitter.has_listeners());
}

#[test]
fn queues_recreated_after_clear_keep_insertion_order() {
    let emitter: EventEmitter = EventEmitter::new();
    let l: Listener = Listener::new(|_, _| {});

    emitter.on("a b", &l);
    emitter.off("a", ());
    emitter.on("a", &l);

    assert_eq!(emitter.event_types(), vec!["b", "a"]);
}
