//! Tests for listener registration: `on`, `once`, `on_limit`, `on_all`.

use std::sync::{Arc, Mutex};

use bubble_emitter::{Event, EventEmitter, Flow, HandleEvent, Listener, Selector};
use regex::Regex;
use serde_json::{json, Value};

use super::support::{entries, make_log, recorder, typed_recorder};

// ============================================================================
// Basic registration
// ============================================================================

#[test]
fn on_adds_listener_and_emit_calls_it() {
    let emitter: EventEmitter = EventEmitter::new();
    let log = make_log();

    emitter.on("change", recorder(&log, "a"));
    emitter.emit("change", []);

    assert_eq!(entries(&log), vec!["a"]);
}

#[test]
fn listeners_fire_in_registration_order() {
    let emitter: EventEmitter = EventEmitter::new();
    let log = make_log();

    emitter
        .on("change", recorder(&log, "a"))
        .on("change", recorder(&log, "b"))
        .add_listener("change", [recorder(&log, "c"), recorder(&log, "d")]);
    emitter.emit("change", []);

    assert_eq!(entries(&log), vec!["a", "b", "c", "d"]);
}

#[test]
fn duplicate_registration_is_a_no_op() {
    let emitter: EventEmitter = EventEmitter::new();
    let log = make_log();
    let a = recorder(&log, "a");

    emitter.on("change", &a);
    emitter.on("change", &a);
    emitter.on("change", [&a, &a]);

    assert_eq!(emitter.listener_count("change"), 1);
    emitter.emit("change", []);
    assert_eq!(entries(&log), vec!["a"]);
}

fn ignore(_: &Event, _: &[Value]) {}

#[test]
fn wrapping_the_same_fn_twice_gives_distinct_listeners() {
    let emitter: EventEmitter = EventEmitter::new();

    emitter.on("change", Listener::new(ignore));
    emitter.on("change", Listener::new(ignore));
    assert_eq!(emitter.listener_count("change"), 2);

    emitter.off("change", Listener::new(ignore));
    assert_eq!(emitter.listener_count("change"), 2);

    let kept = Listener::new(ignore);
    emitter.on("change", &kept).on("change", &kept);
    assert_eq!(emitter.listener_count("change"), 3);
    emitter.off("change", &kept);
    assert_eq!(emitter.listener_count("change"), 2);
}

#[test]
fn same_listener_may_serve_several_types() {
    let emitter: EventEmitter = EventEmitter::new();
    let log = make_log();

    emitter.on("open close", typed_recorder(&log, "x"));
    emitter.emit("close", []);
    emitter.emit("open", []);

    assert_eq!(entries(&log), vec!["x:close", "x:open"]);
}

#[test]
fn multi_name_selector_creates_queues_left_to_right() {
    let emitter: EventEmitter = EventEmitter::new();
    emitter.on("a  b\tc", Listener::new(|_, _| {}));

    assert_eq!(emitter.event_types(), vec!["a", "b", "c"]);
}

#[test]
fn empty_selector_or_listener_list_registers_nothing() {
    let emitter: EventEmitter = EventEmitter::new();
    let log = make_log();

    emitter.on("", recorder(&log, "a"));
    emitter.on("   ", recorder(&log, "a"));
    emitter.on("change", ());
    emitter.on("change", Vec::<Listener>::new());

    assert!(!emitter.has_listeners());
    assert!(emitter.event_types().is_empty());
}

// ============================================================================
// Wildcard and pattern registration
// ============================================================================

#[test]
fn wildcard_only_extends_existing_queues() {
    let emitter: EventEmitter = EventEmitter::new();
    let log = make_log();

    emitter.on("a", recorder(&log, "a1"));
    emitter.on("*", typed_recorder(&log, "w"));
    emitter.on("b", recorder(&log, "b1"));

    emitter.emit("a", []);
    emitter.emit("b", []);

    assert_eq!(entries(&log), vec!["a1", "w:a", "b1"]);
}

#[test]
fn wildcard_on_an_empty_emitter_creates_nothing() {
    let emitter: EventEmitter = EventEmitter::new();
    emitter.on_all(Listener::new(|_, _| {}));
    emitter.on("*", Listener::new(|_, _| {}));

    assert!(!emitter.has_listeners());
}

#[test]
fn pattern_extends_matching_existing_queues() {
    let emitter: EventEmitter = EventEmitter::new();
    let log = make_log();

    emitter.on("user:add user:remove post:add", Listener::new(|_, _| {}));
    emitter.on(Regex::new("^user:").unwrap(), typed_recorder(&log, "u"));
    emitter.on(Regex::new("^comment:").unwrap(), typed_recorder(&log, "c"));

    emitter.emit("*", []);

    assert_eq!(entries(&log), vec!["u:user:add", "u:user:remove"]);
    assert_eq!(emitter.listener_count("post:add"), 1);
    assert!(!emitter.event_types().contains(&"comment:add".to_string()));
}

#[test]
fn closure_predicate_selector_extends_matching_queues() {
    let emitter: EventEmitter = EventEmitter::new();
    emitter.on("short longer", Listener::new(|_, _| {}));
    emitter.on(
        Selector::pattern(|name: &str| name.len() > 5),
        Listener::new(|_, _| {}),
    );

    assert_eq!(emitter.listener_count("short"), 1);
    assert_eq!(emitter.listener_count("longer"), 2);
}

// ============================================================================
// Once / limited listeners
// ============================================================================

#[test]
fn once_listener_fires_exactly_once() {
    let emitter: EventEmitter = EventEmitter::new();
    let log = make_log();

    emitter.once("change", recorder(&log, "once"));
    emitter.on("change", recorder(&log, "always"));

    for _ in 0..3 {
        emitter.emit("change", []);
    }

    assert_eq!(
        entries(&log),
        vec!["once", "always", "always", "always"]
    );
    assert_eq!(emitter.listener_count("change"), 1);
}

#[test]
fn once_listener_returning_false_is_still_removed() {
    let emitter: EventEmitter = EventEmitter::new();
    let log = make_log();

    emitter.add_once_listener(
        "change",
        super::support::recorder_with(&log, "stopper", Flow::Stop),
    );
    emitter.emit("change", []);
    emitter.emit("change", []);

    assert_eq!(entries(&log), vec!["stopper"]);
    assert!(!emitter.has_listeners());
}

#[test]
fn limited_listener_fires_at_most_n_times() {
    let emitter: EventEmitter = EventEmitter::new();
    let log = make_log();

    emitter.on_limit("tick", 3, recorder(&log, "t"));
    for _ in 0..5 {
        emitter.emit("tick", []);
    }

    assert_eq!(entries(&log), vec!["t", "t", "t"]);
    assert!(!emitter.has_listeners(), "registry should be discarded");
}

#[test]
fn zero_limit_registers_nothing() {
    let emitter: EventEmitter = EventEmitter::new();
    let log = make_log();

    emitter.add_limited_listener("tick", 0, recorder(&log, "t"));
    emitter.emit("tick", []);

    assert!(entries(&log).is_empty());
    assert!(!emitter.has_listeners());
}

#[test]
fn once_on_several_types_counts_each_type_separately() {
    let emitter: EventEmitter = EventEmitter::new();
    let log = make_log();

    emitter.once("a b", typed_recorder(&log, "x"));
    emitter.emit("a", []);
    emitter.emit("a", []);
    emitter.emit("b", []);
    emitter.emit("b", []);

    assert_eq!(entries(&log), vec!["x:a", "x:b"]);
}

#[test]
fn once_does_not_reset_an_existing_unbounded_registration() {
    let emitter: EventEmitter = EventEmitter::new();
    let log = make_log();
    let a = recorder(&log, "a");

    emitter.on("change", &a);
    emitter.once("change", &a);
    emitter.emit("change", []);
    emitter.emit("change", []);

    assert_eq!(entries(&log), vec!["a", "a"]);
}

// ============================================================================
// Delegates
// ============================================================================

struct Counter {
    seen: Mutex<Vec<Value>>,
}

impl HandleEvent for Counter {
    fn handle_event(&self, event: &Event, args: &[Value]) -> Flow {
        let mut seen = self.seen.lock().unwrap();
        seen.push(json!({ "type": event.event_type(), "args": args }));
        Flow::Continue
    }
}

#[test]
fn delegate_receives_event_and_args() {
    let emitter: EventEmitter = EventEmitter::new();
    let counter = Arc::new(Counter {
        seen: Mutex::new(Vec::new()),
    });

    emitter.on("save", Listener::delegate(Arc::clone(&counter)));
    emitter.emit("save", [json!(1), json!("two")]);

    let seen = counter.seen.lock().unwrap();
    assert_eq!(*seen, vec![json!({ "type": "save", "args": [1, "two"] })]);
}

#[test]
fn same_delegate_object_is_deduplicated() {
    let emitter: EventEmitter = EventEmitter::new();
    let counter = Arc::new(Counter {
        seen: Mutex::new(Vec::new()),
    });

    emitter.on("save", Listener::delegate(Arc::clone(&counter)));
    emitter.on("save", Listener::from(Arc::clone(&counter)));

    assert_eq!(emitter.listener_count("save"), 1);
}
