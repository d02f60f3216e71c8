//! Selector — which event type(s) an operation targets.
//!
//! Strings are parsed once: `"*"` is the wildcard, whitespace separates
//! several names, and an empty (or all-whitespace) string selects nothing.
//! Wildcard and pattern selectors only ever match types that already have a
//! queue on the emitter.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

/// Predicate over event-type names.
pub trait NameTest: Send + Sync {
    fn test(&self, name: &str) -> bool;
}

impl NameTest for Regex {
    fn test(&self, name: &str) -> bool {
        self.is_match(name)
    }
}

impl<F> NameTest for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn test(&self, name: &str) -> bool {
        self(name)
    }
}

#[derive(Clone)]
pub enum Selector {
    /// One exact event type.
    Name(String),
    /// Several exact event types, in the order given.
    Names(Vec<String>),
    /// Every event type that currently has a queue.
    Wildcard,
    /// Every existing event type accepted by the predicate.
    Pattern(Arc<dyn NameTest>),
}

impl Selector {
    pub fn parse(selector: &str) -> Self {
        if selector == "*" {
            return Selector::Wildcard;
        }
        let mut names: Vec<String> = selector.split_whitespace().map(str::to_owned).collect();
        if names.len() == 1 {
            Selector::Name(names.remove(0))
        } else {
            Selector::Names(names)
        }
    }

    pub fn pattern(test: impl NameTest + 'static) -> Self {
        Selector::Pattern(Arc::new(test))
    }

    /// `true` when the selector can never match anything.
    pub fn is_empty(&self) -> bool {
        match self {
            Selector::Name(name) => name.is_empty(),
            Selector::Names(names) => names.is_empty(),
            Selector::Wildcard | Selector::Pattern(_) => false,
        }
    }

    /// Literal selectors may create queues; wildcard and pattern never do.
    pub(crate) fn is_literal(&self) -> bool {
        matches!(self, Selector::Name(_) | Selector::Names(_))
    }

    /// The literal names, or nothing for wildcard/pattern selectors.
    pub(crate) fn literal_names(&self) -> &[String] {
        match self {
            Selector::Name(name) => std::slice::from_ref(name),
            Selector::Names(names) => names,
            Selector::Wildcard | Selector::Pattern(_) => &[],
        }
    }

    /// Narrow `existing` (in registry order) to the names this selector hits.
    ///
    /// Literal names keep the selector's own order and duplicates.
    pub(crate) fn select(&self, existing: Vec<String>) -> Vec<String> {
        match self {
            Selector::Wildcard => existing,
            Selector::Pattern(test) => existing.into_iter().filter(|n| test.test(n)).collect(),
            Selector::Name(_) | Selector::Names(_) => self
                .literal_names()
                .iter()
                .filter(|n| existing.contains(n))
                .cloned()
                .collect(),
        }
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Name(name) => f.debug_tuple("Name").field(name).finish(),
            Selector::Names(names) => f.debug_tuple("Names").field(names).finish(),
            Selector::Wildcard => f.write_str("Wildcard"),
            Selector::Pattern(_) => f.write_str("Pattern(..)"),
        }
    }
}

impl From<&str> for Selector {
    fn from(selector: &str) -> Self {
        Selector::parse(selector)
    }
}

impl From<String> for Selector {
    fn from(selector: String) -> Self {
        Selector::parse(&selector)
    }
}

impl From<&String> for Selector {
    fn from(selector: &String) -> Self {
        Selector::parse(selector)
    }
}

impl From<Regex> for Selector {
    fn from(pattern: Regex) -> Self {
        Selector::pattern(pattern)
    }
}

impl From<&Selector> for Selector {
    fn from(selector: &Selector) -> Self {
        selector.clone()
    }
}
