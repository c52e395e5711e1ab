//! The success-or-failures carrier.

use crate::entry::{Cause, InvalidEntry};
use serde::Serialize;
use std::fmt;
use std::ops::Deref;

/// Message of the entry substituted when an invalid result would otherwise be empty.
pub const NO_FAILURES_MESSAGE: &str = "No validation failures provided.";

/// Path, property and display name of the substituted entry.
pub const UNKNOWN_FIELD: &str = "Unknown";

/// Message used when a valid result is requested for an absent value.
pub const ABSENT_VALUE_MESSAGE: &str = "A valid result cannot be created from an absent value.";

/// A non-empty, ordered list of failures.
///
/// Entries with a blank message are dropped on construction. If nothing is
/// left, a single `"No validation failures provided."` entry takes their place,
/// so an invalid result is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Failures(Vec<InvalidEntry>);

impl Failures {
    pub fn new(entries: impl IntoIterator<Item = InvalidEntry>) -> Self {
        let entries: Vec<InvalidEntry> = entries.into_iter().filter(|e| !e.is_blank()).collect();
        if entries.is_empty() {
            Self(vec![Self::sentinel()])
        } else {
            Self(entries)
        }
    }

    pub fn single(entry: InvalidEntry) -> Self {
        Self::new([entry])
    }

    /// Concatenate two lists, `self` first.
    pub fn concat(mut self, other: Failures) -> Self {
        self.0.extend(other.0);
        self
    }

    /// Concatenate any number of lists in order.
    pub fn merge(parts: impl IntoIterator<Item = Failures>) -> Self {
        Self::new(parts.into_iter().flat_map(|f| f.0))
    }

    pub fn into_vec(self) -> Vec<InvalidEntry> {
        self.0
    }

    fn sentinel() -> InvalidEntry {
        InvalidEntry::new(NO_FAILURES_MESSAGE, UNKNOWN_FIELD, UNKNOWN_FIELD, UNKNOWN_FIELD)
            .with_cause(Cause::SystemError)
    }
}

impl Deref for Failures {
    type Target = [InvalidEntry];

    fn deref(&self) -> &[InvalidEntry] {
        &self.0
    }
}

impl IntoIterator for Failures {
    type Item = InvalidEntry;
    type IntoIter = std::vec::IntoIter<InvalidEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Failures {
    type Item = &'a InvalidEntry;
    type IntoIter = std::slice::Iter<'a, InvalidEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Failures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed: {} failure(s)", self.0.len())
    }
}

impl std::error::Error for Failures {}

/// Either the validated value or every failure found while validating it.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validated<T> {
    Valid(T),
    Invalid(Failures),
}

impl<T> Validated<T> {
    pub fn valid(value: T) -> Self {
        Validated::Valid(value)
    }

    /// Wrap an optional value; `None` becomes a single `SystemError` failure
    /// on the field `value`.
    pub fn valid_option(value: Option<T>) -> Self {
        match value {
            Some(value) => Validated::Valid(value),
            None => Validated::Invalid(Failures::single(InvalidEntry::system_error(
                ABSENT_VALUE_MESSAGE,
                "value",
                "value",
            ))),
        }
    }

    pub fn invalid(entries: impl IntoIterator<Item = InvalidEntry>) -> Self {
        Validated::Invalid(Failures::new(entries))
    }

    pub fn invalid_entry(entry: InvalidEntry) -> Self {
        Validated::Invalid(Failures::single(entry))
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Validated::Valid(_))
    }

    /// The failures, or an empty slice when valid.
    pub fn failures(&self) -> &[InvalidEntry] {
        match self {
            Validated::Valid(_) => &[],
            Validated::Invalid(failures) => failures,
        }
    }

    pub fn get_value_or(self, fallback: T) -> T {
        match self {
            Validated::Valid(value) => value,
            Validated::Invalid(_) => fallback,
        }
    }

    /// Consume the result through one of two continuations.
    pub fn fold<R>(
        self,
        on_invalid: impl FnOnce(Failures) -> R,
        on_valid: impl FnOnce(T) -> R,
    ) -> R {
        match self {
            Validated::Valid(value) => on_valid(value),
            Validated::Invalid(failures) => on_invalid(failures),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Validated<U> {
        match self {
            Validated::Valid(value) => Validated::Valid(f(value)),
            Validated::Invalid(failures) => Validated::Invalid(failures),
        }
    }

    pub fn as_ref(&self) -> Validated<&T> {
        match self {
            Validated::Valid(value) => Validated::Valid(value),
            Validated::Invalid(failures) => Validated::Invalid(failures.clone()),
        }
    }

    pub fn into_result(self) -> Result<T, Failures> {
        match self {
            Validated::Valid(value) => Ok(value),
            Validated::Invalid(failures) => Err(failures),
        }
    }

    pub fn into_failures(self) -> Option<Failures> {
        match self {
            Validated::Valid(_) => None,
            Validated::Invalid(failures) => Some(failures),
        }
    }

    /// Keep this value if both results are valid; otherwise concatenate the
    /// failures of both, `self` first. Both results are always inspected.
    pub fn accumulate<U>(self, other: Validated<U>) -> Validated<T> {
        match (self, other) {
            (Validated::Valid(value), Validated::Valid(_)) => Validated::Valid(value),
            (Validated::Valid(_), Validated::Invalid(failures))
            | (Validated::Invalid(failures), Validated::Valid(_)) => Validated::Invalid(failures),
            (Validated::Invalid(first), Validated::Invalid(second)) => {
                Validated::Invalid(first.concat(second))
            }
        }
    }
}

impl<F> Validated<F> {
    /// Applicative application: apply a validated function to a validated argument.
    ///
    /// Failures from both sides are collected, function side first, so chains of
    /// curried functions report every invalid argument.
    pub fn apply<A, B>(self, arg: Validated<A>) -> Validated<B>
    where
        F: FnOnce(A) -> B,
    {
        match (self, arg) {
            (Validated::Valid(f), Validated::Valid(a)) => Validated::Valid(f(a)),
            (func, arg) => Validated::Invalid(Failures::merge(
                func.into_failures().into_iter().chain(arg.into_failures()),
            )),
        }
    }
}

impl<T> From<Failures> for Validated<T> {
    fn from(failures: Failures) -> Self {
        Validated::Invalid(failures)
    }
}

/// Build a value from two validated inputs, or return all their failures.
pub fn combine2<A, B, R>(
    a: Validated<A>,
    b: Validated<B>,
    builder: impl FnOnce(A, B) -> R,
) -> Validated<R> {
    match (a, b) {
        (Validated::Valid(a), Validated::Valid(b)) => Validated::Valid(builder(a, b)),
        (a, b) => Validated::Invalid(Failures::merge(
            [a.into_failures(), b.into_failures()].into_iter().flatten(),
        )),
    }
}

/// Build a value from three validated inputs, or return all their failures.
pub fn combine3<A, B, C, R>(
    a: Validated<A>,
    b: Validated<B>,
    c: Validated<C>,
    builder: impl FnOnce(A, B, C) -> R,
) -> Validated<R> {
    match (a, b, c) {
        (Validated::Valid(a), Validated::Valid(b), Validated::Valid(c)) => {
            Validated::Valid(builder(a, b, c))
        }
        (a, b, c) => Validated::Invalid(Failures::merge(
            [a.into_failures(), b.into_failures(), c.into_failures()]
                .into_iter()
                .flatten(),
        )),
    }
}

/// Build a value from four validated inputs, or return all their failures.
pub fn combine4<A, B, C, D, R>(
    a: Validated<A>,
    b: Validated<B>,
    c: Validated<C>,
    d: Validated<D>,
    builder: impl FnOnce(A, B, C, D) -> R,
) -> Validated<R> {
    match (a, b, c, d) {
        (Validated::Valid(a), Validated::Valid(b), Validated::Valid(c), Validated::Valid(d)) => {
            Validated::Valid(builder(a, b, c, d))
        }
        (a, b, c, d) => Validated::Invalid(Failures::merge(
            [
                a.into_failures(),
                b.into_failures(),
                c.into_failures(),
                d.into_failures(),
            ]
            .into_iter()
            .flatten(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(message: &str) -> InvalidEntry {
        InvalidEntry::new(message, "path", "prop", "Prop")
    }

    #[test]
    fn blank_messages_are_replaced_by_sentinel() {
        let result: Validated<i32> = Validated::invalid([entry(""), entry("  ")]);
        let failures = result.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].failure_message, NO_FAILURES_MESSAGE);
        assert_eq!(failures[0].path, UNKNOWN_FIELD);
        assert_eq!(failures[0].property_name, UNKNOWN_FIELD);
    }

    #[test]
    fn blank_messages_are_dropped_next_to_real_ones() {
        let result: Validated<i32> = Validated::invalid([entry(""), entry("real")]);
        assert_eq!(result.failures().len(), 1);
        assert_eq!(result.failures()[0].failure_message, "real");
    }

    #[test]
    fn absent_value_becomes_system_failure() {
        let result: Validated<&str> = Validated::valid_option(None);
        let failures = result.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].cause, Cause::SystemError);
        assert_eq!(failures[0].property_name, "value");
    }

    #[test]
    fn fold_picks_the_matching_branch() {
        let valid = Validated::valid(2).fold(|f| f.len() as i32, |v| v * 10);
        let invalid = Validated::<i32>::invalid([entry("a"), entry("b")]).fold(|f| f.len() as i32, |v| v);
        assert_eq!(valid, 20);
        assert_eq!(invalid, 2);
    }

    #[test]
    fn apply_collects_both_sides() {
        let func: Validated<fn(i32) -> i32> = Validated::invalid([entry("func")]);
        let arg: Validated<i32> = Validated::invalid([entry("arg")]);
        let result = func.apply(arg);
        let messages: Vec<_> = result.failures().iter().map(|e| e.failure_message.as_str()).collect();
        assert_eq!(messages, ["func", "arg"]);
    }

    #[test]
    fn apply_supports_curried_chains() {
        let add = |a: i32| move |b: i32| a + b;
        let result = Validated::valid(add).apply(Validated::valid(2)).apply(Validated::valid(3));
        assert_eq!(result, Validated::Valid(5));
    }

    #[test]
    fn combine_skips_builder_on_any_failure() {
        let mut called = false;
        let result = combine3(
            Validated::valid(1),
            Validated::<i32>::invalid([entry("b")]),
            Validated::<i32>::invalid([entry("c")]),
            |a, b, c| {
                called = true;
                a + b + c
            },
        );
        assert!(!called);
        let messages: Vec<_> = result.failures().iter().map(|e| e.failure_message.as_str()).collect();
        assert_eq!(messages, ["b", "c"]);
    }

    #[test]
    fn combine_builds_when_all_valid() {
        let result = combine4(
            Validated::valid("Ada"),
            Validated::valid(36u8),
            Validated::valid(true),
            Validated::valid('x'),
            |name, age, active, tag| format!("{name}-{age}-{active}-{tag}"),
        );
        assert_eq!(result, Validated::Valid("Ada-36-true-x".to_string()));
        assert!(combine2(Validated::valid(1), Validated::valid(2), |a, b| a + b).is_valid());
    }

    #[test]
    fn accumulate_keeps_left_value_and_orders_failures() {
        let left: Validated<&str> = Validated::invalid([entry("left")]);
        let right: Validated<i32> = Validated::invalid([entry("right")]);
        let merged = left.accumulate(right);
        let messages: Vec<_> = merged.failures().iter().map(|e| e.failure_message.as_str()).collect();
        assert_eq!(messages, ["left", "right"]);

        assert_eq!(Validated::valid("x").accumulate(Validated::valid(1)), Validated::Valid("x"));
    }
}
