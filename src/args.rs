//! Argument containers shared by the combinators.
//!
//! [`Args`] holds one call's arguments: ordered positional slots plus named
//! slots kept in insertion order. It is generic over the slot type so the
//! same container describes the caller's arguments (`Args<Arg<T, E>>`), the
//! resolved values handed to a `callback` function (`Args<T>`) and the
//! outcomes handed to an `errback` function (`Args<Result<T, E>>`).

use std::fmt;
use std::future::Future;
use std::ops::Index;

use crate::deferred::Deferred;

/// One argument as supplied by the caller.
pub enum Arg<T, E> {
    /// An immediate value.
    Value(T),
    /// A failure that already happened, passed synchronously.
    Failure(E),
    /// A value that is still pending.
    Pending(Deferred<T, E>),
}

impl<T, E> Arg<T, E> {
    pub fn value(value: T) -> Self {
        Arg::Value(value)
    }

    pub fn failure(err: E) -> Self {
        Arg::Failure(err)
    }

    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        Arg::Pending(Box::pin(future))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Arg::Pending(_))
    }
}

impl<T, E> From<Result<T, E>> for Arg<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Arg::Value(value),
            Err(err) => Arg::Failure(err),
        }
    }
}

impl<T, E> From<Deferred<T, E>> for Arg<T, E> {
    fn from(future: Deferred<T, E>) -> Self {
        Arg::Pending(future)
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for Arg<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Arg::Failure(err) => f.debug_tuple("Failure").field(err).finish(),
            Arg::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Where an argument sits in a call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Slot {
    Positional(usize),
    Named(String),
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Positional(index) => write!(f, "#{index}"),
            Slot::Named(name) => f.write_str(name),
        }
    }
}

/// Positional and named arguments of a single call.
#[derive(Debug, Clone, PartialEq)]
pub struct Args<S> {
    positional: Vec<S>,
    named: Vec<(String, S)>,
}

impl<S> Default for Args<S> {
    fn default() -> Self {
        Self {
            positional: Vec::new(),
            named: Vec::new(),
        }
    }
}

impl<S> Args<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a call from already-split containers. A repeated name keeps its
    /// first position and takes the last value.
    pub fn from_parts<I>(positional: Vec<S>, named: I) -> Self
    where
        I: IntoIterator<Item = (String, S)>,
    {
        let mut args = Self {
            positional,
            named: Vec::new(),
        };
        for (name, slot) in named {
            args.set_named(name, slot);
        }
        args
    }

    /// Appends a positional argument.
    pub fn push(mut self, slot: S) -> Self {
        self.positional.push(slot);
        self
    }

    /// Adds a named argument, replacing any earlier one with the same name.
    pub fn insert(mut self, name: impl Into<String>, slot: S) -> Self {
        self.set_named(name.into(), slot);
        self
    }

    fn set_named(&mut self, name: String, slot: S) {
        match self.named.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = slot,
            None => self.named.push((name, slot)),
        }
    }

    pub fn positional(&self) -> &[S] {
        &self.positional
    }

    pub fn get(&self, index: usize) -> Option<&S> {
        self.positional.get(index)
    }

    pub fn first(&self) -> Option<&S> {
        self.positional.first()
    }

    pub fn named(&self, name: &str) -> Option<&S> {
        self.named
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, slot)| slot)
    }

    /// Named arguments in insertion order.
    pub fn named_iter(&self) -> impl Iterator<Item = (&str, &S)> {
        self.named.iter().map(|(key, slot)| (key.as_str(), slot))
    }

    /// Number of positional arguments.
    pub fn len(&self) -> usize {
        self.positional.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty()
    }

    /// Total number of slots, positional and named.
    pub fn arity(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    /// Every slot in call order: positional first, then named.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &S)> {
        let positional = self
            .positional
            .iter()
            .enumerate()
            .map(|(index, slot)| (Slot::Positional(index), slot));
        let named = self
            .named
            .iter()
            .map(|(key, slot)| (Slot::Named(key.clone()), slot));
        positional.chain(named)
    }

    pub fn into_parts(self) -> (Vec<S>, Vec<(String, S)>) {
        (self.positional, self.named)
    }

    /// Applies `f` to every slot, keeping positions and names.
    pub fn map<U>(self, mut f: impl FnMut(S) -> U) -> Args<U> {
        Args {
            positional: self.positional.into_iter().map(&mut f).collect(),
            named: self
                .named
                .into_iter()
                .map(|(key, slot)| (key, f(slot)))
                .collect(),
        }
    }

    /// Like [`Args::map`], stopping at the first error in call order.
    pub fn try_map<U, Er>(self, mut f: impl FnMut(S) -> Result<U, Er>) -> Result<Args<U>, Er> {
        let positional = self
            .positional
            .into_iter()
            .map(&mut f)
            .collect::<Result<Vec<_>, _>>()?;
        let named = self
            .named
            .into_iter()
            .map(|(key, slot)| f(slot).map(|slot| (key, slot)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Args { positional, named })
    }

    pub(crate) fn slot_mut(&mut self, slot: &Slot) -> Option<&mut S> {
        match slot {
            Slot::Positional(index) => self.positional.get_mut(*index),
            Slot::Named(name) => self
                .named
                .iter_mut()
                .find(|(key, _)| key == name)
                .map(|(_, slot)| slot),
        }
    }
}

impl<T, E> Args<Arg<T, E>> {
    pub fn value(self, value: T) -> Self {
        self.push(Arg::Value(value))
    }

    pub fn failure(self, err: E) -> Self {
        self.push(Arg::Failure(err))
    }

    pub fn pending<F>(self, future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.push(Arg::pending(future))
    }

    pub fn named_value(self, name: impl Into<String>, value: T) -> Self {
        self.insert(name, Arg::Value(value))
    }

    pub fn named_failure(self, name: impl Into<String>, err: E) -> Self {
        self.insert(name, Arg::Failure(err))
    }

    pub fn named_pending<F>(self, name: impl Into<String>, future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.insert(name, Arg::pending(future))
    }
}

impl<T, E> Args<Result<T, E>> {
    /// Whether any slot, positional or named, holds a failure.
    pub fn has_failure(&self) -> bool {
        self.iter().any(|(_, slot)| slot.is_err())
    }

    /// The first failure in call order, if any.
    pub fn first_failure(&self) -> Option<(Slot, &E)> {
        self.iter()
            .find_map(|(slot, outcome)| outcome.as_ref().err().map(|err| (slot, err)))
    }
}

impl<S> Index<usize> for Args<S> {
    type Output = S;

    fn index(&self, index: usize) -> &S {
        &self.positional[index]
    }
}
