//! Argument resolution shared by `callback` and `errback`.
//!
//! A call is first classified into a buffer with every immediate slot filled
//! and a set of pending deferreds tagged with the slot they belong to. Each
//! pending deferred is then rebound so that its outcome is written back into
//! that slot as it settles, and the set is joined either fail-fast or
//! wait-all. The buffer is only read once the join is over, always in call
//! order.

use futures::future::{FutureExt, TryFutureExt};
use futures::stream::{FuturesUnordered, StreamExt, TryStreamExt};
use std::future::Future;

use crate::args::{Arg, Args, Slot};
use crate::deferred::Deferred;

/// Slots not yet known are `None`.
type Buffer<T, E> = Args<Option<Result<T, E>>>;

pub(crate) struct Classified<T, E> {
    buffer: Buffer<T, E>,
    pending: Vec<(Slot, Deferred<T, E>)>,
}

/// Splits a call into its immediate slots and its pending set.
pub(crate) fn classify<T, E>(args: Args<Arg<T, E>>) -> Classified<T, E> {
    let mut pending = Vec::new();
    let (positional, named) = args.into_parts();

    let positional = positional
        .into_iter()
        .enumerate()
        .map(|(index, arg)| split(Slot::Positional(index), arg, &mut pending))
        .collect();
    let named: Vec<_> = named
        .into_iter()
        .map(|(name, arg)| {
            let slot = split(Slot::Named(name.clone()), arg, &mut pending);
            (name, slot)
        })
        .collect();

    Classified {
        buffer: Args::from_parts(positional, named),
        pending,
    }
}

fn split<T, E>(
    slot: Slot,
    arg: Arg<T, E>,
    pending: &mut Vec<(Slot, Deferred<T, E>)>,
) -> Option<Result<T, E>> {
    match arg {
        Arg::Value(value) => Some(Ok(value)),
        Arg::Failure(err) => Some(Err(err)),
        Arg::Pending(future) => {
            pending.push((slot, future));
            None
        }
    }
}

impl<T, E> Classified<T, E> {
    pub(crate) fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// The buffer of a call without pending arguments.
    pub(crate) fn into_immediate(self) -> Args<Result<T, E>> {
        debug_assert!(self.pending.is_empty());
        seal(self.buffer)
    }
}

/// Observes a pending argument on success only: its value is tagged with the
/// slot it fills, a failure passes through untouched.
fn rebind_value<T, E>(
    slot: Slot,
    future: Deferred<T, E>,
) -> impl Future<Output = Result<(Slot, T), E>> {
    future.map_ok(move |value| (slot, value))
}

/// Observes a pending argument on both success and failure.
fn rebind_outcome<T, E>(
    slot: Slot,
    future: Deferred<T, E>,
) -> impl Future<Output = (Slot, Result<T, E>)> {
    future.map(move |outcome| (slot, outcome))
}

fn fill<S>(buffer: &mut Args<Option<S>>, slot: &Slot, outcome: S) {
    tracing::trace!(%slot, "argument settled");
    if let Some(cell) = buffer.slot_mut(slot) {
        debug_assert!(cell.is_none(), "slot {slot} filled twice");
        *cell = Some(outcome);
    }
}

fn seal<S>(buffer: Args<Option<S>>) -> Args<S> {
    buffer.map(|cell| cell.expect("every slot is filled before the buffer is read"))
}

/// Waits for every pending argument to succeed, or for the first failure.
///
/// An immediate failure already in the buffer wins without waiting at all.
/// Arguments still pending when a failure arrives are dropped, not cancelled.
pub(crate) async fn join_fail_fast<T, E>(classified: Classified<T, E>) -> Result<Args<T>, E> {
    let Classified { buffer, pending } = classified;
    let mut buffer = buffer.try_map(Option::transpose)?;

    let mut settling: FuturesUnordered<_> = pending
        .into_iter()
        .map(|(slot, future)| rebind_value(slot, future))
        .collect();
    while let Some((slot, value)) = settling.try_next().await? {
        fill(&mut buffer, &slot, value);
    }

    Ok(seal(buffer))
}

/// Waits for every pending argument to settle, whatever the outcome.
pub(crate) async fn join_wait_all<T, E>(classified: Classified<T, E>) -> Args<Result<T, E>> {
    let Classified { mut buffer, pending } = classified;

    let mut settling: FuturesUnordered<_> = pending
        .into_iter()
        .map(|(slot, future)| rebind_outcome(slot, future))
        .collect();
    while let Some((slot, outcome)) = settling.next().await {
        fill(&mut buffer, &slot, outcome);
    }

    seal(buffer)
}
