//! `callback`: call a function once every argument has succeeded.
//!
//! The wrapped function sees plain values. If any argument fails, pending or
//! immediate, the call settles with that failure and the function never runs.

use futures::future::FutureExt;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::args::{Arg, Args};
use crate::deferred::{fail, maybe_deferred, Deferred, IntoDeferred};
use crate::resolve;

/// Wraps `func` so it can be called with pending arguments.
///
/// ```
/// use promise_decorate::{callback, succeed, Args};
/// use futures::executor::block_on;
///
/// let add = callback(|a: Args<i64>| Ok::<_, ()>(a[0] + a[1])).named("add");
/// let inner = add.call(Args::new().pending(succeed(3)).pending(succeed(4)));
/// let outer = add.call(Args::new().value(3).pending(inner));
/// assert_eq!(block_on(outer), Ok(10));
/// ```
pub fn callback<F>(func: F) -> Callback<F> {
    Callback::new(func)
}

pub struct Callback<F> {
    func: Arc<F>,
    name: Cow<'static, str>,
}

impl<F> Callback<F> {
    pub fn new(func: F) -> Self {
        Self {
            func: Arc::new(func),
            name: Cow::Borrowed(std::any::type_name::<F>()),
        }
    }

    /// Sets the name used in logs.
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Calls the wrapped function once every argument has a value.
    ///
    /// Never fails synchronously: argument failures and failures returned by
    /// the function both come back as a failed deferred, unchanged.
    pub fn call<T, E, R>(&self, args: Args<Arg<T, E>>) -> Deferred<T, E>
    where
        F: Fn(Args<T>) -> R + Send + Sync + 'static,
        R: IntoDeferred<Value = T, Error = E>,
        T: Send + 'static,
        E: Send + 'static,
    {
        let classified = resolve::classify(args);
        let pending = classified.pending_count();
        tracing::debug!(callback = %self.name, pending, "classified arguments");

        if pending == 0 {
            return match classified.into_immediate().try_map(|outcome| outcome) {
                Ok(args) => maybe_deferred(|| (self.func)(args)),
                Err(err) => {
                    tracing::debug!(callback = %self.name, "argument failed, not invoking");
                    fail(err)
                }
            };
        }

        let func = Arc::clone(&self.func);
        let name = self.name.clone();
        async move {
            match resolve::join_fail_fast(classified).await {
                Ok(args) => {
                    let returned = func(args).into_deferred();
                    returned.await
                }
                Err(err) => {
                    tracing::debug!(callback = %name, "argument failed, not invoking");
                    Err(err)
                }
            }
        }
        .boxed()
    }

    /// Turns the combinator into a plain function value.
    pub fn into_fn<T, E, R>(self) -> impl Fn(Args<Arg<T, E>>) -> Deferred<T, E>
    where
        F: Fn(Args<T>) -> R + Send + Sync + 'static,
        R: IntoDeferred<Value = T, Error = E>,
        T: Send + 'static,
        E: Send + 'static,
    {
        move |args| self.call(args)
    }
}

impl<F> Clone for Callback<F> {
    fn clone(&self) -> Self {
        Self {
            func: Arc::clone(&self.func),
            name: self.name.clone(),
        }
    }
}

impl<F> fmt::Debug for Callback<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deferred::succeed;
    use crate::pair::Producer;
    use crate::{Error, Promise};
    use futures::executor::block_on;
    use futures::poll;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::task::Poll;
    use tracing_test::traced_test;

    fn counting_add(calls: Arc<AtomicUsize>) -> Callback<impl Fn(Args<i64>) -> Result<i64, Error>> {
        callback(move |a: Args<i64>| -> Result<i64, Error> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(a.positional().iter().sum::<i64>() + a.named("y").copied().unwrap_or(0))
        })
    }

    #[test]
    fn test_immediate_call_runs_function_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let add = counting_add(calls.clone());
        let sum = add.call(Args::new().value(3).named_value("y", 4));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(block_on(sum), Ok(7));
    }

    #[test]
    fn test_immediate_failure_skips_function() {
        let calls = Arc::new(AtomicUsize::new(0));
        let add = counting_add(calls.clone());
        let sum = add.call(Args::new().value(3).failure(Error::ProducerDropped));
        assert_eq!(block_on(sum), Err(Error::ProducerDropped));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_function_waits_for_pending_arguments() {
        let calls = Arc::new(AtomicUsize::new(0));
        let add = counting_add(calls.clone());
        let (producer, consumer) = Producer::<i64, Error>::new();
        let mut sum = add.call(Args::new().value(3).pending(consumer));

        block_on(async {
            assert!(poll!(&mut sum).is_pending());
            assert_eq!(calls.load(Ordering::SeqCst), 0);
            producer.resolve(4);
            assert_eq!(poll!(&mut sum), Poll::Ready(Ok(7)));
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_returned_failure_is_propagated() {
        let broken = callback(|_: Args<i64>| Err::<i64, _>(Error::ProducerDropped));
        let result = broken.call(Args::new().pending(succeed(1)));
        assert_eq!(block_on(result), Err(Error::ProducerDropped));
    }

    #[test]
    fn test_returned_deferred_is_awaited() {
        let later = callback(|a: Args<i64>| succeed::<i64, Error>(a[0] * 10));
        assert_eq!(block_on(later.call(Args::new().pending(succeed(2)))), Ok(20));
    }

    #[test]
    fn test_into_fn_behaves_like_call() {
        let add = callback(|a: Args<i64>| Ok::<_, Error>(a[0] + a[1])).into_fn();
        assert_eq!(block_on(add(Args::new().value(1).pending(succeed(2)))), Ok(3));
    }

    #[test]
    #[traced_test]
    fn test_short_circuit_is_logged() {
        let add = counting_add(Arc::new(AtomicUsize::new(0))).named("adder");
        let sum = add.call(Args::new().value(3).pending(crate::deferred::fail(Error::ProducerDropped)));
        assert_eq!(block_on(sum), Err(Error::ProducerDropped));
        assert!(logs_contain("argument failed, not invoking"));
        assert!(logs_contain("adder"));
    }
}
