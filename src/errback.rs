//! `errback`: call a recovery function only when an argument has failed.
//!
//! Every argument is waited on, whatever its outcome. When none failed the
//! call passes its first positional value through and the function is never
//! invoked. When at least one failed, the function receives every outcome,
//! failures included, and its result becomes the result of the call. Wrapped
//! functions can therefore assume they are always handling a failure.

use futures::future::FutureExt;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::args::{Arg, Args};
use crate::deferred::{fail, maybe_deferred, succeed, Deferred, IntoDeferred};
use crate::resolve;
use crate::Error;

/// Wraps `func` as a conditional failure interceptor.
///
/// The error type must be able to carry [`Error::NoPositionalArguments`],
/// reported when the wrapped function is called without positional
/// arguments.
pub fn errback<F>(func: F) -> Errback<F> {
    Errback::new(func)
}

pub struct Errback<F> {
    func: Arc<F>,
    name: Cow<'static, str>,
}

impl<F> Errback<F> {
    pub fn new(func: F) -> Self {
        Self {
            func: Arc::new(func),
            name: Cow::Borrowed(std::any::type_name::<F>()),
        }
    }

    /// Sets the name used in logs and in [`Error::NoPositionalArguments`].
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call<T, E, R>(&self, args: Args<Arg<T, E>>) -> Deferred<T, E>
    where
        F: Fn(Args<Result<T, E>>) -> R + Send + Sync + 'static,
        R: IntoDeferred<Value = T, Error = E>,
        T: Send + 'static,
        E: From<Error> + Send + 'static,
    {
        if args.is_empty() {
            tracing::warn!(errback = %self.name, "invoked with no positional arguments");
            return fail(
                Error::NoPositionalArguments {
                    name: self.name.to_string(),
                }
                .into(),
            );
        }

        let classified = resolve::classify(args);
        let pending = classified.pending_count();
        tracing::debug!(errback = %self.name, pending, "classified arguments");

        if pending == 0 {
            return dispatch(&self.name, &*self.func, classified.into_immediate());
        }

        let func = Arc::clone(&self.func);
        let name = self.name.clone();
        async move {
            let outcomes = resolve::join_wait_all(classified).await;
            let dispatched = dispatch(&name, &*func, outcomes);
            dispatched.await
        }
        .boxed()
    }

    /// Turns the combinator into a plain function value.
    pub fn into_fn<T, E, R>(self) -> impl Fn(Args<Arg<T, E>>) -> Deferred<T, E>
    where
        F: Fn(Args<Result<T, E>>) -> R + Send + Sync + 'static,
        R: IntoDeferred<Value = T, Error = E>,
        T: Send + 'static,
        E: From<Error> + Send + 'static,
    {
        move |args| self.call(args)
    }
}

/// Passes the first positional value through, or hands every outcome to
/// `func` when at least one of them failed.
fn dispatch<T, E, F, R>(name: &str, func: &F, outcomes: Args<Result<T, E>>) -> Deferred<T, E>
where
    F: Fn(Args<Result<T, E>>) -> R,
    R: IntoDeferred<Value = T, Error = E>,
    T: Send + 'static,
    E: From<Error> + Send + 'static,
{
    let failed = outcomes.first_failure().map(|(slot, _)| slot);
    if let Some(slot) = failed {
        tracing::debug!(errback = %name, %slot, "argument failed, intercepting");
        return maybe_deferred(|| func(outcomes));
    }

    tracing::debug!(errback = %name, "no failures, passing through");
    let (positional, _) = outcomes.into_parts();
    match positional.into_iter().next() {
        Some(Ok(first)) => succeed(first),
        Some(Err(err)) => fail(err),
        None => fail(
            Error::NoPositionalArguments {
                name: name.to_string(),
            }
            .into(),
        ),
    }
}

impl<F> Clone for Errback<F> {
    fn clone(&self) -> Self {
        Self {
            func: Arc::clone(&self.func),
            name: self.name.clone(),
        }
    }
}

impl<F> fmt::Debug for Errback<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Errback").field("name", &self.name).finish()
    }
}
