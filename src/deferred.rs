//! The asynchronous value the combinators consume and produce.
//!
//! A [`Deferred`] is any boxed `Send` future settling once with either a
//! value or a failure. The helpers here build already-settled deferreds and
//! normalise a function call into one.

use futures::future::{self, BoxFuture, FutureExt};

use crate::args::Arg;

/// A pending `Result<T, E>`.
pub type Deferred<T, E> = BoxFuture<'static, Result<T, E>>;

/// An already-succeeded deferred.
pub fn succeed<T, E>(value: T) -> Deferred<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    future::ready(Ok(value)).boxed()
}

/// An already-failed deferred.
pub fn fail<T, E>(err: E) -> Deferred<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    future::ready(Err(err)).boxed()
}

/// What a wrapped function may return: a settled `Result`, a further
/// [`Deferred`], or an [`Arg`].
pub trait IntoDeferred {
    type Value;
    type Error;

    fn into_deferred(self) -> Deferred<Self::Value, Self::Error>;
}

impl<T, E> IntoDeferred for Result<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    type Value = T;
    type Error = E;

    fn into_deferred(self) -> Deferred<T, E> {
        future::ready(self).boxed()
    }
}

impl<T, E> IntoDeferred for Deferred<T, E> {
    type Value = T;
    type Error = E;

    fn into_deferred(self) -> Deferred<T, E> {
        self
    }
}

impl<T, E> IntoDeferred for Arg<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    type Value = T;
    type Error = E;

    fn into_deferred(self) -> Deferred<T, E> {
        match self {
            Arg::Value(value) => succeed(value),
            Arg::Failure(err) => fail(err),
            Arg::Pending(future) => future,
        }
    }
}

/// Calls `f` right away and turns whatever it returns into a deferred.
///
/// A plain `Ok`/`Err` becomes an already-settled deferred; a returned deferred
/// is handed back as is, so the caller observes its eventual outcome.
pub fn maybe_deferred<F, R>(f: F) -> Deferred<R::Value, R::Error>
where
    F: FnOnce() -> R,
    R: IntoDeferred,
{
    f().into_deferred()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_settled_deferreds() {
        assert_eq!(block_on(succeed::<_, ()>(3)), Ok(3));
        assert_eq!(block_on(fail::<(), _>("oops")), Err("oops"));
    }

    #[test]
    fn test_maybe_deferred_normalises_results() {
        assert_eq!(block_on(maybe_deferred(|| Ok::<i32, &str>(1))), Ok(1));
        assert_eq!(block_on(maybe_deferred(|| Err::<i32, &str>("bad"))), Err("bad"));
    }

    #[test]
    fn test_maybe_deferred_keeps_returned_deferred() {
        let result = maybe_deferred(|| succeed::<i32, &str>(5).map(|r| r.map(|v| v * 2)).boxed());
        assert_eq!(block_on(result), Ok(10));
    }

    #[test]
    fn test_arg_into_deferred() {
        let pending: Arg<i32, &str> = Arg::pending(succeed(4));
        assert_eq!(block_on(pending.into_deferred()), Ok(4));
        assert_eq!(block_on(Arg::<i32, &str>::failure("no").into_deferred()), Err("no"));
    }
}
