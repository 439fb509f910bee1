//! `callback` and `errback` lift an ordinary function into one that can be
//! called with a mix of immediate values and pending [`Deferred`] values in
//! any positional or named argument slot.
//!
//! - [`callback`] waits for every pending argument. If all succeed the wrapped
//!   function runs with the resolved values; the first failure is propagated
//!   and the function never runs.
//! - [`errback`] waits for every pending argument regardless of outcome. If
//!   none failed it passes the first positional value through untouched;
//!   otherwise the wrapped (recovery) function runs with every outcome.
//!
//! # Examples
//!
//! ```
//! use promise_decorate::{callback, errback, fail, succeed, Args};
//! use futures::executor::block_on;
//!
//! let add = callback(|a: Args<i64>| Ok::<_, String>(a[0] + a[1]));
//! let sum = add.call(Args::new().value(3).pending(succeed(4)));
//! assert_eq!(block_on(sum), Ok(7));
//!
//! let failed = add.call(Args::new().value(3).pending(fail("oops".to_string())));
//! assert_eq!(block_on(failed), Err("oops".to_string()));
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Oops {
//!     Broken,
//!     Decorate(promise_decorate::Error),
//! }
//! impl From<promise_decorate::Error> for Oops {
//!     fn from(err: promise_decorate::Error) -> Self {
//!         Oops::Decorate(err)
//!     }
//! }
//!
//! let recover = errback(|a: Args<Result<i64, Oops>>| a[1].clone());
//! let recovered = recover.call(Args::new().failure(Oops::Broken).value(12));
//! assert_eq!(block_on(recovered), Ok(12));
//! ```

pub mod args;
pub mod callback;
pub mod deferred;
pub mod errback;
pub mod pair;
pub mod poly;
mod resolve;

pub use args::{Arg, Args, Slot};
pub use callback::{callback, Callback};
pub use deferred::{fail, maybe_deferred, succeed, Deferred, IntoDeferred};
pub use errback::{errback, Errback};

/// Failures raised by this crate itself, as opposed to failures of the
/// arguments or of the wrapped function, which pass through untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("@errback decorated function {name:?} invoked with no positional arguments")]
    NoPositionalArguments { name: String },
    #[error("the producer was dropped before it settled")]
    ProducerDropped,
}

/// A hand-settled promise: a producer that is resolved or rejected exactly
/// once, and a waiter future that observes the outcome.
pub trait Promise {
    type Output;
    type Error;
    type Waiter;

    fn new() -> (Self, Self::Waiter)
    where
        Self: Sized;

    fn resolve(self, value: Self::Output);

    fn reject(self, err: Self::Error);
}
