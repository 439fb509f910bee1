use parking_lot::Mutex;
use std::sync::Arc;
use std::{future::Future, pin::Pin, task::{Context, Poll, Waker}};
use crate::{Error, Promise};

/// This `pair::Producer` promise can only have one consumer. The consumer
/// settles with `Result<T, E>` and can be passed straight into an argument
/// slot of a `callback` or `errback` call.
///
/// # Examples
///
/// ```
/// use promise_decorate::{Promise, pair::Producer};
/// use futures::executor::block_on;
/// use std::thread;
/// let (promise, consumer) = Producer::<String, promise_decorate::Error>::new();
///
/// let task1 = thread::spawn(move || block_on(async {
///     println!("Received {:?}",  consumer.await);
/// }));
/// promise.resolve("Hi".into());
/// task1.join().expect("The task1 thread has panicked.");
/// ```
#[derive(Debug)]
pub struct Producer<T, E> {
    promise: Arc<Mutex<Inner<T, E>>>,
}

#[derive(Debug)]
pub struct Consumer<T, E> {
    promise: Arc<Mutex<Inner<T, E>>>,
}

#[derive(Debug)]
enum WakerState {
    Fresh,
    Tainted,
}

#[derive(Debug)]
struct Inner<T, E> {
    value: Option<Result<T, E>>,
    waker: Result<Waker, WakerState>,
}

impl<T, E> Producer<T, E> {
    fn settle(&self, outcome: Result<T, E>) {
        let mut promise = self.promise.lock();
        promise.value = Some(outcome);
        if let Ok(waker) = std::mem::replace(&mut promise.waker, Err(WakerState::Tainted)) {
            waker.wake()
        }
    }
}

impl<T, E> Promise for Producer<T, E> {
    type Output = T;
    type Error = E;
    type Waiter = Consumer<T, E>;

    fn resolve(self, value: T) {
        self.settle(Ok(value));
    }

    fn reject(self, err: E) {
        self.settle(Err(err));
    }

    fn new() -> (Self, Consumer<T, E>) {
        let inner = Arc::new(Mutex::new(Inner {
                value: None,
                waker: Err(WakerState::Fresh),
            }));
        (Self { promise: inner.clone() }, Consumer { promise: inner })
    }
}

impl<T, E> Drop for Producer<T, E> {
    /// If this is an unsettled producer, wake the consumer so it can fail.
    fn drop(&mut self) {
        let mut promise = self.promise.lock();
        if let Ok(waker) = std::mem::replace(&mut promise.waker, Err(WakerState::Tainted)) {
            waker.wake()
        }
    }
}

impl<T, E: From<Error>> Future for Consumer<T, E> {
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut promise = self.promise.lock();
        match promise.value.take() {
            Some(value) => Poll::Ready(value),
            None => {
                match std::mem::replace(&mut promise.waker, Ok(cx.waker().clone())) {
                    Err(WakerState::Tainted) => Poll::Ready(Err(Error::ProducerDropped.into())),
                    _ => Poll::Pending
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
use futures::executor::block_on;
use std::thread;
use super::Producer;
use crate::{callback, Args, Error, Promise};

#[test]
fn test_promise_out_resolve() {
    let (op, op_a) = Producer::<String, Error>::new();
    let task1 = thread::spawn(move || {
        block_on(async {
            assert_eq!(op_a.await, Ok(String::from("🍓")));
        })
    });
    let task2 = thread::spawn(move || {
        op.resolve(String::from("🍓"));
    });
    task2.join().expect("The task2 thread has panicked");
    task1.join().expect("The task1 thread has panicked");
}

#[test]
fn test_promise_out_unresolved() {
    let (op, op_a) = Producer::<String, Error>::new();
    let task1 = thread::spawn(move || {
        block_on(async {
            assert_eq!(op_a.await, Err(Error::ProducerDropped));
        })
    });
    let task2 = thread::spawn(move || {
        // Move the producer into this thread but never settle it.
        std::mem::drop(op);
    });
    task2.join().expect("The task2 thread has panicked");
    task1.join().expect("The task1 thread has panicked");
}

#[test]
fn test_promise_out_no_consumer() {
    let (op, op_a) = Producer::<String, Error>::new();
    let task1 = thread::spawn(move || {
        let _op_a = op_a;
    });
    let task2 = thread::spawn(move || {
        op.resolve(String::from("🍓"));
    });
    task1.join().expect("The task1 thread has panicked");
    task2.join().expect("The task2 thread has panicked");
}

#[test]
fn test_promise_out_reject() {
    let (a, b) = Producer::<String, Error>::new();
    let task1 = thread::spawn(|| {
        block_on(async {
            assert_eq!(b.await, Err(Error::ProducerDropped));
        })
    });
    let task2 = thread::spawn(|| {
        a.reject(Error::ProducerDropped);
    });
    task1.join().expect("The task1 thread has panicked");
    task2.join().expect("The task2 thread has panicked");
}

#[test]
fn test_consumer_feeds_callback_from_another_thread() {
    let (op, op_a) = Producer::<i64, Error>::new();
    let add = callback(|a: Args<i64>| Ok::<_, Error>(a[0] + a[1]));
    let sum = add.call(Args::new().value(3).pending(op_a));
    let task = thread::spawn(move || op.resolve(4));
    assert_eq!(block_on(sum), Ok(7));
    task.join().expect("The resolving thread has panicked");
}
}
