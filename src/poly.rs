use parking_lot::Mutex;
use std::sync::Arc;
use std::{future::Future, pin::Pin, task::{Context, Poll, Waker}};
use crate::{Error, Promise};

/// This `poly::Producer` promise can have many consumers. The consumers may be
/// cloned, and each one settles with its own clone of the `Result<T, E>`, so
/// the same promise can be handed to several argument slots or calls.
///
/// # Examples
///
/// ```
/// use promise_decorate::{Promise, poly::Producer};
/// use futures::executor::block_on;
/// use std::thread;
/// let (promise, consumer) = Producer::<String, promise_decorate::Error>::new();
/// let consumer2 = consumer.clone();
/// let task1 = thread::spawn(move || block_on(async {
///     println!("Received on task 1 {:?}",  consumer.await);
/// }));
/// let task2 = thread::spawn(move || block_on(async {
///     println!("Received on task 2 {:?}",  consumer2.await);
/// }));
/// promise.resolve("Hi".into());
/// task1.join().expect("The task1 thread has panicked.");
/// task2.join().expect("The task2 thread has panicked.");
/// ```
#[derive(Debug)]
pub struct Producer<T, E> {
    promise: Arc<Mutex<Inner<T, E>>>,
}

#[derive(Debug)]
pub struct Consumer<T, E> {
    promise: Arc<Mutex<Inner<T, E>>>,
}

impl<T, E> Clone for Consumer<T, E> {
    fn clone(&self) -> Self {
        Self { promise: self.promise.clone() }
    }
}

#[derive(Debug)]
struct Inner<T, E> {
    value: Option<Result<T, E>>,
    dropped: bool,
    waker: Vec<Waker>, // Every consumer that polled must be woken, not only
                       // the last one.
}

impl<T, E> Producer<T, E> {
    fn settle(&self, outcome: Result<T, E>) {
        let mut promise = self.promise.lock();
        promise.value = Some(outcome);
        for waker in promise.waker.drain(..) {
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

    /// This is a slight fib because we're not returning Self alone. We're
    /// also returning a Consumer<T, E> which you can wait on.
    fn new() -> (Self, Self::Waiter) {
        let producer = Self {
                            promise: Arc::new(Mutex::new(Inner {
                                value: None,
                                dropped: false,
                                waker: vec![],
                            })),
                        };
        let consumer = Consumer { promise: producer.promise.clone() };
        (producer, consumer)
    }
}

impl<T, E> Drop for Producer<T, E> {
    fn drop(&mut self) {
        let mut promise = self.promise.lock();
        if promise.value.is_none() {
            promise.dropped = true;
            for waker in promise.waker.drain(..) {
                waker.wake()
            }
        }
    }
}

impl<T: Clone, E: Clone + From<Error>> Future for Consumer<T, E> {
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut guard = self.promise.lock();
        let promise = &mut *guard;
        match promise.value {
            Some(ref value) => Poll::Ready(value.clone()),
            None if promise.dropped => Poll::Ready(Err(Error::ProducerDropped.into())),
            None => {
                promise.waker.push(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}
