#![forbid(unsafe_code)]

//! Equality-suppressed observable values.
//!
//! A [`ChangeSignal`] holds a current value and publishes subsequent values
//! to subscribers. It is the notification substrate for the route tree:
//! activation flags, active-child pointers, and active-descendant chains are
//! all exposed through signals so that rendering collaborators can react to
//! navigation changes without polling.
//!
//! # How it works
//!
//! 1. [`ChangeSignal::get`] reads the current value synchronously.
//! 2. [`ChangeSignal::subscribe`] hands back a [`SignalFeed`]: a live queue
//!    of values published *after* the subscription. The current value is not
//!    replayed.
//! 3. [`ChangeSignal::set`] compares the incoming value against the stored
//!    one using the signal's equality predicate; unchanged values are dropped
//!    without waking anyone. Changed values are enqueued on every live feed,
//!    in subscription order, before `set` returns.
//! 4. [`ChangeSignal::close`] terminates every feed without a final value.
//!
//! Delivery is same-thread and synchronous with `set`; consumers drain their
//! feed whenever it suits them. There is no event loop and no background
//! thread anywhere in this crate.

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

/// A value holder with change notification.
///
/// The equality predicate defaults to `PartialEq`, which gives sequence-typed
/// signals structural comparison for free: two equal `Vec`s do not notify.
/// A custom predicate can be supplied with [`ChangeSignal::with_eq`].
pub struct ChangeSignal<T> {
    value: T,
    eq: Box<dyn Fn(&T, &T) -> bool>,
    subscribers: Vec<Sender<T>>,
    closed: bool,
}

impl<T: Clone + PartialEq + 'static> ChangeSignal<T> {
    /// Create a signal holding `initial`, comparing values with `PartialEq`.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self::with_eq(initial, |a, b| a == b)
    }
}

impl<T: Clone> ChangeSignal<T> {
    /// Create a signal holding `initial` with a custom equality predicate.
    ///
    /// The predicate decides whether a written value counts as a change;
    /// writes judged equal to the stored value are suppressed entirely.
    #[must_use]
    pub fn with_eq(initial: T, eq: impl Fn(&T, &T) -> bool + 'static) -> Self {
        Self {
            value: initial,
            eq: Box::new(eq),
            subscribers: Vec::new(),
            closed: false,
        }
    }

    /// Read the current value.
    #[must_use]
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Subscribe to values published after this call.
    ///
    /// The current value is not replayed. Subscribing to a closed signal
    /// returns an already-terminated feed.
    pub fn subscribe(&mut self) -> SignalFeed<T> {
        let (tx, rx) = mpsc::channel();
        if self.closed {
            drop(tx);
        } else {
            self.subscribers.push(tx);
        }
        SignalFeed { rx: Some(rx) }
    }

    /// Store `value` and notify subscribers if it differs from the current
    /// value under the signal's equality predicate.
    ///
    /// Subscribers are notified in subscription order. Feeds whose receiving
    /// half has been dropped are pruned here. Returns `true` if the value
    /// changed.
    pub fn set(&mut self, value: T) -> bool {
        if (self.eq)(&self.value, &value) {
            return false;
        }
        self.value = value;
        let published = self.value.clone();
        self.subscribers
            .retain(|tx| tx.send(published.clone()).is_ok());
        true
    }

    /// Terminate all subscriptions without notifying a final value.
    ///
    /// Feeds observe termination on their next poll. Later writes update the
    /// stored value silently; later subscriptions are born terminated.
    pub fn close(&mut self) {
        self.subscribers.clear();
        self.closed = true;
    }

    /// Whether [`ChangeSignal::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of live subscribers.
    ///
    /// Feeds dropped by their consumer are only counted out after the next
    /// successful [`ChangeSignal::set`] prunes them.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<T: fmt::Debug> fmt::Debug for ChangeSignal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeSignal")
            .field("value", &self.value)
            .field("subscribers", &self.subscribers.len())
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

/// A live, cancellable feed of values from one [`ChangeSignal`].
///
/// Values accumulate in the feed as they are published; the consumer drains
/// them with [`SignalFeed::try_next`] or [`SignalFeed::drain`]. Dropping the
/// feed cancels the subscription.
#[derive(Debug)]
pub struct SignalFeed<T> {
    rx: Option<Receiver<T>>,
}

impl<T> SignalFeed<T> {
    /// A feed that was never connected to a signal.
    ///
    /// Useful for subscription requests against an already-destroyed source.
    #[must_use]
    pub fn terminated() -> Self {
        Self { rx: None }
    }

    /// Take the next pending value, if any, without blocking.
    ///
    /// Once the signal has been closed (or dropped) and all pending values
    /// are consumed, the feed marks itself terminated.
    pub fn try_next(&mut self) -> Option<T> {
        match self.rx.as_ref()?.try_recv() {
            Ok(value) => Some(value),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.rx = None;
                None
            }
        }
    }

    /// Drain every pending value, in publication order.
    pub fn drain(&mut self) -> Vec<T> {
        let mut out = Vec::new();
        while let Some(value) = self.try_next() {
            out.push(value);
        }
        out
    }

    /// Cancel the subscription. Idempotent: cancelling twice is harmless.
    pub fn cancel(&mut self) {
        self.rx = None;
    }

    /// Whether the feed has been cancelled or observed signal teardown.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.rx.is_none()
    }
}
