//! Latest-value cache with change notification.
//!
//! A [`Relay`] holds the most recent value and a list of subscriber
//! callbacks. Every `accept` stores the value and notifies all live
//! subscribers in registration order; subscribing replays the current value
//! immediately when one exists.
//!
//! `Relay` is single-threaded (`Rc<RefCell<..>>`): it lives on the context
//! that owns the list state. Subscribers are kept as `Weak` callbacks whose
//! only strong reference sits in the returned [`Subscription`], so dropping
//! the subscription detaches the callback. Dead entries are pruned lazily
//! during notification.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<V> = Box<dyn Fn(&V)>;

struct RelayInner<V> {
    value: Option<V>,
    subscribers: Vec<Weak<Callback<V>>>,
}

pub struct Relay<V> {
    inner: Rc<RefCell<RelayInner<V>>>,
}

impl<V> Clone for Relay<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Relay<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Relay")
            .field("value", &inner.value)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

impl<V: Clone + 'static> Relay<V> {
    pub fn new(initial: V) -> Self {
        Self::with_value(Some(initial))
    }

    /// A relay with nothing to replay until the first `accept`.
    pub fn empty() -> Self {
        Self::with_value(None)
    }

    fn with_value(value: Option<V>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(RelayInner {
                value,
                subscribers: Vec::new(),
            })),
        }
    }

    pub fn value(&self) -> Option<V> {
        self.inner.borrow().value.clone()
    }

    /// Stores `value` and notifies every live subscriber.
    pub fn accept(&self, value: V) {
        let callbacks: Vec<Rc<Callback<V>>> = {
            let mut inner = self.inner.borrow_mut();
            inner.value = Some(value.clone());
            inner.subscribers.retain(|weak| weak.strong_count() > 0);
            inner.subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        // Borrow released: callbacks may read the relay again.
        for callback in callbacks {
            callback(&value);
        }
    }

    /// Registers `callback` and replays the current value to it.
    #[must_use = "dropping the subscription detaches the callback"]
    pub fn subscribe(&self, callback: impl Fn(&V) + 'static) -> Subscription {
        let callback: Rc<Callback<V>> = Rc::new(Box::new(callback));
        let current = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.push(Rc::downgrade(&callback));
            inner.value.clone()
        };
        if let Some(value) = current {
            callback(&value);
        }
        Subscription { _guard: callback }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

/// Keeps a callback attached to its relay until dropped.
pub struct Subscription {
    _guard: Rc<dyn Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
