//! Shared, version-tracked reactive cell.
//!
//! An [`Observable`] is the store half of every binding: widgets read and
//! write it, UI code subscribes to it. Notification is synchronous and runs
//! after the cell's borrow has been released, so a subscriber may read or
//! write the same cell.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = dyn Fn(&T);

struct Inner<T> {
    value: T,
    version: u64,
    subscribers: Vec<Weak<Callback<T>>>,
}

/// A shared value with change notification.
///
/// Clones share the same cell.
pub struct Observable<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .finish()
    }
}

impl<T: Default + Clone + PartialEq + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value for the duration of `f`.
    ///
    /// `f` must not write to this cell.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Store `value` and notify subscribers. Equal values are ignored.
    ///
    /// Returns whether the value changed.
    pub fn set(&self, value: T) -> bool {
        let live = {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return false;
            }
            inner.value = value;
            inner.version += 1;
            inner.subscribers.retain(|w| w.strong_count() > 0);
            inner
                .subscribers
                .iter()
                .filter_map(Weak::upgrade)
                .collect::<Vec<_>>()
        };
        let snapshot = self.get();
        for callback in live {
            callback(&snapshot);
        }
        true
    }

    /// Set to `f(current)`.
    pub fn update(&self, f: impl FnOnce(&T) -> T) -> bool {
        let next = self.with(f);
        self.set(next)
    }

    /// Number of effective mutations so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Register `callback`; it runs until the returned guard is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: Rc<Callback<T>> = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));
        Subscription {
            _callback: Box::new(strong),
        }
    }

    /// Live subscriber count.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Whether both handles share one cell.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// RAII guard returned by [`Observable::subscribe`].
///
/// Holds the only strong reference to the callback; dropping it
/// unsubscribes.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    _callback: Box<dyn Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn equal_set_is_a_no_op() {
        let obs = Observable::new(1);
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _sub = obs.subscribe(move |_| h.set(h.get() + 1));
        assert!(!obs.set(1));
        assert_eq!(obs.version(), 0);
        assert!(obs.set(2));
        assert_eq!(obs.version(), 1);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn subscribers_run_in_registration_order() {
        let obs = Observable::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = Rc::clone(&log);
        let b = Rc::clone(&log);
        let _s1 = obs.subscribe(move |v| a.borrow_mut().push(("a", *v)));
        let _s2 = obs.subscribe(move |v| b.borrow_mut().push(("b", *v)));
        obs.set(7);
        assert_eq!(*log.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let obs = Observable::new(0);
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let sub = obs.subscribe(move |_| h.set(h.get() + 1));
        assert_eq!(obs.subscriber_count(), 1);
        drop(sub);
        assert_eq!(obs.subscriber_count(), 0);
        obs.set(5);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn subscriber_may_write_back() {
        let obs = Observable::new(0);
        let inner = obs.clone();
        let _sub = obs.subscribe(move |v| {
            if *v < 3 {
                inner.set(v + 1);
            }
        });
        obs.set(1);
        assert_eq!(obs.get(), 3);
    }

    #[test]
    fn update_and_with() {
        let obs = Observable::new(vec![1, 2]);
        obs.update(|v| v.iter().map(|x| x * 10).collect());
        assert_eq!(obs.with(Vec::len), 2);
        assert_eq!(obs.get(), vec![10, 20]);
    }

    #[test]
    fn clones_share_state() {
        let a = Observable::new("x".to_owned());
        let b = a.clone();
        b.set("y".to_owned());
        assert_eq!(a.get(), "y");
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&Observable::new("y".to_owned())));
    }
}
