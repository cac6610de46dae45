//! Reactive primitives.
//!
//! - [`Observable`]: shared, version-tracked cell with synchronous change
//!   notification.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//! - [`StateView`]: read-only handle on a cell someone else writes.
//!
//! # Architecture
//!
//! `Observable<T>` uses `Rc<RefCell<..>>` for single-threaded shared
//! ownership. Subscribers are stored as `Weak` callbacks and pruned lazily
//! during notification.
//!
//! # Invariants
//!
//! 1. Version increments exactly once per mutation that changes the value.
//! 2. Subscribers are notified in registration order.
//! 3. Setting a value equal to the current value is a no-op (no version bump,
//!    no notifications).
//! 4. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.

pub mod observable;
pub mod view;

pub use observable::{Observable, Subscription};
pub use view::StateView;
