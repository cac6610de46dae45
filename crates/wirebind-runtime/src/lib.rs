#![forbid(unsafe_code)]

//! Runtime plumbing for wirebind.
//!
//! - [`reactive`]: the store cell ([`Observable`]), subscriptions and
//!   read-only views of controller state.
//! - [`scheduler`]: the deferred task queue drained once per turn.
//! - [`defaults`]: the current locale table that widget settings default to.

pub mod defaults;
pub mod reactive;
pub mod scheduler;

pub use defaults::{
    DefaultsContext, DefaultsOverride, current_defaults, detect_system_locale, load_locale,
};
pub use reactive::{Observable, StateView, Subscription};
pub use scheduler::Scheduler;
