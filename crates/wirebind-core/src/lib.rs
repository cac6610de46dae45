#![forbid(unsafe_code)]

//! Core types for wirebind.
//!
//! - [`value`]: the [`TypedValue`] union shared by stores, widgets and
//!   formatters, plus its structural equality.
//! - [`ids`]: debug correlation ids.
//! - [`dom`]: the synchronous DOM contract consumed by adapters, and
//!   [`MemoryDom`](dom::MemoryDom), an in-memory implementation.

pub mod dom;
pub mod ids;
pub mod value;

pub use dom::{Dom, ListenerId, MemoryDom, NodeId};
pub use ids::next_id;
pub use value::{TypedValue, equal_typed};
