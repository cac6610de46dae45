//! Debug correlation ids.
//!
//! Ids are rendered as three zero-padded digits and cycle modulo 1000. They
//! correlate log lines for one controller; nothing relies on them being
//! unique across the cycle.

use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide id counter.
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Width of the rendered id.
const ID_WIDTH: usize = 3;

/// Cycle length of rendered ids.
const ID_CYCLE: u64 = 1000;

/// Return the next correlation id, e.g. `"007"`.
#[must_use]
pub fn next_id() -> String {
    let n = ID_COUNTER.fetch_add(1, Ordering::Relaxed) % ID_CYCLE;
    format!("{n:0width$}", width = ID_WIDTH)
}
