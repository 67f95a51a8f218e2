//! Branded element identifiers.
//!
//! Generated identifiers have the form `{prefix}-{NNNN}-{counter}`: four
//! random digits followed by a process-wide counter, so two identifiers from
//! the same process never collide even when the random part does.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;

/// Prefix used by [`branded_id`].
pub const DEFAULT_ID_PREFIX: &str = "horizon";

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Generate a fresh identifier with the default prefix.
pub fn branded_id() -> String {
    branded_id_with_prefix(DEFAULT_ID_PREFIX)
}

/// Generate a fresh identifier with a custom prefix.
pub fn branded_id_with_prefix(prefix: &str) -> String {
    let counter = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let random: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("{prefix}-{random:04}-{counter}")
}
