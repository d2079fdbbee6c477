// SPDX-License-Identifier: MIT OR Apache-2.0
//! Process-wide identifier allocation.
//!
//! Nodes, pins and edges all draw their ids from the same counter, so a raw
//! id value names exactly one entity regardless of its kind. The counter is
//! initialized once at process start and never reset.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Allocate a fresh raw id, greater than every id handed out before it.
pub(crate) fn next_raw_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}
