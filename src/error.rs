//! Failure taxonomy for the slot table.

use std::collections::TryReserveError;

use thiserror::Error;

/// Errors surfaced by [`Dict::insert`](crate::Dict::insert).
///
/// Lookup misses are never errors; they are `None`.
#[derive(Debug, Error)]
pub enum DictError {
    /// Allocating the doubled slot array (or the staging buffer for live
    /// entries) failed. The table has already released everything it owned
    /// and is back to its freshly-constructed empty state.
    #[error("allocation failed while growing the slot table")]
    Alloc(#[from] TryReserveError),

    /// An insert probed every slot without finding a home. Unreachable
    /// while the load factor stays below 2/3; kept as a hard bound so a
    /// degenerate step function cannot loop forever.
    #[error("probe sequence exhausted all {capacity} slots")]
    ProbeExhausted {
        /// Slot count at the time the probe gave up.
        capacity: usize,
    },

    /// Doubling the table would push the slot count past the u32 index
    /// domain of the probe arithmetic. The table is intact and readable.
    #[error("slot table cannot grow past {max} slots", max = u32::MAX)]
    CapacityOverflow,
}
