//! Error types for the `bucket-table` crate

use alloc::collections::TryReserveError;

/// Errors surfaced by fallible [`BucketTable`](crate::BucketTable)
/// operations.
///
/// A missing key is never an error; lookups and removals report absence with
/// `None`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum TableError {
    /// A probe wrapped all the way around without meeting an empty slot.
    ///
    /// Growth keeps the load factor under one quarter, so this only happens
    /// if growth was bypassed or failed. The operation did nothing.
    #[error("unable to insert: all {capacity} slots are occupied")]
    Full {
        /// Number of slots in the table when the probe gave up.
        capacity: usize,
    },

    /// Doubling the slot count would overflow `usize`.
    #[error("slot count overflow while growing the table")]
    CapacityOverflow,

    /// The slot array could not be allocated or extended.
    ///
    /// When this is returned from a grow, the table is left exactly as it was
    /// before the grow started.
    #[error("failed to allocate slot array")]
    Alloc(#[from] TryReserveError),
}
