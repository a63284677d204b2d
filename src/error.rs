//! Error type shared by `Dictionary` and `DefaultDict`.

use thiserror::Error;

/// Failures surfaced by dictionary operations and construction.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictError {
    /// The queried key has no entry (also returned by `pop_item` on an
    /// empty dictionary).
    #[error("key not found")]
    KeyNotFound,

    /// The key's hash equals the hash of a different stored key, so no
    /// amount of growth can give it its own slot.
    #[error("key cannot be placed: its hash is identical to a stored key's hash")]
    UnplaceableKey,

    /// The slot array for `capacity * multiplier` slots cannot be allocated:
    /// the slot count or its byte size overflows, or the allocator refused.
    /// Initial allocation reports a multiplier of 1.
    #[error("capacity overflow while growing from {capacity} by a factor of {multiplier}")]
    CapacityOverflow {
        /// Capacity before the failed allocation
        capacity: usize,
        /// Factor that was being applied
        multiplier: usize,
    },

    /// A dictionary needs at least one slot.
    #[error("invalid construction: initial capacity must be non-zero")]
    ZeroCapacity,

    /// Growth must strictly increase capacity.
    #[error("invalid construction: growth multiplier must be at least 2, got {multiplier}")]
    GrowthMultiplierTooSmall {
        /// The rejected multiplier
        multiplier: usize,
    },

    /// A `DefaultDict` was built without a value factory.
    #[error("invalid construction: a default dictionary requires a value factory")]
    MissingFactory,
}

impl DictError {
    /// True for the construction-time variants.
    pub fn is_invalid_construction(&self) -> bool {
        matches!(
            self,
            DictError::ZeroCapacity
                | DictError::GrowthMultiplierTooSmall { .. }
                | DictError::MissingFactory
        )
    }
}
