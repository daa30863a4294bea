//! Error types for the cache core.
//!
//! Every error here is locally recoverable by the caller (e.g.
//! evict-then-retry on `CapacityExceeded`). Statistics updates and prefetch
//! issuance deliberately do not produce errors; see the tier manager and
//! prefetcher docs for that asymmetry.

use thiserror::Error;

/// Errors surfaced by store, tier, and batch operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// No free slot remains in the target table.
    #[error("capacity exceeded: no free slot available")]
    CapacityExceeded,

    /// Input payload is longer than the table's fixed per-slot byte capacity.
    #[error("payload too large: {len} bytes exceeds slot capacity of {max}")]
    PayloadTooLarge { len: usize, max: usize },

    /// Tier level outside the valid range 0..=3.
    #[error("invalid tier level {0}, expected 0..=3")]
    InvalidTier(u8),

    /// Index out of range, or the slot at that index is not active.
    #[error("invalid index {0}: out of range or slot inactive")]
    InvalidIndex(usize),

    /// Compression destination buffer cannot hold all compressed items.
    #[error("output buffer too small: need {needed} bytes, have {available}")]
    OutputBufferTooSmall { needed: usize, available: usize },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CacheError>;
