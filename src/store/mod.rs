//! The data-oriented cache store: struct-of-arrays tables plus tier
//! bookkeeping.

pub mod soa;
pub mod tier;

pub use soa::{SoaStore, StoreStats, TableKind};
pub use tier::{Tier, TierManager, TierSnapshot};
