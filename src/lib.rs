//! graph-cache-core: tiered struct-of-arrays cache engine.
//!
//! An in-process acceleration layer for graph database and LLM workloads.
//! Keys, values, and metadata live in fixed-capacity struct-of-arrays
//! tables whose slots are assigned to one of four latency tiers:
//!   accelerator memory (hot) → host RAM (warm) → fast local storage
//!   (cool) → slow local storage (cold)
//!
//! The crate exposes only in-process operations. Tier migration, P2P
//! synchronization, and observability are external collaborators that
//! drive the store through the same public API and poll its stats
//! snapshots.

pub mod batch;
pub mod config;
pub mod error;
pub mod prefetch;
pub mod store;

pub use config::Config;
pub use error::{CacheError, Result};
pub use prefetch::{PrefetchPattern, PrefetchRequest, PrefetchStats, Prefetcher};
pub use store::soa::{new_shared_store, SharedStore, SoaStore, StoreStats, TableKind};
pub use store::tier::{Tier, TierManager, TierSnapshot};
