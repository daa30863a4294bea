//! Storage tiers and the tier manager.
//!
//! Four latency tiers, fastest to slowest. The tier manager is pure
//! bookkeeping: it tracks per-tier capacity, usage, observed latency, and
//! hit rate, and picks a tier for new payloads. It never moves bytes
//! itself; an external migration collaborator reads this state, relocates
//! data, and writes the new placement back through the store.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::TierConfig;
use crate::error::{CacheError, Result};
use crate::store::soa::TableKind;

/// Identifies which storage tier a slot currently resides in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Tier 0: on-accelerator memory (hot).
    Accel,
    /// Tier 1: host RAM (warm).
    Ram,
    /// Tier 2: fast local storage (cool).
    LocalDisk,
    /// Tier 3: slow local storage (cold).
    ColdDisk,
}

impl Tier {
    /// Returns the numeric tier level (lower = faster).
    pub fn level(&self) -> u8 {
        match self {
            Tier::Accel => 0,
            Tier::Ram => 1,
            Tier::LocalDisk => 2,
            Tier::ColdDisk => 3,
        }
    }

    /// Converts a numeric level into a tier, rejecting levels above 3.
    pub fn from_level(level: u8) -> Result<Tier> {
        match level {
            0 => Ok(Tier::Accel),
            1 => Ok(Tier::Ram),
            2 => Ok(Tier::LocalDisk),
            3 => Ok(Tier::ColdDisk),
            other => Err(CacheError::InvalidTier(other)),
        }
    }

    /// Returns the next slower tier, or None if already coldest.
    pub fn demote(&self) -> Option<Tier> {
        match self {
            Tier::Accel => Some(Tier::Ram),
            Tier::Ram => Some(Tier::LocalDisk),
            Tier::LocalDisk => Some(Tier::ColdDisk),
            Tier::ColdDisk => None,
        }
    }

    /// Returns the next faster tier, or None if already hottest.
    pub fn promote(&self) -> Option<Tier> {
        match self {
            Tier::Accel => None,
            Tier::Ram => Some(Tier::Accel),
            Tier::LocalDisk => Some(Tier::Ram),
            Tier::ColdDisk => Some(Tier::LocalDisk),
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Accel => write!(f, "ACCEL"),
            Tier::Ram => write!(f, "RAM"),
            Tier::LocalDisk => write!(f, "SSD"),
            Tier::ColdDisk => write!(f, "HDD"),
        }
    }
}

/// Per-tier counters. Usage, latency, and hit rate are read far more often
/// than written, so they live in atomics and tolerate brief staleness.
#[derive(Debug)]
struct TierState {
    capacity: u64,
    usage: AtomicU64,
    latency_ns: AtomicU64,
    /// f64 hit rate stored via `to_bits`.
    hit_rate_bits: AtomicU64,
}

/// Serializable point-in-time view of one tier, polled by the
/// observability collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierSnapshot {
    pub level: u8,
    pub capacity: u64,
    pub usage: u64,
    pub latency_ns: u64,
    pub hit_rate: f64,
}

/// The tier manager: placement decisions and per-tier statistics.
pub struct TierManager {
    tiers: [TierState; 4],
    select_thresholds: [usize; 3],
    /// Slots an external migration collaborator has flagged for imminent
    /// movement; consumed by the tier-based prefetch strategy.
    migration_candidates: Mutex<Vec<(TableKind, usize)>>,
}

impl TierManager {
    /// Create a tier manager from the tier section of the configuration.
    pub fn new(config: &TierConfig) -> Self {
        let tiers = std::array::from_fn(|i| TierState {
            capacity: config.capacities[i],
            usage: AtomicU64::new(0),
            latency_ns: AtomicU64::new(config.latency_targets_ns[i]),
            hit_rate_bits: AtomicU64::new(0f64.to_bits()),
        });

        Self {
            tiers,
            select_thresholds: config.select_thresholds,
            migration_candidates: Mutex::new(Vec::new()),
        }
    }

    /// Pick a tier for a payload the caller did not pin explicitly.
    ///
    /// Deterministic size thresholds: small payloads go to the fastest
    /// tier, large ones to progressively slower tiers.
    pub fn select_tier(&self, payload_size: usize) -> Tier {
        if payload_size < self.select_thresholds[0] {
            Tier::Accel
        } else if payload_size < self.select_thresholds[1] {
            Tier::Ram
        } else if payload_size < self.select_thresholds[2] {
            Tier::LocalDisk
        } else {
            Tier::ColdDisk
        }
    }

    /// Overwrite the usage counter for a tier level.
    ///
    /// Out-of-range levels are a silent no-op: these updates sit on the hot
    /// path of every access, and callers tolerate a dropped sample better
    /// than an error branch.
    pub fn update_usage(&self, level: u8, usage: u64) {
        if let Some(state) = self.tiers.get(level as usize) {
            state.usage.store(usage, Ordering::Relaxed);
        }
    }

    /// Overwrite the observed latency for a tier level. Silent no-op for
    /// out-of-range levels.
    pub fn update_latency(&self, level: u8, latency_ns: u64) {
        if let Some(state) = self.tiers.get(level as usize) {
            state.latency_ns.store(latency_ns, Ordering::Relaxed);
        }
    }

    /// Overwrite the observed hit rate for a tier level. Silent no-op for
    /// out-of-range levels.
    pub fn update_hit_rate(&self, level: u8, rate: f64) {
        if let Some(state) = self.tiers.get(level as usize) {
            state.hit_rate_bits.store(rate.to_bits(), Ordering::Relaxed);
        }
    }

    /// Add slot bytes to a tier's usage. Called by the store on insert and
    /// on tier reassignment.
    pub fn add_usage(&self, tier: Tier, bytes: u64) {
        self.tiers[tier.level() as usize]
            .usage
            .fetch_add(bytes, Ordering::Relaxed);
    }

    /// Subtract slot bytes from a tier's usage, saturating at zero.
    pub fn sub_usage(&self, tier: Tier, bytes: u64) {
        let usage = &self.tiers[tier.level() as usize].usage;
        let mut current = usage.load(Ordering::Relaxed);
        loop {
            let next = current.saturating_sub(bytes);
            match usage.compare_exchange_weak(
                current,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(observed) => current = observed,
            }
        }
    }

    /// Current usage in bytes for a tier.
    pub fn usage(&self, tier: Tier) -> u64 {
        self.tiers[tier.level() as usize].usage.load(Ordering::Relaxed)
    }

    /// Capacity budget in bytes for a tier.
    pub fn capacity(&self, tier: Tier) -> u64 {
        self.tiers[tier.level() as usize].capacity
    }

    /// Flag a slot as a migration candidate. The tier-based prefetch
    /// strategy targets these before the mover relocates them.
    pub fn mark_migration_candidate(&self, table: TableKind, index: usize) {
        self.migration_candidates.lock().push((table, index));
    }

    /// Drain the current migration-candidate set.
    pub fn take_migration_candidates(&self) -> Vec<(TableKind, usize)> {
        std::mem::take(&mut *self.migration_candidates.lock())
    }

    /// Snapshot all four tiers for monitoring.
    pub fn snapshot(&self) -> [TierSnapshot; 4] {
        std::array::from_fn(|i| {
            let state = &self.tiers[i];
            TierSnapshot {
                level: i as u8,
                capacity: state.capacity,
                usage: state.usage.load(Ordering::Relaxed),
                latency_ns: state.latency_ns.load(Ordering::Relaxed),
                hit_rate: f64::from_bits(state.hit_rate_bits.load(Ordering::Relaxed)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TierConfig;

    #[test]
    fn test_tier_ordering() {
        assert_eq!(Tier::Accel.level(), 0);
        assert_eq!(Tier::ColdDisk.level(), 3);
    }

    #[test]
    fn test_tier_transitions() {
        assert_eq!(Tier::Accel.demote(), Some(Tier::Ram));
        assert_eq!(Tier::ColdDisk.demote(), None);
        assert_eq!(Tier::ColdDisk.promote(), Some(Tier::LocalDisk));
        assert_eq!(Tier::Accel.promote(), None);
    }

    #[test]
    fn test_from_level_rejects_out_of_range() {
        assert_eq!(Tier::from_level(2), Ok(Tier::LocalDisk));
        assert_eq!(Tier::from_level(4), Err(CacheError::InvalidTier(4)));
    }

    #[test]
    fn test_select_tier_thresholds() {
        let mgr = TierManager::new(&TierConfig::default());
        assert_eq!(mgr.select_tier(100), Tier::Accel);
        assert_eq!(mgr.select_tier(2 * 1024), Tier::Ram);
        assert_eq!(mgr.select_tier(50 * 1024), Tier::LocalDisk);
        assert_eq!(mgr.select_tier(1024 * 1024), Tier::ColdDisk);
    }

    #[test]
    fn test_invalid_level_update_is_noop() {
        let mgr = TierManager::new(&TierConfig::default());
        mgr.update_usage(0, 42);
        mgr.update_usage(5, 10);

        let snap = mgr.snapshot();
        assert_eq!(snap[0].usage, 42);
        assert_eq!(snap[1].usage, 0);
        assert_eq!(snap[2].usage, 0);
        assert_eq!(snap[3].usage, 0);
    }

    #[test]
    fn test_usage_accounting_saturates() {
        let mgr = TierManager::new(&TierConfig::default());
        mgr.add_usage(Tier::Ram, 100);
        mgr.sub_usage(Tier::Ram, 250);
        assert_eq!(mgr.usage(Tier::Ram), 0);
    }

    #[test]
    fn test_migration_candidates_drain() {
        let mgr = TierManager::new(&TierConfig::default());
        mgr.mark_migration_candidate(TableKind::Keys, 7);
        mgr.mark_migration_candidate(TableKind::Values, 3);

        let taken = mgr.take_migration_candidates();
        assert_eq!(taken, vec![(TableKind::Keys, 7), (TableKind::Values, 3)]);
        assert!(mgr.take_migration_candidates().is_empty());
    }
}
