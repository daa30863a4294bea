//! Prefetch subsystem: pattern-driven, best-effort data-readiness hints.
//!
//! Prefetch is fire-and-forget. A request names an access pattern and a
//! set of target indices; the dispatcher resolves it to concrete
//! (table, index) hints, touches the payloads through read-only store
//! accessors, and tracks how often a later real access lands on a hinted
//! slot. Issuing never fails and never takes a store write lock — a hint
//! racing a concurrent removal is a wasted touch, nothing more.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PrefetchConfig;
use crate::store::soa::{SoaStore, TableKind};

/// The closed set of access patterns a caller (or the external migration /
/// P2P sync collaborators) can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrefetchPattern {
    /// Forward scan: each index plus `prefetch_distance` successors.
    Sequential,
    /// No locality assumption; each listed index independently.
    Random,
    /// Most recently accessed listed indices first.
    Temporal,
    /// Listed indices plus their array-position neighbors.
    Spatial,
    /// Slots the tier manager has flagged as migration candidates.
    TierBased,
    /// Listed value slots whose compressed flag suggests an imminent
    /// decompress-on-read.
    CompressionBased,
    /// Indices a peer instance is expected to request.
    P2pBased,
}

/// A transient prefetch request. `table` names the array the indices refer
/// to; the tier-based strategy ignores both fields in favor of the tier
/// manager's candidate set, and the compression-based strategy always
/// resolves against the value table.
#[derive(Debug, Clone)]
pub struct PrefetchRequest {
    pub pattern: PrefetchPattern,
    pub table: TableKind,
    pub indices: Vec<usize>,
}

impl PrefetchRequest {
    pub fn new(pattern: PrefetchPattern, table: TableKind, indices: Vec<usize>) -> Self {
        Self { pattern, table, indices }
    }
}

/// Effectiveness counters, polled by the observability collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefetchStats {
    /// Resolved hints issued so far (one request entry per hint).
    pub requests_issued: u64,
    /// Real accesses that landed on a still-outstanding hint.
    pub hits: u64,
    /// hits / requests_issued, 0.0 when nothing has been issued.
    pub effectiveness: f64,
}

/// The strategy dispatcher plus its running effectiveness counters.
pub struct Prefetcher {
    config: PrefetchConfig,
    issued: AtomicU64,
    hits: AtomicU64,
    /// Hints awaiting a real access. A hint is consumed by the first
    /// access that targets it; hints for since-removed slots linger
    /// harmlessly until the index is hinted and hit again.
    outstanding: Mutex<HashSet<(TableKind, usize)>>,
}

impl Prefetcher {
    pub fn new(config: PrefetchConfig) -> Self {
        Self {
            config,
            issued: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            outstanding: Mutex::new(HashSet::new()),
        }
    }

    /// Dispatch a request, returning the number of hints issued.
    ///
    /// Out-of-bounds indices are dropped silently; prefetching must never
    /// fail the caller.
    pub fn issue(&self, store: &SoaStore, request: &PrefetchRequest) -> usize {
        let hints = self.resolve(store, request);

        let hardware = self.config.enable_hardware_prefetch;
        let software = self.config.enable_software_prefetch;

        let mut outstanding = self.outstanding.lock();
        for &(table, index) in &hints {
            match table {
                TableKind::Keys => store.prefetch_key(index, hardware, software),
                TableKind::Values => store.prefetch_value(index, hardware, software),
                // Metadata slots carry no payload; the hint itself is the
                // readiness signal.
                TableKind::Metadata => {}
            }
            outstanding.insert((table, index));
        }
        drop(outstanding);

        self.issued.fetch_add(hints.len() as u64, Ordering::Relaxed);
        debug!(pattern = ?request.pattern, hints = hints.len(), "Prefetch dispatched");
        hints.len()
    }

    /// Resolve a request to in-bounds (table, index) hints.
    fn resolve(&self, store: &SoaStore, request: &PrefetchRequest) -> Vec<(TableKind, usize)> {
        let table = request.table;
        let cap = store.capacity(table);

        match request.pattern {
            PrefetchPattern::Sequential => {
                let mut hints = Vec::new();
                for &index in &request.indices {
                    for ahead in index..=index.saturating_add(self.config.prefetch_distance) {
                        if ahead < cap {
                            hints.push((table, ahead));
                        }
                    }
                }
                hints
            }
            PrefetchPattern::Random | PrefetchPattern::P2pBased => request
                .indices
                .iter()
                .filter(|&&index| index < cap)
                .map(|&index| (table, index))
                .collect(),
            PrefetchPattern::Temporal => {
                // Most recently accessed first; inactive slots drop out.
                let mut stamped: Vec<(u64, usize)> = request
                    .indices
                    .iter()
                    .filter_map(|&index| {
                        let stamp = match table {
                            TableKind::Keys => store.key_last_access(index),
                            TableKind::Values => store.value_last_access(index),
                            TableKind::Metadata => store.metadata_last_access(index),
                        }?;
                        Some((stamp, index))
                    })
                    .collect();
                stamped.sort_by(|a, b| b.0.cmp(&a.0));
                stamped.into_iter().map(|(_, index)| (table, index)).collect()
            }
            PrefetchPattern::Spatial => {
                let mut seen = HashSet::new();
                let mut hints = Vec::new();
                for &index in &request.indices {
                    let low = index.saturating_sub(1);
                    let high = index.saturating_add(1);
                    for neighbor in low..=high {
                        if neighbor < cap && seen.insert(neighbor) {
                            hints.push((table, neighbor));
                        }
                    }
                }
                hints
            }
            PrefetchPattern::TierBased => store
                .tiers()
                .take_migration_candidates()
                .into_iter()
                .filter(|&(t, index)| index < store.capacity(t))
                .collect(),
            PrefetchPattern::CompressionBased => request
                .indices
                .iter()
                .filter(|&&index| store.value_is_compressed(index) == Some(true))
                .map(|&index| (TableKind::Values, index))
                .collect(),
        }
    }

    /// Report a real access. Consumes a matching outstanding hint and
    /// records a hit.
    pub fn record_access(&self, table: TableKind, index: usize) {
        if self.outstanding.lock().remove(&(table, index)) {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Running effectiveness counters.
    pub fn stats(&self) -> PrefetchStats {
        let issued = self.issued.load(Ordering::Relaxed);
        let hits = self.hits.load(Ordering::Relaxed);
        PrefetchStats {
            requests_issued: issued,
            hits,
            effectiveness: if issued == 0 { 0.0 } else { hits as f64 / issued as f64 },
        }
    }
}

/// Touch a payload slice so it is resident when the real access arrives.
#[cfg(target_arch = "x86_64")]
pub(crate) fn touch_slice(data: &[u8], hardware: bool, software: bool) {
    if hardware {
        use std::arch::x86_64::{_mm_prefetch, _MM_HINT_T0};
        let mut offset = 0;
        while offset < data.len() {
            // Prefetch instructions cannot fault; any address is sound.
            unsafe { _mm_prefetch(data.as_ptr().add(offset) as *const i8, _MM_HINT_T0) };
            offset += 64;
        }
    }
    if software && !data.is_empty() {
        let _ = unsafe { std::ptr::read_volatile(data.as_ptr()) };
    }
}

#[cfg(not(target_arch = "x86_64"))]
pub(crate) fn touch_slice(data: &[u8], _hardware: bool, software: bool) {
    if software && !data.is_empty() {
        let _ = unsafe { std::ptr::read_volatile(data.as_ptr()) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::tier::Tier;
    use std::sync::Arc;

    fn store_with_keys(n: usize) -> SoaStore {
        let mut cfg = Config::default();
        cfg.store.max_keys = 32;
        cfg.store.max_values = 32;
        cfg.store.max_metadata = 8;
        cfg.store.shards = 4;
        let store = SoaStore::new(Arc::new(cfg));
        for i in 0..n {
            store.add_key(format!("key-{i}").as_bytes(), Tier::Ram).unwrap();
        }
        store
    }

    fn prefetcher() -> Prefetcher {
        Prefetcher::new(PrefetchConfig {
            enable_hardware_prefetch: false,
            enable_software_prefetch: true,
            prefetch_distance: 2,
        })
    }

    #[test]
    fn test_sequential_expands_by_distance() {
        let store = store_with_keys(8);
        let pf = prefetcher();

        let issued = pf.issue(
            &store,
            &PrefetchRequest::new(PrefetchPattern::Sequential, TableKind::Keys, vec![0]),
        );
        // Index 0 plus 2 successors.
        assert_eq!(issued, 3);
    }

    #[test]
    fn test_out_of_bounds_is_silent_noop() {
        let store = store_with_keys(2);
        let pf = prefetcher();

        let issued = pf.issue(
            &store,
            &PrefetchRequest::new(PrefetchPattern::Random, TableKind::Keys, vec![1_000_000]),
        );
        assert_eq!(issued, 0);
        assert_eq!(pf.stats().requests_issued, 0);
    }

    #[test]
    fn test_hit_accounting() {
        let store = store_with_keys(4);
        let pf = prefetcher();

        pf.issue(
            &store,
            &PrefetchRequest::new(PrefetchPattern::Random, TableKind::Keys, vec![0, 1]),
        );

        pf.record_access(TableKind::Keys, 0);
        pf.record_access(TableKind::Keys, 0); // hint already consumed
        pf.record_access(TableKind::Keys, 3); // never hinted

        let stats = pf.stats();
        assert_eq!(stats.requests_issued, 2);
        assert_eq!(stats.hits, 1);
        assert!((stats.effectiveness - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_effectiveness_zero_when_idle() {
        let pf = prefetcher();
        assert_eq!(pf.stats().effectiveness, 0.0);
    }

    #[test]
    fn test_compression_based_filters_uncompressed() {
        let store = store_with_keys(0);
        let a = store.add_value(b"compressed", Tier::Ram, true).unwrap();
        let b = store.add_value(b"plain", Tier::Ram, false).unwrap();
        let pf = prefetcher();

        let issued = pf.issue(
            &store,
            &PrefetchRequest::new(
                PrefetchPattern::CompressionBased,
                TableKind::Values,
                vec![a, b],
            ),
        );
        assert_eq!(issued, 1);
    }

    #[test]
    fn test_tier_based_drains_candidates() {
        let store = store_with_keys(4);
        store.tiers().mark_migration_candidate(TableKind::Keys, 1);
        store.tiers().mark_migration_candidate(TableKind::Keys, 2);
        let pf = prefetcher();

        let request = PrefetchRequest::new(PrefetchPattern::TierBased, TableKind::Keys, vec![]);
        assert_eq!(pf.issue(&store, &request), 2);
        // Candidate set was drained by the first dispatch.
        assert_eq!(pf.issue(&store, &request), 0);
    }

    #[test]
    fn test_spatial_includes_neighbors_once() {
        let store = store_with_keys(8);
        let pf = prefetcher();

        let issued = pf.issue(
            &store,
            &PrefetchRequest::new(PrefetchPattern::Spatial, TableKind::Keys, vec![2, 3]),
        );
        // 1,2,3 from index 2 and 4 from index 3, deduplicated.
        assert_eq!(issued, 4);
    }

    #[test]
    fn test_temporal_covers_metadata_slots() {
        let store = store_with_keys(0);
        let a = store.add_metadata(1, 64, Tier::Ram, 0).unwrap();
        let b = store.add_metadata(1, 64, Tier::Ram, 0).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        store.touch_metadata(a).unwrap();
        let pf = prefetcher();

        let request =
            PrefetchRequest::new(PrefetchPattern::Temporal, TableKind::Metadata, vec![a, b]);
        let hints = pf.resolve(&store, &request);
        assert_eq!(hints, vec![(TableKind::Metadata, a), (TableKind::Metadata, b)]);
    }

    #[test]
    fn test_temporal_orders_by_recency() {
        let store = store_with_keys(4);
        std::thread::sleep(std::time::Duration::from_millis(2));
        store.touch_key(2).unwrap();
        let pf = prefetcher();

        let request =
            PrefetchRequest::new(PrefetchPattern::Temporal, TableKind::Keys, vec![0, 1, 2]);
        let hints = pf.resolve(&store, &request);
        assert_eq!(hints.first(), Some(&(TableKind::Keys, 2)));
        assert_eq!(hints.len(), 3);
    }
}
