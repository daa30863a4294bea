//! Struct-of-arrays cache store.
//!
//! Three fixed-capacity tables (keys, values, metadata), each laid out as
//! parallel arrays: one flat payload arena plus per-slot length, hash,
//! liveness, tier, timestamp, and access-count columns. Slots are the unit
//! of lifecycle; the integer index is the only handle external code may
//! retain. Key and value slots are not paired by position — any key→value
//! association belongs to the caller.
//!
//! Each table is partitioned into index-range shards behind independent
//! `RwLock`s. Mutations hold the owning shard's write lock; lookups take
//! per-shard read locks and scan shards in ascending order, so the
//! duplicate-content tie-break is "lowest global index wins". Free slots
//! are handed out from a seeded free list, lowest-first on a fresh table,
//! with FIFO reuse after removal.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::batch;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::prefetch::touch_slice;
use crate::store::tier::{Tier, TierManager};

/// Which of the store's tables an index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableKind {
    Keys,
    Values,
    Metadata,
}

/// Aggregate occupancy statistics, polled by observability collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub active_key_count: usize,
    pub active_value_count: usize,
    /// active_key_count / max_keys.
    pub key_utilization: f64,
    /// active_value_count / max_values.
    pub value_utilization: f64,
}

/// Per-slot bookkeeping columns shared by all three tables.
#[derive(Debug)]
struct SlotColumns {
    active: Vec<bool>,
    tiers: Vec<Tier>,
    /// Last-access timestamp, nanoseconds since store creation.
    stamps: Vec<u64>,
    access_counts: Vec<u64>,
    /// Free local indices, seeded ascending so a fresh shard hands out
    /// slot 0 first.
    free: VecDeque<usize>,
}

impl SlotColumns {
    fn new(capacity: usize) -> Self {
        Self {
            active: vec![false; capacity],
            tiers: vec![Tier::Accel; capacity],
            stamps: vec![0; capacity],
            access_counts: vec![0; capacity],
            free: (0..capacity).collect(),
        }
    }

    /// Pop the next free local index, if any.
    fn allocate(&mut self) -> Option<usize> {
        self.free.pop_front()
    }

    /// Mark a freshly written slot live.
    fn activate(&mut self, local: usize, tier: Tier, now: u64) {
        self.active[local] = true;
        self.tiers[local] = tier;
        self.stamps[local] = now;
        self.access_counts[local] = 0;
    }

    /// Flip a slot dead and return its index to the free pool.
    fn release(&mut self, local: usize) {
        self.active[local] = false;
        self.free.push_back(local);
    }
}

/// One index-range shard of the key table.
#[derive(Debug)]
struct KeyShard {
    slots: SlotColumns,
    /// Flat payload arena, `capacity * max_key_bytes`.
    payload: Vec<u8>,
    lens: Vec<u32>,
    hashes: Vec<u64>,
}

impl KeyShard {
    fn new(capacity: usize, max_key_bytes: usize) -> Self {
        Self {
            slots: SlotColumns::new(capacity),
            payload: vec![0; capacity * max_key_bytes],
            lens: vec![0; capacity],
            hashes: vec![0; capacity],
        }
    }
}

/// One index-range shard of the value table.
#[derive(Debug)]
struct ValueShard {
    slots: SlotColumns,
    payload: Vec<u8>,
    lens: Vec<u32>,
    compressed: Vec<bool>,
}

impl ValueShard {
    fn new(capacity: usize, max_value_bytes: usize) -> Self {
        Self {
            slots: SlotColumns::new(capacity),
            payload: vec![0; capacity * max_value_bytes],
            lens: vec![0; capacity],
            compressed: vec![false; capacity],
        }
    }
}

/// One index-range shard of the metadata table. Metadata slots carry no
/// payload bytes, only a type tag, a declared size, and a flags bitset.
#[derive(Debug)]
struct MetaShard {
    slots: SlotColumns,
    kinds: Vec<u8>,
    sizes: Vec<u32>,
    flags: Vec<u32>,
}

impl MetaShard {
    fn new(capacity: usize) -> Self {
        Self {
            slots: SlotColumns::new(capacity),
            kinds: vec![0; capacity],
            sizes: vec![0; capacity],
            flags: vec![0; capacity],
        }
    }
}

/// Split `capacity` slots across `shards` near-equal index ranges.
/// Returns the per-shard base offsets with a trailing sentinel equal to
/// `capacity`.
fn shard_offsets(capacity: usize, shards: usize) -> Vec<usize> {
    let shards = shards.max(1);
    let base = capacity / shards;
    let rem = capacity % shards;

    let mut offsets = Vec::with_capacity(shards + 1);
    let mut next = 0;
    for i in 0..shards {
        offsets.push(next);
        next += base + usize::from(i < rem);
    }
    offsets.push(capacity);
    offsets
}

/// Map a global index to (shard, local index) within the given offsets.
fn locate(offsets: &[usize], index: usize) -> Option<(usize, usize)> {
    let capacity = *offsets.last()?;
    if index >= capacity {
        return None;
    }
    // Shard sizes differ by at most one, so a linear walk over the shard
    // count is bounded and branch-predictable.
    for s in 0..offsets.len() - 1 {
        if index < offsets[s + 1] {
            return Some((s, index - offsets[s]));
        }
    }
    None
}

/// The struct-of-arrays store.
pub struct SoaStore {
    key_shards: Vec<RwLock<KeyShard>>,
    key_offsets: Vec<usize>,

    value_shards: Vec<RwLock<ValueShard>>,
    value_offsets: Vec<usize>,

    meta_shards: Vec<RwLock<MetaShard>>,
    meta_offsets: Vec<usize>,

    tiers: TierManager,

    active_keys: AtomicUsize,
    active_values: AtomicUsize,
    active_metadata: AtomicUsize,

    /// Monotonic origin for slot timestamps.
    epoch: Instant,

    config: Arc<Config>,
}

impl SoaStore {
    /// Create a store with all capacities fixed by the configuration.
    pub fn new(config: Arc<Config>) -> Self {
        let s = &config.store;

        let key_offsets = shard_offsets(s.max_keys, s.shards);
        let key_shards = key_offsets
            .windows(2)
            .map(|w| RwLock::new(KeyShard::new(w[1] - w[0], s.max_key_bytes)))
            .collect();

        let value_offsets = shard_offsets(s.max_values, s.shards);
        let value_shards = value_offsets
            .windows(2)
            .map(|w| RwLock::new(ValueShard::new(w[1] - w[0], s.max_value_bytes)))
            .collect();

        let meta_offsets = shard_offsets(s.max_metadata, s.shards);
        let meta_shards = meta_offsets
            .windows(2)
            .map(|w| RwLock::new(MetaShard::new(w[1] - w[0])))
            .collect();

        Self {
            key_shards,
            key_offsets,
            value_shards,
            value_offsets,
            meta_shards,
            meta_offsets,
            tiers: TierManager::new(&config.tiers),
            active_keys: AtomicUsize::new(0),
            active_values: AtomicUsize::new(0),
            active_metadata: AtomicUsize::new(0),
            epoch: Instant::now(),
            config,
        }
    }

    /// The tier manager backing this store's placement decisions.
    pub fn tiers(&self) -> &TierManager {
        &self.tiers
    }

    /// Slot capacity of a table.
    pub fn capacity(&self, table: TableKind) -> usize {
        match table {
            TableKind::Keys => self.config.store.max_keys,
            TableKind::Values => self.config.store.max_values,
            TableKind::Metadata => self.config.store.max_metadata,
        }
    }

    fn now(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    // ---- key table ----

    /// Insert a key, returning its slot index.
    ///
    /// The hash is computed here, at write time; lookups never rehash
    /// stored payloads. Fails with `PayloadTooLarge` before touching any
    /// slot and with `CapacityExceeded` when no free slot remains, leaving
    /// the store unchanged in both cases.
    pub fn add_key(&self, bytes: &[u8], tier: Tier) -> Result<usize> {
        let max = self.config.store.max_key_bytes;
        if bytes.len() > max {
            return Err(CacheError::PayloadTooLarge { len: bytes.len(), max });
        }
        let hash = batch::hash_key(bytes);
        let now = self.now();

        for (s, lock) in self.key_shards.iter().enumerate() {
            let mut shard = lock.write();
            let Some(local) = shard.slots.allocate() else {
                continue;
            };

            let start = local * max;
            shard.payload[start..start + bytes.len()].copy_from_slice(bytes);
            // Clear the tail so a reused slot never carries stale bytes.
            shard.payload[start + bytes.len()..start + max].fill(0);
            shard.lens[local] = bytes.len() as u32;
            shard.hashes[local] = hash;
            shard.slots.activate(local, tier, now);
            drop(shard);

            self.active_keys.fetch_add(1, Ordering::Relaxed);
            self.tiers.add_usage(tier, bytes.len() as u64);

            let index = self.key_offsets[s] + local;
            debug!(index, len = bytes.len(), tier = %tier, "Key slot allocated");
            return Ok(index);
        }
        Err(CacheError::CapacityExceeded)
    }

    /// Insert a key into the tier selected for its size.
    pub fn add_key_auto(&self, bytes: &[u8]) -> Result<usize> {
        self.add_key(bytes, self.tiers.select_tier(bytes.len()))
    }

    /// Release a key slot. The payload bytes may remain in memory but are
    /// unreachable through any accessor until the slot is rewritten.
    pub fn remove_key(&self, index: usize) -> Result<()> {
        let (s, local) =
            locate(&self.key_offsets, index).ok_or(CacheError::InvalidIndex(index))?;
        let mut shard = self.key_shards[s].write();
        if !shard.slots.active[local] {
            return Err(CacheError::InvalidIndex(index));
        }

        let tier = shard.slots.tiers[local];
        let len = shard.lens[local] as u64;
        shard.slots.release(local);
        drop(shard);

        self.active_keys.fetch_sub(1, Ordering::Relaxed);
        self.tiers.sub_usage(tier, len);
        debug!(index, "Key slot released");
        Ok(())
    }

    /// Exact-match lookup for a batch of keys.
    ///
    /// Output is order-preserving: entry `i` is the slot index whose stored
    /// bytes equal `keys[i]`, or None. Candidate slots are screened by
    /// stored hash first, then confirmed by byte equality. When duplicate
    /// active keys share identical content, the lowest global index wins.
    /// The configured batch width tiles the scan for locality; it never
    /// changes the result.
    pub fn find_keys<K: AsRef<[u8]>>(&self, keys: &[K]) -> Vec<Option<usize>> {
        let width = self.config.batch.batch_width;
        let hashes = batch::hash_keys(keys, width);

        keys.iter()
            .zip(hashes)
            .map(|(key, hash)| self.find_one(key.as_ref(), hash, width))
            .collect()
    }

    fn find_one(&self, key: &[u8], hash: u64, width: usize) -> Option<usize> {
        let max = self.config.store.max_key_bytes;
        for (s, lock) in self.key_shards.iter().enumerate() {
            let shard = lock.read();
            let candidates =
                batch::candidate_positions(hash, &shard.hashes, &shard.slots.active, width);
            for local in candidates {
                let len = shard.lens[local] as usize;
                let start = local * max;
                if len == key.len() && &shard.payload[start..start + len] == key {
                    return Some(self.key_offsets[s] + local);
                }
            }
        }
        None
    }

    /// Fetch an active key's payload. Tombstoned slots return None.
    pub fn get_key(&self, index: usize) -> Option<Vec<u8>> {
        let (s, local) = locate(&self.key_offsets, index)?;
        let shard = self.key_shards[s].read();
        if !shard.slots.active[local] {
            return None;
        }
        let start = local * self.config.store.max_key_bytes;
        let len = shard.lens[local] as usize;
        Some(shard.payload[start..start + len].to_vec())
    }

    /// Record a real access: bump the slot's timestamp and access counter.
    pub fn touch_key(&self, index: usize) -> Result<()> {
        let (s, local) =
            locate(&self.key_offsets, index).ok_or(CacheError::InvalidIndex(index))?;
        let now = self.now();
        let mut shard = self.key_shards[s].write();
        if !shard.slots.active[local] {
            return Err(CacheError::InvalidIndex(index));
        }
        shard.slots.stamps[local] = now;
        shard.slots.access_counts[local] += 1;
        Ok(())
    }

    /// Reassign a key slot's tier, moving its bytes in the usage
    /// accounting. This is the migration collaborator's write-back hook.
    pub fn update_key_tier(&self, index: usize, tier: Tier) -> Result<()> {
        let (s, local) =
            locate(&self.key_offsets, index).ok_or(CacheError::InvalidIndex(index))?;
        let mut shard = self.key_shards[s].write();
        if !shard.slots.active[local] {
            return Err(CacheError::InvalidIndex(index));
        }
        let old = shard.slots.tiers[local];
        let len = shard.lens[local] as u64;
        shard.slots.tiers[local] = tier;
        drop(shard);

        if old != tier {
            self.tiers.sub_usage(old, len);
            self.tiers.add_usage(tier, len);
        }
        Ok(())
    }

    /// Tier of an active key slot.
    pub fn key_tier(&self, index: usize) -> Option<Tier> {
        let (s, local) = locate(&self.key_offsets, index)?;
        let shard = self.key_shards[s].read();
        shard.slots.active[local].then(|| shard.slots.tiers[local])
    }

    /// Last-access timestamp of an active key slot (nanoseconds since
    /// store creation).
    pub fn key_last_access(&self, index: usize) -> Option<u64> {
        let (s, local) = locate(&self.key_offsets, index)?;
        let shard = self.key_shards[s].read();
        shard.slots.active[local].then(|| shard.slots.stamps[local])
    }

    /// Access count of an active key slot.
    pub fn key_access_count(&self, index: usize) -> Option<u64> {
        let (s, local) = locate(&self.key_offsets, index)?;
        let shard = self.key_shards[s].read();
        shard.slots.active[local].then(|| shard.slots.access_counts[local])
    }

    /// Whether the key slot at `index` is live.
    pub fn key_is_active(&self, index: usize) -> bool {
        locate(&self.key_offsets, index)
            .map(|(s, local)| self.key_shards[s].read().slots.active[local])
            .unwrap_or(false)
    }

    // ---- value table ----

    /// Insert a value, returning its slot index. Same contract as
    /// `add_key`, with the value byte capacity and a compressed flag.
    pub fn add_value(&self, bytes: &[u8], tier: Tier, compressed: bool) -> Result<usize> {
        let max = self.config.store.max_value_bytes;
        if bytes.len() > max {
            return Err(CacheError::PayloadTooLarge { len: bytes.len(), max });
        }
        let now = self.now();

        for (s, lock) in self.value_shards.iter().enumerate() {
            let mut shard = lock.write();
            let Some(local) = shard.slots.allocate() else {
                continue;
            };

            let start = local * max;
            shard.payload[start..start + bytes.len()].copy_from_slice(bytes);
            shard.payload[start + bytes.len()..start + max].fill(0);
            shard.lens[local] = bytes.len() as u32;
            shard.compressed[local] = compressed;
            shard.slots.activate(local, tier, now);
            drop(shard);

            self.active_values.fetch_add(1, Ordering::Relaxed);
            self.tiers.add_usage(tier, bytes.len() as u64);

            let index = self.value_offsets[s] + local;
            debug!(index, len = bytes.len(), tier = %tier, compressed, "Value slot allocated");
            return Ok(index);
        }
        Err(CacheError::CapacityExceeded)
    }

    /// Insert a value into the tier selected for its size.
    pub fn add_value_auto(&self, bytes: &[u8], compressed: bool) -> Result<usize> {
        self.add_value(bytes, self.tiers.select_tier(bytes.len()), compressed)
    }

    /// Release a value slot.
    pub fn remove_value(&self, index: usize) -> Result<()> {
        let (s, local) =
            locate(&self.value_offsets, index).ok_or(CacheError::InvalidIndex(index))?;
        let mut shard = self.value_shards[s].write();
        if !shard.slots.active[local] {
            return Err(CacheError::InvalidIndex(index));
        }

        let tier = shard.slots.tiers[local];
        let len = shard.lens[local] as u64;
        shard.slots.release(local);
        drop(shard);

        self.active_values.fetch_sub(1, Ordering::Relaxed);
        self.tiers.sub_usage(tier, len);
        debug!(index, "Value slot released");
        Ok(())
    }

    /// Fetch an active value's payload. Tombstoned slots return None.
    pub fn get_value(&self, index: usize) -> Option<Vec<u8>> {
        let (s, local) = locate(&self.value_offsets, index)?;
        let shard = self.value_shards[s].read();
        if !shard.slots.active[local] {
            return None;
        }
        let start = local * self.config.store.max_value_bytes;
        let len = shard.lens[local] as usize;
        Some(shard.payload[start..start + len].to_vec())
    }

    /// Record a real access on a value slot.
    pub fn touch_value(&self, index: usize) -> Result<()> {
        let (s, local) =
            locate(&self.value_offsets, index).ok_or(CacheError::InvalidIndex(index))?;
        let now = self.now();
        let mut shard = self.value_shards[s].write();
        if !shard.slots.active[local] {
            return Err(CacheError::InvalidIndex(index));
        }
        shard.slots.stamps[local] = now;
        shard.slots.access_counts[local] += 1;
        Ok(())
    }

    /// Reassign a value slot's tier.
    pub fn update_value_tier(&self, index: usize, tier: Tier) -> Result<()> {
        let (s, local) =
            locate(&self.value_offsets, index).ok_or(CacheError::InvalidIndex(index))?;
        let mut shard = self.value_shards[s].write();
        if !shard.slots.active[local] {
            return Err(CacheError::InvalidIndex(index));
        }
        let old = shard.slots.tiers[local];
        let len = shard.lens[local] as u64;
        shard.slots.tiers[local] = tier;
        drop(shard);

        if old != tier {
            self.tiers.sub_usage(old, len);
            self.tiers.add_usage(tier, len);
        }
        Ok(())
    }

    /// Flip a value slot's compressed flag.
    pub fn set_value_compressed(&self, index: usize, compressed: bool) -> Result<()> {
        let (s, local) =
            locate(&self.value_offsets, index).ok_or(CacheError::InvalidIndex(index))?;
        let mut shard = self.value_shards[s].write();
        if !shard.slots.active[local] {
            return Err(CacheError::InvalidIndex(index));
        }
        shard.compressed[local] = compressed;
        Ok(())
    }

    /// Whether an active value slot holds compressed bytes.
    pub fn value_is_compressed(&self, index: usize) -> Option<bool> {
        let (s, local) = locate(&self.value_offsets, index)?;
        let shard = self.value_shards[s].read();
        shard.slots.active[local].then(|| shard.compressed[local])
    }

    /// Tier of an active value slot.
    pub fn value_tier(&self, index: usize) -> Option<Tier> {
        let (s, local) = locate(&self.value_offsets, index)?;
        let shard = self.value_shards[s].read();
        shard.slots.active[local].then(|| shard.slots.tiers[local])
    }

    /// Last-access timestamp of an active value slot.
    pub fn value_last_access(&self, index: usize) -> Option<u64> {
        let (s, local) = locate(&self.value_offsets, index)?;
        let shard = self.value_shards[s].read();
        shard.slots.active[local].then(|| shard.slots.stamps[local])
    }

    /// Access count of an active value slot.
    pub fn value_access_count(&self, index: usize) -> Option<u64> {
        let (s, local) = locate(&self.value_offsets, index)?;
        let shard = self.value_shards[s].read();
        shard.slots.active[local].then(|| shard.slots.access_counts[local])
    }

    /// Whether the value slot at `index` is live.
    pub fn value_is_active(&self, index: usize) -> bool {
        locate(&self.value_offsets, index)
            .map(|(s, local)| self.value_shards[s].read().slots.active[local])
            .unwrap_or(false)
    }

    // ---- metadata table ----

    /// Insert a metadata record (type tag, declared size, flags bitset).
    pub fn add_metadata(&self, kind: u8, size: u32, tier: Tier, flags: u32) -> Result<usize> {
        let now = self.now();
        for (s, lock) in self.meta_shards.iter().enumerate() {
            let mut shard = lock.write();
            let Some(local) = shard.slots.allocate() else {
                continue;
            };

            shard.kinds[local] = kind;
            shard.sizes[local] = size;
            shard.flags[local] = flags;
            shard.slots.activate(local, tier, now);
            drop(shard);

            self.active_metadata.fetch_add(1, Ordering::Relaxed);
            self.tiers.add_usage(tier, size as u64);
            return Ok(self.meta_offsets[s] + local);
        }
        Err(CacheError::CapacityExceeded)
    }

    /// Release a metadata slot.
    pub fn remove_metadata(&self, index: usize) -> Result<()> {
        let (s, local) =
            locate(&self.meta_offsets, index).ok_or(CacheError::InvalidIndex(index))?;
        let mut shard = self.meta_shards[s].write();
        if !shard.slots.active[local] {
            return Err(CacheError::InvalidIndex(index));
        }
        let tier = shard.slots.tiers[local];
        let size = shard.sizes[local] as u64;
        shard.slots.release(local);
        drop(shard);

        self.active_metadata.fetch_sub(1, Ordering::Relaxed);
        self.tiers.sub_usage(tier, size);
        Ok(())
    }

    /// Overwrite a metadata slot's flags bitset.
    pub fn update_metadata_flags(&self, index: usize, flags: u32) -> Result<()> {
        let (s, local) =
            locate(&self.meta_offsets, index).ok_or(CacheError::InvalidIndex(index))?;
        let mut shard = self.meta_shards[s].write();
        if !shard.slots.active[local] {
            return Err(CacheError::InvalidIndex(index));
        }
        shard.flags[local] = flags;
        Ok(())
    }

    /// Record a real access on a metadata slot.
    pub fn touch_metadata(&self, index: usize) -> Result<()> {
        let (s, local) =
            locate(&self.meta_offsets, index).ok_or(CacheError::InvalidIndex(index))?;
        let now = self.now();
        let mut shard = self.meta_shards[s].write();
        if !shard.slots.active[local] {
            return Err(CacheError::InvalidIndex(index));
        }
        shard.slots.stamps[local] = now;
        shard.slots.access_counts[local] += 1;
        Ok(())
    }

    /// Last-access timestamp of an active metadata slot.
    pub fn metadata_last_access(&self, index: usize) -> Option<u64> {
        let (s, local) = locate(&self.meta_offsets, index)?;
        let shard = self.meta_shards[s].read();
        shard.slots.active[local].then(|| shard.slots.stamps[local])
    }

    /// Type tag and flags of an active metadata slot.
    pub fn get_metadata(&self, index: usize) -> Option<(u8, u32, u32)> {
        let (s, local) = locate(&self.meta_offsets, index)?;
        let shard = self.meta_shards[s].read();
        shard.slots.active[local]
            .then(|| (shard.kinds[local], shard.sizes[local], shard.flags[local]))
    }

    // ---- stats & prefetch touches ----

    /// Occupancy snapshot. Pure; no side effects.
    pub fn stats(&self) -> StoreStats {
        let keys = self.active_keys.load(Ordering::Relaxed);
        let values = self.active_values.load(Ordering::Relaxed);
        let max_keys = self.config.store.max_keys;
        let max_values = self.config.store.max_values;
        StoreStats {
            active_key_count: keys,
            active_value_count: values,
            key_utilization: if max_keys == 0 { 0.0 } else { keys as f64 / max_keys as f64 },
            value_utilization: if max_values == 0 {
                0.0
            } else {
                values as f64 / max_values as f64
            },
        }
    }

    /// Best-effort readiness touch on a key slot's payload. Out-of-bounds
    /// or inactive slots are a silent no-op; only read locks are taken, so
    /// this may race freely with mutations.
    pub fn prefetch_key(&self, index: usize, hardware: bool, software: bool) {
        let Some((s, local)) = locate(&self.key_offsets, index) else {
            return;
        };
        let shard = self.key_shards[s].read();
        if !shard.slots.active[local] {
            return;
        }
        let max = self.config.store.max_key_bytes;
        let len = shard.lens[local] as usize;
        touch_slice(&shard.payload[local * max..local * max + len], hardware, software);
    }

    /// Best-effort readiness touch on a value slot's payload.
    pub fn prefetch_value(&self, index: usize, hardware: bool, software: bool) {
        let Some((s, local)) = locate(&self.value_offsets, index) else {
            return;
        };
        let shard = self.value_shards[s].read();
        if !shard.slots.active[local] {
            return;
        }
        let max = self.config.store.max_value_bytes;
        let len = shard.lens[local] as usize;
        touch_slice(&shard.payload[local * max..local * max + len], hardware, software);
    }
}

/// Thread-safe handle; the store's internals are already sharded, so a
/// plain `Arc` is enough for sharing across worker threads.
pub type SharedStore = Arc<SoaStore>;

/// Create a store wrapped for sharing.
pub fn new_shared_store(config: Arc<Config>) -> SharedStore {
    Arc::new(SoaStore::new(config))
}
