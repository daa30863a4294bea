//! Runtime configuration for graph-cache-core.
//!
//! Configuration can be loaded from a JSON file or constructed
//! programmatically. It is handed to the store, tier manager, and prefetcher
//! at construction time; there is no ambient global state.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Store table capacities and shard layout.
    pub store: StoreConfig,

    /// Per-tier budgets and placement thresholds.
    pub tiers: TierConfig,

    /// Batch operation tuning.
    pub batch: BatchConfig,

    /// Prefetching settings.
    pub prefetch: PrefetchConfig,
}

/// Store table capacities.
///
/// All capacities are hard limits fixed at construction; the store never
/// grows or shrinks its backing arrays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Maximum number of key slots.
    pub max_keys: usize,

    /// Maximum number of value slots.
    pub max_values: usize,

    /// Maximum number of metadata slots.
    pub max_metadata: usize,

    /// Per-slot key payload capacity in bytes.
    pub max_key_bytes: usize,

    /// Per-slot value payload capacity in bytes.
    pub max_value_bytes: usize,

    /// Number of independently lockable index-range shards per table.
    pub shards: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_keys: 65536,
            max_values: 65536,
            max_metadata: 16384,
            max_key_bytes: 256,
            max_value_bytes: 4096,
            shards: 8,
        }
    }
}

/// Tier capacity budgets and the placement thresholds used by
/// `TierManager::select_tier`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierConfig {
    /// Byte budget per tier, fastest (index 0) to slowest (index 3).
    pub capacities: [u64; 4],

    /// Target access latency per tier in nanoseconds, used to seed the
    /// observed-latency counters.
    pub latency_targets_ns: [u64; 4],

    /// Payload-size thresholds (bytes) for automatic tier selection.
    /// A payload smaller than `select_thresholds[i]` is placed in tier `i`;
    /// anything at or above the last threshold goes to tier 3.
    pub select_thresholds: [usize; 3],
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            capacities: [
                4 * 1024 * 1024 * 1024,   // 4 GB accelerator memory
                16 * 1024 * 1024 * 1024,  // 16 GB host RAM
                64 * 1024 * 1024 * 1024,  // 64 GB fast local storage
                256 * 1024 * 1024 * 1024, // 256 GB slow local storage
            ],
            latency_targets_ns: [100, 1_000, 100_000, 10_000_000],
            select_thresholds: [1024, 10 * 1024, 100 * 1024],
        }
    }
}

/// Batch (SIMD-style) operation tuning.
///
/// The batch width governs loop tiling only; every batch operation produces
/// identical output regardless of the configured width.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of items processed per tile in batch loops.
    pub batch_width: usize,

    /// zstd compression level (1-22) for `compress_values`.
    pub zstd_level: i32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_width: 8,
            zstd_level: 3,
        }
    }
}

/// Prefetch strategy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefetchConfig {
    /// Issue hardware prefetch instructions where the target supports them.
    pub enable_hardware_prefetch: bool,

    /// Touch payload bytes through a volatile read as a software prefetch.
    pub enable_software_prefetch: bool,

    /// Lookahead count for the sequential pattern: each listed index also
    /// hints this many successors.
    pub prefetch_distance: usize,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            enable_hardware_prefetch: true,
            enable_software_prefetch: true,
            prefetch_distance: 4,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file, falling back to defaults when
    /// the file does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let data = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&data)?;
            Ok(config)
        } else {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            Ok(Config::default())
        }
    }

    /// Wrap in an `Arc` for sharing across the store, tier manager, and
    /// prefetcher.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}
