//! Integration tests for the struct-of-arrays store.

use std::collections::HashSet;
use std::sync::Arc;

use graph_cache_core::{CacheError, Config, SoaStore, Tier};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn store_with(max_keys: usize, shards: usize) -> SoaStore {
    init_tracing();
    let mut cfg = Config::default();
    cfg.store.max_keys = max_keys;
    cfg.store.max_values = max_keys;
    cfg.store.max_metadata = 8;
    cfg.store.shards = shards;
    SoaStore::new(Arc::new(cfg))
}

#[test]
fn test_add_then_find_returns_insertion_indices() {
    let store = store_with(16, 4);

    assert_eq!(store.add_key(b"user:123", Tier::Ram).unwrap(), 0);
    assert_eq!(store.add_key(b"session:456", Tier::Accel).unwrap(), 1);

    let matches = store.find_keys(&[b"user:123".as_slice(), b"session:456".as_slice()]);
    assert_eq!(matches, vec![Some(0), Some(1)]);
}

#[test]
fn test_capacity_bound_is_hard() {
    let store = store_with(4, 4);

    for i in 0..4 {
        store.add_key(format!("key-{i}").as_bytes(), Tier::Ram).unwrap();
    }
    assert_eq!(
        store.add_key(b"one-too-many", Tier::Ram),
        Err(CacheError::CapacityExceeded)
    );

    // The failed call left no partial slot behind.
    assert_eq!(store.stats().active_key_count, 4);
    assert!(store.find_keys(&[b"one-too-many"])[0].is_none());
}

#[test]
fn test_exact_match_never_confuses_distinct_keys() {
    let store = store_with(16, 4);

    let a = store.add_key(b"node:alpha", Tier::Ram).unwrap();
    let b = store.add_key(b"node:beta", Tier::Ram).unwrap();

    assert_eq!(store.find_keys(&[b"node:alpha"])[0], Some(a));
    assert_eq!(store.find_keys(&[b"node:beta"])[0], Some(b));
    assert!(store.find_keys(&[b"node:gamma"])[0].is_none());
}

#[test]
fn test_removed_key_is_invisible_to_lookup() {
    let store = store_with(16, 4);

    let idx = store.add_key(b"user:123", Tier::Ram).unwrap();
    store.add_key(b"session:456", Tier::Accel).unwrap();

    store.remove_key(idx).unwrap();

    // The backing bytes may still sit in memory, but no accessor reaches them.
    assert!(store.find_keys(&[b"user:123"])[0].is_none());
    assert_eq!(store.get_key(idx), None);
    assert_eq!(store.find_keys(&[b"session:456"])[0], Some(1));
}

#[test]
fn test_invalid_tier_level_rejected_at_boundary() {
    assert_eq!(Tier::from_level(5), Err(CacheError::InvalidTier(5)));

    // Statistics updates swallow the same input silently.
    let store = store_with(8, 4);
    store.tiers().update_usage(5, 10);
    for snap in store.tiers().snapshot() {
        assert_eq!(snap.usage, 0);
    }
}

#[test]
fn test_find_results_invariant_under_batch_width() {
    let keys: Vec<Vec<u8>> = (0..32).map(|i| format!("node:{i:03}").into_bytes()).collect();
    let queries: Vec<&[u8]> = keys.iter().map(|k| k.as_slice()).collect();

    let mut reference = None;
    for width in [1, 2, 8, 16, 64] {
        let mut cfg = Config::default();
        cfg.store.max_keys = 64;
        cfg.store.shards = 4;
        cfg.batch.batch_width = width;
        let store = SoaStore::new(Arc::new(cfg));
        for key in &keys {
            store.add_key(key, Tier::Ram).unwrap();
        }

        let found = store.find_keys(&queries);
        match &reference {
            None => reference = Some(found),
            Some(expected) => assert_eq!(&found, expected, "width {width} diverged"),
        }
    }
}

#[test]
fn test_remove_returns_slot_for_reuse() {
    let store = store_with(2, 2);

    let a = store.add_key(b"first", Tier::Ram).unwrap();
    let _b = store.add_key(b"second", Tier::Ram).unwrap();
    assert!(store.add_key(b"third", Tier::Ram).is_err());

    store.remove_key(a).unwrap();
    let c = store.add_key(b"third", Tier::Ram).unwrap();
    assert_eq!(c, a);
    assert_eq!(store.find_keys(&[b"third"])[0], Some(c));
}

#[test]
fn test_value_lifecycle_and_auto_tier() {
    let store = store_with(8, 4);

    let small = store.add_value_auto(b"tiny", false).unwrap();
    assert_eq!(store.value_tier(small), Some(Tier::Accel));

    let big = store.add_value_auto(&vec![0u8; 2048], false).unwrap();
    assert_eq!(store.value_tier(big), Some(Tier::Ram));

    store.remove_value(small).unwrap();
    assert_eq!(store.get_value(small), None);
    assert_eq!(store.get_value(big).unwrap().len(), 2048);
}

#[test]
fn test_concurrent_adds_stay_within_capacity() {
    let store = Arc::new(store_with(64, 8));
    let mut handles = Vec::new();

    for t in 0..8 {
        let store = store.clone();
        handles.push(std::thread::spawn(move || {
            let mut indices = Vec::new();
            for i in 0..8 {
                let key = format!("t{t}-k{i}");
                indices.push(store.add_key(key.as_bytes(), Tier::Ram).unwrap());
            }
            indices
        }));
    }

    let mut all: Vec<usize> = Vec::new();
    for handle in handles {
        all.extend(handle.join().unwrap());
    }

    // 64 adds into 64 slots: every index unique and in range.
    let unique: HashSet<_> = all.iter().copied().collect();
    assert_eq!(unique.len(), 64);
    assert!(all.iter().all(|&i| i < 64));
    assert_eq!(store.stats().active_key_count, 64);
    assert_eq!(store.add_key(b"overflow", Tier::Ram), Err(CacheError::CapacityExceeded));
}
