//! Batch (SIMD-style) operations: hashing, hash matching, and compression.
//!
//! Everything here is pure and stateless; the store calls these routines
//! for its own tables and callers may use them directly. Loops are tiled
//! by a batch width so the compiler can vectorize the inner body and the
//! working set stays cache-resident. The width is a performance knob only:
//! every function returns identical output for any width >= 1, and the
//! tests hold that property.

use xxhash_rust::xxh3::xxh3_64;

use crate::error::{CacheError, Result};

/// Hash a single key payload with XXH3-64, the same function the store
/// applies at key-write time. Lookup correctness depends on callers and
/// the store agreeing on this function.
pub fn hash_key(bytes: &[u8]) -> u64 {
    xxh3_64(bytes)
}

/// Hash a batch of keys, order-preserving, one 64-bit hash per input.
pub fn hash_keys<K: AsRef<[u8]>>(keys: &[K], batch_width: usize) -> Vec<u64> {
    let width = batch_width.max(1);
    let mut out = Vec::with_capacity(keys.len());
    for tile in keys.chunks(width) {
        for key in tile {
            out.push(xxh3_64(key.as_ref()));
        }
    }
    out
}

/// Scan a shard's hash column for active slots whose stored hash equals
/// `target`, returning their positions in ascending order. The caller
/// confirms byte equality; a hash match alone is only a candidate.
pub fn candidate_positions(
    target: u64,
    hashes: &[u64],
    active: &[bool],
    batch_width: usize,
) -> Vec<usize> {
    debug_assert_eq!(hashes.len(), active.len());
    let width = batch_width.max(1);
    let mut out = Vec::new();
    let mut base = 0;
    for (hash_tile, active_tile) in hashes.chunks(width).zip(active.chunks(width)) {
        for (i, (&hash, &live)) in hash_tile.iter().zip(active_tile).enumerate() {
            if live && hash == target {
                out.push(base + i);
            }
        }
        base += hash_tile.len();
    }
    out
}

/// Worst-case compressed size for a payload of `len` bytes, for sizing
/// destination buffers passed to `compress_values`.
pub fn compressed_bound(len: usize) -> usize {
    zstd::zstd_safe::compress_bound(len)
}

/// Compress each input independently with zstd and pack the outputs
/// contiguously into `out`, returning each item's compressed byte length.
///
/// Fails with `OutputBufferTooSmall` if an item does not fit in the
/// remaining destination space; no partial sizes are returned in that
/// case. The exact need is unknown until compression succeeds, so `needed`
/// reports the worst-case bound for the failing item on top of the bytes
/// already written. Lossless: `decompress_values` reconstructs
/// byte-identical payloads.
pub fn compress_values<V: AsRef<[u8]>>(
    values: &[V],
    level: i32,
    out: &mut [u8],
) -> Result<Vec<usize>> {
    let mut sizes = Vec::with_capacity(values.len());
    let mut cursor = 0;

    for value in values {
        let written = zstd::bulk::compress_to_buffer(value.as_ref(), &mut out[cursor..], level)
            .map_err(|_| CacheError::OutputBufferTooSmall {
                needed: cursor + compressed_bound(value.as_ref().len()),
                available: out.len(),
            })?;
        sizes.push(written);
        cursor += written;
    }
    Ok(sizes)
}

/// Split a packed compressed blob back into items using the per-item sizes
/// from `compress_values` and decompress each one.
///
/// Corrupt or truncated compressed input also surfaces as
/// `OutputBufferTooSmall` — the error set carries no separate
/// codec-failure kind — with `needed` and `available` both reporting the
/// failing item's size.
pub fn decompress_values(blob: &[u8], sizes: &[usize]) -> Result<Vec<Vec<u8>>> {
    let total: usize = sizes.iter().sum();
    if total > blob.len() {
        return Err(CacheError::OutputBufferTooSmall {
            needed: total,
            available: blob.len(),
        });
    }

    let mut out = Vec::with_capacity(sizes.len());
    let mut cursor = 0;
    for &size in sizes {
        let item = &blob[cursor..cursor + size];
        let decompressed = zstd::decode_all(item).map_err(|_| {
            CacheError::OutputBufferTooSmall {
                needed: size,
                available: size,
            }
        })?;
        out.push(decompressed);
        cursor += size;
    }
    Ok(out)
}
