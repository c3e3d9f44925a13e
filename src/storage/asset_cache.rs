// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! LRU cache for asset metadata lookups.
//!
//! Asset parameters rarely change, and an account listing fans out one lookup
//! per holding. Entries are cached per asset id without the holder's amount.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::models::AssetRecord;

/// Default number of assets kept.
pub const DEFAULT_ASSET_CACHE_CAPACITY: usize = 512;

/// Default time-to-live per entry.
pub const DEFAULT_ASSET_CACHE_TTL: Duration = Duration::from_secs(300);

struct CacheEntry {
    asset: AssetRecord,
    inserted_at: Instant,
}

pub struct AssetCache {
    cache: Mutex<LruCache<u64, CacheEntry>>,
    ttl: Duration,
}

impl AssetCache {
    /// Create a cache holding at most `capacity` assets for `ttl` each.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
            ttl,
        }
    }

    /// Returns `None` if not cached or expired.
    pub fn get(&self, asset_id: u64) -> Option<AssetRecord> {
        let mut cache = self.cache.lock().ok()?;
        if let Some(entry) = cache.get(&asset_id) {
            if entry.inserted_at.elapsed() < self.ttl {
                return Some(entry.asset.clone());
            }
            cache.pop(&asset_id);
        }
        None
    }

    pub fn put(&self, asset: AssetRecord) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(
                asset.id,
                CacheEntry {
                    asset: AssetRecord { amount: 0, ..asset },
                    inserted_at: Instant::now(),
                },
            );
        }
    }

    pub fn invalidate(&self, asset_id: u64) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.pop(&asset_id);
        }
    }
}

impl Default for AssetCache {
    fn default() -> Self {
        Self::new(DEFAULT_ASSET_CACHE_CAPACITY, DEFAULT_ASSET_CACHE_TTL)
    }
}
