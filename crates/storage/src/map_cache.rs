//! In-memory cache for issued map tile credentials.
//!
//! Issuing a tile credential is a round-trip to the imagery backend, so the
//! credential for each (field, layer) pair is kept for a fixed time-to-live.
//!
//! ## Expiry
//!
//! Expiry is lazy: there is no background sweep. An entry whose age has
//! reached the TTL is removed by the next `get` for that exact key, which
//! then reports a miss. `put` always overwrites with a fresh timestamp.
//!
//! ## Concurrency
//!
//! The map sits behind an `RwLock` for memory safety only. There is no
//! single-flight: two requests that both miss will both issue credentials
//! and the last `put` wins. Any valid credential renders the same tiles.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use field_common::MapLayer;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

/// Credentials are reused for one hour.
pub const DEFAULT_MAP_CACHE_TTL: Duration = Duration::from_secs(3600);

/// A cached tile credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapCacheEntry {
    pub field_id: String,
    pub layer: MapLayer,
    pub map_id: String,
    pub token: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Capability used by the tile service; swap in a shared store without
/// touching the analytics code.
#[async_trait]
pub trait MapCredentialCache: Send + Sync {
    /// Entry for the key if present and younger than the TTL.
    ///
    /// A stale entry is removed and reported as absent.
    async fn get(&self, field_id: &str, layer: MapLayer) -> Option<MapCacheEntry>;

    /// Store a credential, replacing any existing entry for the key.
    async fn put(
        &self,
        field_id: &str,
        layer: MapLayer,
        map_id: String,
        token: Option<String>,
    ) -> MapCacheEntry;

    /// Remove the entry if it has reached the TTL. Returns true if removed.
    async fn evict_if_stale(&self, field_id: &str, layer: MapLayer) -> bool;
}

struct CachedCredential {
    entry: MapCacheEntry,
    inserted_at: Instant,
}

impl CachedCredential {
    fn is_stale(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() >= ttl
    }
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
    writes: AtomicU64,
}

/// Point-in-time cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MapCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expired: u64,
    pub writes: u64,
    pub entry_count: u64,
}

impl MapCacheStats {
    /// Cache hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Process-wide in-memory credential cache.
pub struct MemoryMapCache {
    entries: RwLock<HashMap<(String, MapLayer), CachedCredential>>,
    ttl: Duration,
    counters: Counters,
}

impl Default for MemoryMapCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMapCache {
    /// Cache with the default one-hour TTL.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_MAP_CACHE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            counters: Counters::default(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored entries, stale ones included until they are read.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Get current statistics.
    pub async fn stats(&self) -> MapCacheStats {
        MapCacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            expired: self.counters.expired.load(Ordering::Relaxed),
            writes: self.counters.writes.load(Ordering::Relaxed),
            entry_count: self.len().await as u64,
        }
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[async_trait]
impl MapCredentialCache for MemoryMapCache {
    async fn get(&self, field_id: &str, layer: MapLayer) -> Option<MapCacheEntry> {
        let key = (field_id.to_string(), layer);
        let mut entries = self.entries.write().await;

        match entries.get(&key) {
            Some(cached) if cached.is_stale(self.ttl) => {
                entries.remove(&key);
                self.counters.expired.fetch_add(1, Ordering::Relaxed);
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                debug!(field_id, layer = %layer, "Map credential expired");
                None
            }
            Some(cached) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                Some(cached.entry.clone())
            }
            None => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    async fn put(
        &self,
        field_id: &str,
        layer: MapLayer,
        map_id: String,
        token: Option<String>,
    ) -> MapCacheEntry {
        let entry = MapCacheEntry {
            field_id: field_id.to_string(),
            layer,
            map_id,
            token,
            created_at: Utc::now(),
        };

        let cached = CachedCredential {
            entry: entry.clone(),
            inserted_at: Instant::now(),
        };

        self.entries
            .write()
            .await
            .insert((field_id.to_string(), layer), cached);
        self.counters.writes.fetch_add(1, Ordering::Relaxed);

        entry
    }

    async fn evict_if_stale(&self, field_id: &str, layer: MapLayer) -> bool {
        let key = (field_id.to_string(), layer);
        let mut entries = self.entries.write().await;

        let stale = entries
            .get(&key)
            .map(|cached| cached.is_stale(self.ttl))
            .unwrap_or(false);
        if stale {
            entries.remove(&key);
            self.counters.expired.fetch_add(1, Ordering::Relaxed);
        }
        stale
    }
}
