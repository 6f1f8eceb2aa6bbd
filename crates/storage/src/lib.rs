//! Storage abstractions for the field analytics services.
//!
//! Provides the map credential cache: a time-bounded store of tile
//! credentials keyed by (field identifier, map layer).

pub mod map_cache;

pub use map_cache::{
    MapCacheEntry, MapCacheStats, MapCredentialCache, MemoryMapCache, DEFAULT_MAP_CACHE_TTL,
};
