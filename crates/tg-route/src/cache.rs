//! Trip cache: keys, the `TripCache` trait, the in-memory backend and the
//! cache-then-fetch wrapper.
//!
//! # Keys
//!
//! Clicks land on cell centres, but hosts may also pass raw coordinates, so
//! keys quantize both endpoints to 5 decimal places (about 1 m) and the
//! departure to its bucket start:
//!
//! ```text
//!   (round(lon·1e5), round(lat·1e5)) × 2  +  floor(departure / bucket) · bucket
//! ```
//!
//! # Expiry
//!
//! Every entry records the time it was stored.  Entries older than the
//! retention window are purged lazily: the next read sweeps them out before
//! looking the key up.  All methods take `now` (Unix seconds) explicitly so
//! expiry is deterministic under test.

use std::fmt;

use log::debug;
use rustc_hash::FxHashMap;

use tg_core::{CacheConfig, DepartureTime, LonLat};

use crate::provider::{TravelTimeProvider, TripTimes};
use crate::RouteResult;

// ── CacheKey ──────────────────────────────────────────────────────────────────

/// Fixed-point scale of cached coordinates: 5 decimal places.
pub const COORD_SCALE: f64 = 1e5;

#[inline]
fn quantize(p: LonLat) -> (i64, i64) {
    ((p.lon * COORD_SCALE).round() as i64, (p.lat * COORD_SCALE).round() as i64)
}

/// Deterministic cache key for one origin–destination–departure query.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct CacheKey {
    /// Origin `(lon, lat)` in units of 1e-5°.
    pub origin:       (i64, i64),
    /// Destination `(lon, lat)` in units of 1e-5°.
    pub destination:  (i64, i64),
    /// Unix second the departure bucket starts at.
    pub bucket_start: i64,
}

impl CacheKey {
    pub fn new(origin: LonLat, destination: LonLat, departure: DepartureTime, bucket_secs: u32) -> Self {
        Self {
            origin:       quantize(origin),
            destination:  quantize(destination),
            bucket_start: departure.bucket_start(bucket_secs),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let deg = |v: i64| v as f64 / COORD_SCALE;
        write!(
            f,
            "{:.5},{:.5}->{:.5},{:.5}@{}",
            deg(self.origin.0),
            deg(self.origin.1),
            deg(self.destination.0),
            deg(self.destination.1),
            self.bucket_start
        )
    }
}

// ── TripCache trait ───────────────────────────────────────────────────────────

/// Storage backend for cached trip times.
pub trait TripCache {
    /// Look `key` up, first purging everything that has expired by `now`.
    fn get(&mut self, key: &CacheKey, now: i64) -> RouteResult<Option<TripTimes>>;

    /// Store (or overwrite) `key`, stamped with `now`.
    fn put(&mut self, key: CacheKey, times: &TripTimes, now: i64) -> RouteResult<()>;

    /// Remove every entry stored more than the retention window before `now`.
    /// Returns the number removed.
    fn purge_expired(&mut self, now: i64) -> RouteResult<usize>;
}

/// `true` if an entry stored at `stored_at` is still live at `now`.
#[inline]
pub(crate) fn is_fresh(stored_at: i64, now: i64, retention_secs: u64) -> bool {
    now.saturating_sub(stored_at) <= retention_secs as i64
}

// ── MemoryCache ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct CachedTrip {
    times:     TripTimes,
    stored_at: i64,
}

/// Process-local cache backed by a hash map.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries:        FxHashMap<CacheKey, CachedTrip>,
    retention_secs: u64,
}

impl MemoryCache {
    pub fn new(retention_secs: u64) -> Self {
        Self { entries: FxHashMap::default(), retention_secs }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.retention_secs)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TripCache for MemoryCache {
    fn get(&mut self, key: &CacheKey, now: i64) -> RouteResult<Option<TripTimes>> {
        self.purge_expired(now)?;
        Ok(self.entries.get(key).map(|e| e.times.clone()))
    }

    fn put(&mut self, key: CacheKey, times: &TripTimes, now: i64) -> RouteResult<()> {
        self.entries.insert(key, CachedTrip { times: times.clone(), stored_at: now });
        Ok(())
    }

    fn purge_expired(&mut self, now: i64) -> RouteResult<usize> {
        let before = self.entries.len();
        let retention = self.retention_secs;
        self.entries.retain(|_, e| is_fresh(e.stored_at, now, retention));
        Ok(before - self.entries.len())
    }
}

// ── CachedProvider ────────────────────────────────────────────────────────────

/// Hit / miss counters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits:   u64,
    pub misses: u64,
}

/// Cache-then-fetch wrapper around a [`TravelTimeProvider`].
///
/// Only successful answers are stored; a provider error is returned to the
/// caller and the next identical query asks the provider again.
pub struct CachedProvider<P, C> {
    provider:    P,
    cache:       C,
    bucket_secs: u32,
    stats:       CacheStats,
}

impl<P: TravelTimeProvider, C: TripCache> CachedProvider<P, C> {
    pub fn new(provider: P, cache: C, bucket_secs: u32) -> Self {
        Self { provider, cache, bucket_secs, stats: CacheStats::default() }
    }

    pub fn fetch(
        &mut self,
        origin: LonLat,
        destination: LonLat,
        departure: DepartureTime,
        now: i64,
    ) -> RouteResult<TripTimes> {
        let key = CacheKey::new(origin, destination, departure, self.bucket_secs);
        if let Some(times) = self.cache.get(&key, now)? {
            self.stats.hits += 1;
            debug!("trip cache hit {key}");
            return Ok(times);
        }
        self.stats.misses += 1;
        debug!("trip cache miss {key}");

        // Fetch for the bucket start so every query sharing the key gets the
        // same answer.
        let times = self.provider.fetch(origin, destination, DepartureTime(key.bucket_start))?;
        self.cache.put(key, &times, now)?;
        Ok(times)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut C {
        &mut self.cache
    }
}
