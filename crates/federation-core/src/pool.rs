//! Pool of reusable JSON object maps for decoding.
//!
//! Every resolution decodes the inbound document into one [`RawMap`]. Maps
//! are recycled through [`MapPool`] so the steady state does not allocate a
//! fresh hash table per request.
//!
//! [`MapPool::acquire`] hands out a [`PooledMap`] guard. Dropping the guard is
//! the only way a map goes back, so a map can never be read after release
//! and is never shared by two live resolutions.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use serde::de::{DeserializeSeed, Deserializer, MapAccess, Visitor};
use serde_json::Value;

/// A decoded JSON object: string keys to arbitrary JSON values.
pub type RawMap = serde_json::Map<String, Value>;

/// Maps with more entries than this are dropped instead of pooled.
pub const MAX_POOLED_ENTRIES: usize = u8::MAX as usize;

/// Default upper bound on idle maps kept by a pool.
pub const DEFAULT_MAX_IDLE: usize = 256;

/// Snapshot of pool counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Maps currently waiting in the pool.
    pub idle: usize,
    /// Maps created because the pool was empty.
    pub allocated: usize,
    /// Acquisitions served from the pool.
    pub reused: usize,
    /// Released maps that were dropped (oversized or pool full).
    pub discarded: usize,
}

/// Thread-safe pool of [`RawMap`]s.
pub struct MapPool {
    idle: Mutex<Vec<RawMap>>,
    max_idle: usize,
    allocated: AtomicUsize,
    reused: AtomicUsize,
    discarded: AtomicUsize,
}

impl Default for MapPool {
    fn default() -> Self {
        Self::with_max_idle(DEFAULT_MAX_IDLE)
    }
}

impl fmt::Debug for MapPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapPool")
            .field("max_idle", &self.max_idle)
            .field("stats", &self.stats())
            .finish()
    }
}

impl MapPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pool that keeps at most `max_idle` maps around.
    pub fn with_max_idle(max_idle: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            max_idle,
            allocated: AtomicUsize::new(0),
            reused: AtomicUsize::new(0),
            discarded: AtomicUsize::new(0),
        }
    }

    /// Take an empty map, recycled if one is idle.
    pub fn acquire(&self) -> PooledMap<'_> {
        let recycled = self
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();

        let map = match recycled {
            Some(map) => {
                self.reused.fetch_add(1, Ordering::Relaxed);
                map
            }
            None => {
                self.allocated.fetch_add(1, Ordering::Relaxed);
                RawMap::new()
            }
        };
        debug_assert!(map.is_empty());

        PooledMap { pool: self, map }
    }

    /// Clear `map` and return it to the pool.
    ///
    /// Maps above [`MAX_POOLED_ENTRIES`] entries, or arriving while the pool
    /// already holds `max_idle` maps, are dropped.
    pub fn release(&self, mut map: RawMap) {
        if map.len() > MAX_POOLED_ENTRIES {
            self.discarded.fetch_add(1, Ordering::Relaxed);
            return;
        }
        map.clear();

        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        if idle.len() >= self.max_idle {
            drop(idle);
            self.discarded.fetch_add(1, Ordering::Relaxed);
            return;
        }
        idle.push(map);
    }

    /// Number of maps waiting in the pool.
    pub fn idle(&self) -> usize {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            idle: self.idle(),
            allocated: self.allocated.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}

/// A map on loan from a [`MapPool`]; released on drop.
pub struct PooledMap<'a> {
    pool: &'a MapPool,
    map: RawMap,
}

impl PooledMap<'_> {
    /// Decode a JSON object from `bytes` straight into this map.
    ///
    /// Fails on malformed JSON, on a top-level value that is not an object,
    /// and on trailing data after the object.
    pub fn decode_from_slice(&mut self, bytes: &[u8]) -> serde_json::Result<()> {
        let mut de = serde_json::Deserializer::from_slice(bytes);
        MapSeed(&mut self.map).deserialize(&mut de)?;
        de.end()
    }
}

impl Deref for PooledMap<'_> {
    type Target = RawMap;

    fn deref(&self) -> &RawMap {
        &self.map
    }
}

impl DerefMut for PooledMap<'_> {
    fn deref_mut(&mut self) -> &mut RawMap {
        &mut self.map
    }
}

impl Drop for PooledMap<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.map));
    }
}

impl fmt::Debug for PooledMap<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.map, f)
    }
}

/// Fills an existing map instead of building a new one.
struct MapSeed<'m>(&'m mut RawMap);

impl<'de> DeserializeSeed<'de> for MapSeed<'_> {
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> Result<(), D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for MapSeed<'_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A>(self, mut access: A) -> Result<(), A::Error>
    where
        A: MapAccess<'de>,
    {
        while let Some((key, value)) = access.next_entry::<String, Value>()? {
            self.0.insert(key, value);
        }
        Ok(())
    }
}
