// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agora

//! Keyed request cache.
//!
//! Each key holds at most one cached value. Concurrent callers for the same
//! key share a single in-flight fetch; a fetch that was superseded (by an
//! invalidation or a forced refetch) still answers its own caller but never
//! overwrites the cache.

use crate::api::ApiError;
use log::{debug, warn};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    ParkingLots,
    ParkingLotDetail(i64),
    ProjectByParkingLot(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryScope {
    ParkingLots,
    Projects,
}

impl QueryKey {
    pub fn scope(&self) -> QueryScope {
        match self {
            QueryKey::ParkingLots | QueryKey::ParkingLotDetail(_) => QueryScope::ParkingLots,
            QueryKey::ProjectByParkingLot(_) => QueryScope::Projects,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::ParkingLots => write!(f, "parking-lots/list"),
            QueryKey::ParkingLotDetail(id) => write!(f, "parking-lots/detail/{}", id),
            QueryKey::ProjectByParkingLot(id) => write!(f, "projects/by-parking-lot/{}", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// How long a fetched value is served without refetching.
    #[serde(with = "secs")]
    pub stale_time: Duration,
    /// Extra attempts for retryable failures.
    pub retries: u32,
    #[serde(with = "secs")]
    pub retry_delay: Duration,
    pub capacity: usize,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(60),
            retries: 2,
            retry_delay: Duration::from_millis(500),
            capacity: 256,
        }
    }
}

mod secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

struct Slot<V> {
    value: Option<Arc<V>>,
    fetched_at: Option<Instant>,
    stale: bool,
    /// Reassigned from the cache-wide counter for every fetch issued and
    /// every invalidation, so an evicted key never hands out a number twice.
    generation: u64,
    in_flight: Option<u64>,
}

impl<V> Slot<V> {
    fn new() -> Self {
        Self {
            value: None,
            fetched_at: None,
            stale: false,
            generation: 0,
            in_flight: None,
        }
    }

    fn fresh_value(&self, stale_time: Duration) -> Option<Arc<V>> {
        if self.stale {
            return None;
        }
        let fetched_at = self.fetched_at?;
        if fetched_at.elapsed() > stale_time {
            return None;
        }
        self.value.clone()
    }
}

enum Step<V> {
    Hit(Arc<V>),
    Wait,
    Fetch(u64),
}

pub struct QueryCache<V> {
    slots: Mutex<LruCache<QueryKey, Slot<V>>>,
    settled: Condvar,
    generations: AtomicU64,
    options: QueryOptions,
}

/// Releases the in-flight claim on a key when a fetch ends, including by
/// panic, so waiters are never left blocked.
struct InFlight<'a, V> {
    cache: &'a QueryCache<V>,
    key: QueryKey,
    generation: u64,
}

impl<V> Drop for InFlight<'_, V> {
    fn drop(&mut self) {
        let mut slots = self.cache.lock();
        if let Some(slot) = slots.peek_mut(&self.key) {
            if slot.in_flight == Some(self.generation) {
                slot.in_flight = None;
            }
        }
        drop(slots);
        self.cache.settled.notify_all();
    }
}

impl<V> QueryCache<V> {
    pub fn new(options: QueryOptions) -> Self {
        let capacity = NonZeroUsize::new(options.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            slots: Mutex::new(LruCache::new(capacity)),
            settled: Condvar::new(),
            generations: AtomicU64::new(0),
            options,
        }
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<QueryKey, Slot<V>>> {
        // Fetchers run outside the lock.
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Cached value for `key`, stale or not, without fetching.
    pub fn get(&self, key: &QueryKey) -> Option<Arc<V>> {
        self.lock().peek(key).and_then(|slot| slot.value.clone())
    }

    pub fn is_fresh(&self, key: &QueryKey) -> bool {
        self.lock()
            .peek(key)
            .and_then(|slot| slot.fresh_value(self.options.stale_time))
            .is_some()
    }

    /// Returns the cached value when fresh, otherwise runs `fetcher` (or waits
    /// for an identical request already in flight).
    pub fn fetch<F>(&self, key: QueryKey, mut fetcher: F) -> Result<Arc<V>, ApiError>
    where
        F: FnMut() -> Result<V, ApiError>,
    {
        let generation = {
            let mut slots = self.lock();
            loop {
                match self.step(&mut slots, key) {
                    Step::Hit(value) => {
                        debug!("Query cache hit — key={}", key);
                        return Ok(value);
                    }
                    Step::Wait => {
                        debug!("Query in flight, waiting — key={}", key);
                        slots = self
                            .settled
                            .wait(slots)
                            .unwrap_or_else(|poisoned| poisoned.into_inner());
                    }
                    Step::Fetch(generation) => break generation,
                }
            }
        };

        self.run(key, generation, &mut fetcher)
    }

    /// Fetches `key` even if a fresh value is cached; supersedes any request
    /// already in flight for it.
    pub fn refetch<F>(&self, key: QueryKey, mut fetcher: F) -> Result<Arc<V>, ApiError>
    where
        F: FnMut() -> Result<V, ApiError>,
    {
        let generation = {
            let mut slots = self.lock();
            let generation = self.next_generation();
            let slot = slots.get_or_insert_mut(key, Slot::new);
            slot.generation = generation;
            slot.in_flight = Some(generation);
            generation
        };
        self.run(key, generation, &mut fetcher)
    }

    /// Marks `key` stale; the next `fetch` goes to the network and any
    /// request already in flight will not be stored.
    pub fn invalidate(&self, key: &QueryKey) {
        let mut slots = self.lock();
        if let Some(slot) = slots.peek_mut(key) {
            slot.stale = true;
            slot.generation = self.next_generation();
            slot.in_flight = None;
            debug!("Query invalidated — key={}", key);
        }
        drop(slots);
        self.settled.notify_all();
    }

    pub fn invalidate_scope(&self, scope: QueryScope) {
        let mut slots = self.lock();
        let mut count = 0usize;
        for (key, slot) in slots.iter_mut() {
            if key.scope() == scope {
                slot.stale = true;
                slot.generation = self.next_generation();
                slot.in_flight = None;
                count += 1;
            }
        }
        drop(slots);
        debug!("Query scope invalidated — scope={:?} entries={}", scope, count);
        self.settled.notify_all();
    }

    pub fn clear(&self) {
        self.lock().clear();
        self.settled.notify_all();
    }

    fn step(&self, slots: &mut LruCache<QueryKey, Slot<V>>, key: QueryKey) -> Step<V> {
        let slot = slots.get_or_insert_mut(key, Slot::new);
        if let Some(value) = slot.fresh_value(self.options.stale_time) {
            return Step::Hit(value);
        }
        if slot.in_flight.is_some() {
            return Step::Wait;
        }
        let generation = self.next_generation();
        slot.generation = generation;
        slot.in_flight = Some(generation);
        Step::Fetch(generation)
    }

    fn run<F>(&self, key: QueryKey, generation: u64, fetcher: &mut F) -> Result<Arc<V>, ApiError>
    where
        F: FnMut() -> Result<V, ApiError>,
    {
        let claim = InFlight {
            cache: self,
            key,
            generation,
        };
        let value = Arc::new(self.fetch_with_retry(key, fetcher)?);

        let mut slots = self.lock();
        match slots.peek_mut(&key) {
            Some(slot) if slot.generation == generation => {
                slot.value = Some(Arc::clone(&value));
                slot.fetched_at = Some(Instant::now());
                slot.stale = false;
                slot.in_flight = None;
            }
            _ => debug!(
                "Discarding superseded query result — key={} generation={}",
                key, generation
            ),
        }
        drop(slots);
        drop(claim);
        Ok(value)
    }

    fn fetch_with_retry<F>(&self, key: QueryKey, fetcher: &mut F) -> Result<V, ApiError>
    where
        F: FnMut() -> Result<V, ApiError>,
    {
        let mut attempt = 0u32;
        loop {
            match fetcher() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.options.retries => {
                    attempt += 1;
                    let delay = self.options.retry_delay * attempt;
                    warn!(
                        "Query failed, retrying — key={} attempt={} delay_ms={} error={}",
                        key,
                        attempt,
                        delay.as_millis(),
                        err
                    );
                    std::thread::sleep(delay);
                }
                Err(err) => return Err(err),
            }
        }
    }
}
