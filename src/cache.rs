// src/cache.rs
//
// Shared memo of ledger reads and derived series/forecasts. Every entry is
// dropped by `invalidate`, which the write handlers call after each mutation.

use crate::domain::sale::{PropertyType, SaleRecord};
use crate::forecast::{AggregatedSeries, ForecastPoint, Granularity};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};

/// Identifies an aggregated series: filters plus granularity.
/// Filter sets are stored sorted so equal sets give equal keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    property_types: Option<Vec<PropertyType>>,
    bedrooms: Option<Vec<u32>>,
    granularity: Granularity,
}

impl SeriesKey {
    pub fn new(
        property_types: Option<&HashSet<PropertyType>>,
        bedrooms: Option<&HashSet<u32>>,
        granularity: Granularity,
    ) -> Self {
        Self {
            property_types: property_types.map(sorted),
            bedrooms: bedrooms.map(sorted),
            granularity,
        }
    }
}

fn sorted<T: Ord + Copy>(set: &HashSet<T>) -> Vec<T> {
    let mut values: Vec<T> = set.iter().copied().collect();
    values.sort();
    values
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForecastKey {
    pub series: SeriesKey,
    pub horizon: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
    pub evictions: u64,
}

/// Entries kept per map by default. Keys come from query strings, so both
/// derived maps are capped.
pub const DEFAULT_CAPACITY: usize = 64;

/// A forecast together with the series it was fitted on.
pub type CachedForecast = (Arc<AggregatedSeries>, Arc<Vec<ForecastPoint>>);

/// Map that drops its least recently used entry once `capacity` is reached.
struct Bounded<K, V> {
    entries: HashMap<K, (V, u64)>,
    clock: u64,
    capacity: usize,
}

impl<K: Eq + Hash + Clone, V: Clone> Bounded<K, V> {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            clock: 0,
            capacity: capacity.max(1),
        }
    }

    fn get(&mut self, key: &K) -> Option<V> {
        self.clock += 1;
        let clock = self.clock;
        self.entries.get_mut(key).map(|(value, used)| {
            *used = clock;
            value.clone()
        })
    }

    /// Returns true when an older entry had to make room.
    fn insert(&mut self, key: K, value: V) -> bool {
        self.clock += 1;
        let mut evicted = false;
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, (_, used))| *used)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                self.entries.remove(&oldest);
                evicted = true;
            }
        }
        self.entries.insert(key, (value, self.clock));
        evicted
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

struct CacheInner {
    /// Bumped by every invalidation; results computed under an older
    /// generation are not stored.
    generation: u64,
    sales: Option<Arc<Vec<SaleRecord>>>,
    series: Bounded<SeriesKey, Arc<AggregatedSeries>>,
    forecasts: Bounded<ForecastKey, CachedForecast>,
    stats: CacheStats,
}

pub struct QueryCache {
    inner: Mutex<CacheInner>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps at most `capacity` series and `capacity` forecasts.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                generation: 0,
                sales: None,
                series: Bounded::new(capacity),
                forecasts: Bounded::new(capacity),
                stats: CacheStats::default(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        // Entries are plain values; a panic elsewhere cannot leave them half-written.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// All ledger rows, loaded once per generation. The lock is not held while
    /// `load` runs.
    pub fn sales_or_load<E, F>(&self, load: F) -> Result<Arc<Vec<SaleRecord>>, E>
    where
        F: FnOnce() -> Result<Vec<SaleRecord>, E>,
    {
        let generation = {
            let mut inner = self.lock();
            if let Some(sales) = inner.sales.clone() {
                inner.stats.hits += 1;
                return Ok(sales);
            }
            inner.stats.misses += 1;
            inner.generation
        };

        let sales = Arc::new(load()?);

        let mut inner = self.lock();
        if inner.generation == generation {
            inner.sales = Some(Arc::clone(&sales));
        }
        Ok(sales)
    }

    pub fn series_or_compute<E, F>(&self, key: &SeriesKey, compute: F) -> Result<Arc<AggregatedSeries>, E>
    where
        F: FnOnce() -> Result<AggregatedSeries, E>,
    {
        let generation = {
            let mut inner = self.lock();
            if let Some(series) = inner.series.get(key) {
                inner.stats.hits += 1;
                return Ok(series);
            }
            inner.stats.misses += 1;
            inner.generation
        };

        let series = Arc::new(compute()?);

        let mut inner = self.lock();
        if inner.generation == generation && inner.series.insert(key.clone(), Arc::clone(&series)) {
            inner.stats.evictions += 1;
        }
        Ok(series)
    }

    /// Forecast for `key` along with the series it was fitted on.
    ///
    /// On a miss the generation is taken before `load_series` runs, so a write
    /// landing between reading the series and fitting it keeps the result out
    /// of the cache.
    pub fn forecast_or_compute<E, S, F>(&self, key: &ForecastKey, load_series: S, fit: F) -> Result<CachedForecast, E>
    where
        S: FnOnce() -> Result<Arc<AggregatedSeries>, E>,
        F: FnOnce(&AggregatedSeries) -> Result<Vec<ForecastPoint>, E>,
    {
        let generation = {
            let mut inner = self.lock();
            if let Some(cached) = inner.forecasts.get(key) {
                inner.stats.hits += 1;
                return Ok(cached);
            }
            inner.stats.misses += 1;
            inner.generation
        };

        let series = load_series()?;
        let points = Arc::new(fit(&series)?);

        let mut inner = self.lock();
        if inner.generation == generation
            && inner
                .forecasts
                .insert(key.clone(), (Arc::clone(&series), Arc::clone(&points)))
        {
            inner.stats.evictions += 1;
        }
        Ok((series, points))
    }

    /// Drops every cached entry. Call after any write to the ledger or users.
    pub fn invalidate(&self) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.sales = None;
        inner.series.clear();
        inner.forecasts.clear();
        inner.stats.invalidations += 1;
        log::debug!("query cache invalidated (generation {})", inner.generation);
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }

    /// Number of cached series and forecasts.
    pub fn entry_counts(&self) -> (usize, usize) {
        let inner = self.lock();
        (inner.series.len(), inner.forecasts.len())
    }
}
