//! In-memory single-flight cache for decoded rasters.
//!
//! Each [`RasterKey`] maps to one entry that is either a decode in flight
//! (shared by every caller that asks for the key while it runs) or a ready
//! raster. A failed decode removes its entry so the next request retries.
//!
//! ## Generations
//!
//! [`RasterCache::clear`] drops every entry and bumps the cache generation.
//! Decodes that were already running still finish and are returned to the
//! callers awaiting them, but their results carry the old generation and
//! are never inserted into the cleared cache.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use overlay_common::{OverlayResult, Raster, RasterKey};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

type SharedDecode = Shared<BoxFuture<'static, OverlayResult<Arc<Raster>>>>;

enum CacheEntry {
    /// Decode in flight, tagged with the generation and flight that started it.
    Pending {
        generation: u64,
        flight: u64,
        decode: SharedDecode,
    },
    Ready(Arc<Raster>),
}

/// Observable state of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Pending,
    Ready,
}

struct CacheState {
    generation: u64,
    next_flight: u64,
    entries: HashMap<RasterKey, CacheEntry>,
}

/// What a lookup under the write lock found.
enum Lookup {
    Ready(Arc<Raster>),
    InFlight {
        generation: u64,
        flight: u64,
        decode: SharedDecode,
    },
    Finished(OverlayResult<Arc<Raster>>),
    Missing,
}

/// Statistics for the raster cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RasterCacheStats {
    /// Requests answered from a ready entry.
    pub hits: u64,
    /// Requests that started a decode.
    pub misses: u64,
    /// Requests that joined a decode already in flight.
    pub coalesced: u64,
    /// Decodes that failed (entry dropped).
    pub failures: u64,
    /// Decode results dropped because the cache was cleared while they ran,
    /// counted per waiting caller.
    pub stale_discards: u64,
    /// Current number of entries (pending + ready).
    pub entries: usize,
    /// Current generation.
    pub generation: u64,
}

impl RasterCacheStats {
    /// Fraction of requests that did not start a decode (0.0 - 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.coalesced + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits + self.coalesced) as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
    failures: AtomicU64,
    stale_discards: AtomicU64,
}

/// Keyed, single-flight store of decoded rasters.
///
/// Construct one per data source and share it (e.g. behind an `Arc`);
/// there is no global instance.
pub struct RasterCache {
    state: RwLock<CacheState>,
    counters: Counters,
}

impl RasterCache {
    /// Create an empty cache at generation 0.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(CacheState {
                generation: 0,
                next_flight: 0,
                entries: HashMap::new(),
            }),
            counters: Counters::default(),
        }
    }

    /// Get the raster for `key`, decoding it with `loader` if needed.
    ///
    /// At most one decode per key is in flight: concurrent callers await the
    /// same future, and `loader` is only invoked by the caller that starts
    /// it. Successful results are memoized until [`RasterCache::clear`];
    /// failures are returned to every waiter and then forgotten.
    pub async fn get<F, Fut>(&self, key: RasterKey, loader: F) -> OverlayResult<Arc<Raster>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = OverlayResult<Raster>> + Send + 'static,
    {
        if let Some(raster) = self.peek(&key).await {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            debug!(%key, "Raster cache hit");
            return Ok(raster);
        }

        let (generation, flight, decode) = {
            let mut state = self.state.write().await;
            let generation = state.generation;

            let lookup = match state.entries.get(&key) {
                Some(CacheEntry::Ready(raster)) => Lookup::Ready(Arc::clone(raster)),
                Some(CacheEntry::Pending {
                    generation: started,
                    flight,
                    decode,
                }) => match decode.peek() {
                    // Finished, but every waiter went away before settling it
                    Some(outcome) => Lookup::Finished(outcome.clone()),
                    None => Lookup::InFlight {
                        generation: *started,
                        flight: *flight,
                        decode: decode.clone(),
                    },
                },
                None => Lookup::Missing,
            };

            match lookup {
                Lookup::Ready(raster) | Lookup::Finished(Ok(raster)) => {
                    state
                        .entries
                        .insert(key, CacheEntry::Ready(Arc::clone(&raster)));
                    self.counters.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(%key, "Raster cache hit");
                    return Ok(raster);
                }
                // A waiter settles against the generation its flight started in
                Lookup::InFlight {
                    generation,
                    flight,
                    decode,
                } => {
                    self.counters.coalesced.fetch_add(1, Ordering::Relaxed);
                    debug!(%key, generation, flight, "Joining raster decode in flight");
                    (generation, flight, decode)
                }
                Lookup::Finished(Err(_)) | Lookup::Missing => {
                    let flight = state.next_flight;
                    state.next_flight += 1;

                    let decode = loader()
                        .map(|outcome| outcome.map(Arc::new))
                        .boxed()
                        .shared();
                    state.entries.insert(
                        key,
                        CacheEntry::Pending {
                            generation,
                            flight,
                            decode: decode.clone(),
                        },
                    );
                    self.counters.misses.fetch_add(1, Ordering::Relaxed);
                    debug!(%key, generation, flight, "Raster cache miss, starting decode");
                    (generation, flight, decode)
                }
            }
        };

        let outcome = decode.await;
        self.settle(key, generation, flight, &outcome).await;
        outcome
    }

    /// Move a finished flight to its final state.
    ///
    /// Every waiter calls this; only the first one for a flight changes the
    /// map, and nothing is written if the cache was cleared meanwhile.
    async fn settle(
        &self,
        key: RasterKey,
        generation: u64,
        flight: u64,
        outcome: &OverlayResult<Arc<Raster>>,
    ) {
        let mut state = self.state.write().await;

        if state.generation != generation {
            self.counters.stale_discards.fetch_add(1, Ordering::Relaxed);
            debug!(
                %key,
                generation,
                current_generation = state.generation,
                "Discarding raster decoded for a cleared generation"
            );
            return;
        }

        let ours = matches!(
            state.entries.get(&key),
            Some(CacheEntry::Pending { flight: f, .. }) if *f == flight
        );
        if !ours {
            return;
        }

        match outcome {
            Ok(raster) => {
                debug!(
                    %key,
                    width = raster.width(),
                    height = raster.height(),
                    lane = raster.pixels().lane(),
                    "Raster decoded and cached"
                );
                state.entries.insert(key, CacheEntry::Ready(Arc::clone(raster)));
            }
            Err(err) => {
                state.entries.remove(&key);
                self.counters.failures.fetch_add(1, Ordering::Relaxed);
                warn!(%key, error = %err, "Raster decode failed, entry dropped");
            }
        }
    }

    /// The ready raster for `key`, without starting a decode.
    pub async fn peek(&self, key: &RasterKey) -> Option<Arc<Raster>> {
        match self.state.read().await.entries.get(key) {
            Some(CacheEntry::Ready(raster)) => Some(Arc::clone(raster)),
            _ => None,
        }
    }

    /// State of the entry for `key`, if any.
    pub async fn state(&self, key: &RasterKey) -> Option<EntryState> {
        self.state
            .read()
            .await
            .entries
            .get(key)
            .map(|entry| match entry {
                CacheEntry::Pending { .. } => EntryState::Pending,
                CacheEntry::Ready(_) => EntryState::Ready,
            })
    }

    /// Drop every entry and start a new generation.
    ///
    /// Returns the number of entries dropped.
    pub async fn clear(&self) -> usize {
        let mut state = self.state.write().await;
        let dropped = state.entries.len();
        state.entries.clear();
        state.generation += 1;
        info!(dropped, generation = state.generation, "Raster cache cleared");
        dropped
    }

    /// Current generation (starts at 0, bumped by every clear).
    pub async fn generation(&self) -> u64 {
        self.state.read().await.generation
    }

    /// Get current number of entries (pending and ready).
    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    /// Check if cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }

    /// Get current cache statistics.
    pub async fn stats(&self) -> RasterCacheStats {
        let state = self.state.read().await;
        RasterCacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            coalesced: self.counters.coalesced.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
            stale_discards: self.counters.stale_discards.load(Ordering::Relaxed),
            entries: state.entries.len(),
            generation: state.generation,
        }
    }
}

impl Default for RasterCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overlay_common::OverlayError;
    use std::sync::atomic::AtomicUsize;
    use test_utils::berlin_3x3;

    fn key(month: u32) -> RasterKey {
        RasterKey::new(2020, month).unwrap()
    }

    #[tokio::test]
    async fn test_cache_hit_miss() {
        let cache = RasterCache::new();
        let loads = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let loads = loads.clone();
            let raster = cache
                .get(key(3), move || async move {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok(berlin_3x3())
                })
                .await
                .unwrap();
            assert_eq!(raster.value(1, 1), Some(50.0));
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        let stats = cache.stats().await;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.entries, 1);
        assert_eq!(cache.state(&key(3)).await, Some(EntryState::Ready));
    }

    #[tokio::test]
    async fn test_failure_not_memoized() {
        let cache = RasterCache::new();

        let err = cache
            .get(key(4), || async {
                Err(OverlayError::decode_failure(key(4), "connection reset"))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, OverlayError::DecodeFailure { .. }));
        assert!(cache.is_empty().await);

        let raster = cache.get(key(4), || async { Ok(berlin_3x3()) }).await;
        assert!(raster.is_ok());
        assert_eq!(cache.stats().await.failures, 1);
    }

    #[tokio::test]
    async fn test_clear_bumps_generation() {
        let cache = RasterCache::new();
        cache.get(key(1), || async { Ok(berlin_3x3()) }).await.unwrap();
        cache.get(key(2), || async { Ok(berlin_3x3()) }).await.unwrap();

        assert_eq!(cache.clear().await, 2);
        assert_eq!(cache.generation().await, 1);
        assert!(cache.is_empty().await);
        assert!(cache.peek(&key(1)).await.is_none());
    }

    #[tokio::test]
    async fn test_joined_flight_settles_in_its_own_generation() {
        let cache = RasterCache::new();
        let (release, gate) = tokio::sync::oneshot::channel::<()>();

        let first = cache.get(key(6), move || async move {
            let _ = gate.await;
            Ok(berlin_3x3())
        });
        let second = async {
            tokio::task::yield_now().await;
            assert_eq!(cache.state(&key(6)).await, Some(EntryState::Pending));
            cache
                .get(key(6), || async {
                    Err(OverlayError::Decode("joined caller started a decode".into()))
                })
                .await
        };
        let opener = async {
            while cache.stats().await.coalesced == 0 {
                tokio::task::yield_now().await;
            }
            let _ = release.send(());
        };

        let (a, b, ()) = tokio::join!(first, second, opener);
        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));

        let stats = cache.stats().await;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.coalesced, 1);
        assert_eq!(stats.stale_discards, 0);
        assert_eq!(cache.state(&key(6)).await, Some(EntryState::Ready));
    }

    #[test]
    fn test_stats_hit_rate() {
        let mut stats = RasterCacheStats::default();
        assert!((stats.hit_rate() - 0.0).abs() < f64::EPSILON);

        stats.hits = 6;
        stats.coalesced = 2;
        stats.misses = 2;
        assert!((stats.hit_rate() - 0.8).abs() < f64::EPSILON);
    }
}
