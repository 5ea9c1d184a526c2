//! Bounded, single-flight cache of fetched GEO series.
//!
//! A miss starts one fetch task per dataset id and parks a shared handle to
//! its outcome in the map; every concurrent caller for that id awaits the
//! same handle, success or failure. The task runs to completion even if all
//! callers go away, then either stores the series or removes its slot, so no
//! slot outlives its fetch. Completed entries expire after the configured
//! TTL and the least recently accessed ones are evicted once the cache holds
//! more than `max_entries`.

use crate::config::CacheConfig;
use crate::models::GeoSeries;
use crate::services::geo_client::{DatasetFetcher, FetchError};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use metrics::counter;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

type FetchOutcome = Result<Arc<GeoSeries>, Arc<FetchError>>;
type SharedFetch = Shared<BoxFuture<'static, FetchOutcome>>;

enum Slot {
    InFlight {
        flight: u64,
        fetch: SharedFetch,
    },
    Ready {
        series: Arc<GeoSeries>,
        fetched_at: Instant,
        last_access: Instant,
    },
}

impl Slot {
    fn is_flight(&self, id: u64) -> bool {
        matches!(self, Slot::InFlight { flight, .. } if *flight == id)
    }
}

struct Inner {
    fetcher: Arc<dyn DatasetFetcher>,
    slots: DashMap<String, Slot>,
    max_entries: usize,
    ttl: Duration,
    next_flight: AtomicU64,
}

pub struct DatasetCache {
    inner: Arc<Inner>,
}

impl DatasetCache {
    pub fn new(fetcher: Arc<dyn DatasetFetcher>, config: &CacheConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetcher,
                slots: DashMap::new(),
                max_entries: config.max_entries,
                ttl: config.ttl(),
                next_flight: AtomicU64::new(0),
            }),
        }
    }

    /// Return the cached series for `accession`, fetching it at most once
    /// across concurrent callers when it is missing or expired.
    pub async fn get_or_fetch(&self, accession: &str) -> FetchOutcome {
        let fetch = match self.inner.slots.entry(accession.to_string()) {
            Entry::Occupied(mut occupied) => {
                let joined = match occupied.get_mut() {
                    Slot::Ready {
                        series,
                        fetched_at,
                        last_access,
                    } => {
                        if fetched_at.elapsed() < self.inner.ttl {
                            *last_access = Instant::now();
                            counter!("dataset_cache_hits_total").increment(1);
                            tracing::debug!(accession = %accession, "Dataset cache hit");
                            return Ok(series.clone());
                        }
                        None
                    }
                    Slot::InFlight { fetch, .. } => Some(fetch.clone()),
                };

                match joined {
                    Some(fetch) => {
                        counter!("dataset_cache_misses_total").increment(1);
                        tracing::debug!(accession = %accession, "Joining in-flight dataset fetch");
                        fetch
                    }
                    None => {
                        tracing::debug!(accession = %accession, "Dataset cache entry expired");
                        let (slot, fetch) = self.start_flight(accession);
                        occupied.insert(slot);
                        fetch
                    }
                }
            }
            Entry::Vacant(vacant) => {
                let (slot, fetch) = self.start_flight(accession);
                vacant.insert(slot);
                fetch
            }
        };

        fetch.await
    }

    /// Whether a fresh, fully fetched entry exists for `accession`.
    pub fn contains(&self, accession: &str) -> bool {
        self.inner
            .slots
            .get(accession)
            .map(|slot| match &*slot {
                Slot::Ready { fetched_at, .. } => fetched_at.elapsed() < self.inner.ttl,
                Slot::InFlight { .. } => false,
            })
            .unwrap_or(false)
    }

    /// Number of fully fetched entries, expired ones included.
    pub fn len(&self) -> usize {
        self.inner
            .slots
            .iter()
            .filter(|slot| matches!(slot.value(), Slot::Ready { .. }))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of fetches currently running.
    pub fn in_flight(&self) -> usize {
        self.inner
            .slots
            .iter()
            .filter(|slot| matches!(slot.value(), Slot::InFlight { .. }))
            .count()
    }

    fn start_flight(&self, accession: &str) -> (Slot, SharedFetch) {
        counter!("dataset_cache_misses_total").increment(1);

        let flight = self.inner.next_flight.fetch_add(1, Ordering::Relaxed);
        let task = tokio::spawn(Inner::fetch_and_store(
            self.inner.clone(),
            accession.to_string(),
            flight,
        ));

        let accession = accession.to_string();
        let fetch = async move {
            task.await.unwrap_or_else(|e| {
                Err(Arc::new(FetchError::Interrupted {
                    accession,
                    reason: e.to_string(),
                }))
            })
        }
        .boxed()
        .shared();

        (
            Slot::InFlight {
                flight,
                fetch: fetch.clone(),
            },
            fetch,
        )
    }
}

impl Inner {
    async fn fetch_and_store(self: Arc<Self>, accession: String, flight: u64) -> FetchOutcome {
        counter!("dataset_cache_fetches_total").increment(1);

        match self.fetcher.fetch(&accession).await {
            Ok(series) => {
                let series = Arc::new(series);
                if let Some(mut slot) = self.slots.get_mut(&accession) {
                    if slot.is_flight(flight) {
                        let now = Instant::now();
                        *slot = Slot::Ready {
                            series: series.clone(),
                            fetched_at: now,
                            last_access: now,
                        };
                    }
                }
                self.evict_if_needed();
                Ok(series)
            }
            Err(e) => {
                self.slots
                    .remove_if(&accession, |_, slot| slot.is_flight(flight));
                tracing::warn!(accession = %accession, error = %e, "Dataset fetch failed");
                Err(Arc::new(e))
            }
        }
    }

    fn evict_if_needed(&self) {
        let mut completed: Vec<(String, Instant, bool)> = self
            .slots
            .iter()
            .filter_map(|entry| match entry.value() {
                Slot::Ready {
                    fetched_at,
                    last_access,
                    ..
                } => Some((
                    entry.key().clone(),
                    *last_access,
                    fetched_at.elapsed() >= self.ttl,
                )),
                Slot::InFlight { .. } => None,
            })
            .collect();

        if completed.len() <= self.max_entries {
            return;
        }

        // Expired entries go first, then least recently accessed.
        completed.sort_by_key(|(_, last_access, expired)| (!*expired, *last_access));
        let excess = completed.len() - self.max_entries;

        for (accession, _, _) in completed.into_iter().take(excess) {
            let removed = self
                .slots
                .remove_if(&accession, |_, slot| matches!(slot, Slot::Ready { .. }));
            if removed.is_some() {
                counter!("dataset_cache_evictions_total").increment(1);
                tracing::debug!(accession = %accession, "Evicted dataset from cache");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::soft::SoftParseError;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    struct CountingFetcher {
        calls: AtomicUsize,
        delay: Duration,
    }

    impl CountingFetcher {
        fn new(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                delay,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DatasetFetcher for CountingFetcher {
        async fn fetch(&self, accession: &str) -> Result<GeoSeries, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if accession.starts_with("BAD") {
                return Err(SoftParseError::MissingSeries(accession.to_string()).into());
            }
            Ok(GeoSeries {
                accession: accession.to_string(),
                title: format!("{} title", accession),
                summary: "summary".to_string(),
                platform_id: "GPL570".to_string(),
                sample_ids: vec!["GSM1".to_string()],
            })
        }
    }

    fn cache_with(fetcher: Arc<CountingFetcher>, max_entries: usize, ttl_secs: u64) -> DatasetCache {
        DatasetCache::new(
            fetcher,
            &CacheConfig {
                max_entries,
                ttl_secs,
            },
        )
    }

    async fn wait_for_idle(cache: &DatasetCache) {
        for _ in 0..200 {
            if cache.in_flight() == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("fetches still running: {}", cache.in_flight());
    }

    #[tokio::test]
    async fn second_lookup_is_served_from_cache() {
        let fetcher = CountingFetcher::new(Duration::ZERO);
        let cache = cache_with(fetcher.clone(), 8, 3600);

        let first = cache.get_or_fetch("GSE1").await.unwrap();
        let second = cache.get_or_fetch("GSE1").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(fetcher.calls(), 1);
        assert!(cache.contains("GSE1"));
    }

    #[tokio::test]
    async fn concurrent_lookups_share_one_fetch() {
        let fetcher = CountingFetcher::new(Duration::from_millis(100));
        let cache = cache_with(fetcher.clone(), 8, 3600);

        let (a, b) = tokio::join!(cache.get_or_fetch("GSE999"), cache.get_or_fetch("GSE999"));

        assert_eq!(a.unwrap().title, "GSE999 title");
        assert_eq!(b.unwrap().title, "GSE999 title");
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn concurrent_lookups_share_one_failure() {
        let fetcher = CountingFetcher::new(Duration::from_millis(300));
        let cache = cache_with(fetcher.clone(), 8, 3600);

        let start = Instant::now();
        let results = futures::future::join_all((0..4).map(|_| cache.get_or_fetch("BAD1"))).await;

        assert!(results.iter().all(|r| r.is_err()));
        assert_eq!(fetcher.calls(), 1);
        assert!(start.elapsed() < Duration::from_millis(900));
        assert_eq!(cache.in_flight(), 0);
        assert!(!cache.contains("BAD1"));
    }

    #[tokio::test]
    async fn failed_fetch_is_not_cached() {
        let fetcher = CountingFetcher::new(Duration::ZERO);
        let cache = cache_with(fetcher.clone(), 8, 3600);

        assert!(cache.get_or_fetch("BAD1").await.is_err());
        assert!(!cache.contains("BAD1"));
        assert!(cache.is_empty());

        assert!(cache.get_or_fetch("BAD1").await.is_err());
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn abandoned_lookups_leave_no_slots_behind() {
        let fetcher = CountingFetcher::new(Duration::from_millis(200));
        let cache = Arc::new(cache_with(fetcher.clone(), 2, 3600));

        let tasks: Vec<_> = (0..100)
            .map(|i| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    let _ = cache.get_or_fetch(&format!("GSE{}", i)).await;
                })
            })
            .collect();
        tokio::time::sleep(Duration::from_millis(20)).await;
        for task in &tasks {
            task.abort();
        }

        wait_for_idle(&cache).await;

        assert_eq!(fetcher.calls(), 100);
        assert_eq!(cache.in_flight(), 0);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn slow_fetch_counts_as_recent_when_it_lands() {
        let fetcher = CountingFetcher::new(Duration::from_millis(100));
        let cache = cache_with(fetcher.clone(), 1, 3600);

        cache.get_or_fetch("GSE1").await.unwrap();

        // GSE1 is touched while GSE2 is still being fetched.
        let (landed, _) = tokio::join!(cache.get_or_fetch("GSE2"), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cache.get_or_fetch("GSE1").await.unwrap();
        });
        landed.unwrap();

        assert!(cache.contains("GSE2"));
        assert!(!cache.contains("GSE1"));
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn least_recently_used_entry_is_evicted() {
        let fetcher = CountingFetcher::new(Duration::ZERO);
        let cache = cache_with(fetcher.clone(), 2, 3600);

        let tick = Duration::from_millis(2);
        cache.get_or_fetch("GSE1").await.unwrap();
        tokio::time::sleep(tick).await;
        cache.get_or_fetch("GSE2").await.unwrap();
        tokio::time::sleep(tick).await;
        // Touch GSE1 so GSE2 becomes the oldest.
        cache.get_or_fetch("GSE1").await.unwrap();
        tokio::time::sleep(tick).await;
        cache.get_or_fetch("GSE3").await.unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.contains("GSE1"));
        assert!(!cache.contains("GSE2"));
        assert!(cache.contains("GSE3"));
    }

    #[tokio::test]
    async fn expired_entries_are_fetched_again() {
        let fetcher = CountingFetcher::new(Duration::ZERO);
        let cache = cache_with(fetcher.clone(), 8, 0);

        cache.get_or_fetch("GSE1").await.unwrap();
        cache.get_or_fetch("GSE1").await.unwrap();

        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn zero_capacity_keeps_nothing() {
        let fetcher = CountingFetcher::new(Duration::ZERO);
        let cache = cache_with(fetcher.clone(), 0, 3600);

        cache.get_or_fetch("GSE1").await.unwrap();
        cache.get_or_fetch("GSE1").await.unwrap();

        assert!(cache.is_empty());
        assert_eq!(fetcher.calls(), 2);
    }
}
