use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::task::JoinSet;

use super::cache::CacheStore;
use super::error::CatalogError;
use super::fetcher::GroupFetcher;
use super::groups::Group;
use super::types::{CacheEnvelope, CatalogStatus, Satellite};

/// Read-only view of the catalog handed to consumers. Downstream code never
/// mutates entities, only derives transient projections from them.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub satellites: Vec<Satellite>,
    pub status: CatalogStatus,
    pub cached: bool,
    pub timestamp: Option<i64>,
}

#[derive(Debug)]
struct Shared {
    satellites: Vec<Satellite>,
    seen: HashSet<String>,
    status: CatalogStatus,
    cached: bool,
    timestamp: Option<i64>,
}

impl Shared {
    fn reset(&mut self, status: CatalogStatus) {
        self.satellites.clear();
        self.seen.clear();
        self.status = status;
        self.cached = false;
        self.timestamp = None;
    }

    fn load_envelope(&mut self, envelope: CacheEnvelope, status: CatalogStatus) {
        self.satellites = envelope.data;
        self.seen = self.satellites.iter().map(|s| s.id.clone()).collect();
        self.status = status;
        self.cached = true;
        self.timestamp = Some(envelope.timestamp);
    }
}

/// Owns the authoritative in-memory satellite list and drives the cache
/// tiers: fresh cache, concurrent network fan-out with progressive publish,
/// stale cache as last resort.
pub struct Aggregator {
    fetcher: GroupFetcher,
    cache: CacheStore,
    shared: Arc<Mutex<Shared>>,
}

impl Aggregator {
    pub fn new(fetcher: GroupFetcher, cache: CacheStore) -> Self {
        Aggregator {
            fetcher,
            cache,
            shared: Arc::new(Mutex::new(Shared {
                satellites: Vec::new(),
                seen: HashSet::new(),
                status: CatalogStatus::Syncing,
                cached: false,
                timestamp: None,
            })),
        }
    }

    /// Errors only when a writer panicked while holding the state lock;
    /// readers then report the fault instead of panicking in turn.
    pub fn snapshot(&self) -> Result<CatalogSnapshot, CatalogError> {
        let shared = self
            .shared
            .lock()
            .map_err(|e| CatalogError::StatePoisoned(e.to_string()))?;
        Ok(CatalogSnapshot {
            satellites: shared.satellites.clone(),
            status: shared.status,
            cached: shared.cached,
            timestamp: shared.timestamp,
        })
    }

    pub fn status(&self) -> Result<CatalogStatus, CatalogError> {
        let shared = self
            .shared
            .lock()
            .map_err(|e| CatalogError::StatePoisoned(e.to_string()))?;
        Ok(shared.status)
    }

    /// Run one full catalog acquisition cycle and return the resulting status.
    pub async fn refresh(&self) -> CatalogStatus {
        if let Some(envelope) = self.cache.read_fresh() {
            log::info!("serving {} satellites from fresh cache", envelope.data.len());
            let mut shared = self.shared.lock().unwrap();
            shared.load_envelope(envelope, CatalogStatus::ActiveCached);
            return CatalogStatus::ActiveCached;
        }

        self.shared.lock().unwrap().reset(CatalogStatus::Syncing);

        let mut tasks = JoinSet::new();
        for group in Group::ALL {
            let fetcher = self.fetcher.clone();
            tasks.spawn(async move { (group, fetcher.fetch_group(group).await) });
        }

        // Groups publish as they resolve; consumers may observe a partial
        // catalog while fetches are still in flight.
        let mut fetched_any = false;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((group, Ok(batch))) => {
                    if !batch.is_empty() {
                        fetched_any = true;
                    }
                    self.publish_batch(batch);
                    log::debug!("group {} published", group.key());
                }
                Ok((group, Err(e))) => {
                    log::warn!("group {} unavailable: {}", group.key(), e);
                }
                Err(e) => {
                    log::warn!("group fetch task failed: {}", e);
                }
            }
        }

        if fetched_any {
            // All groups have settled; persist the complete deduplicated
            // list in one shot so a failed group can never poison the cache
            // with a partial earlier write.
            let satellites = {
                let mut shared = self.shared.lock().unwrap();
                shared.status = CatalogStatus::Active;
                shared.cached = false;
                shared.timestamp = Some(Utc::now().timestamp_millis());
                shared.satellites.clone()
            };
            if let Err(e) = self.cache.write(&satellites) {
                log::warn!("cache write failed: {}", e);
            }
            return CatalogStatus::Active;
        }

        if let Some(envelope) = self.cache.read_stale() {
            log::warn!(
                "all sources failed; serving stale cache of {} satellites",
                envelope.data.len()
            );
            let mut shared = self.shared.lock().unwrap();
            shared.load_envelope(envelope, CatalogStatus::OfflineCached);
            return CatalogStatus::OfflineCached;
        }

        log::error!("all sources failed and no cache is available");
        self.shared.lock().unwrap().reset(CatalogStatus::Error);
        CatalogStatus::Error
    }

    /// Append a group's records to the live list. The seen-ID check and
    /// insert happen under one lock, so the first group to publish a catalog
    /// number wins and later duplicates are dropped.
    fn publish_batch(&self, batch: Vec<Satellite>) {
        let mut shared = self.shared.lock().unwrap();
        for satellite in batch {
            if shared.seen.insert(satellite.id.clone()) {
                shared.satellites.push(satellite);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::cache::CURRENT_KEY;
    use crate::catalog::types::Category;
    use axum::extract::RawQuery;
    use axum::{http::StatusCode, Router};
    use std::time::Duration;

    const ISS_TLE: &str = "ISS (ZARYA)\n\
        1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927\n\
        2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537\n";

    fn satellite(id: &str, name: &str) -> Satellite {
        Satellite {
            name: name.to_string(),
            tle1: String::new(),
            tle2: String::new(),
            id: id.to_string(),
            category: Category::Payload,
            is_visible: true,
        }
    }

    fn aggregator(sources: Vec<String>, cache_dir: &std::path::Path) -> Aggregator {
        let fetcher = GroupFetcher::new(sources, Duration::from_secs(5)).unwrap();
        let cache = CacheStore::new(cache_dir.into(), Duration::from_secs(12 * 3600));
        Aggregator::new(fetcher, cache)
    }

    #[test]
    fn duplicate_ids_across_batches_keep_first_publisher() {
        let dir = tempfile::tempdir().unwrap();
        let agg = aggregator(vec![], dir.path());

        agg.publish_batch(vec![satellite("25544", "ISS (ZARYA)")]);
        agg.publish_batch(vec![
            satellite("25544", "ISS DUPLICATE"),
            satellite("43013", "NOAA 20"),
        ]);

        let snapshot = agg.snapshot().unwrap();
        assert_eq!(snapshot.satellites.len(), 2);
        assert_eq!(snapshot.satellites[0].name, "ISS (ZARYA)");
    }

    #[test]
    fn poisoned_state_surfaces_as_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let agg = aggregator(vec![], dir.path());

        // Panic while holding the lock so later readers see the poison.
        let shared = agg.shared.clone();
        let _ = std::thread::spawn(move || {
            let _guard = shared.lock().unwrap();
            panic!("writer died mid-update");
        })
        .join();

        assert!(matches!(
            agg.snapshot(),
            Err(CatalogError::StatePoisoned(_))
        ));
        assert!(agg.status().is_err());
    }

    #[tokio::test]
    async fn settled_groups_are_persisted_even_when_others_fail() {
        // Only the stations group resolves; every other group gets a 500.
        let router = Router::new().fallback(|RawQuery(query): RawQuery| async move {
            if query.unwrap_or_default().contains("GROUP=stations") {
                (StatusCode::OK, ISS_TLE.to_string())
            } else {
                (StatusCode::INTERNAL_SERVER_ERROR, String::new())
            }
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let dir = tempfile::tempdir().unwrap();
        let agg = aggregator(vec![format!("http://{addr}")], dir.path());

        let status = agg.refresh().await;
        assert_eq!(status, CatalogStatus::Active);

        let body = std::fs::read(dir.path().join(CURRENT_KEY)).unwrap();
        let envelope: CacheEnvelope = serde_json::from_slice(&body).unwrap();
        assert_eq!(envelope.data.len(), 1);
        assert_eq!(envelope.data[0].id, "25544");
    }

    #[tokio::test]
    async fn total_failure_without_cache_is_an_error_state() {
        let dir = tempfile::tempdir().unwrap();
        // Unroutable source; every fetch fails fast.
        let agg = aggregator(vec!["http://127.0.0.1:1".to_string()], dir.path());

        let status = agg.refresh().await;
        assert_eq!(status, CatalogStatus::Error);
        assert!(agg.snapshot().unwrap().satellites.is_empty());
    }

    #[tokio::test]
    async fn total_failure_with_stale_cache_degrades_to_offline() {
        let dir = tempfile::tempdir().unwrap();
        let old = CacheEnvelope::new(
            vec![satellite("25544", "ISS (ZARYA)")],
            Utc::now() - chrono::Duration::hours(30),
        );
        std::fs::create_dir_all(dir.path()).unwrap();
        std::fs::write(
            dir.path().join(CURRENT_KEY),
            serde_json::to_vec(&old).unwrap(),
        )
        .unwrap();

        let agg = aggregator(vec!["http://127.0.0.1:1".to_string()], dir.path());
        let status = agg.refresh().await;

        assert_eq!(status, CatalogStatus::OfflineCached);
        let snapshot = agg.snapshot().unwrap();
        assert_eq!(snapshot.satellites.len(), 1);
        assert!(snapshot.cached);
    }

    #[tokio::test]
    async fn fresh_cache_skips_the_network_entirely() {
        let dir = tempfile::tempdir().unwrap();
        let fresh = CacheEnvelope::new(vec![satellite("25544", "ISS (ZARYA)")], Utc::now());
        std::fs::create_dir_all(dir.path()).unwrap();
        std::fs::write(
            dir.path().join(CURRENT_KEY),
            serde_json::to_vec(&fresh).unwrap(),
        )
        .unwrap();

        // No sources configured; a network attempt would fail immediately.
        let agg = aggregator(vec![], dir.path());
        let status = agg.refresh().await;

        assert_eq!(status, CatalogStatus::ActiveCached);
        assert_eq!(agg.snapshot().unwrap().satellites.len(), 1);
    }
}
