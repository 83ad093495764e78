//! Asset cache worker.
//!
//! Pre-caches a versioned asset manifest on install, sweeps older generations
//! on activate, answers asset requests cache-first and replays deferred
//! reviews when a sync event arrives.

mod lifecycle;
mod manifest;
mod sync;

pub use lifecycle::WorkerState;
pub use manifest::{cache_key, AssetManifest};
pub use sync::{SyncManager, SYNC_NEW_REVIEWS};

use futures::future::join_all;
use url::Url;

use crate::gateway::{AssetResponse, AssetSource, Source, Transport};
use crate::models::CachedAsset;
use crate::queue::{DrainReport, ReviewQueue};
use crate::services::LocalStore;
use crate::{Error, Result};

/// Outcome of an install
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub bucket: String,
    pub cached: Vec<String>,
    /// Assets that failed to download or came back non-2xx
    pub skipped: Vec<String>,
}

/// Outcome of an activation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivateReport {
    pub current: String,
    pub deleted: Vec<String>,
}

/// An answered asset request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served {
    pub response: AssetResponse,
    pub source: Source,
}

/// Result of dispatching one sync tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub tag: String,
    /// Drain result, `None` for tags the worker does not handle
    pub drain: Option<DrainReport>,
}

pub struct AssetWorker<T> {
    transport: T,
    store: LocalStore,
    queue: ReviewQueue,
    sync_manager: SyncManager,
    manifest: AssetManifest,
    origin: Url,
    state: WorkerState,
}

impl<T: Transport + AssetSource> AssetWorker<T> {
    pub fn new(
        transport: T,
        store: LocalStore,
        sync_manager: SyncManager,
        manifest: AssetManifest,
        origin: Url,
    ) -> Self {
        let queue = ReviewQueue::new(store.clone());
        Self {
            transport,
            store,
            queue,
            sync_manager,
            manifest,
            origin,
            state: WorkerState::Parsed,
        }
    }

    pub const fn state(&self) -> WorkerState {
        self.state
    }

    pub const fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }

    fn transition(&mut self, next: WorkerState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(Error::InvalidState(format!(
                "worker cannot go from {} to {}",
                self.state, next
            )));
        }
        tracing::debug!("Worker {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// Populate the current bucket with every manifest asset.
    ///
    /// Assets that cannot be fetched are skipped. A storage failure makes the
    /// worker redundant.
    pub async fn install(&mut self) -> Result<InstallReport> {
        self.transition(WorkerState::Installing)?;
        let bucket = self.manifest.bucket_name();
        tracing::info!("Installing asset cache {}", bucket);

        match self.populate(&bucket).await {
            Ok(report) => {
                self.transition(WorkerState::Installed)?;
                tracing::info!(
                    "Installed {}: {} cached, {} skipped",
                    bucket,
                    report.cached.len(),
                    report.skipped.len()
                );
                Ok(report)
            }
            Err(error) => {
                tracing::warn!("Install of {} failed: {}", bucket, error);
                self.state = WorkerState::Redundant;
                Err(error)
            }
        }
    }

    async fn populate(&self, bucket: &str) -> Result<InstallReport> {
        let urls = self.manifest.resolve(&self.origin)?;
        self.store.open_bucket(bucket).await?;

        let responses = join_all(urls.iter().map(|url| self.transport.fetch_asset(url))).await;

        let mut report = InstallReport {
            bucket: bucket.to_string(),
            ..InstallReport::default()
        };
        for (url, response) in urls.into_iter().zip(responses) {
            match response {
                Ok(response) if response.is_success() => {
                    let asset = CachedAsset::new(
                        url.as_str(),
                        response.status,
                        response.content_type,
                        response.body,
                    );
                    self.store.put_asset(bucket, &asset).await?;
                    report.cached.push(url.into());
                }
                Ok(response) => {
                    tracing::warn!("Not caching {}: HTTP {}", url, response.status);
                    report.skipped.push(url.into());
                }
                Err(error) => {
                    tracing::warn!("Not caching {}: {}", url, error);
                    report.skipped.push(url.into());
                }
            }
        }
        Ok(report)
    }

    /// Delete every other generation of this app's buckets.
    ///
    /// A storage failure puts the worker back to installed so activation can
    /// be retried.
    pub async fn activate(&mut self) -> Result<ActivateReport> {
        self.transition(WorkerState::Activating)?;
        let current = self.manifest.bucket_name();
        tracing::info!("Activating asset cache {}", current);

        match self.sweep(&current).await {
            Ok(deleted) => {
                self.transition(WorkerState::Active)?;
                Ok(ActivateReport { current, deleted })
            }
            Err(error) => {
                tracing::warn!("Activation of {} failed: {}", current, error);
                self.state = WorkerState::Installed;
                Err(error)
            }
        }
    }

    async fn sweep(&self, current: &str) -> Result<Vec<String>> {
        let mut deleted = Vec::new();
        for bucket in self.store.bucket_names().await? {
            if bucket == current || !self.manifest.owns_bucket(&bucket) {
                continue;
            }
            if self.store.delete_bucket(&bucket).await? {
                tracing::info!("Deleted old asset cache {}", bucket);
                deleted.push(bucket);
            }
        }
        Ok(deleted)
    }

    /// Answer a request from the cache, falling back to the network.
    ///
    /// Lookups ignore the query string. Network responses are not cached.
    pub async fn fetch(&self, request: &str) -> Result<Served> {
        let key = cache_key(&self.origin, request)?;
        match self.store.match_asset(key.as_str()).await {
            Ok(Some(asset)) => {
                tracing::debug!("Serving {} from cache", key);
                return Ok(Served {
                    response: AssetResponse {
                        status: asset.status,
                        content_type: asset.content_type,
                        body: asset.body,
                    },
                    source: Source::Cache,
                });
            }
            Ok(None) => {}
            Err(error) => tracing::warn!("Asset cache lookup for {} failed: {}", key, error),
        }

        let url = self
            .origin
            .join(request.trim())
            .map_err(|error| Error::InvalidInput(format!("invalid request URL: {error}")))?;
        let response = self.transport.fetch_asset(&url).await?;
        Ok(Served {
            response,
            source: Source::Network,
        })
    }

    /// Handle one sync event.
    ///
    /// `sync-new-reviews` drains the review queue and re-registers itself
    /// while reviews remain undelivered.
    pub async fn sync(&self, tag: &str) -> Result<Option<DrainReport>> {
        if tag != SYNC_NEW_REVIEWS {
            tracing::debug!("Ignoring sync event {}", tag);
            return Ok(None);
        }

        let report = self.queue.drain(&self.transport).await?;
        if !report.is_complete() {
            self.sync_manager.register(SYNC_NEW_REVIEWS);
        }
        Ok(Some(report))
    }

    /// Dispatch every registered sync tag.
    pub async fn process_sync_registrations(&self) -> Result<Vec<SyncOutcome>> {
        let mut outcomes = Vec::new();
        for tag in self.sync_manager.take_registered() {
            match self.sync(&tag).await {
                Ok(drain) => outcomes.push(SyncOutcome { tag, drain }),
                Err(error) => {
                    self.sync_manager.register(&tag);
                    return Err(error);
                }
            }
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{pending_review, MockTransport};
    use pretty_assertions::assert_eq;

    const ORIGIN: &str = "http://localhost:8000";

    fn manifest(version: &str) -> AssetManifest {
        AssetManifest {
            root: "restaurant-reviews".to_string(),
            version: version.to_string(),
            assets: vec![
                "/".to_string(),
                "css/styles.css".to_string(),
                "img/1.jpg".to_string(),
            ],
        }
    }

    fn serve_site(transport: &MockTransport) {
        transport.serve_asset("http://localhost:8000/", 200, "<html>");
        transport.serve_asset("http://localhost:8000/css/styles.css", 200, "body {}");
    }

    async fn worker(
        transport: &MockTransport,
        version: &str,
    ) -> (AssetWorker<MockTransport>, LocalStore, SyncManager) {
        let store = LocalStore::open_in_memory().await.unwrap();
        let sync = SyncManager::new();
        let worker = AssetWorker::new(
            transport.clone(),
            store.clone(),
            sync.clone(),
            manifest(version),
            Url::parse(ORIGIN).unwrap(),
        );
        (worker, store, sync)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn install_caches_what_it_can() {
        let transport = MockTransport::default();
        serve_site(&transport);
        let (mut worker, store, _) = worker(&transport, "v9").await;

        let report = worker.install().await.unwrap();
        assert_eq!(worker.state(), WorkerState::Installed);
        assert_eq!(report.bucket, "restaurant-reviews-v9");
        assert_eq!(
            report.cached,
            vec![
                "http://localhost:8000/".to_string(),
                "http://localhost:8000/css/styles.css".to_string(),
            ]
        );
        assert_eq!(
            report.skipped,
            vec!["http://localhost:8000/img/1.jpg".to_string()]
        );
        assert_eq!(
            store.bucket_summaries().await.unwrap(),
            vec![("restaurant-reviews-v9".to_string(), 2)]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn install_while_offline_still_completes() {
        let transport = MockTransport::default();
        transport.go_offline();
        let (mut worker, _, _) = worker(&transport, "v9").await;

        let report = worker.install().await.unwrap();
        assert!(report.cached.is_empty());
        assert_eq!(report.skipped.len(), 3);
        assert_eq!(worker.state(), WorkerState::Installed);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn lifecycle_steps_must_run_in_order() {
        let transport = MockTransport::default();
        let (mut worker, _, _) = worker(&transport, "v9").await;

        assert!(matches!(
            worker.activate().await.unwrap_err(),
            Error::InvalidState(_)
        ));
        worker.install().await.unwrap();
        assert!(matches!(
            worker.install().await.unwrap_err(),
            Error::InvalidState(_)
        ));
        worker.activate().await.unwrap();
        assert_eq!(worker.state(), WorkerState::Active);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn activate_sweeps_only_old_generations_of_this_app() {
        let transport = MockTransport::default();
        serve_site(&transport);
        let (mut worker, store, _) = worker(&transport, "v9").await;
        for bucket in ["restaurant-reviews-v7", "restaurant-reviews-v8", "other-app-v1"] {
            store.open_bucket(bucket).await.unwrap();
        }

        worker.install().await.unwrap();
        let report = worker.activate().await.unwrap();

        assert_eq!(report.current, "restaurant-reviews-v9");
        let mut deleted = report.deleted;
        deleted.sort();
        assert_eq!(deleted, vec!["restaurant-reviews-v7", "restaurant-reviews-v8"]);

        let mut remaining = store.bucket_names().await.unwrap();
        remaining.sort();
        assert_eq!(remaining, vec!["other-app-v1", "restaurant-reviews-v9"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_activation_can_be_retried() {
        let transport = MockTransport::default();
        let (mut worker, store, _) = worker(&transport, "v9").await;
        worker.install().await.unwrap();

        store
            .execute_raw("ALTER TABLE cache_buckets RENAME TO cache_buckets_moved")
            .await
            .unwrap();
        assert!(worker.activate().await.is_err());
        assert_eq!(worker.state(), WorkerState::Installed);

        store
            .execute_raw("ALTER TABLE cache_buckets_moved RENAME TO cache_buckets")
            .await
            .unwrap();
        let report = worker.activate().await.unwrap();
        assert_eq!(report.current, "restaurant-reviews-v9");
        assert_eq!(worker.state(), WorkerState::Active);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn fetch_is_cache_first_and_ignores_query_string() {
        let transport = MockTransport::default();
        serve_site(&transport);
        let (mut worker, _, _) = worker(&transport, "v9").await;
        worker.install().await.unwrap();
        worker.activate().await.unwrap();
        transport.go_offline();

        let served = worker.fetch("/css/styles.css?v=123").await.unwrap();
        assert_eq!(served.source, Source::Cache);
        assert_eq!(served.response.body, b"body {}".to_vec());
        assert_eq!(served.response.status, 200);

        let miss = worker.fetch("/img/1.jpg").await.unwrap_err();
        assert!(miss.is_network());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn cache_miss_goes_to_network_without_caching() {
        let transport = MockTransport::default();
        transport.serve_asset("http://localhost:8000/restaurant.html?id=2", 200, "detail");
        let (mut worker, store, _) = worker(&transport, "v9").await;
        worker.install().await.unwrap();

        let served = worker.fetch("restaurant.html?id=2").await.unwrap();
        assert_eq!(served.source, Source::Network);
        assert_eq!(served.response.body, b"detail".to_vec());
        assert!(store
            .match_asset("http://localhost:8000/restaurant.html")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sync_event_drains_pending_reviews() {
        let transport = MockTransport::default();
        let (worker, store, sync) = worker(&transport, "v9").await;
        store.put_pending_review(&pending_review(1, 100)).await.unwrap();
        store.put_pending_review(&pending_review(2, 200)).await.unwrap();
        transport.fail_post_for(200);

        let report = worker.sync(SYNC_NEW_REVIEWS).await.unwrap().unwrap();
        assert_eq!(report.delivered, vec![100]);
        assert_eq!(report.retained, vec![200]);
        assert_eq!(sync.registered_tags(), vec![SYNC_NEW_REVIEWS.to_string()]);

        transport.recover_post_for(200);
        let outcomes = worker.process_sync_registrations().await.unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(
            outcomes[0].drain.as_ref().map(|report| report.delivered.clone()),
            Some(vec![200])
        );
        assert!(sync.registered_tags().is_empty());
        assert!(store.pending_reviews().await.unwrap().is_empty());
        assert_eq!(transport.posted_keys(), vec![100, 200]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unknown_sync_tags_are_ignored() {
        let transport = MockTransport::default();
        let (worker, store, _) = worker(&transport, "v9").await;
        store.put_pending_review(&pending_review(1, 100)).await.unwrap();

        assert_eq!(worker.sync("sync-other").await.unwrap(), None);
        assert_eq!(store.pending_reviews().await.unwrap().len(), 1);
    }
}
