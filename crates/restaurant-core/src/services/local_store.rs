//! Shared local store service used by the page and worker contexts.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::db::{
    AssetCacheRepository, Database, LibSqlAssetCacheRepository, LibSqlPendingReviewRepository,
    LibSqlRestaurantRepository, PendingReviewRepository, RestaurantRepository,
};
use crate::models::{CachedAsset, Restaurant, RestaurantId, Review};
use crate::Result;

/// Thread-safe handle to the local store.
///
/// Clones share one connection; every operation takes the lock for its whole
/// duration, so a `replace_restaurants` transaction is never interleaved with
/// another reader or writer holding a clone.
#[derive(Clone)]
pub struct LocalStore {
    db: Arc<Mutex<Database>>,
    db_path: Option<PathBuf>,
}

impl LocalStore {
    /// Open the store at the given filesystem path.
    ///
    /// A file that is not a database is moved aside and a fresh store is
    /// created; everything in it can be refetched.
    pub async fn open_path(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = match Database::open(&db_path).await {
            Ok(db) => db,
            Err(error) if Self::is_corrupted_db_error(&error) => {
                tracing::warn!(
                    "Local store at {} is unreadable: {}. Starting from an empty store.",
                    db_path.display(),
                    error
                );
                Self::quarantine_corrupted_db_files(&db_path)?;
                Database::open(&db_path).await?
            }
            Err(error) => return Err(error),
        };

        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: Some(db_path),
        })
    }

    /// Open an in-memory store (primarily for tests).
    pub async fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory().await?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: None,
        })
    }

    /// Filesystem location, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    #[cfg(test)]
    pub(crate) async fn execute_raw(&self, sql: &str) -> Result<()> {
        let db = self.db.lock().await;
        db.connection().execute(sql, ()).await?;
        Ok(())
    }

    fn is_corrupted_db_error(error: &crate::Error) -> bool {
        let message = error.to_string().to_ascii_lowercase();
        message.contains("file is not a database") || message.contains("malformed")
    }

    fn quarantine_corrupted_db_files(db_path: &Path) -> Result<()> {
        if db_path.exists() {
            let timestamp = chrono::Utc::now().timestamp_millis();
            let base_name = db_path
                .file_name()
                .map_or_else(|| "restaurants.db".into(), |name| name.to_string_lossy());
            let backup_path = db_path.with_file_name(format!("{base_name}.corrupt-{timestamp}"));

            std::fs::rename(db_path, &backup_path)?;
            tracing::warn!(
                "Moved corrupted local store from {} to {}",
                db_path.display(),
                backup_path.display()
            );
        }

        for suffix in ["-wal", "-shm"] {
            let mut sidecar = db_path.as_os_str().to_owned();
            sidecar.push(suffix);
            let sidecar = PathBuf::from(sidecar);
            if sidecar.exists() {
                std::fs::remove_file(&sidecar)?;
                tracing::warn!("Removed stale store file {}", sidecar.display());
            }
        }

        Ok(())
    }

    // -- restaurants ---------------------------------------------------------

    /// Get one cached restaurant.
    pub async fn get_restaurant(&self, id: RestaurantId) -> Result<Option<Restaurant>> {
        let db = self.db.lock().await;
        let repo = LibSqlRestaurantRepository::new(db.connection());
        repo.get(id).await
    }

    /// Insert or overwrite one cached restaurant.
    pub async fn put_restaurant(&self, restaurant: &Restaurant) -> Result<()> {
        let db = self.db.lock().await;
        let repo = LibSqlRestaurantRepository::new(db.connection());
        repo.put(restaurant).await
    }

    /// The full cached snapshot.
    pub async fn all_restaurants(&self) -> Result<Vec<Restaurant>> {
        let db = self.db.lock().await;
        let repo = LibSqlRestaurantRepository::new(db.connection());
        repo.get_all().await
    }

    /// Atomically replace the cached snapshot with `restaurants`.
    pub async fn replace_restaurants(&self, restaurants: &[Restaurant]) -> Result<()> {
        let db = self.db.lock().await;
        let repo = LibSqlRestaurantRepository::new(db.connection());
        repo.replace_all(restaurants).await
    }

    // -- pending reviews -----------------------------------------------------

    /// Persist a pending review keyed by its creation timestamp.
    pub async fn put_pending_review(&self, review: &Review) -> Result<()> {
        let db = self.db.lock().await;
        let repo = LibSqlPendingReviewRepository::new(db.connection());
        repo.put(review).await
    }

    /// Get one pending review.
    pub async fn get_pending_review(&self, created_at: i64) -> Result<Option<Review>> {
        let db = self.db.lock().await;
        let repo = LibSqlPendingReviewRepository::new(db.connection());
        repo.get(created_at).await
    }

    /// Remove a pending review.
    pub async fn delete_pending_review(&self, created_at: i64) -> Result<bool> {
        let db = self.db.lock().await;
        let repo = LibSqlPendingReviewRepository::new(db.connection());
        repo.delete(created_at).await
    }

    /// Every pending review.
    pub async fn pending_reviews(&self) -> Result<Vec<Review>> {
        let db = self.db.lock().await;
        let repo = LibSqlPendingReviewRepository::new(db.connection());
        repo.get_all().await
    }

    // -- asset cache ---------------------------------------------------------

    /// Create an asset cache bucket if missing.
    pub async fn open_bucket(&self, name: &str) -> Result<()> {
        let db = self.db.lock().await;
        let repo = LibSqlAssetCacheRepository::new(db.connection());
        repo.open_bucket(name).await
    }

    /// Asset cache bucket names in creation order.
    pub async fn bucket_names(&self) -> Result<Vec<String>> {
        let db = self.db.lock().await;
        let repo = LibSqlAssetCacheRepository::new(db.connection());
        repo.bucket_names().await
    }

    /// Delete an asset cache bucket with its entries.
    pub async fn delete_bucket(&self, name: &str) -> Result<bool> {
        let db = self.db.lock().await;
        let repo = LibSqlAssetCacheRepository::new(db.connection());
        repo.delete_bucket(name).await
    }

    /// Store an asset in a bucket.
    pub async fn put_asset(&self, bucket: &str, asset: &CachedAsset) -> Result<()> {
        let db = self.db.lock().await;
        let repo = LibSqlAssetCacheRepository::new(db.connection());
        repo.put_entry(bucket, asset).await
    }

    /// Look up an asset by normalized URL across all buckets.
    pub async fn match_asset(&self, url: &str) -> Result<Option<CachedAsset>> {
        let db = self.db.lock().await;
        let repo = LibSqlAssetCacheRepository::new(db.connection());
        repo.match_url(url).await
    }

    /// Bucket names with entry counts.
    pub async fn bucket_summaries(&self) -> Result<Vec<(String, usize)>> {
        let db = self.db.lock().await;
        let repo = LibSqlAssetCacheRepository::new(db.connection());
        repo.bucket_summaries().await
    }
}
