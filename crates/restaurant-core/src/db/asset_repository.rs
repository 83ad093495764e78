//! Asset cache bucket repository implementation

#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // SQLite stores u16/usize as i64

use crate::error::Result;
use crate::models::CachedAsset;
use libsql::Connection;

use super::connection::in_transaction;

/// Trait for named asset cache buckets (async)
#[allow(async_fn_in_trait)]
pub trait AssetCacheRepository {
    /// Create a bucket if it does not exist yet
    async fn open_bucket(&self, name: &str) -> Result<()>;

    /// Bucket names in creation order
    async fn bucket_names(&self) -> Result<Vec<String>>;

    /// Delete a bucket and all of its entries, returning whether it existed
    async fn delete_bucket(&self, name: &str) -> Result<bool>;

    /// Store an entry in a bucket, overwriting any entry for the same URL
    async fn put_entry(&self, bucket: &str, asset: &CachedAsset) -> Result<()>;

    /// First entry for `url`, searching buckets in creation order
    async fn match_url(&self, url: &str) -> Result<Option<CachedAsset>>;

    /// Bucket names with their entry counts
    async fn bucket_summaries(&self) -> Result<Vec<(String, usize)>>;
}

/// libSQL implementation of `AssetCacheRepository`
pub struct LibSqlAssetCacheRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlAssetCacheRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_asset(row: &libsql::Row) -> Result<CachedAsset> {
        Ok(CachedAsset {
            url: row.get(0)?,
            status: row.get::<i64>(1)? as u16,
            content_type: row.get(2)?,
            body: row.get(3)?,
            cached_at: row.get(4)?,
        })
    }
}

impl AssetCacheRepository for LibSqlAssetCacheRepository<'_> {
    async fn open_bucket(&self, name: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR IGNORE INTO cache_buckets (name, created_at) VALUES (?, ?)",
                libsql::params![name, crate::util::unix_millis_now()],
            )
            .await?;
        Ok(())
    }

    async fn bucket_names(&self) -> Result<Vec<String>> {
        let mut rows = self
            .conn
            .query(
                "SELECT name FROM cache_buckets ORDER BY created_at, rowid",
                (),
            )
            .await?;

        let mut names = Vec::new();
        while let Some(row) = rows.next().await? {
            names.push(row.get::<String>(0)?);
        }
        Ok(names)
    }

    async fn delete_bucket(&self, name: &str) -> Result<bool> {
        in_transaction(self.conn, || async move {
            self.conn
                .execute("DELETE FROM cache_entries WHERE bucket = ?", [name])
                .await?;
            let rows = self
                .conn
                .execute("DELETE FROM cache_buckets WHERE name = ?", [name])
                .await?;
            Ok(rows > 0)
        })
        .await
    }

    async fn put_entry(&self, bucket: &str, asset: &CachedAsset) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO cache_entries (bucket, url, status, content_type, body, cached_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
                libsql::params![
                    bucket,
                    asset.url.as_str(),
                    i64::from(asset.status),
                    asset.content_type.clone(),
                    asset.body.clone(),
                    asset.cached_at
                ],
            )
            .await?;
        Ok(())
    }

    async fn match_url(&self, url: &str) -> Result<Option<CachedAsset>> {
        let mut rows = self
            .conn
            .query(
                "SELECT e.url, e.status, e.content_type, e.body, e.cached_at
                 FROM cache_entries e
                 JOIN cache_buckets b ON e.bucket = b.name
                 WHERE e.url = ?
                 ORDER BY b.created_at, b.rowid
                 LIMIT 1",
                [url],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_asset(&row)?)),
            None => Ok(None),
        }
    }

    async fn bucket_summaries(&self) -> Result<Vec<(String, usize)>> {
        let mut rows = self
            .conn
            .query(
                "SELECT b.name, COUNT(e.url)
                 FROM cache_buckets b
                 LEFT JOIN cache_entries e ON e.bucket = b.name
                 GROUP BY b.name
                 ORDER BY b.created_at, b.rowid",
                (),
            )
            .await?;

        let mut summaries = Vec::new();
        while let Some(row) = rows.next().await? {
            summaries.push((row.get::<String>(0)?, row.get::<i64>(1)? as usize));
        }
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use pretty_assertions::assert_eq;

    fn asset(url: &str, body: &str) -> CachedAsset {
        CachedAsset::new(url, 200, Some("text/css".into()), body.as_bytes().to_vec())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn buckets_are_listed_in_creation_order() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlAssetCacheRepository::new(db.connection());

        repo.open_bucket("restaurant-reviews-v1").await.unwrap();
        repo.open_bucket("restaurant-reviews-v2").await.unwrap();
        repo.open_bucket("restaurant-reviews-v1").await.unwrap();

        assert_eq!(
            repo.bucket_names().await.unwrap(),
            vec!["restaurant-reviews-v1", "restaurant-reviews-v2"]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn put_and_match_entry() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlAssetCacheRepository::new(db.connection());

        repo.open_bucket("b").await.unwrap();
        let stored = asset("http://localhost:8000/css/styles.css", "body{}");
        repo.put_entry("b", &stored).await.unwrap();

        let matched = repo
            .match_url("http://localhost:8000/css/styles.css")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(matched, stored);
        assert!(repo
            .match_url("http://localhost:8000/css/other.css")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn delete_bucket_drops_its_entries() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlAssetCacheRepository::new(db.connection());

        repo.open_bucket("old").await.unwrap();
        repo.open_bucket("new").await.unwrap();
        repo.put_entry("old", &asset("http://a/x", "old")).await.unwrap();
        repo.put_entry("new", &asset("http://a/y", "new")).await.unwrap();

        assert!(repo.delete_bucket("old").await.unwrap());
        assert!(!repo.delete_bucket("old").await.unwrap());

        assert!(repo.match_url("http://a/x").await.unwrap().is_none());
        assert_eq!(
            repo.bucket_summaries().await.unwrap(),
            vec![("new".to_string(), 1)]
        );
    }
}
