//! Pending review repository implementation

use crate::error::Result;
use crate::models::Review;
use libsql::Connection;

/// Trait for the `reviews` collection of undelivered reviews (async)
#[allow(async_fn_in_trait)]
pub trait PendingReviewRepository {
    /// Get a pending review by its creation timestamp
    async fn get(&self, created_at: i64) -> Result<Option<Review>>;

    /// Insert or overwrite the pending review keyed by its creation timestamp
    async fn put(&self, review: &Review) -> Result<()>;

    /// Delete a pending review, returning whether it existed
    async fn delete(&self, created_at: i64) -> Result<bool>;

    /// Every pending review, oldest first
    async fn get_all(&self) -> Result<Vec<Review>>;
}

/// libSQL implementation of `PendingReviewRepository`
pub struct LibSqlPendingReviewRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlPendingReviewRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn parse_review(row: &libsql::Row) -> Result<Review> {
        let body: String = row.get(0)?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl PendingReviewRepository for LibSqlPendingReviewRepository<'_> {
    async fn get(&self, created_at: i64) -> Result<Option<Review>> {
        let mut rows = self
            .conn
            .query("SELECT body FROM reviews WHERE created_at = ?", [created_at])
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_review(&row)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, review: &Review) -> Result<()> {
        let body = serde_json::to_string(review)?;
        self.conn
            .execute(
                "INSERT OR REPLACE INTO reviews (created_at, restaurant_id, body) VALUES (?, ?, ?)",
                libsql::params![
                    review.created_at,
                    i64::from(review.restaurant_id.get()),
                    body
                ],
            )
            .await?;
        Ok(())
    }

    async fn delete(&self, created_at: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM reviews WHERE created_at = ?", [created_at])
            .await?;
        Ok(rows > 0)
    }

    async fn get_all(&self) -> Result<Vec<Review>> {
        let mut rows = self
            .conn
            .query("SELECT body, created_at FROM reviews ORDER BY created_at", ())
            .await?;

        let mut reviews = Vec::new();
        while let Some(row) = rows.next().await? {
            match Self::parse_review(&row) {
                Ok(review) => reviews.push(review),
                Err(error) => {
                    let created_at: i64 = row.get(1)?;
                    tracing::warn!("Skipping unreadable pending review {created_at}: {error}");
                }
            }
        }
        Ok(reviews)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::testing::pending_review;
    use pretty_assertions::assert_eq;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_put_get_delete() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlPendingReviewRepository::new(db.connection());

        let review = pending_review(1, 1_700_000_000_001);
        repo.put(&review).await.unwrap();
        assert_eq!(repo.get(review.created_at).await.unwrap(), Some(review.clone()));

        assert!(repo.delete(review.created_at).await.unwrap());
        assert!(repo.get(review.created_at).await.unwrap().is_none());
        assert!(!repo.delete(review.created_at).await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn same_timestamp_keeps_last_write() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlPendingReviewRepository::new(db.connection());

        let first = pending_review(1, 42);
        let mut second = pending_review(2, 42);
        second.comments = "second".to_string();

        repo.put(&first).await.unwrap();
        repo.put(&second).await.unwrap();

        let all = repo.get_all().await.unwrap();
        assert_eq!(all, vec![second]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn get_all_orders_by_timestamp() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlPendingReviewRepository::new(db.connection());

        repo.put(&pending_review(1, 30)).await.unwrap();
        repo.put(&pending_review(1, 10)).await.unwrap();
        repo.put(&pending_review(2, 20)).await.unwrap();

        let keys: Vec<i64> = repo
            .get_all()
            .await
            .unwrap()
            .iter()
            .map(|review| review.created_at)
            .collect();
        assert_eq!(keys, vec![10, 20, 30]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn get_all_skips_unreadable_rows() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = LibSqlPendingReviewRepository::new(db.connection());

        repo.put(&pending_review(1, 1_000)).await.unwrap();
        repo.put(&pending_review(1, 3_000)).await.unwrap();
        db.connection()
            .execute(
                "INSERT INTO reviews (created_at, restaurant_id, body) VALUES (2000, 1, '{\"rating\":\"lots\"}')",
                (),
            )
            .await
            .unwrap();

        let keys: Vec<i64> = repo
            .get_all()
            .await
            .unwrap()
            .iter()
            .map(|review| review.created_at)
            .collect();
        assert_eq!(keys, vec![1_000, 3_000]);
        assert!(repo.get(2_000).await.is_err());
    }
}
