//! Deferred write queue for reviews that could not be sent immediately.
//!
//! Entries live in the local store's `reviews` collection, keyed by creation
//! timestamp. A drain posts every entry independently and only removes the
//! ones the backend confirmed; the rest wait for the next drain. There is no
//! retry limit or backoff.

use futures::future::join_all;

use crate::gateway::Transport;
use crate::models::Review;
use crate::services::LocalStore;
use crate::Result;

/// Outcome of one drain pass, as creation-timestamp keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Reviews the backend accepted
    pub delivered: Vec<i64>,
    /// Reviews left in the queue for a later drain
    pub retained: Vec<i64>,
}

impl DrainReport {
    /// Whether every pending review was delivered
    pub fn is_complete(&self) -> bool {
        self.retained.is_empty()
    }
}

/// Durable queue of pending reviews
#[derive(Clone)]
pub struct ReviewQueue {
    store: LocalStore,
}

impl ReviewQueue {
    pub const fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// Persist `review` under its creation timestamp.
    pub async fn enqueue(&self, review: &Review) -> Result<()> {
        self.store.put_pending_review(review).await?;
        tracing::info!(
            "Queued pending review {} for restaurant {}",
            review.created_at,
            review.restaurant_id
        );
        Ok(())
    }

    /// Every review still waiting for delivery.
    pub async fn list_pending(&self) -> Result<Vec<Review>> {
        self.store.pending_reviews().await
    }

    /// Drop a pending review by key.
    pub async fn remove(&self, created_at: i64) -> Result<bool> {
        self.store.delete_pending_review(created_at).await
    }

    /// Post every pending review and remove the confirmed ones.
    pub async fn drain<T: Transport>(&self, transport: &T) -> Result<DrainReport> {
        let pending = self.list_pending().await?;
        if pending.is_empty() {
            tracing::debug!("No pending reviews to deliver");
            return Ok(DrainReport::default());
        }

        let attempts = join_all(pending.iter().map(|review| transport.post_review(review))).await;

        let mut report = DrainReport::default();
        for (review, attempt) in pending.iter().zip(attempts) {
            match attempt {
                Ok(()) => {
                    // Delivered but still queued means a duplicate POST on the
                    // next drain; the backend accepts that.
                    if let Err(error) = self.remove(review.created_at).await {
                        tracing::warn!(
                            "Delivered review {} but could not remove it from the queue: {}",
                            review.created_at,
                            error
                        );
                    }
                    report.delivered.push(review.created_at);
                }
                Err(error) => {
                    tracing::warn!(
                        "Pending review {} not delivered, keeping it for the next sync: {}",
                        review.created_at,
                        error
                    );
                    report.retained.push(review.created_at);
                }
            }
        }

        tracing::info!(
            "Drained review queue: {} delivered, {} retained",
            report.delivered.len(),
            report.retained.len()
        );
        Ok(report)
    }
}
