//! Remote data gateway with local-store fallback.
//!
//! Every listing operation goes through [`RestaurantGateway::fetch_restaurants`]:
//! a successful network fetch replaces the cached snapshot wholesale, a failed
//! one serves the last snapshot instead. Network failures never reach the
//! caller from listing operations.

mod http;
mod transport;

pub use http::HttpTransport;
pub use transport::{AssetResponse, AssetSource, Transport};

use futures::future::join_all;

use crate::models::{NewReview, Restaurant, RestaurantId, Review};
use crate::queries;
use crate::queue::ReviewQueue;
use crate::services::LocalStore;
use crate::util::unix_millis_now;
use crate::worker::{SyncManager, SYNC_NEW_REVIEWS};
use crate::{Error, Result};

/// Where a response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Network,
    Cache,
}

/// Result of a restaurant listing fetch
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    pub restaurants: Vec<Restaurant>,
    pub source: Source,
    /// Restaurants whose review sub-fetch failed; their reviews were carried
    /// over from the previous snapshot
    pub missing_reviews: Vec<RestaurantId>,
}

/// Outcome of a favorite toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FavoriteUpdate {
    pub stored_locally: bool,
    pub confirmed: bool,
}

/// How a submitted review left the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Posted directly and accepted
    Sent,
    /// Queued for the next background sync
    Deferred { created_at: i64 },
}

/// Restaurant data access for the page context.
pub struct RestaurantGateway<T> {
    transport: T,
    store: LocalStore,
    queue: ReviewQueue,
    background_sync: Option<SyncManager>,
}

impl<T: Transport> RestaurantGateway<T> {
    /// Gateway that posts reviews directly.
    pub fn new(transport: T, store: LocalStore) -> Self {
        let queue = ReviewQueue::new(store.clone());
        Self {
            transport,
            store,
            queue,
            background_sync: None,
        }
    }

    /// Defer review delivery to background sync through `sync`.
    #[must_use]
    pub fn with_background_sync(mut self, sync: SyncManager) -> Self {
        self.background_sync = Some(sync);
        self
    }

    pub const fn store(&self) -> &LocalStore {
        &self.store
    }

    pub const fn queue(&self) -> &ReviewQueue {
        &self.queue
    }

    /// All restaurants with their reviews, from the network when reachable.
    pub async fn fetch_restaurants(&self) -> Fetched {
        match self.transport.restaurants().await {
            Ok(restaurants) => {
                let (restaurants, missing_reviews) = self.attach_reviews(restaurants).await;
                if let Err(error) = self.store.replace_restaurants(&restaurants).await {
                    tracing::warn!("Failed to update cached restaurants: {}", error);
                }
                tracing::debug!("Fetched {} restaurants from network", restaurants.len());
                Fetched {
                    restaurants,
                    source: Source::Network,
                    missing_reviews,
                }
            }
            Err(error) => {
                tracing::warn!("Restaurant fetch failed, serving cached data: {}", error);
                Fetched {
                    restaurants: self.cached_restaurants().await,
                    source: Source::Cache,
                    missing_reviews: Vec::new(),
                }
            }
        }
    }

    async fn cached_restaurants(&self) -> Vec<Restaurant> {
        self.store.all_restaurants().await.unwrap_or_else(|error| {
            tracing::warn!("Failed to read cached restaurants: {}", error);
            Vec::new()
        })
    }

    async fn attach_reviews(
        &self,
        mut restaurants: Vec<Restaurant>,
    ) -> (Vec<Restaurant>, Vec<RestaurantId>) {
        let results = join_all(
            restaurants
                .iter()
                .map(|restaurant| self.transport.reviews_for(restaurant.id)),
        )
        .await;

        let mut missing = Vec::new();
        for (restaurant, result) in restaurants.iter_mut().zip(results) {
            match result {
                Ok(reviews) => {
                    let id = restaurant.id;
                    restaurant.reviews = reviews
                        .into_iter()
                        .filter(|review| {
                            let belongs = review.restaurant_id == id;
                            if !belongs {
                                tracing::warn!(
                                    "Dropping review {} filed under restaurant {} but fetched for {}",
                                    review.created_at,
                                    review.restaurant_id,
                                    id
                                );
                            }
                            belongs
                        })
                        .collect();
                }
                Err(error) => {
                    tracing::warn!(
                        "Failed to fetch reviews for restaurant {}: {}",
                        restaurant.id,
                        error
                    );
                    missing.push(restaurant.id);
                }
            }
        }

        if !missing.is_empty() {
            let cached = self.cached_restaurants().await;
            for restaurant in &mut restaurants {
                if !missing.contains(&restaurant.id) {
                    continue;
                }
                if let Some(previous) = queries::by_id(&cached, restaurant.id) {
                    restaurant.reviews.clone_from(&previous.reviews);
                }
            }
        }

        (restaurants, missing)
    }

    /// One restaurant, or `Error::NotFound`.
    pub async fn fetch_restaurant_by_id(&self, id: RestaurantId) -> Result<Restaurant> {
        let fetched = self.fetch_restaurants().await;
        queries::by_id(&fetched.restaurants, id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("restaurant {id}")))
    }

    pub async fn fetch_by_cuisine(&self, cuisine: &str) -> Vec<Restaurant> {
        queries::by_cuisine(self.fetch_restaurants().await.restaurants, cuisine)
    }

    pub async fn fetch_by_neighborhood(&self, neighborhood: &str) -> Vec<Restaurant> {
        queries::by_neighborhood(self.fetch_restaurants().await.restaurants, neighborhood)
    }

    pub async fn fetch_by_cuisine_and_neighborhood(
        &self,
        cuisine: &str,
        neighborhood: &str,
    ) -> Vec<Restaurant> {
        queries::by_cuisine_and_neighborhood(
            self.fetch_restaurants().await.restaurants,
            cuisine,
            neighborhood,
        )
    }

    pub async fn fetch_neighborhoods(&self) -> Vec<String> {
        queries::neighborhoods(&self.fetch_restaurants().await.restaurants)
    }

    pub async fn fetch_cuisines(&self) -> Vec<String> {
        queries::cuisines(&self.fetch_restaurants().await.restaurants)
    }

    /// Set the favorite flag locally, then on the backend.
    ///
    /// The local update is kept even when the backend rejects it.
    pub async fn set_favorite(
        &self,
        restaurant: &mut Restaurant,
        is_favorite: bool,
    ) -> FavoriteUpdate {
        restaurant.is_favorite = is_favorite;

        let stored_locally = match self.store.put_restaurant(restaurant).await {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(
                    "Failed to store favorite for restaurant {}: {}",
                    restaurant.id,
                    error
                );
                false
            }
        };

        let confirmed = match self.transport.put_favorite(restaurant.id, is_favorite).await {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(
                    "Backend did not confirm favorite for restaurant {}: {}",
                    restaurant.id,
                    error
                );
                false
            }
        };

        FavoriteUpdate {
            stored_locally,
            confirmed,
        }
    }

    /// Append a review locally, then deliver it or queue it for background sync.
    ///
    /// A failed direct POST is returned as `Error::Network`; the local append
    /// stays in place.
    pub async fn submit_review(
        &self,
        restaurant: &mut Restaurant,
        review: NewReview,
    ) -> Result<Delivery> {
        review.validate()?;

        let created_at = match self.background_sync {
            Some(_) => self.unused_pending_key(unix_millis_now()).await?,
            None => unix_millis_now(),
        };
        let review = Review::from_submission(restaurant.id, review, created_at);

        restaurant.reviews.push(review.clone());
        if let Err(error) = self.store.put_restaurant(restaurant).await {
            tracing::warn!(
                "Failed to store review locally for restaurant {}: {}",
                restaurant.id,
                error
            );
        }

        if let Some(sync) = &self.background_sync {
            self.queue.enqueue(&review).await?;
            sync.register(SYNC_NEW_REVIEWS);
            return Ok(Delivery::Deferred { created_at });
        }

        self.transport.post_review(&review).await?;
        tracing::info!("Posted review for restaurant {}", restaurant.id);
        Ok(Delivery::Sent)
    }

    async fn unused_pending_key(&self, mut created_at: i64) -> Result<i64> {
        while self.store.get_pending_review(created_at).await?.is_some() {
            created_at += 1;
        }
        Ok(created_at)
    }
}
