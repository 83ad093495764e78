//! Fixtures and an in-process backend double shared by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use url::Url;

use crate::gateway::{AssetResponse, AssetSource, Transport};
use crate::models::{LatLng, Restaurant, RestaurantId, Review};
use crate::{Error, Result};

pub fn restaurant(id: u32, cuisine: &str, neighborhood: &str) -> Restaurant {
    Restaurant {
        id: RestaurantId::new(id),
        name: format!("Restaurant {id}"),
        neighborhood: neighborhood.to_string(),
        address: format!("{id} Main St"),
        cuisine_type: cuisine.to_string(),
        // Binary-exact coordinates survive a JSON round trip unchanged.
        latlng: LatLng {
            lat: 40.0 + f64::from(id) / 8.0,
            lng: -74.0,
        },
        photograph: Some(id.to_string()),
        operating_hours: None,
        is_favorite: false,
        created_at: None,
        updated_at: None,
        reviews: Vec::new(),
    }
}

pub fn review(restaurant_id: u32, id: u64) -> Review {
    Review {
        id: Some(id),
        restaurant_id: RestaurantId::new(restaurant_id),
        name: format!("Reviewer {id}"),
        rating: 4,
        comments: format!("Review {id}"),
        created_at: 1_500_000_000_000 + i64::try_from(id).unwrap_or_default(),
        updated_at: None,
    }
}

pub fn pending_review(restaurant_id: u32, created_at: i64) -> Review {
    Review {
        id: None,
        restaurant_id: RestaurantId::new(restaurant_id),
        name: "Pending".to_string(),
        rating: 3,
        comments: format!("Written at {created_at}"),
        created_at,
        updated_at: None,
    }
}

#[derive(Default)]
struct BackendState {
    offline: bool,
    restaurants: Vec<Restaurant>,
    reviews: HashMap<RestaurantId, Vec<Review>>,
    failing_reviews: HashSet<RestaurantId>,
    failing_posts: HashSet<i64>,
    posted: Vec<Review>,
    favorites_fail: bool,
    favorite_calls: Vec<(RestaurantId, bool)>,
    assets: HashMap<String, AssetResponse>,
    asset_requests: Vec<String>,
}

/// Scriptable stand-in for the backend and the asset origin.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<BackendState>>,
}

impl MockTransport {
    pub fn with_restaurants(restaurants: Vec<Restaurant>) -> Self {
        let transport = Self::default();
        transport.set_restaurants(restaurants);
        transport
    }

    fn state(&self) -> std::sync::MutexGuard<'_, BackendState> {
        self.state.lock().unwrap()
    }

    pub fn set_restaurants(&self, restaurants: Vec<Restaurant>) {
        self.state().restaurants = restaurants;
    }

    pub fn set_reviews(&self, restaurant_id: u32, reviews: Vec<Review>) {
        self.state()
            .reviews
            .insert(RestaurantId::new(restaurant_id), reviews);
    }

    pub fn go_offline(&self) {
        self.state().offline = true;
    }

    pub fn go_online(&self) {
        self.state().offline = false;
    }

    pub fn fail_reviews_for(&self, restaurant_id: u32) {
        self.state()
            .failing_reviews
            .insert(RestaurantId::new(restaurant_id));
    }

    pub fn fail_post_for(&self, created_at: i64) {
        self.state().failing_posts.insert(created_at);
    }

    pub fn recover_post_for(&self, created_at: i64) {
        self.state().failing_posts.remove(&created_at);
    }

    /// Creation timestamps of every accepted POST, sorted
    pub fn posted_keys(&self) -> Vec<i64> {
        let mut keys: Vec<i64> = self.state().posted.iter().map(|r| r.created_at).collect();
        keys.sort_unstable();
        keys
    }

    pub fn fail_favorites(&self) {
        self.state().favorites_fail = true;
    }

    pub fn favorite_calls(&self) -> Vec<(RestaurantId, bool)> {
        self.state().favorite_calls.clone()
    }

    pub fn serve_asset(&self, url: &str, status: u16, body: &str) {
        self.state().assets.insert(
            url.to_string(),
            AssetResponse {
                status,
                content_type: Some("text/plain".to_string()),
                body: body.as_bytes().to_vec(),
            },
        );
    }

    pub fn asset_requests(&self) -> Vec<String> {
        self.state().asset_requests.clone()
    }

    fn check_online(&self) -> Result<()> {
        if self.state().offline {
            Err(Error::Network("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Transport for MockTransport {
    async fn restaurants(&self) -> Result<Vec<Restaurant>> {
        self.check_online()?;
        Ok(self.state().restaurants.clone())
    }

    async fn reviews_for(&self, restaurant_id: RestaurantId) -> Result<Vec<Review>> {
        self.check_online()?;
        let state = self.state();
        if state.failing_reviews.contains(&restaurant_id) {
            return Err(Error::Network("HTTP 500".to_string()));
        }
        Ok(state
            .reviews
            .get(&restaurant_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn post_review(&self, review: &Review) -> Result<()> {
        self.check_online()?;
        let mut state = self.state();
        if state.failing_posts.contains(&review.created_at) {
            return Err(Error::Network("HTTP 503".to_string()));
        }
        state.posted.push(review.clone());
        Ok(())
    }

    async fn put_favorite(&self, restaurant_id: RestaurantId, is_favorite: bool) -> Result<()> {
        self.check_online()?;
        let mut state = self.state();
        if state.favorites_fail {
            return Err(Error::Network("HTTP 500".to_string()));
        }
        state.favorite_calls.push((restaurant_id, is_favorite));
        Ok(())
    }
}

impl AssetSource for MockTransport {
    async fn fetch_asset(&self, url: &Url) -> Result<AssetResponse> {
        self.check_online()?;
        let mut state = self.state();
        state.asset_requests.push(url.to_string());
        Ok(state
            .assets
            .get(url.as_str())
            .cloned()
            .unwrap_or_else(|| AssetResponse {
                status: 404,
                content_type: None,
                body: Vec::new(),
            }))
    }
}
