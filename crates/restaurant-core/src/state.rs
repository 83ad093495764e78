//! Application state owned by the presentation layer.

use serde::Serialize;

use crate::gateway::{Fetched, RestaurantGateway, Source, Transport};
use crate::models::{LatLng, Restaurant};
use crate::queries::{self, WILDCARD};

/// A map pin that links to a restaurant page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub position: LatLng,
    pub title: String,
    pub alt: String,
    pub url: String,
}

impl MapMarker {
    pub fn for_restaurant(restaurant: &Restaurant) -> Self {
        Self {
            position: restaurant.latlng,
            title: restaurant.name.clone(),
            alt: restaurant.name.clone(),
            url: restaurant.detail_url(),
        }
    }
}

/// Everything the listing page renders from.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub restaurants: Vec<Restaurant>,
    pub neighborhoods: Vec<String>,
    pub cuisines: Vec<String>,
    pub cuisine: String,
    pub neighborhood: String,
    pub markers: Vec<MapMarker>,
    /// Where the last refresh got its data
    pub source: Option<Source>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            restaurants: Vec::new(),
            neighborhoods: Vec::new(),
            cuisines: Vec::new(),
            cuisine: WILDCARD.to_string(),
            neighborhood: WILDCARD.to_string(),
            markers: Vec::new(),
            source: None,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the filter; `"all"` disables a field.
    pub fn select(&mut self, cuisine: impl Into<String>, neighborhood: impl Into<String>) {
        self.cuisine = cuisine.into();
        self.neighborhood = neighborhood.into();
    }

    /// Clear the current listing and its markers.
    pub fn reset_restaurants(&mut self) {
        self.restaurants.clear();
        self.markers.clear();
    }

    /// Rebuild the listing from one fetch, honouring the current selection.
    pub fn apply(&mut self, fetched: Fetched) {
        self.reset_restaurants();
        self.neighborhoods = queries::neighborhoods(&fetched.restaurants);
        self.cuisines = queries::cuisines(&fetched.restaurants);
        self.restaurants = queries::by_cuisine_and_neighborhood(
            fetched.restaurants,
            &self.cuisine,
            &self.neighborhood,
        );
        self.markers = self
            .restaurants
            .iter()
            .map(MapMarker::for_restaurant)
            .collect();
        self.source = Some(fetched.source);
    }

    /// Fetch once through `gateway` and rebuild everything from the result.
    pub async fn refresh<T: Transport>(&mut self, gateway: &RestaurantGateway<T>) {
        let fetched = gateway.fetch_restaurants().await;
        self.apply(fetched);
    }
}
