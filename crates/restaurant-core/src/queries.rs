//! Pure filters and projections over a fetched restaurant set.

use crate::models::{Restaurant, RestaurantId};
use crate::util::distinct_in_order;

/// Filter value that disables a cuisine or neighborhood filter
pub const WILDCARD: &str = "all";

fn matches(filter: &str, value: &str) -> bool {
    filter == WILDCARD || filter == value
}

/// The restaurant with the given id
pub fn by_id(restaurants: &[Restaurant], id: RestaurantId) -> Option<&Restaurant> {
    restaurants.iter().find(|restaurant| restaurant.id == id)
}

/// Restaurants serving exactly `cuisine`
pub fn by_cuisine(restaurants: Vec<Restaurant>, cuisine: &str) -> Vec<Restaurant> {
    restaurants
        .into_iter()
        .filter(|restaurant| restaurant.cuisine_type == cuisine)
        .collect()
}

/// Restaurants located exactly in `neighborhood`
pub fn by_neighborhood(restaurants: Vec<Restaurant>, neighborhood: &str) -> Vec<Restaurant> {
    restaurants
        .into_iter()
        .filter(|restaurant| restaurant.neighborhood == neighborhood)
        .collect()
}

/// Restaurants matching both filters; `"all"` disables either one
pub fn by_cuisine_and_neighborhood(
    restaurants: Vec<Restaurant>,
    cuisine: &str,
    neighborhood: &str,
) -> Vec<Restaurant> {
    restaurants
        .into_iter()
        .filter(|restaurant| {
            matches(cuisine, &restaurant.cuisine_type)
                && matches(neighborhood, &restaurant.neighborhood)
        })
        .collect()
}

/// Distinct neighborhoods in first-appearance order
pub fn neighborhoods(restaurants: &[Restaurant]) -> Vec<String> {
    distinct_in_order(
        restaurants
            .iter()
            .map(|restaurant| restaurant.neighborhood.clone()),
    )
}

/// Distinct cuisines in first-appearance order
pub fn cuisines(restaurants: &[Restaurant]) -> Vec<String> {
    distinct_in_order(
        restaurants
            .iter()
            .map(|restaurant| restaurant.cuisine_type.clone()),
    )
}
