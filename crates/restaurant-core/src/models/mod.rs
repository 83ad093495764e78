//! Data models for Restaurant Reviews

mod asset;
pub mod lenient;
mod restaurant;
mod review;

pub use asset::CachedAsset;
pub use lenient::parse_favorite;
pub use restaurant::{LatLng, Restaurant, RestaurantId};
pub use review::{NewReview, Review, ReviewPayload, MAX_RATING, MIN_RATING};
