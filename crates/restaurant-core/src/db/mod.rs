//! Local store for Restaurant Reviews

mod asset_repository;
mod connection;
mod migrations;
mod restaurant_repository;
mod review_repository;

pub use asset_repository::{AssetCacheRepository, LibSqlAssetCacheRepository};
pub use connection::Database;
pub use restaurant_repository::{LibSqlRestaurantRepository, RestaurantRepository};
pub use review_repository::{LibSqlPendingReviewRepository, PendingReviewRepository};
