//! restaurant-core - Offline cache and sync for Restaurant Reviews
//!
//! This crate contains the models, local store, backend gateway, deferred
//! review queue and asset cache worker used by the restaurant reviews client.

pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod models;
pub mod queries;
pub mod queue;
pub mod services;
pub mod state;
pub mod util;
pub mod worker;

#[cfg(test)]
mod testing;

pub use config::ClientConfig;
pub use error::{Error, Result};
pub use gateway::{
    Delivery, FavoriteUpdate, Fetched, HttpTransport, RestaurantGateway, Source, Transport,
};
pub use models::{NewReview, Restaurant, RestaurantId, Review};
pub use queue::{DrainReport, ReviewQueue};
pub use services::LocalStore;
pub use state::{AppState, MapMarker};
pub use worker::{AssetManifest, AssetWorker, SyncManager, WorkerState, SYNC_NEW_REVIEWS};
