use std::path::{Path, PathBuf};

use chrono::DateTime;
use restaurant_core::config::ENV_DB_PATH;
use restaurant_core::worker::AssetManifest;
use restaurant_core::{
    AssetWorker, ClientConfig, HttpTransport, LocalStore, Restaurant, RestaurantGateway, Review,
    Source, SyncManager,
};
use serde::Serialize;

use crate::error::CliError;

/// Everything a command needs: resolved config, the local store and a client.
pub struct Session {
    pub config: ClientConfig,
    pub store: LocalStore,
    pub transport: HttpTransport,
}

impl Session {
    pub async fn open(
        cli_db_path: Option<PathBuf>,
        cli_api_url: Option<String>,
    ) -> Result<Self, CliError> {
        let mut config = ClientConfig::from_env()?;
        if let Some(api_url) = cli_api_url {
            config.api_base_url = api_url;
        }
        let db_path = resolve_db_path(cli_db_path, config.db_path.take())?;

        let transport = HttpTransport::new(config.api_base_url.clone(), config.request_timeout)?;
        let store = LocalStore::open_path(&db_path).await?;
        tracing::debug!("Using local store {}", db_path.display());
        config.db_path = Some(db_path);

        Ok(Self {
            config,
            store,
            transport,
        })
    }

    pub fn gateway(&self) -> RestaurantGateway<HttpTransport> {
        RestaurantGateway::new(self.transport.clone(), self.store.clone())
    }

    pub fn worker(&self, manifest: AssetManifest) -> AssetWorker<HttpTransport> {
        AssetWorker::new(
            self.transport.clone(),
            self.store.clone(),
            SyncManager::new(),
            manifest,
            self.config.app_origin.clone(),
        )
    }
}

pub fn resolve_db_path(
    cli_db_path: Option<PathBuf>,
    env_db_path: Option<PathBuf>,
) -> Result<PathBuf, CliError> {
    if let Some(path) = cli_db_path.or(env_db_path) {
        return Ok(path);
    }
    default_db_path()
}

pub fn default_db_path() -> Result<PathBuf, CliError> {
    dirs::data_dir()
        .map(|dir| dir.join("restaurants").join("restaurants.db"))
        .ok_or_else(|| {
            CliError::Config(format!(
                "could not resolve a data directory; set {ENV_DB_PATH} or pass --db-path"
            ))
        })
}

#[derive(Debug, Serialize)]
pub struct RestaurantListItem {
    pub id: u32,
    pub name: String,
    pub neighborhood: String,
    pub cuisine: String,
    pub address: String,
    pub is_favorite: bool,
    pub average_rating: Option<f64>,
    pub review_count: usize,
    pub image_url: String,
    pub detail_url: String,
}

pub fn restaurant_to_list_item(restaurant: &Restaurant) -> RestaurantListItem {
    RestaurantListItem {
        id: restaurant.id.get(),
        name: restaurant.name.clone(),
        neighborhood: restaurant.neighborhood.clone(),
        cuisine: restaurant.cuisine_type.clone(),
        address: restaurant.address.clone(),
        is_favorite: restaurant.is_favorite,
        average_rating: restaurant.average_rating(),
        review_count: restaurant.reviews.len(),
        image_url: restaurant.image_url(),
        detail_url: restaurant.detail_url(),
    }
}

pub fn format_restaurant_lines(restaurants: &[Restaurant]) -> Vec<String> {
    restaurants
        .iter()
        .map(|restaurant| {
            let favorite = if restaurant.is_favorite { "*" } else { " " };
            let rating = restaurant
                .average_rating()
                .map_or_else(|| "  -".to_string(), |average| format!("{average:.1}"));
            format!(
                "{:>3} {favorite} {:<32}  {:<12}  {:<10}  {rating}",
                restaurant.id.get(),
                truncate(&restaurant.name, 32),
                truncate(&restaurant.cuisine_type, 12),
                truncate(&restaurant.neighborhood, 10),
            )
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct PendingReviewItem {
    pub created_at: i64,
    pub created_at_iso: String,
    pub restaurant_id: u32,
    pub name: String,
    pub rating: u8,
    pub comments: String,
}

pub fn pending_review_to_item(review: &Review) -> PendingReviewItem {
    PendingReviewItem {
        created_at: review.created_at,
        created_at_iso: format_timestamp(review.created_at),
        restaurant_id: review.restaurant_id.get(),
        name: review.name.clone(),
        rating: review.rating,
        comments: review.comments.clone(),
    }
}

pub fn format_review_lines(reviews: &[Review]) -> Vec<String> {
    reviews
        .iter()
        .map(|review| {
            format!(
                "{}  {}  {}: {}",
                format_timestamp(review.created_at),
                format_stars(review.rating),
                review.name,
                truncate(&review.comments, 60)
            )
        })
        .collect()
}

pub fn format_stars(rating: u8) -> String {
    let filled = usize::from(rating.min(5));
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

pub fn format_timestamp(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M UTC").to_string(),
    )
}

pub const fn source_label(source: Source) -> &'static str {
    match source {
        Source::Network => "network",
        Source::Cache => "cache",
    }
}

pub fn truncate(value: &str, max_chars: usize) -> String {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let mut truncated = collapsed
            .chars()
            .take(max_chars.saturating_sub(3))
            .collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn write_output(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    Ok(())
}
