//! reqwest-backed implementation of the backend contract.

use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::Deserialize;
use url::Url;

use super::transport::{AssetResponse, AssetSource, Transport};
use crate::models::{Restaurant, RestaurantId, Review};
use crate::util::{compact_text, is_http_url, normalize_text_option};
use crate::{Error, Result};

/// HTTP client for the restaurant backend and static asset origin.
#[derive(Clone)]
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Build a client for `base_url`; every request is bounded by `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, client })
    }

    /// Backend base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn restaurants_url(&self) -> String {
        format!("{}/restaurants", self.base_url)
    }

    fn reviews_url(&self, restaurant_id: RestaurantId) -> String {
        format!("{}/reviews/?restaurant_id={restaurant_id}", self.base_url)
    }

    fn new_review_url(&self) -> String {
        format!("{}/reviews/", self.base_url)
    }

    fn favorite_url(&self, restaurant_id: RestaurantId, is_favorite: bool) -> String {
        format!(
            "{}/restaurants/{restaurant_id}/?is_favorite={is_favorite}",
            self.base_url
        )
    }
}

impl Transport for HttpTransport {
    async fn restaurants(&self) -> Result<Vec<Restaurant>> {
        let response = self.client.get(self.restaurants_url()).send().await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn reviews_for(&self, restaurant_id: RestaurantId) -> Result<Vec<Review>> {
        let response = self
            .client
            .get(self.reviews_url(restaurant_id))
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn post_review(&self, review: &Review) -> Result<()> {
        let response = self
            .client
            .post(self.new_review_url())
            .json(&review.payload())
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn put_favorite(&self, restaurant_id: RestaurantId, is_favorite: bool) -> Result<()> {
        let response = self
            .client
            .put(self.favorite_url(restaurant_id, is_favorite))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

impl AssetSource for HttpTransport {
    async fn fetch_asset(&self, url: &Url) -> Result<AssetResponse> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        Ok(AssetResponse {
            status,
            content_type,
            body,
        })
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(Error::Network(parse_api_error(status, &body)))
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", compact_text(&message), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

fn normalize_base_url(raw: String) -> Result<String> {
    let base_url = normalize_text_option(Some(raw))
        .ok_or_else(|| Error::Config("backend URL must not be empty".to_string()))?;
    if !is_http_url(&base_url) {
        return Err(Error::Config(
            "backend URL must include http:// or https://".to_string(),
        ));
    }
    Url::parse(&base_url).map_err(|error| Error::Config(format!("invalid backend URL: {error}")))?;
    Ok(base_url.trim_end_matches('/').to_string())
}
