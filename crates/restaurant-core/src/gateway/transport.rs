//! Seams between the client and the network.

use url::Url;

use crate::models::{Restaurant, RestaurantId, Review};
use crate::Result;

/// The backend REST contract.
///
/// Rejected requests and non-2xx responses surface as `Error::Network`.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// `GET /restaurants`, without reviews
    async fn restaurants(&self) -> Result<Vec<Restaurant>>;

    /// `GET /reviews/?restaurant_id={id}`
    async fn reviews_for(&self, restaurant_id: RestaurantId) -> Result<Vec<Review>>;

    /// `POST /reviews/`
    async fn post_review(&self, review: &Review) -> Result<()>;

    /// `PUT /restaurants/{id}/?is_favorite={bool}`
    async fn put_favorite(&self, restaurant_id: RestaurantId, is_favorite: bool) -> Result<()>;
}

/// A raw response for a static asset request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl AssetResponse {
    /// Whether the status is in the 2xx range
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Network access for static assets.
///
/// Unlike `Transport`, any HTTP status is a valid response here; only
/// transport-level failures are errors.
#[allow(async_fn_in_trait)]
pub trait AssetSource {
    async fn fetch_asset(&self, url: &Url) -> Result<AssetResponse>;
}
