//! Restaurant model

use std::collections::BTreeMap;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use super::lenient;
use super::Review;

/// Backend-assigned restaurant identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RestaurantId(u32);

impl RestaurantId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for RestaurantId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for RestaurantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RestaurantId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

// Reviews posted through the REST API echo `restaurant_id` back as a string.
impl<'de> Deserialize<'de> for RestaurantId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u32),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Number(id) => Ok(Self(id)),
            RawId::Text(text) => text
                .parse()
                .map_err(|_| serde::de::Error::custom(format!("invalid restaurant id: {text}"))),
        }
    }
}

/// Geographic coordinate of a restaurant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// A restaurant as served by the backend and mirrored in the local store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    /// Unique identifier
    pub id: RestaurantId,
    pub name: String,
    pub neighborhood: String,
    pub address: String,
    pub cuisine_type: String,
    pub latlng: LatLng,
    /// Photo reference; image URLs fall back to the id when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photograph: Option<String>,
    /// Day name to opening hours text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_hours: Option<BTreeMap<String, String>>,
    #[serde(default, deserialize_with = "lenient::favorite")]
    pub is_favorite: bool,
    #[serde(
        rename = "createdAt",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_timestamp"
    )]
    pub created_at: Option<i64>,
    #[serde(
        rename = "updatedAt",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_timestamp"
    )]
    pub updated_at: Option<i64>,
    /// Reviews attached at fetch time
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Restaurant {
    /// Relative URL of the restaurant detail page
    #[must_use]
    pub fn detail_url(&self) -> String {
        format!("./restaurant.html?id={}", self.id)
    }

    /// Image path, using the photograph reference or the id
    #[must_use]
    pub fn image_url(&self) -> String {
        match self.photograph.as_deref().map(str::trim) {
            Some(photo) if !photo.is_empty() => format!("/img/{photo}.jpg"),
            _ => format!("/img/{}.jpg", self.id),
        }
    }

    /// Average review rating, if any reviews are attached
    #[must_use]
    pub fn average_rating(&self) -> Option<f64> {
        if self.reviews.is_empty() {
            return None;
        }
        let total: u32 = self.reviews.iter().map(|review| u32::from(review.rating)).sum();
        Some(f64::from(total) / f64::from(u32::try_from(self.reviews.len()).unwrap_or(u32::MAX)))
    }
}
