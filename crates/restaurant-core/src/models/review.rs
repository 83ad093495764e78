//! Review model

use serde::{Deserialize, Serialize};

use super::lenient;
use super::RestaurantId;
use crate::error::{Error, Result};

/// Lowest accepted star rating
pub const MIN_RATING: u8 = 1;
/// Highest accepted star rating
pub const MAX_RATING: u8 = 5;

/// A review attached to a restaurant, or waiting in the pending queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Server-assigned id; absent until the backend has accepted the review
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub restaurant_id: RestaurantId,
    /// Author name
    pub name: String,
    #[serde(deserialize_with = "lenient::rating")]
    pub rating: u8,
    pub comments: String,
    /// Creation timestamp (Unix ms); the key of a pending review
    #[serde(rename = "createdAt", default, deserialize_with = "lenient::timestamp")]
    pub created_at: i64,
    #[serde(
        rename = "updatedAt",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_timestamp"
    )]
    pub updated_at: Option<i64>,
}

/// A review as entered by the user, before it is stamped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub name: String,
    pub rating: u8,
    pub comments: String,
}

impl NewReview {
    pub fn new(name: impl Into<String>, rating: u8, comments: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rating,
            comments: comments.into(),
        }
    }

    /// Reject empty authors/comments and out-of-range ratings
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput("review author cannot be empty".into()));
        }
        if self.comments.trim().is_empty() {
            return Err(Error::InvalidInput("review comments cannot be empty".into()));
        }
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(Error::InvalidInput(format!(
                "rating must be between {MIN_RATING} and {MAX_RATING}, got {}",
                self.rating
            )));
        }
        Ok(())
    }
}

/// Body of `POST /reviews/`: the review without id or timestamps
#[derive(Debug, Serialize)]
pub struct ReviewPayload<'a> {
    pub restaurant_id: RestaurantId,
    pub name: &'a str,
    pub rating: u8,
    pub comments: &'a str,
}

impl Review {
    /// Stamp a user-entered review for a restaurant
    #[must_use]
    pub fn from_submission(
        restaurant_id: RestaurantId,
        review: NewReview,
        created_at: i64,
    ) -> Self {
        Self {
            id: None,
            restaurant_id,
            name: review.name.trim().to_string(),
            rating: review.rating,
            comments: review.comments.trim().to_string(),
            created_at,
            updated_at: None,
        }
    }

    /// Wire form sent to the backend
    #[must_use]
    pub fn payload(&self) -> ReviewPayload<'_> {
        ReviewPayload {
            restaurant_id: self.restaurant_id,
            name: &self.name,
            rating: self.rating,
            comments: &self.comments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn decodes_reviews_written_through_the_api() {
        let review: Review = serde_json::from_value(json!({
            "id": 31,
            "restaurant_id": "3",
            "name": "Kim",
            "rating": "4",
            "comments": "Great dumplings",
            "createdAt": "1532030400000",
            "updatedAt": "2018-07-19T20:00:00.000Z"
        }))
        .unwrap();

        assert_eq!(review.id, Some(31));
        assert_eq!(review.restaurant_id, RestaurantId::new(3));
        assert_eq!(review.rating, 4);
        assert_eq!(review.created_at, 1_532_030_400_000);
        assert_eq!(review.updated_at, Some(1_532_030_400_000));
    }

    #[test]
    fn rejects_unparseable_rating() {
        let result = serde_json::from_value::<Review>(json!({
            "restaurant_id": 1,
            "name": "Kim",
            "rating": "lots",
            "comments": "?"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn payload_omits_keys_and_timestamps() {
        let review = Review::from_submission(
            RestaurantId::new(2),
            NewReview::new("  Ana ", 5, " Loved it "),
            1_700_000_000_000,
        );

        let payload = serde_json::to_value(review.payload()).unwrap();
        assert_eq!(
            payload,
            json!({
                "restaurant_id": 2,
                "name": "Ana",
                "rating": 5,
                "comments": "Loved it"
            })
        );
    }

    #[test]
    fn validate_checks_author_comments_and_rating() {
        assert!(NewReview::new("Ana", 3, "ok").validate().is_ok());
        assert!(NewReview::new(" ", 3, "ok").validate().is_err());
        assert!(NewReview::new("Ana", 3, "").validate().is_err());
        assert!(NewReview::new("Ana", 0, "ok").validate().is_err());
        assert!(NewReview::new("Ana", 6, "ok").validate().is_err());
    }
}
