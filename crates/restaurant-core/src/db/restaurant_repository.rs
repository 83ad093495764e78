//! Restaurant snapshot repository implementation

use crate::error::Result;
use crate::models::{Restaurant, RestaurantId};
use libsql::Connection;

use super::connection::in_transaction;

/// Trait for the `restaurants` collection (async)
#[allow(async_fn_in_trait)]
pub trait RestaurantRepository {
    /// Get a restaurant by id
    async fn get(&self, id: RestaurantId) -> Result<Option<Restaurant>>;

    /// Insert or overwrite one restaurant
    async fn put(&self, restaurant: &Restaurant) -> Result<()>;

    /// Delete one restaurant, returning whether it existed
    async fn delete(&self, id: RestaurantId) -> Result<bool>;

    /// Every stored restaurant, ordered by id
    async fn get_all(&self) -> Result<Vec<Restaurant>>;

    /// Replace the whole collection with `restaurants` in one transaction
    async fn replace_all(&self, restaurants: &[Restaurant]) -> Result<()>;
}

/// libSQL implementation of `RestaurantRepository`
pub struct LibSqlRestaurantRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlRestaurantRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    async fn insert(&self, restaurant: &Restaurant) -> Result<()> {
        let body = serde_json::to_string(restaurant)?;
        self.conn
            .execute(
                "INSERT OR REPLACE INTO restaurants (id, body) VALUES (?, ?)",
                libsql::params![i64::from(restaurant.id.get()), body],
            )
            .await?;
        Ok(())
    }

    fn parse_restaurant(row: &libsql::Row) -> Result<Restaurant> {
        let body: String = row.get(0)?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl RestaurantRepository for LibSqlRestaurantRepository<'_> {
    async fn get(&self, id: RestaurantId) -> Result<Option<Restaurant>> {
        let mut rows = self
            .conn
            .query(
                "SELECT body FROM restaurants WHERE id = ?",
                [i64::from(id.get())],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_restaurant(&row)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, restaurant: &Restaurant) -> Result<()> {
        self.insert(restaurant).await
    }

    async fn delete(&self, id: RestaurantId) -> Result<bool> {
        let rows = self
            .conn
            .execute(
                "DELETE FROM restaurants WHERE id = ?",
                [i64::from(id.get())],
            )
            .await?;
        Ok(rows > 0)
    }

    async fn get_all(&self) -> Result<Vec<Restaurant>> {
        let mut rows = self
            .conn
            .query("SELECT body, id FROM restaurants ORDER BY id", ())
            .await?;

        let mut restaurants = Vec::new();
        while let Some(row) = rows.next().await? {
            match Self::parse_restaurant(&row) {
                Ok(restaurant) => restaurants.push(restaurant),
                Err(error) => {
                    let id: i64 = row.get(1)?;
                    tracing::warn!("Skipping unreadable cached restaurant {id}: {error}");
                }
            }
        }
        Ok(restaurants)
    }

    async fn replace_all(&self, restaurants: &[Restaurant]) -> Result<()> {
        in_transaction(self.conn, || async move {
            let removed = self.conn.execute("DELETE FROM restaurants", ()).await?;
            for restaurant in restaurants {
                self.insert(restaurant).await?;
            }
            tracing::debug!(
                "Replaced restaurant snapshot: removed {removed}, stored {}",
                restaurants.len()
            );
            Ok(())
        })
        .await
    }
}
