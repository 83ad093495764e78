//! Database migrations

use crate::error::{Error, Result};
use libsql::Connection;

/// Current schema version
pub const CURRENT_VERSION: i32 = 2;

/// Run all pending migrations
pub async fn run(conn: &Connection) -> Result<()> {
    let version = get_version(conn).await?;
    if version > CURRENT_VERSION {
        return Err(Error::Database(format!(
            "local store schema version {version} is newer than supported version {CURRENT_VERSION}"
        )));
    }

    if version < 1 {
        migrate_v1(conn).await?;
    }
    if version < 2 {
        migrate_v2(conn).await?;
    }

    Ok(())
}

/// Get the current schema version
pub async fn get_version(conn: &Connection) -> Result<i32> {
    let mut rows = conn
        .query(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            (),
        )
        .await?;

    let exists: bool = if let Some(row) = rows.next().await? {
        row.get::<i32>(0)? != 0
    } else {
        false
    };

    if !exists {
        return Ok(0);
    }

    let mut rows = conn
        .query("SELECT COALESCE(MAX(version), 0) FROM schema_version", ())
        .await?;

    let version: i32 = if let Some(row) = rows.next().await? {
        row.get(0)?
    } else {
        0
    };

    Ok(version)
}

async fn apply(conn: &Connection, version: i32, statements: &[&str]) -> Result<()> {
    // libsql doesn't have execute_batch, so we run each statement separately
    conn.execute("BEGIN TRANSACTION", ()).await?;

    for stmt in statements {
        if let Err(e) = conn.execute(stmt, ()).await {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }
    }

    if let Err(e) = conn
        .execute(
            "INSERT INTO schema_version (version) VALUES (?)",
            [i64::from(version)],
        )
        .await
    {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e.into());
    }

    if let Err(e) = conn.execute("COMMIT", ()).await {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e.into());
    }

    tracing::info!("Migrated local store to version {version}");
    Ok(())
}

/// Migration to version 1: restaurant snapshot and pending review collections
async fn migrate_v1(conn: &Connection) -> Result<()> {
    apply(
        conn,
        1,
        &[
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            )",
            // Keyed by restaurant id; body is the JSON record including reviews
            "CREATE TABLE IF NOT EXISTS restaurants (
                id INTEGER PRIMARY KEY,
                body TEXT NOT NULL
            )",
            // Keyed by creation timestamp; holds only undelivered reviews
            "CREATE TABLE IF NOT EXISTS reviews (
                created_at INTEGER PRIMARY KEY,
                restaurant_id INTEGER NOT NULL,
                body TEXT NOT NULL
            )",
            "CREATE INDEX IF NOT EXISTS idx_reviews_restaurant ON reviews(restaurant_id)",
        ],
    )
    .await
}

/// Migration to version 2: asset cache buckets
async fn migrate_v2(conn: &Connection) -> Result<()> {
    apply(
        conn,
        2,
        &[
            "CREATE TABLE IF NOT EXISTS cache_buckets (
                name TEXT PRIMARY KEY,
                created_at INTEGER NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS cache_entries (
                bucket TEXT NOT NULL REFERENCES cache_buckets(name) ON DELETE CASCADE,
                url TEXT NOT NULL,
                status INTEGER NOT NULL,
                content_type TEXT,
                body BLOB NOT NULL,
                cached_at INTEGER NOT NULL,
                PRIMARY KEY (bucket, url)
            )",
        ],
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[tokio::test(flavor = "multi_thread")]
    async fn fresh_database_is_at_current_version() {
        let db = Database::open_in_memory().await.unwrap();
        let version = get_version(db.connection()).await.unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rerunning_migrations_is_a_no_op() {
        let db = Database::open_in_memory().await.unwrap();
        run(db.connection()).await.unwrap();

        let mut rows = db
            .connection()
            .query("SELECT COUNT(*) FROM schema_version", ())
            .await
            .unwrap();
        let count: i64 = rows.next().await.unwrap().unwrap().get(0).unwrap();
        assert_eq!(count, i64::from(CURRENT_VERSION));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn newer_schema_is_refused() {
        let db = Database::open_in_memory().await.unwrap();
        db.connection()
            .execute("INSERT INTO schema_version (version) VALUES (?)", [99_i64])
            .await
            .unwrap();

        match run(db.connection()).await.unwrap_err() {
            Error::Database(message) => assert!(message.contains("99")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
