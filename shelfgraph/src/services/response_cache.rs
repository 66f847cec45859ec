//! SQLite cache of catalog response bodies
//!
//! Keyed by endpoint and query parameters (never the API key). Identical
//! requests are idempotent reads, so a hit is served without touching the
//! network or the rate limiter.

use chrono::{DateTime, Duration, Utc};
use shelfgraph_common::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Response body cache backed by SQLite
#[derive(Clone)]
pub struct ResponseCache {
    pool: SqlitePool,
    ttl: Option<Duration>,
}

impl ResponseCache {
    /// Open (or create) the cache database at `path`
    pub async fn open(path: &Path, ttl: Option<Duration>) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // mode=rwc: read, write, create
        let db_url = format!("sqlite://{}?mode=rwc", path.display());
        debug!("Connecting to response cache: {}", db_url);

        let pool = SqlitePool::connect(&db_url).await?;
        Self::with_pool(pool, ttl).await
    }

    /// Cache that lives only as long as the process
    pub async fn in_memory(ttl: Option<Duration>) -> Result<Self> {
        // One connection: every :memory: connection is a separate database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::with_pool(pool, ttl).await
    }

    async fn with_pool(pool: SqlitePool, ttl: Option<Duration>) -> Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS responses (
                cache_key TEXT PRIMARY KEY,
                body TEXT NOT NULL,
                fetched_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool, ttl })
    }

    /// Stable key for an endpoint and its parameters
    pub fn cache_key(endpoint: &str, params: &BTreeMap<String, String>) -> String {
        let query: Vec<String> = params.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        format!("{}?{}", endpoint, query.join("&"))
    }

    /// Cached body for `key`, if present and not expired
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String, DateTime<Utc>)> =
            sqlx::query_as("SELECT body, fetched_at FROM responses WHERE cache_key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.and_then(|(body, fetched_at)| {
            match self.ttl {
                Some(ttl) if Utc::now() - fetched_at > ttl => {
                    debug!(key = %key, fetched_at = %fetched_at, "Cached response expired");
                    None
                }
                _ => Some(body),
            }
        }))
    }

    /// Store `body` under `key`, replacing any previous entry
    pub async fn put(&self, key: &str, body: &str) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO responses (cache_key, body, fetched_at) VALUES (?, ?, ?)",
        )
        .bind(key)
        .bind(body)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
