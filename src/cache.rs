use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, warn};

use crate::error::FetchError;

/// Responses older than this are treated as absent.
pub const DEFAULT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Keyed store of past responses.
pub trait ResponseCache {
    /// Return the stored body for `key`, or run `fetch` and store what it
    /// returns. Failed fetches are never stored.
    fn get_or_fetch(
        &self,
        key: &str,
        fetch: &mut dyn FnMut() -> Result<String, FetchError>,
    ) -> Result<String, FetchError>;
}

/// Pass-through used when caching is disabled.
pub struct NoCache;

impl ResponseCache for NoCache {
    fn get_or_fetch(
        &self,
        _key: &str,
        fetch: &mut dyn FnMut() -> Result<String, FetchError>,
    ) -> Result<String, FetchError> {
        fetch()
    }
}

/// SQLite-backed response cache with a fixed expiry.
pub struct SqliteCache {
    conn: Connection,
    ttl: Duration,
}

impl SqliteCache {
    /// Open (or create) `http_cache.db` under `dir`.
    pub fn open(dir: &Path, ttl: Duration) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Could not create cache directory {}", dir.display()))?;
        let db_path = dir.join("http_cache.db");
        let conn = Connection::open(&db_path)
            .with_context(|| format!("Could not open cache {}", db_path.display()))?;
        Self::with_connection(conn, ttl)
    }

    /// Default location: the platform cache directory.
    pub fn default_dir() -> Result<std::path::PathBuf> {
        Ok(dirs::cache_dir()
            .context("Could not determine cache directory")?
            .join("citegraph"))
    }

    pub fn with_connection(conn: Connection, ttl: Duration) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS http_cache (
                key TEXT PRIMARY KEY,
                body TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )",
        )?;
        let cache = Self { conn, ttl };
        let purged = cache.purge_expired(unix_now())?;
        if purged > 0 {
            debug!(purged, "dropped expired cache entries");
        }
        Ok(cache)
    }

    /// Stored body for `key` if it is younger than the TTL at `now`.
    pub fn get(&self, key: &str, now: i64) -> rusqlite::Result<Option<String>> {
        let oldest = now - self.ttl_secs();
        self.conn
            .query_row(
                "SELECT body FROM http_cache WHERE key = ?1 AND created_at >= ?2",
                params![key, oldest],
                |row| row.get(0),
            )
            .optional()
    }

    pub fn put(&self, key: &str, body: &str, now: i64) -> rusqlite::Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO http_cache (key, body, created_at) VALUES (?1, ?2, ?3)",
            params![key, body, now],
        )?;
        Ok(())
    }

    fn purge_expired(&self, now: i64) -> rusqlite::Result<usize> {
        let oldest = now - self.ttl_secs();
        self.conn
            .execute("DELETE FROM http_cache WHERE created_at < ?1", params![oldest])
    }

    fn ttl_secs(&self) -> i64 {
        i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX)
    }
}

impl ResponseCache for SqliteCache {
    fn get_or_fetch(
        &self,
        key: &str,
        fetch: &mut dyn FnMut() -> Result<String, FetchError>,
    ) -> Result<String, FetchError> {
        let now = unix_now();
        match self.get(key, now) {
            Ok(Some(body)) => {
                debug!(key, "served from cache");
                return Ok(body);
            }
            Ok(None) => {}
            Err(e) => warn!(key, error = %e, "cache lookup failed, fetching"),
        }
        let body = fetch()?;
        if let Err(e) = self.put(key, &body, now) {
            warn!(key, error = %e, "could not store response in cache");
        }
        Ok(body)
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_cache() -> SqliteCache {
        SqliteCache::with_connection(Connection::open_in_memory().unwrap(), DEFAULT_TTL).unwrap()
    }

    #[test]
    fn fetches_once_then_serves_from_cache() {
        let cache = memory_cache();
        let mut calls = 0;
        let mut fetch = || -> Result<String, FetchError> {
            calls += 1;
            Ok("{\"paperId\":\"a\"}".to_string())
        };
        let first = cache.get_or_fetch("k", &mut fetch).unwrap();
        let second = cache.get_or_fetch("k", &mut fetch).unwrap();
        assert_eq!(first, second);
        assert_eq!(calls, 1);
    }

    #[test]
    fn failed_fetch_is_not_stored() {
        let cache = memory_cache();
        let mut failing = || -> Result<String, FetchError> {
            Err(FetchError::Status {
                url: "u".into(),
                status: 500,
            })
        };
        assert!(cache.get_or_fetch("k", &mut failing).is_err());
        assert_eq!(cache.get("k", unix_now()).unwrap(), None);
    }

    #[test]
    fn entries_expire_after_ttl() {
        let cache = memory_cache();
        let week = DEFAULT_TTL.as_secs() as i64;
        cache.put("k", "body", 1_000).unwrap();
        assert_eq!(cache.get("k", 1_000 + week).unwrap().as_deref(), Some("body"));
        assert_eq!(cache.get("k", 1_000 + week + 1).unwrap(), None);
    }

    #[test]
    fn no_cache_always_fetches() {
        let mut calls = 0;
        let mut fetch = || -> Result<String, FetchError> {
            calls += 1;
            Ok(String::new())
        };
        NoCache.get_or_fetch("k", &mut fetch).unwrap();
        NoCache.get_or_fetch("k", &mut fetch).unwrap();
        assert_eq!(calls, 2);
    }

    #[test]
    fn open_creates_database_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SqliteCache::open(dir.path(), DEFAULT_TTL).unwrap();
        cache.put("k", "v", unix_now()).unwrap();
        assert!(dir.path().join("http_cache.db").exists());
    }
}
