//! Revalidation cache
//!
//! Records when each route was last generated so that pages can be
//! regenerated in the background once they are older than their
//! revalidation interval. Routes the content source reported missing are
//! remembered too, so repeated requests answer "not found" without a fetch.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// Cache directory, relative to the site directory
pub const CACHE_DIR: &str = ".spacetraveling-cache";

/// Cache file name inside [`CACHE_DIR`]
const CACHE_FILE: &str = "db.json";

/// Route of the home page listing
pub const LISTING_ROUTE: &str = "/";

/// Route of an article page
pub fn post_route(uid: &str) -> String {
    format!("/post/{}", uid)
}

/// Result of the last generation of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStatus {
    Generated,
    NotFound,
}

/// Represents a cached entry for a generated route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub status: RouteStatus,
    /// Generation time (as unix timestamp)
    pub generated_at: u64,
    /// Output path relative to public dir
    pub output_path: String,
    /// Last publication date of the article, as received
    pub last_publication_date: Option<String>,
}

/// Cache database for tracking generated routes
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheDb {
    /// Version of the cache format
    pub version: u32,
    /// Entries keyed by route
    pub routes: HashMap<String, CacheEntry>,
}

impl CacheDb {
    /// Current cache format version
    const VERSION: u32 = 1;

    pub fn new() -> Self {
        Self {
            version: Self::VERSION,
            routes: HashMap::new(),
        }
    }

    /// Load cache from disk, or create a new empty cache
    pub fn load(base_dir: &Path) -> Self {
        let cache_path = base_dir.join(CACHE_DIR).join(CACHE_FILE);
        if let Ok(content) = fs::read_to_string(&cache_path) {
            if let Ok(cache) = serde_json::from_str::<CacheDb>(&content) {
                if cache.version == Self::VERSION {
                    return cache;
                }
                tracing::info!("Cache version mismatch, starting with an empty cache");
            }
        }
        Self::new()
    }

    /// Save cache to disk
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        let cache_dir = base_dir.join(CACHE_DIR);
        fs::create_dir_all(&cache_dir)?;

        let content = serde_json::to_string_pretty(self)?;
        fs::write(cache_dir.join(CACHE_FILE), content)?;
        Ok(())
    }

    pub fn get(&self, route: &str) -> Option<&CacheEntry> {
        self.routes.get(route)
    }

    /// Record a successful generation
    pub fn record_generated(
        &mut self,
        route: &str,
        output_path: &str,
        last_publication_date: Option<String>,
        now: u64,
    ) {
        self.routes.insert(
            route.to_string(),
            CacheEntry {
                status: RouteStatus::Generated,
                generated_at: now,
                output_path: output_path.to_string(),
                last_publication_date,
            },
        );
    }

    /// Record that the content source has no record for a route
    pub fn record_not_found(&mut self, route: &str, now: u64) {
        self.routes.insert(
            route.to_string(),
            CacheEntry {
                status: RouteStatus::NotFound,
                generated_at: now,
                output_path: String::new(),
                last_publication_date: None,
            },
        );
    }

    /// Whether a route is unknown or older than `interval_secs`
    pub fn is_stale(&self, route: &str, interval_secs: u64, now: u64) -> bool {
        match self.routes.get(route) {
            Some(entry) => now.saturating_sub(entry.generated_at) >= interval_secs,
            None => true,
        }
    }

    /// Drop entries of posts that are no longer generated
    pub fn retain_posts(&mut self, uids: &[String]) {
        self.routes.retain(|route, _| {
            route == LISTING_ROUTE || uids.iter().any(|uid| post_route(uid) == *route)
        });
    }
}

/// Current time as unix timestamp
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Remove the cache directory
pub fn clear(base_dir: &Path) -> Result<()> {
    let cache_dir = base_dir.join(CACHE_DIR);
    if cache_dir.exists() {
        fs::remove_dir_all(&cache_dir)?;
        tracing::info!("Deleted: {:?}", cache_dir);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_route_is_stale() {
        let cache = CacheDb::new();
        assert!(cache.is_stale(LISTING_ROUTE, 60, 1_000));
    }

    #[test]
    fn test_staleness_follows_interval() {
        let mut cache = CacheDb::new();
        cache.record_generated(LISTING_ROUTE, "index.html", None, 1_000);

        assert!(!cache.is_stale(LISTING_ROUTE, 60, 1_059));
        assert!(cache.is_stale(LISTING_ROUTE, 60, 1_060));
    }

    #[test]
    fn test_not_found_is_remembered() {
        let mut cache = CacheDb::new();
        let route = post_route("missing");
        cache.record_not_found(&route, 500);

        let entry = cache.get(&route).unwrap();
        assert_eq!(entry.status, RouteStatus::NotFound);
        assert!(!cache.is_stale(&route, 3600, 600));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = CacheDb::new();
        cache.record_generated(
            &post_route("hello"),
            "post/hello/index.html",
            Some("2021-03-15T19:25:28+0000".to_string()),
            42,
        );
        cache.save(dir.path()).unwrap();

        let loaded = CacheDb::load(dir.path());
        let entry = loaded.get("/post/hello").unwrap();
        assert_eq!(entry.generated_at, 42);
        assert_eq!(entry.output_path, "post/hello/index.html");

        clear(dir.path()).unwrap();
        assert!(CacheDb::load(dir.path()).routes.is_empty());
    }

    #[test]
    fn test_version_mismatch_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(CACHE_DIR)).unwrap();
        fs::write(
            dir.path().join(CACHE_DIR).join(CACHE_FILE),
            r#"{"version": 0, "routes": {"/": {"status": "generated", "generated_at": 1, "output_path": "index.html", "last_publication_date": null}}}"#,
        )
        .unwrap();

        let cache = CacheDb::load(dir.path());
        assert_eq!(cache.version, 1);
        assert!(cache.routes.is_empty());
    }

    #[test]
    fn test_retain_posts() {
        let mut cache = CacheDb::new();
        cache.record_generated(LISTING_ROUTE, "index.html", None, 1);
        cache.record_generated(&post_route("a"), "post/a/index.html", None, 1);
        cache.record_generated(&post_route("b"), "post/b/index.html", None, 1);

        cache.retain_posts(&["a".to_string()]);
        assert!(cache.get(LISTING_ROUTE).is_some());
        assert!(cache.get("/post/a").is_some());
        assert!(cache.get("/post/b").is_none());
    }
}
