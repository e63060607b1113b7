//! JSON file cache with a time-to-live check on read.
//!
//! Every provider owns one [`FileCache`] rooted at `<cache dir>/<provider>/`.
//! Keys are caller-built relative paths such as `anime/1234.json`; they are
//! joined to the root as-is. Expired entries stay on disk until the sweep task
//! removes them.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::interval;
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed cache entry at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CacheError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// On-disk layout of a single cache file.
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// Unix seconds at write time.
    pub timestamp: f64,
    pub data: T,
}

#[derive(Debug, Clone)]
pub struct FileCache {
    root: PathBuf,
    ttl: Duration,
}

impl FileCache {
    pub fn new(root: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            root: root.into(),
            ttl,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Join a cache key onto the provider root. No I/O.
    pub fn get_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    /// Read an entry, returning `None` when the file is missing or older than
    /// the TTL (or `ttl_override` when given).
    pub fn read<T: DeserializeOwned>(
        &self,
        path: &Path,
        ttl_override: Option<Duration>,
    ) -> Result<Option<T>, CacheError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::io(path, e)),
        };

        let entry: CacheEntry<T> =
            serde_json::from_str(&raw).map_err(|e| CacheError::json(path, e))?;

        let ttl = ttl_override.unwrap_or(self.ttl).as_secs_f64();
        if now_unix() - entry.timestamp < ttl {
            Ok(Some(entry.data))
        } else {
            debug!("Cache entry {} is stale", path.display());
            Ok(None)
        }
    }

    /// Overwrite `path` with `value` stamped with the current time.
    pub fn write<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), CacheError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| CacheError::io(parent, e))?;
        }

        let entry = CacheEntry {
            timestamp: now_unix(),
            data: value,
        };
        let body = serde_json::to_string(&entry).map_err(|e| CacheError::json(path, e))?;
        fs::write(path, body).map_err(|e| CacheError::io(path, e))
    }

    /// Remove an entry. A missing file is not an error.
    pub fn drop(&self, path: &Path) -> Result<(), CacheError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::io(path, e)),
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        self.read(&self.get_path(key), None)
    }

    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        self.write(&self.get_path(key), value)
    }

    /// Serve `key` from the cache, or run `fetch` and store its result.
    ///
    /// Cache failures are logged and treated as misses; only `fetch` errors
    /// reach the caller.
    pub async fn get_or_fetch<T, E, F, Fut>(&self, key: &str, fetch: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let path = self.get_path(key);
        match self.read::<T>(&path, None) {
            Ok(Some(hit)) => {
                debug!("Cache hit: {}", path.display());
                return Ok(hit);
            }
            Ok(None) => {}
            Err(e) => warn!("Ignoring unreadable cache entry: {}", e),
        }

        let value = fetch().await?;
        if let Err(e) = self.write(&path, &value) {
            warn!("Failed to write cache entry: {}", e);
        }
        Ok(value)
    }
}

pub fn now_unix() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

/// Delete every file under `root` whose entry is older than `max_age`.
///
/// The age comes from the entry's `timestamp`; files that do not parse fall
/// back to their modification time.
pub fn sweep(root: &Path, max_age: Duration) -> Result<usize, CacheError> {
    if !root.exists() {
        return Ok(0);
    }

    let threshold = now_unix() - max_age.as_secs_f64();
    let mut removed = 0;

    for entry in fs::read_dir(root).map_err(|e| CacheError::io(root, e))? {
        let entry = entry.map_err(|e| CacheError::io(root, e))?;
        let path = entry.path();
        let Ok(metadata) = entry.metadata() else {
            continue;
        };

        if metadata.is_dir() {
            removed += sweep(&path, max_age)?;
            continue;
        }

        let written_at = entry_timestamp(&path).or_else(|| {
            metadata
                .modified()
                .ok()
                .and_then(|m| m.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs_f64())
        });

        if written_at.is_some_and(|ts| ts < threshold) {
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!("Swept stale cache file {}", path.display());
                    removed += 1;
                }
                Err(e) => warn!("Failed to delete stale cache file {}: {}", path.display(), e),
            }
        }
    }

    Ok(removed)
}

fn entry_timestamp(path: &Path) -> Option<f64> {
    #[derive(Deserialize)]
    struct Stamp {
        timestamp: f64,
    }

    let raw = fs::read_to_string(path).ok()?;
    serde_json::from_str::<Stamp>(&raw).ok().map(|s| s.timestamp)
}

/// Periodically sweep each `(root, max_age)` pair. Never returns.
pub async fn start_sweep_task(targets: Vec<(PathBuf, Duration)>, every: Duration) {
    info!(
        "Starting cache sweep task for {} provider directories",
        targets.len()
    );
    let mut ticker = interval(every);

    loop {
        ticker.tick().await;
        for (root, max_age) in &targets {
            match sweep(root, *max_age) {
                Ok(0) => {}
                Ok(n) => info!("Swept {} stale entries from {}", n, root.display()),
                Err(e) => warn!("Cache sweep error: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_raw(path: &Path, timestamp: f64, data: serde_json::Value) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let body = json!({ "timestamp": timestamp, "data": data });
        fs::write(path, body.to_string()).unwrap();
    }

    #[test]
    fn test_get_path_is_plain_join() {
        let cache = FileCache::new("cache/anilist", Duration::from_secs(60));
        assert_eq!(
            cache.get_path("anime/1234.json"),
            PathBuf::from("cache/anilist/anime/1234.json")
        );
    }

    #[test]
    fn test_round_trip_within_ttl() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path(), Duration::from_secs(3600));
        let path = cache.get_path("user/nattadasu.json");

        let value = json!({ "name": "nattadasu", "episodes": [1, 2, 3] });
        cache.write(&path, &value).unwrap();

        let read: Option<serde_json::Value> = cache.read(&path, None).unwrap();
        assert_eq!(read, Some(value));
    }

    #[test]
    fn test_miss_on_first_access() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path(), Duration::from_secs(3600));

        let read: Option<String> = cache.get("never/written.json").unwrap();
        assert!(read.is_none());
    }

    #[test]
    fn test_expired_entry_reads_none_and_stays_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path(), Duration::from_secs(60));
        let path = cache.get_path("anime/1.json");
        write_raw(&path, now_unix() - 120.0, json!("old"));

        let read: Option<String> = cache.read(&path, None).unwrap();
        assert!(read.is_none());
        assert!(path.exists());

        // A longer override makes the same entry fresh again
        let read: Option<String> = cache
            .read(&path, Some(Duration::from_secs(600)))
            .unwrap();
        assert_eq!(read.as_deref(), Some("old"));
    }

    #[test]
    fn test_malformed_entry_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path(), Duration::from_secs(60));
        let path = cache.get_path("broken.json");
        fs::write(&path, "{not json").unwrap();

        let result: Result<Option<String>, _> = cache.read(&path, None);
        assert!(matches!(result, Err(CacheError::Json { .. })));
    }

    #[test]
    fn test_drop_removes_and_tolerates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path(), Duration::from_secs(60));
        cache.put("a/b.json", &1u32).unwrap();

        let path = cache.get_path("a/b.json");
        assert!(path.exists());
        cache.drop(&path).unwrap();
        assert!(!path.exists());
        cache.drop(&path).unwrap();
    }

    #[tokio::test]
    async fn test_get_or_fetch_only_fetches_once() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path(), Duration::from_secs(60));
        let mut calls = 0;

        let first: Result<u32, std::io::Error> = cache
            .get_or_fetch("n.json", || {
                calls += 1;
                async { Ok(7) }
            })
            .await;
        assert_eq!(first.unwrap(), 7);

        let second: Result<u32, std::io::Error> = cache
            .get_or_fetch("n.json", || async { Ok(99) })
            .await;
        assert_eq!(second.unwrap(), 7);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_sweep_removes_only_old_entries() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("anime/old.json");
        let fresh = dir.path().join("anime/fresh.json");
        write_raw(&old, now_unix() - 7200.0, json!(1));
        write_raw(&fresh, now_unix(), json!(2));

        let removed = sweep(dir.path(), Duration::from_secs(3600)).unwrap();
        assert_eq!(removed, 1);
        assert!(!old.exists());
        assert!(fresh.exists());
    }

    #[tokio::test]
    async fn test_get_or_fetch_replaces_corrupt_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path(), Duration::from_secs(60));
        let path = cache.get_path("anime/1.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{not json").unwrap();

        let mut calls = 0;
        let value: Result<u32, std::io::Error> = cache
            .get_or_fetch("anime/1.json", || {
                calls += 1;
                async { Ok(42) }
            })
            .await;
        assert_eq!(value.unwrap(), 42);
        assert_eq!(calls, 1);

        let stored: Option<u32> = cache.get("anime/1.json").unwrap();
        assert_eq!(stored, Some(42));
    }

    #[test]
    fn test_sweep_falls_back_to_mtime_for_unparseable_files() {
        let dir = tempfile::tempdir().unwrap();
        let junk = dir.path().join("anime/junk.json");
        fs::create_dir_all(junk.parent().unwrap()).unwrap();
        fs::write(&junk, "not a cache entry").unwrap();
        std::thread::sleep(Duration::from_millis(20));

        let removed = sweep(dir.path(), Duration::ZERO).unwrap();
        assert_eq!(removed, 1);
        assert!(!junk.exists());
    }

    #[test]
    fn test_sweep_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let removed = sweep(&dir.path().join("nope"), Duration::from_secs(1)).unwrap();
        assert_eq!(removed, 0);
    }
}
