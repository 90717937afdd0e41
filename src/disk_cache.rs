//! # Disk Cache
//!
//! A reference [`CacheManager`] backed by a directory tree.
//!
//! ## Layout
//!
//! ```text
//! <root>/
//!   0/ … f/                                  one shard per leading hex digit
//!     <prefix>_<id>_<extra|0>_<type>.asset   one byte store per asset
//! ```
//!
//! ## Recency
//!
//! [`touch_access_time`](CacheManager::touch_access_time) stamps both the
//! access and modification time of a store. Eviction ranks stores by
//! modification time, which stays meaningful on filesystems mounted
//! `noatime`.
//!
//! ## Eviction
//!
//! [`purge`](DiskCache::purge) is never triggered by the accessor. The
//! embedding application decides when to call it.

use std::fs::{self, File, FileTimes};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::{AssetError, AssetResult, AssetType, CacheManager};

const SHARDS: &str = "0123456789abcdef";
const STORE_EXTENSION: &str = "asset";

/// Configuration for a [`DiskCache`].
///
/// # Example
///
/// ```rust
/// use asset_file::DiskCacheConfig;
///
/// let config = DiskCacheConfig::new("/var/cache/assets")
///     .with_max_size(512 * 1024 * 1024)
///     .with_high_water_percent(90);
/// assert_eq!(config.filename_prefix, "sl_cache");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DiskCacheConfig {
    /// Directory holding the shard directories.
    pub root: PathBuf,
    /// Leading component of every store filename.
    pub filename_prefix: String,
    /// Total store bytes above which [`DiskCache::purge`] evicts.
    pub max_size_bytes: u64,
    /// Percentage of `max_size_bytes` a purge shrinks the cache down to.
    pub high_water_percent: u8,
}

impl DiskCacheConfig {
    /// Default filename prefix.
    pub const DEFAULT_PREFIX: &'static str = "sl_cache";
    /// Default size cap (1 GiB).
    pub const DEFAULT_MAX_SIZE: u64 = 1024 * 1024 * 1024;

    /// Configuration rooted at `root` with default limits.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Set the filename prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.filename_prefix = prefix.into();
        self
    }

    /// Set the size cap in bytes.
    pub fn with_max_size(mut self, bytes: u64) -> Self {
        self.max_size_bytes = bytes;
        self
    }

    /// Set the purge target as a percentage of the size cap.
    pub fn with_high_water_percent(mut self, percent: u8) -> Self {
        self.high_water_percent = percent;
        self
    }

    /// Check the configuration for values a cache cannot run with.
    ///
    /// # Errors
    ///
    /// - [`AssetError::InvalidConfig`] for an empty root or prefix, a prefix
    ///   containing a path separator, a zero size cap, or a percentage
    ///   outside `1..=100`
    pub fn validate(&self) -> AssetResult<()> {
        let reason = if self.root.as_os_str().is_empty() {
            "root directory is empty"
        } else if self.filename_prefix.is_empty() {
            "filename prefix is empty"
        } else if self.filename_prefix.contains(['/', '\\']) {
            "filename prefix contains a path separator"
        } else if self.max_size_bytes == 0 {
            "max size is zero"
        } else if !(1..=100).contains(&self.high_water_percent) {
            "high water percent must be within 1..=100"
        } else {
            return Ok(());
        };
        Err(AssetError::InvalidConfig {
            reason: reason.to_string(),
        })
    }

    fn purge_target(&self) -> u64 {
        (u128::from(self.max_size_bytes) * u128::from(self.high_water_percent) / 100) as u64
    }
}

impl Default for DiskCacheConfig {
    fn default() -> Self {
        Self {
            root: std::env::temp_dir().join("asset-cache"),
            filename_prefix: Self::DEFAULT_PREFIX.to_string(),
            max_size_bytes: Self::DEFAULT_MAX_SIZE,
            high_water_percent: 100,
        }
    }
}

/// Outcome of a [`DiskCache::purge`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    /// Stores found under the root.
    pub scanned: usize,
    /// Stores deleted.
    pub removed: usize,
    /// Bytes released by the deleted stores.
    pub bytes_freed: u64,
    /// Bytes still held after the purge.
    pub bytes_remaining: u64,
}

struct StoreEntry {
    path: PathBuf,
    len: u64,
    modified: SystemTime,
}

/// Sharded on-disk asset cache.
#[derive(Debug)]
pub struct DiskCache {
    config: DiskCacheConfig,
}

impl DiskCache {
    /// Open (or create) a cache at `config.root`.
    ///
    /// Creates the root and its shard directories if they are missing.
    ///
    /// # Errors
    ///
    /// - [`AssetError::InvalidConfig`] if the configuration fails validation
    /// - [`AssetError::Io`] if a directory cannot be created
    pub fn open(config: DiskCacheConfig) -> AssetResult<Self> {
        config.validate()?;

        for shard in SHARDS.chars() {
            let dir = config.root.join(shard.to_string());
            fs::create_dir_all(&dir).map_err(|e| AssetError::io("create_dir", &dir, e))?;
        }

        debug!(root = %config.root.display(), max_size = config.max_size_bytes, "opened disk cache");
        Ok(Self { config })
    }

    /// The configuration this cache was opened with.
    pub fn config(&self) -> &DiskCacheConfig {
        &self.config
    }

    /// Root directory of the cache.
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Total bytes held by all stores.
    pub fn total_size(&self) -> AssetResult<u64> {
        Ok(self.entries()?.iter().map(|e| e.len).sum())
    }

    /// Evict least recently touched stores while the cache is over its cap.
    ///
    /// Does nothing when the total is at or below `max_size_bytes`. Otherwise
    /// deletes stores oldest-first until the total is at or below
    /// `max_size_bytes * high_water_percent / 100`. Stores that vanish during
    /// the purge count as freed; stores that cannot be deleted are logged and
    /// skipped.
    ///
    /// # Errors
    ///
    /// - [`AssetError::NotFound`] / [`AssetError::Io`] if the root cannot be scanned
    pub fn purge(&self) -> AssetResult<PurgeReport> {
        let mut entries = self.entries()?;
        let total: u64 = entries.iter().map(|e| e.len).sum();
        let mut report = PurgeReport {
            scanned: entries.len(),
            bytes_remaining: total,
            ..PurgeReport::default()
        };

        if total <= self.config.max_size_bytes {
            debug!(total, max_size = self.config.max_size_bytes, "disk cache within limit");
            return Ok(report);
        }

        let target = self.config.purge_target();
        entries.sort_by_key(|e| e.modified);

        for entry in entries {
            if report.bytes_remaining <= target {
                break;
            }
            match fs::remove_file(&entry.path) {
                Ok(()) => {
                    report.removed += 1;
                    report.bytes_freed += entry.len;
                    report.bytes_remaining -= entry.len;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    report.bytes_remaining -= entry.len;
                }
                Err(e) => {
                    let err = AssetError::io("remove", &entry.path, e);
                    warn!(error = %err, "failed to evict store");
                }
            }
        }

        info!(
            removed = report.removed,
            bytes_freed = report.bytes_freed,
            bytes_remaining = report.bytes_remaining,
            "purged disk cache"
        );
        Ok(report)
    }

    /// Delete every store, returning how many were removed.
    pub fn clear(&self) -> AssetResult<usize> {
        let mut removed = 0;
        for entry in self.entries()? {
            match fs::remove_file(&entry.path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    let err = AssetError::io("remove", &entry.path, e);
                    warn!(error = %err, "failed to clear store");
                }
            }
        }
        info!(removed, "cleared disk cache");
        Ok(removed)
    }

    fn entries(&self) -> AssetResult<Vec<StoreEntry>> {
        let root = self.root();
        let mut entries = Vec::new();

        for item in WalkDir::new(root).min_depth(1).max_depth(2) {
            let item = match item {
                Ok(item) => item,
                Err(e) if e.depth() == 0 => {
                    return Err(AssetError::io("scan", root, e.into()));
                }
                Err(e) => {
                    debug!(error = %e, "skipping unreadable cache entry");
                    continue;
                }
            };

            let path = item.path();
            if !item.file_type().is_file()
                || path.extension().is_none_or(|ext| ext != STORE_EXTENSION)
            {
                continue;
            }

            // Stores can disappear while we walk.
            let Ok(meta) = item.metadata() else {
                continue;
            };
            entries.push(StoreEntry {
                path: path.to_path_buf(),
                len: meta.len(),
                modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            });
        }

        Ok(entries)
    }
}

impl CacheManager for DiskCache {
    fn resolve_path(&self, id: &str, asset_type: AssetType, extra_info: &str) -> PathBuf {
        let shard = id
            .chars()
            .next()
            .map(|c| c.to_ascii_lowercase())
            .filter(|c| c.is_ascii_hexdigit())
            .unwrap_or('0');
        let extra = if extra_info.is_empty() { "0" } else { extra_info };
        let name = format!(
            "{}_{}_{}_{}.{}",
            self.config.filename_prefix, id, extra, asset_type, STORE_EXTENSION
        );
        self.config.root.join(shard.to_string()).join(name)
    }

    fn touch_access_time(&self, path: &Path) {
        let now = SystemTime::now();
        let times = FileTimes::new().set_accessed(now).set_modified(now);
        let result = File::options()
            .write(true)
            .open(path)
            .and_then(|file| file.set_times(times));
        match result {
            Ok(()) => debug!(path = %path.display(), "touched store"),
            Err(e) => debug!(path = %path.display(), error = %e, "could not touch store"),
        }
    }
}
