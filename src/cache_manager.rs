//! # CacheManager Trait
//!
//! Contract between the asset accessor and the disk cache that owns it.
//!
//! ## Responsibility
//! - Map an (identifier, category) pair to the path of its byte store
//! - Record that a store was accessed, so the cache can rank eviction candidates
//!
//! ## Non-responsibility
//! The accessor never asks the cache what to evict or when. Path layout and
//! eviction policy belong to the implementation alone.
//!
//! ## Usage
//!
//! ```rust
//! use asset_file::{AssetType, CacheManager};
//! use std::path::{Path, PathBuf};
//!
//! struct FlatCache {
//!     root: PathBuf,
//! }
//!
//! impl CacheManager for FlatCache {
//!     fn resolve_path(&self, id: &str, asset_type: AssetType, _extra_info: &str) -> PathBuf {
//!         self.root.join(format!("{id}.{asset_type}"))
//!     }
//!
//!     fn touch_access_time(&self, _path: &Path) {}
//! }
//!
//! let cache = FlatCache { root: PathBuf::from("/tmp/assets") };
//! let path = cache.resolve_path("abc", AssetType::Texture, "");
//! assert_eq!(path, PathBuf::from("/tmp/assets/abc.texture"));
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::AssetType;

// ============================================================================
// Trait Definition
// ============================================================================

/// Disk cache collaborator consumed by [`AssetFile`](crate::AssetFile).
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`. Sessions on different threads may
/// resolve and touch paths concurrently, including the same path.
///
/// # Object Safety
///
/// This trait is object-safe; the accessor accepts `&dyn CacheManager`.
///
/// # Implementors
///
/// - [`DiskCache`](crate::DiskCache): sharded on-disk layout with
///   modification-time recency and size-bounded purge
pub trait CacheManager: Send + Sync {
    /// Resolve an asset to the path of its byte store.
    ///
    /// Must be deterministic for the same arguments and must not create,
    /// modify, or delete anything on disk.
    ///
    /// # Arguments
    ///
    /// * `id` - Canonical string form of the asset id
    /// * `asset_type` - Content category
    /// * `extra_info` - Implementation-defined discriminator; the accessor
    ///   always passes an empty string
    fn resolve_path(&self, id: &str, asset_type: AssetType, extra_info: &str) -> PathBuf;

    /// Record that the store at `path` was just accessed.
    ///
    /// Best-effort: must not panic or fail the caller, even if the file has
    /// disappeared since the caller last looked. Concurrent touches of the
    /// same path must be safe to interleave.
    fn touch_access_time(&self, path: &Path);
}

impl<C: CacheManager + ?Sized> CacheManager for &C {
    fn resolve_path(&self, id: &str, asset_type: AssetType, extra_info: &str) -> PathBuf {
        (**self).resolve_path(id, asset_type, extra_info)
    }

    fn touch_access_time(&self, path: &Path) {
        (**self).touch_access_time(path)
    }
}

impl<C: CacheManager + ?Sized> CacheManager for Arc<C> {
    fn resolve_path(&self, id: &str, asset_type: AssetType, extra_info: &str) -> PathBuf {
        (**self).resolve_path(id, asset_type, extra_info)
    }

    fn touch_access_time(&self, path: &Path) {
        (**self).touch_access_time(path)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingCache {
        touched: Mutex<Vec<PathBuf>>,
    }

    impl CacheManager for RecordingCache {
        fn resolve_path(&self, id: &str, asset_type: AssetType, extra_info: &str) -> PathBuf {
            PathBuf::from(format!("/cache/{id}_{extra_info}_{asset_type}"))
        }

        fn touch_access_time(&self, path: &Path) {
            self.touched.lock().unwrap().push(path.to_path_buf());
        }
    }

    #[test]
    fn cache_manager_is_object_safe() {
        let cache: Box<dyn CacheManager> = Box::new(RecordingCache {
            touched: Mutex::new(Vec::new()),
        });
        let path = cache.resolve_path("id", AssetType::Sound, "x");
        assert_eq!(path, PathBuf::from("/cache/id_x_sound"));
    }

    #[test]
    fn arc_forwards_to_inner() {
        let cache = Arc::new(RecordingCache {
            touched: Mutex::new(Vec::new()),
        });
        let shared: Arc<RecordingCache> = Arc::clone(&cache);
        shared.touch_access_time(Path::new("/cache/a"));
        assert_eq!(
            *cache.touched.lock().unwrap(),
            vec![PathBuf::from("/cache/a")]
        );
    }

    #[test]
    fn reference_forwards_to_inner() {
        let cache = RecordingCache {
            touched: Mutex::new(Vec::new()),
        };
        fn touch_owned<C: CacheManager>(cache: C) {
            cache.touch_access_time(Path::new("/cache/b"));
        }
        let by_ref: &dyn CacheManager = &cache;
        touch_owned(by_ref);
        assert_eq!(cache.touched.lock().unwrap().len(), 1);
    }

    #[test]
    fn cache_manager_requires_send_sync() {
        fn _assert_send_sync<T: Send + Sync>() {}
        fn _check<T: CacheManager>() {
            _assert_send_sync::<T>();
        }
    }
}
