//! # asset-file
//!
//! Per-asset byte-stream access over a content-addressable disk cache.
//!
//! Each asset is named by an [`AssetKey`]: an opaque 128-bit [`AssetId`] plus
//! an [`AssetType`] category. A [`CacheManager`] maps that key to the path of
//! a byte store, and an [`AssetFile`] session reads, writes and seeks within
//! it through its own cursor.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use asset_file::{AssetFile, AssetId, AssetKey, AssetType, DiskCache, DiskCacheConfig, OpenMode, SeekOrigin};
//!
//! # fn main() -> Result<(), asset_file::AssetError> {
//! # let dir = std::env::temp_dir().join(format!("asset-file-lib-{}", AssetId::new()));
//! let cache = DiskCache::open(DiskCacheConfig::new(&dir))?;
//! let key = AssetKey::new(AssetId::new(), AssetType::Sound);
//!
//! let mut file = AssetFile::open(&cache, key, OpenMode::Append);
//! assert!(file.write(b"foo"));
//! assert!(file.write(b"abc"));
//! assert_eq!(file.tell(), 6);
//!
//! assert!(key.exists(&cache));
//! assert_eq!(key.size(&cache), 6);
//!
//! assert!(file.seek(3, SeekOrigin::START));
//! let mut tail = [0u8; 3];
//! assert!(file.read(&mut tail));
//! assert_eq!(&tail, b"abc");
//! # std::fs::remove_dir_all(&dir).ok();
//! # Ok(())
//! # }
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`AssetFile`] | Cursor-bearing session over one asset |
//! | [`AssetKey`] | Content identity; also carries the session-free operations |
//! | [`OpenMode`] | Write discipline of a session |
//! | [`CacheManager`] | Path resolution and access-time bookkeeping |
//! | [`DiskCache`] | Reference on-disk `CacheManager` with size-bounded purge |
//! | [`AssetError`] | Error type for parsing and cache setup |
//!
//! ---
//!
//! ## Session-free Operations
//!
//! Existence, size, removal and rename only need a key and a cache:
//!
//! | Method | Result |
//! |--------|--------|
//! | [`AssetKey::exists`] | `true` for a non-empty regular file |
//! | [`AssetKey::size`] | byte length, 0 when absent |
//! | [`AssetKey::remove`] | always `true`; failures are logged |
//! | [`AssetKey::rename`] | always `true`; failures are logged |
//!
//! ---
//!
//! ## Error Handling
//!
//! The accessor surface is boolean. Missing stores read as empty, short reads
//! succeed, short writes fail, out-of-range seeks fail with a clamped cursor,
//! and filesystem errors on remove or rename are logged through `tracing`
//! without being surfaced. [`AssetError`] appears only where a caller can act
//! on it: parsing identities and opening or purging a [`DiskCache`].
//!
//! ---
//!
//! ## Thread Safety
//!
//! [`CacheManager`] requires `Send + Sync`. Sessions hold no file handle and
//! no lock; two sessions on the same asset are not serialized, so callers
//! needing exclusivity must provide it.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Serialization for [`AssetId`], [`AssetType`], [`AssetKey`], [`OpenMode`], [`DiskCacheConfig`] |

mod asset_file;
mod cache_manager;
mod disk_cache;
mod error;
mod store;
mod types;

// Public re-exports - error types
pub use error::{AssetError, AssetResult};

// Public re-exports - identity types
pub use types::{AssetId, AssetKey, AssetType, OpenMode, SeekOrigin};

// Public re-exports - accessor
pub use asset_file::{AssetFile, MAX_ASSET_SIZE};

// Public re-exports - cache
pub use cache_manager::CacheManager;
pub use disk_cache::{DiskCache, DiskCacheConfig, PurgeReport};
