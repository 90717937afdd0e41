//! # Identity-keyed store operations
//!
//! Operations that need a content identity and a cache, but no cursor.
//! They are methods on [`AssetKey`] so no session has to be opened to ask
//! whether an asset is cached, how large it is, or to drop or rename it.
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`store_path`](AssetKey::store_path) | Resolve the byte store path |
//! | [`exists`](AssetKey::exists) | Non-empty regular file present |
//! | [`size`](AssetKey::size) | Byte length, 0 when absent |
//! | [`remove`](AssetKey::remove) | Delete the store (always reports success) |
//! | [`rename`](AssetKey::rename) | Move bytes to another identity (always reports success) |
//!
//! Every call resolves the path through the cache afresh.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use crate::{AssetError, AssetKey, CacheManager};

/// Discriminator passed to [`CacheManager::resolve_path`] for every store
/// this crate touches.
pub(crate) const EXTRA_INFO: &str = "";

impl AssetKey {
    /// Resolve the path of this asset's byte store.
    pub fn store_path<C: CacheManager + ?Sized>(&self, cache: &C) -> PathBuf {
        cache.resolve_path(&self.id.to_string(), self.asset_type, EXTRA_INFO)
    }

    /// Returns `true` if the store is a regular file holding at least one byte.
    ///
    /// A zero-length store reports `false`: an empty file cannot be told
    /// apart from one that has not been written yet.
    pub fn exists<C: CacheManager + ?Sized>(&self, cache: &C) -> bool {
        let path = self.store_path(cache);
        match fs::metadata(&path) {
            Ok(meta) => meta.is_file() && meta.len() > 0,
            Err(_) => false,
        }
    }

    /// Byte length of the store, or 0 if it cannot be stat'ed.
    pub fn size<C: CacheManager + ?Sized>(&self, cache: &C) -> u64 {
        let path = self.store_path(cache);
        fs::metadata(&path).map(|meta| meta.len()).unwrap_or(0)
    }

    /// Delete the store if present.
    ///
    /// Failures are logged, never returned; this always reports `true`.
    /// A failure whose kind equals `suppress` (typically
    /// [`io::ErrorKind::NotFound`]) is expected by the caller and is not
    /// logged as a warning.
    pub fn remove<C: CacheManager + ?Sized>(&self, cache: &C, suppress: Option<io::ErrorKind>) -> bool {
        let path = self.store_path(cache);
        remove_store(self, &path, suppress);
        true
    }

    /// Move this asset's bytes to `new_key`.
    ///
    /// Any store already at `new_key` is deleted first. If the underlying
    /// rename fails the failure is logged and the call still reports `true`;
    /// callers have always treated rename as infallible.
    ///
    /// Renaming onto a key that resolves to the same path is a no-op.
    pub fn rename<C: CacheManager + ?Sized>(&self, cache: &C, new_key: &AssetKey) -> bool {
        let old_path = self.store_path(cache);
        let new_path = new_key.store_path(cache);

        if old_path == new_path {
            trace!(asset = %self, "rename onto itself; nothing to do");
            return true;
        }

        remove_store(new_key, &new_path, Some(io::ErrorKind::NotFound));

        match fs::rename(&old_path, &new_path) {
            Ok(()) => debug!(from = %self, to = %new_key, "renamed asset"),
            Err(source) => {
                let err = AssetError::io("rename", &old_path, source);
                warn!(from = %self, to = %new_key, error = %err, "failed to rename asset");
            }
        }
        true
    }
}

fn remove_store(key: &AssetKey, path: &Path, suppress: Option<io::ErrorKind>) {
    match fs::remove_file(path) {
        Ok(()) => debug!(asset = %key, path = %path.display(), "removed asset"),
        Err(source) if Some(source.kind()) == suppress => {
            trace!(asset = %key, path = %path.display(), error = %source, "suppressed remove failure");
        }
        Err(source) => {
            let err = AssetError::io("remove", path, source);
            warn!(asset = %key, error = %err, "failed to remove asset");
        }
    }
}
