//! # Asset File Accessor
//!
//! [`AssetFile`] is a short-lived session bound to one asset and one
//! [`OpenMode`]. It owns a cursor and nothing else: every read and write
//! resolves the store path through the [`CacheManager`], opens the file,
//! performs the operation and closes it again.
//!
//! ## Session Lifecycle
//!
//! ```text
//! open(cache, key, mode) ──▶ (read | write | seek | tell | eof)* ──▶ drop
//! ```
//!
//! There is no close step. Because no handle is retained, the cache may evict
//! a store between two calls; the next call simply observes it as missing.
//!
//! ## Result Contract
//!
//! Operations return `bool`, never an error:
//!
//! | Operation | Succeeds when |
//! |-----------|---------------|
//! | [`read`](AssetFile::read) | at least one byte was obtained |
//! | [`write`](AssetFile::write) | every requested byte was written |
//! | [`seek`](AssetFile::seek) | the target lies within `0..=size` |
//! | [`rename`](AssetFile::rename) / [`remove`](AssetFile::remove) | always |
//!
//! Failures are logged through `tracing`.
//!
//! ## Example
//!
//! ```rust
//! use asset_file::{AssetFile, AssetId, AssetKey, AssetType, DiskCache, DiskCacheConfig, OpenMode};
//!
//! # fn main() -> Result<(), asset_file::AssetError> {
//! # let dir = std::env::temp_dir().join(format!("asset-file-doc-{}", AssetId::new()));
//! let cache = DiskCache::open(DiskCacheConfig::new(&dir))?;
//! let key = AssetKey::new(AssetId::new(), AssetType::Notecard);
//!
//! let mut writer = AssetFile::open(&cache, key, OpenMode::Write);
//! assert!(writer.write(b"hello world"));
//!
//! let mut reader = AssetFile::open(&cache, key, OpenMode::Read);
//! let mut buf = [0u8; 5];
//! assert!(reader.read(&mut buf));
//! assert_eq!(&buf, b"hello");
//! assert_eq!(reader.tell(), 5);
//! # std::fs::remove_dir_all(&dir).ok();
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use crate::{AssetError, AssetKey, AssetResult, CacheManager, OpenMode, SeekOrigin};

/// Largest size a store may report. No cap is enforced.
///
/// Seek targets are computed in `i64`, so no larger offset is addressable.
pub const MAX_ASSET_SIZE: u64 = i64::MAX as u64;

/// A cursor-bearing session over one cached asset.
///
/// See the [module documentation](self) for the lifecycle and result contract.
///
/// # Thread Safety
///
/// A session is `Send` when its cache is `Sync`, but it is not a lock: two
/// sessions on the same asset are not serialized against each other.
pub struct AssetFile<'c, C: CacheManager + ?Sized> {
    cache: &'c C,
    key: AssetKey,
    mode: OpenMode,
    position: u64,
    bytes_read: usize,
}

impl<'c, C: CacheManager + ?Sized> AssetFile<'c, C> {
    /// Start a session on `key`.
    ///
    /// In [`OpenMode::Read`] an existing store has its access time refreshed
    /// through [`CacheManager::touch_access_time`], which feeds the cache's
    /// eviction ordering. A missing store is not an error here; reads will
    /// fail later instead.
    pub fn open(cache: &'c C, key: AssetKey, mode: OpenMode) -> Self {
        if mode == OpenMode::Read {
            let path = key.store_path(cache);
            if fs::metadata(&path).is_ok_and(|meta| meta.is_file()) {
                trace!(asset = %key, "touching asset on open");
                cache.touch_access_time(&path);
            }
        }

        Self {
            cache,
            key,
            mode,
            position: 0,
            bytes_read: 0,
        }
    }

    /// The identity this session is currently bound to.
    pub fn key(&self) -> &AssetKey {
        &self.key
    }

    /// The mode the session was opened with.
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Path of the bound store, resolved afresh.
    pub fn path(&self) -> PathBuf {
        self.key.store_path(self.cache)
    }

    /// Read up to `buf.len()` bytes from the cursor.
    ///
    /// Allowed in every mode. On success the cursor advances by the number of
    /// bytes obtained, which may be fewer than requested near the end of the
    /// store; [`last_bytes_read`](Self::last_bytes_read) reports that number.
    ///
    /// Returns `false` if no byte was obtained. If the store could not be
    /// opened at all, the cursor and the last read count are left untouched.
    pub fn read(&mut self, buf: &mut [u8]) -> bool {
        let path = self.path();
        match read_at(&path, self.position, buf) {
            Ok(n) => {
                self.bytes_read = n;
                self.position += n as u64;
                n > 0
            }
            Err(AssetError::NotFound { .. }) => {
                debug!(asset = %self.key, "read from missing asset");
                false
            }
            Err(err) => {
                warn!(asset = %self.key, error = %err, "failed to read asset");
                false
            }
        }
    }

    /// Number of bytes obtained by the most recent read that opened the store.
    pub fn last_bytes_read(&self) -> usize {
        self.bytes_read
    }

    /// Write `data` according to the session's mode.
    ///
    /// - [`OpenMode::Append`]: written at the end of the store regardless of
    ///   any earlier seek; the cursor moves to the new end.
    /// - [`OpenMode::ReadWrite`]: written in place at the cursor without
    ///   truncating; a missing store is created. The cursor advances past the
    ///   written span.
    /// - Otherwise: the store is truncated and rewritten from offset 0; the
    ///   cursor becomes `data.len()`.
    ///
    /// Returns `true` only if every byte was written. On failure the cursor
    /// is unchanged.
    pub fn write(&mut self, data: &[u8]) -> bool {
        let path = self.path();
        let result = match self.mode {
            OpenMode::Append => append_store(&path, data),
            OpenMode::ReadWrite => update_store(&path, self.position, data),
            OpenMode::Read | OpenMode::Write => replace_store(&path, data),
        };

        match result {
            Ok(position) => {
                debug!(asset = %self.key, mode = ?self.mode, bytes = data.len(), position, "wrote asset");
                self.position = position;
                true
            }
            Err(err) => {
                warn!(asset = %self.key, mode = ?self.mode, error = %err, "failed to write asset");
                false
            }
        }
    }

    /// Move the cursor to `origin + offset`.
    ///
    /// A target past the end of the store clamps the cursor to the store size;
    /// a negative target clamps it to 0. Both report `false`. Under
    /// [`OpenMode::Append`] the cursor affects reads only.
    pub fn seek(&mut self, offset: i64, origin: SeekOrigin) -> bool {
        let base = match origin {
            SeekOrigin::Absolute(base) => base,
            SeekOrigin::Current => i64::try_from(self.position).unwrap_or(i64::MAX),
        };
        let target = base.saturating_add(offset);
        let size = self.size();

        if target < 0 {
            warn!(asset = %self.key, target, "attempt to seek past beginning of asset");
            self.position = 0;
            return false;
        }

        let target = target as u64;
        if target > size {
            warn!(asset = %self.key, target, size, "attempt to seek past end of asset");
            self.position = size;
            return false;
        }

        self.position = target;
        true
    }

    /// The cursor.
    pub fn tell(&self) -> u64 {
        self.position
    }

    /// Returns `true` when the cursor is at or beyond the current store size.
    pub fn eof(&self) -> bool {
        self.position >= self.size()
    }

    /// Current size of the bound store; 0 when absent.
    pub fn size(&self) -> u64 {
        self.key.size(self.cache)
    }

    /// See [`MAX_ASSET_SIZE`].
    pub const fn max_size() -> u64 {
        MAX_ASSET_SIZE
    }

    /// Rename the bound store to `new_key` and rebind the session to it.
    ///
    /// Always reports `true`; see [`AssetKey::rename`].
    pub fn rename(&mut self, new_key: AssetKey) -> bool {
        self.key.rename(self.cache, &new_key);
        self.key = new_key;
        true
    }

    /// Delete the bound store. Always reports `true`; see [`AssetKey::remove`].
    pub fn remove(&self) -> bool {
        self.key.remove(self.cache, None)
    }
}

impl<C: CacheManager + ?Sized> fmt::Debug for AssetFile<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetFile")
            .field("key", &self.key)
            .field("mode", &self.mode)
            .field("position", &self.position)
            .field("bytes_read", &self.bytes_read)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Store I/O
// ============================================================================

/// Fill as much of `buf` as the store holds past `offset`.
fn read_at(path: &Path, offset: u64, buf: &mut [u8]) -> AssetResult<usize> {
    let mut file = File::open(path).map_err(|e| AssetError::io("open", path, e))?;
    file.seek(SeekFrom::Start(offset))
        .map_err(|e| AssetError::io("seek", path, e))?;

    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            // Keep what was obtained; the next read will report the error.
            Err(e) if filled > 0 => {
                debug!(path = %path.display(), error = %e, "short read");
                break;
            }
            Err(e) => return Err(AssetError::io("read", path, e)),
        }
    }
    Ok(filled)
}

/// Append and return the new end-of-store offset.
fn append_store(path: &Path, data: &[u8]) -> AssetResult<u64> {
    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|e| AssetError::io("open", path, e))?;
    file.write_all(data)
        .map_err(|e| AssetError::io("append", path, e))?;
    let meta = file
        .metadata()
        .map_err(|e| AssetError::io("stat", path, e))?;
    Ok(meta.len())
}

/// Write in place at `offset`, creating the store if it is absent.
fn update_store(path: &Path, offset: u64, data: &[u8]) -> AssetResult<u64> {
    let mut file = match OpenOptions::new().write(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return replace_store(path, data),
        Err(e) => return Err(AssetError::io("open", path, e)),
    };
    file.seek(SeekFrom::Start(offset))
        .map_err(|e| AssetError::io("seek", path, e))?;
    file.write_all(data)
        .map_err(|e| AssetError::io("write", path, e))?;
    file.stream_position()
        .map_err(|e| AssetError::io("seek", path, e))
}

/// Truncate and rewrite from offset 0.
fn replace_store(path: &Path, data: &[u8]) -> AssetResult<u64> {
    let mut file = File::create(path).map_err(|e| AssetError::io("create", path, e))?;
    file.write_all(data)
        .map_err(|e| AssetError::io("write", path, e))?;
    Ok(data.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AssetId, AssetType};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingCache {
        root: PathBuf,
        touches: AtomicUsize,
    }

    impl CacheManager for CountingCache {
        fn resolve_path(&self, id: &str, asset_type: AssetType, _extra_info: &str) -> PathBuf {
            self.root.join(format!("{id}-{asset_type}.bin"))
        }

        fn touch_access_time(&self, _path: &Path) {
            self.touches.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn setup() -> (tempfile::TempDir, CountingCache, AssetKey) {
        let dir = tempfile::tempdir().unwrap();
        let cache = CountingCache {
            root: dir.path().to_path_buf(),
            touches: AtomicUsize::new(0),
        };
        let key = AssetKey::new(AssetId::new(), AssetType::Object);
        (dir, cache, key)
    }

    #[test]
    fn open_for_read_touches_existing_store() {
        let (_dir, cache, key) = setup();
        fs::write(key.store_path(&cache), b"data").unwrap();

        let _file = AssetFile::open(&cache, key, OpenMode::Read);
        assert_eq!(cache.touches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn open_for_read_skips_touch_when_missing() {
        let (_dir, cache, key) = setup();
        let file = AssetFile::open(&cache, key, OpenMode::Read);
        assert_eq!(cache.touches.load(Ordering::SeqCst), 0);
        assert_eq!(file.tell(), 0);
    }

    #[test]
    fn open_for_write_never_touches() {
        let (_dir, cache, key) = setup();
        fs::write(key.store_path(&cache), b"data").unwrap();

        for mode in [OpenMode::Write, OpenMode::ReadWrite, OpenMode::Append] {
            let _file = AssetFile::open(&cache, key, mode);
        }
        assert_eq!(cache.touches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn read_missing_store_leaves_state_untouched() {
        let (_dir, cache, key) = setup();
        let mut file = AssetFile::open(&cache, key, OpenMode::Read);
        let mut buf = [0u8; 4];
        assert!(!file.read(&mut buf));
        assert_eq!(file.tell(), 0);
        assert_eq!(file.last_bytes_read(), 0);
    }

    #[test]
    fn short_read_at_end_still_succeeds() {
        let (_dir, cache, key) = setup();
        fs::write(key.store_path(&cache), b"abc").unwrap();

        let mut file = AssetFile::open(&cache, key, OpenMode::Read);
        let mut buf = [0u8; 8];
        assert!(file.read(&mut buf));
        assert_eq!(file.last_bytes_read(), 3);
        assert_eq!(&buf[..3], b"abc");
        assert_eq!(file.tell(), 3);
        assert!(file.eof());

        assert!(!file.read(&mut buf));
        assert_eq!(file.last_bytes_read(), 0);
        assert_eq!(file.tell(), 3);
    }

    #[test]
    fn empty_buffer_read_reports_failure() {
        let (_dir, cache, key) = setup();
        fs::write(key.store_path(&cache), b"abc").unwrap();

        let mut file = AssetFile::open(&cache, key, OpenMode::Read);
        assert!(!file.read(&mut []));
        assert_eq!(file.tell(), 0);
    }

    #[test]
    fn read_is_allowed_in_write_modes() {
        let (_dir, cache, key) = setup();
        let mut file = AssetFile::open(&cache, key, OpenMode::ReadWrite);
        assert!(file.write(b"xyz"));
        assert!(file.seek(0, SeekOrigin::START));
        let mut buf = [0u8; 3];
        assert!(file.read(&mut buf));
        assert_eq!(&buf, b"xyz");
    }

    #[test]
    fn truncating_write_replaces_content() {
        let (_dir, cache, key) = setup();
        fs::write(key.store_path(&cache), b"a much longer prior body").unwrap();

        let mut file = AssetFile::open(&cache, key, OpenMode::Write);
        assert!(file.write(b"short"));
        assert_eq!(file.tell(), 5);
        assert_eq!(fs::read(file.path()).unwrap(), b"short");
    }

    #[test]
    fn truncating_write_restarts_at_zero_each_call() {
        let (_dir, cache, key) = setup();
        let mut file = AssetFile::open(&cache, key, OpenMode::Write);
        assert!(file.write(b"first"));
        assert!(file.write(b"2nd"));
        assert_eq!(file.tell(), 3);
        assert_eq!(fs::read(file.path()).unwrap(), b"2nd");
    }

    #[test]
    fn read_mode_write_truncates() {
        let (_dir, cache, key) = setup();
        fs::write(key.store_path(&cache), b"previous").unwrap();

        let mut file = AssetFile::open(&cache, key, OpenMode::Read);
        assert!(file.write(b"new"));
        assert_eq!(fs::read(file.path()).unwrap(), b"new");
    }

    #[test]
    fn read_write_updates_in_place() {
        let (_dir, cache, key) = setup();
        fs::write(key.store_path(&cache), b"0123456789").unwrap();

        let mut file = AssetFile::open(&cache, key, OpenMode::ReadWrite);
        assert!(file.seek(3, SeekOrigin::START));
        assert!(file.write(b"abc"));
        assert_eq!(file.tell(), 6);
        assert_eq!(fs::read(file.path()).unwrap(), b"012abc6789");
    }

    #[test]
    fn read_write_extends_past_end() {
        let (_dir, cache, key) = setup();
        fs::write(key.store_path(&cache), b"0123").unwrap();

        let mut file = AssetFile::open(&cache, key, OpenMode::ReadWrite);
        assert!(file.seek(2, SeekOrigin::START));
        assert!(file.write(b"wxyz"));
        assert_eq!(file.tell(), 6);
        assert_eq!(fs::read(file.path()).unwrap(), b"01wxyz");
    }

    #[test]
    fn read_write_creates_missing_store() {
        let (_dir, cache, key) = setup();
        let mut file = AssetFile::open(&cache, key, OpenMode::ReadWrite);
        assert!(file.write(b"fresh"));
        assert_eq!(file.tell(), 5);
        assert!(file.write(b"!"));
        assert_eq!(fs::read(file.path()).unwrap(), b"fresh!");
    }

    #[test]
    fn append_ignores_seek() {
        let (_dir, cache, key) = setup();
        fs::write(key.store_path(&cache), b"foo").unwrap();

        let mut file = AssetFile::open(&cache, key, OpenMode::Append);
        assert!(file.seek(1, SeekOrigin::START));
        assert!(file.write(b"abc"));
        assert_eq!(file.tell(), 6);
        assert_eq!(fs::read(file.path()).unwrap(), b"fooabc");
    }

    #[test]
    fn append_creates_missing_store() {
        let (_dir, cache, key) = setup();
        let mut file = AssetFile::open(&cache, key, OpenMode::Append);
        assert!(file.write(b"one"));
        assert!(file.write(b"two"));
        assert_eq!(file.tell(), 6);
        assert_eq!(fs::read(file.path()).unwrap(), b"onetwo");
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CountingCache {
            root: dir.path().join("not-created"),
            touches: AtomicUsize::new(0),
        };
        let key = AssetKey::new(AssetId::new(), AssetType::Sound);

        for mode in [OpenMode::Write, OpenMode::ReadWrite, OpenMode::Append] {
            let mut file = AssetFile::open(&cache, key, mode);
            assert!(!file.write(b"data"));
            assert_eq!(file.tell(), 0);
        }
    }

    #[test]
    fn seek_relative_to_current() {
        let (_dir, cache, key) = setup();
        fs::write(key.store_path(&cache), b"0123456789").unwrap();

        let mut file = AssetFile::open(&cache, key, OpenMode::Read);
        assert!(file.seek(4, SeekOrigin::START));
        assert!(file.seek(3, SeekOrigin::Current));
        assert_eq!(file.tell(), 7);
        assert!(file.seek(-2, SeekOrigin::from(-1)));
        assert_eq!(file.tell(), 5);
    }

    #[test]
    fn seek_clamps_both_ends() {
        let (_dir, cache, key) = setup();
        fs::write(key.store_path(&cache), b"0123456789").unwrap();

        let mut file = AssetFile::open(&cache, key, OpenMode::Read);
        assert!(!file.seek(11, SeekOrigin::START));
        assert_eq!(file.tell(), 10);
        assert!(file.eof());

        assert!(!file.seek(-1, SeekOrigin::START));
        assert_eq!(file.tell(), 0);

        assert!(!file.seek(-20, SeekOrigin::Absolute(5)));
        assert_eq!(file.tell(), 0);
    }

    #[test]
    fn seek_to_exact_end_succeeds() {
        let (_dir, cache, key) = setup();
        fs::write(key.store_path(&cache), b"abcd").unwrap();

        let mut file = AssetFile::open(&cache, key, OpenMode::Read);
        assert!(file.seek(4, SeekOrigin::START));
        assert!(file.eof());
    }

    #[test]
    fn seek_on_missing_store_clamps_to_zero() {
        let (_dir, cache, key) = setup();
        let mut file = AssetFile::open(&cache, key, OpenMode::Read);
        assert!(file.seek(0, SeekOrigin::START));
        assert!(!file.seek(1, SeekOrigin::START));
        assert_eq!(file.tell(), 0);
        assert!(file.eof());
    }

    #[test]
    fn seek_saturates_instead_of_overflowing() {
        let (_dir, cache, key) = setup();
        fs::write(key.store_path(&cache), b"abcd").unwrap();

        let mut file = AssetFile::open(&cache, key, OpenMode::Read);
        assert!(!file.seek(i64::MAX, SeekOrigin::Absolute(i64::MAX)));
        assert_eq!(file.tell(), 4);
        assert!(!file.seek(i64::MIN, SeekOrigin::Absolute(-1_000)));
        assert_eq!(file.tell(), 0);
    }

    #[test]
    fn eof_tracks_store_growth() {
        let (_dir, cache, key) = setup();
        fs::write(key.store_path(&cache), b"ab").unwrap();

        let mut file = AssetFile::open(&cache, key, OpenMode::Read);
        assert!(file.seek(2, SeekOrigin::START));
        assert!(file.eof());

        fs::write(key.store_path(&cache), b"abcd").unwrap();
        assert!(!file.eof());
    }

    #[test]
    fn size_is_requeried() {
        let (_dir, cache, key) = setup();
        let file = AssetFile::open(&cache, key, OpenMode::Read);
        assert_eq!(file.size(), 0);
        fs::write(key.store_path(&cache), b"12345").unwrap();
        assert_eq!(file.size(), 5);
    }

    #[test]
    fn rename_rebinds_session() {
        let (_dir, cache, key) = setup();
        let new_key = AssetKey::new(AssetId::new(), AssetType::Object);

        let mut file = AssetFile::open(&cache, key, OpenMode::Write);
        assert!(file.write(b"payload"));
        assert!(file.rename(new_key));
        assert_eq!(file.key(), &new_key);
        assert!(!key.exists(&cache));
        assert_eq!(file.size(), 7);
    }

    #[test]
    fn remove_deletes_bound_store() {
        let (_dir, cache, key) = setup();
        let mut file = AssetFile::open(&cache, key, OpenMode::Write);
        assert!(file.write(b"payload"));
        assert!(file.remove());
        assert_eq!(file.size(), 0);
        assert!(file.remove());
    }

    #[test]
    fn max_size_is_unbounded_sentinel() {
        assert_eq!(AssetFile::<CountingCache>::max_size(), MAX_ASSET_SIZE);
        assert!(MAX_ASSET_SIZE > u64::from(u32::MAX));
    }

    #[test]
    fn works_through_trait_object() {
        let (_dir, cache, key) = setup();
        let dyn_cache: &dyn CacheManager = &cache;
        let mut file = AssetFile::open(dyn_cache, key, OpenMode::Write);
        assert!(file.write(b"dyn"));
        assert!(key.exists(dyn_cache));
    }

    #[test]
    fn debug_omits_cache() {
        let (_dir, cache, key) = setup();
        let file = AssetFile::open(&cache, key, OpenMode::Append);
        let dbg = format!("{file:?}");
        assert!(dbg.contains("Append"));
        assert!(dbg.contains("position: 0"));
    }
}
