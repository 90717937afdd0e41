//! Error types for the asset cache.
//!
//! The [`AssetFile`](crate::AssetFile) accessor never returns these: its
//! surface is boolean by contract. They are produced by identity parsing and
//! by the fallible parts of the reference [`DiskCache`](crate::DiskCache).

use std::path::PathBuf;

/// Asset cache error type with contextual variants.
///
/// # Examples
///
/// ```rust
/// use asset_file::AssetError;
/// use std::path::PathBuf;
///
/// let err = AssetError::NotFound { path: PathBuf::from("/cache/a.asset") };
/// assert_eq!(err.to_string(), "not found: /cache/a.asset");
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// The byte store does not exist.
    #[error("not found: {path}")]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// Expected a regular file but found something else.
    #[error("not a file: {path}")]
    NotAFile {
        /// The offending path.
        path: PathBuf,
    },

    /// A string could not be parsed as an asset id.
    #[error("invalid asset id {input:?}: {reason}")]
    InvalidAssetId {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A string did not name a known asset type.
    #[error("unknown asset type: {name}")]
    UnknownAssetType {
        /// The rejected name.
        name: String,
    },

    /// Cache configuration failed validation.
    #[error("invalid cache configuration: {reason}")]
    InvalidConfig {
        /// What was wrong.
        reason: String,
    },

    /// I/O error with context.
    #[error("{operation} failed for {path}: {source}")]
    Io {
        /// The operation that failed.
        operation: &'static str,
        /// The path involved in the operation.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl AssetError {
    /// Wraps an I/O error with the operation and path it belongs to.
    ///
    /// `NotFound` errors are mapped to [`AssetError::NotFound`] so callers can
    /// match on a missing store without inspecting the source.
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => AssetError::NotFound { path },
            _ => AssetError::Io {
                operation,
                path,
                source,
            },
        }
    }

    /// Returns the [`std::io::ErrorKind`] this error corresponds to, if any.
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            AssetError::NotFound { .. } => Some(std::io::ErrorKind::NotFound),
            AssetError::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AssetError {
    fn from(error: std::io::Error) -> Self {
        AssetError::io("io", PathBuf::new(), error)
    }
}

/// Result alias for asset cache operations.
pub type AssetResult<T> = Result<T, AssetError>;
