//! Error types for storage operations.
//!
//! [`StorageError`] is the single error type returned by every
//! [`FileStorage`](crate::FileStorage) method and by the
//! [`StorageRegistry`](crate::StorageRegistry). Callers match on the variant
//! instead of parsing messages.

use thiserror::Error;

use crate::uri::UriError;

/// Errors returned by storage backends and the registry.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The addressed object does not exist.
    #[error("not found: {uri}")]
    NotFound {
        /// The URI that was looked up.
        uri: String,
    },

    /// A ranged read asked for bytes past the end of the object.
    #[error("range {start}+{size} out of bounds for {uri} ({len} bytes)")]
    OutOfRange {
        /// The object that was read.
        uri: String,
        /// First requested byte.
        start: u64,
        /// Number of requested bytes.
        size: u64,
        /// Actual object length.
        len: u64,
    },

    /// No registered backend can serve the URI's scheme and no local
    /// default is registered.
    #[error("no storage backend registered for scheme `{scheme}`")]
    NoBackend {
        /// The scheme that could not be routed (empty for bare paths).
        scheme: String,
    },

    /// `init` was called on a registry that is already initialized.
    ///
    /// This is a programming error in the host; treat it as fatal.
    #[error("storage registry already initialized")]
    AlreadyInitialized,

    /// The registry was used before `init`.
    #[error("storage registry not initialized")]
    NotInitialized,

    /// A backend was registered after the registry was initialized.
    #[error("cannot register backend `{scheme}` after init")]
    RegistrationClosed {
        /// Scheme of the rejected backend.
        scheme: String,
    },

    /// The location string could not be parsed.
    #[error(transparent)]
    InvalidUri(#[from] UriError),

    /// An I/O error from the underlying filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Whether this error reflects host misuse rather than an I/O outcome.
    ///
    /// Fatal errors must not be retried; the host is expected to stop.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::AlreadyInitialized | Self::RegistrationClosed { .. })
    }
}
