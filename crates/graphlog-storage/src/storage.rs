//! The backend contract.
//!
//! A [`FileStorage`] is an opaque byte-range store addressed by [`Uri`].
//! Synchronous calls block the caller; the `*_async` calls return futures
//! that the host drives on its own runtime. Every call reports an explicit
//! [`Result`]; data is only valid after the caller has checked it.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::uri::Uri;
use crate::Result;

/// Object metadata returned by [`FileStorage::stat`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatBuf {
    /// Object length in bytes.
    pub size: u64,
}

/// One object found by [`FileStorage::list_async`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ListEntry {
    /// Object name relative to the listed directory.
    pub name: String,
    /// Object length in bytes.
    pub size: u64,
}

/// A storage backend.
///
/// # Key Invariants
///
/// - **Scheme routing**: a backend only receives URIs whose scheme matches
///   [`uri_scheme`](Self::uri_scheme), except the local default, which also
///   receives scheme-less URIs.
/// - **Whole-object puts**: `put_*` replaces the object atomically from the
///   caller's point of view; there is no append.
/// - **Ranged gets**: `get_*` returns exactly `size` bytes starting at
///   `start`, or [`StorageError::OutOfRange`].
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// The scheme this backend serves (e.g. `"file"`, `"mem"`, `"s3"`).
    fn uri_scheme(&self) -> &str;

    /// Backends with higher priority win when several serve one scheme.
    fn priority(&self) -> u32 {
        0
    }

    /// Prepare the backend (open clients, create roots).
    fn init(&self) -> Result<()>;

    /// Release backend resources.
    fn fini(&self) -> Result<()>;

    /// Size of the object at `uri`.
    fn stat(&self, uri: &Uri) -> Result<StatBuf>;

    /// Read `size` bytes at offset `start`.
    fn get_sync(&self, uri: &Uri, start: u64, size: u64) -> Result<Vec<u8>>;

    /// Write the whole object.
    fn put_sync(&self, uri: &Uri, data: &[u8]) -> Result<()>;

    /// Asynchronous [`get_sync`](Self::get_sync).
    async fn get_async(&self, uri: &Uri, start: u64, size: u64) -> Result<Vec<u8>>;

    /// Asynchronous [`put_sync`](Self::put_sync).
    async fn put_async(&self, uri: &Uri, data: Vec<u8>) -> Result<()>;

    /// Objects directly under `dir`, sorted by name.
    async fn list_async(&self, dir: &Uri) -> Result<Vec<ListEntry>>;

    /// Delete the named objects under `dir`. Missing names are ignored.
    async fn delete_async(&self, dir: &Uri, files: &HashSet<String>) -> Result<()>;
}

/// Validate a ranged read against an object length, returning the byte
/// range as `usize` bounds.
pub(crate) fn checked_range(
    uri: &Uri,
    start: u64,
    size: u64,
    len: u64,
) -> Result<std::ops::Range<usize>> {
    let out_of_range = || StorageError::OutOfRange {
        uri: uri.to_string(),
        start,
        size,
        len,
    };
    let end = start.checked_add(size).ok_or_else(out_of_range)?;
    if end > len {
        return Err(out_of_range());
    }
    let lo = usize::try_from(start).map_err(|_| out_of_range())?;
    let hi = usize::try_from(end).map_err(|_| out_of_range())?;
    Ok(lo..hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_range_accepts_exact_end() {
        let uri = Uri::parse("mem://a").unwrap();
        assert_eq!(checked_range(&uri, 2, 3, 5).unwrap(), 2..5);
        assert_eq!(checked_range(&uri, 5, 0, 5).unwrap(), 5..5);
    }

    #[test]
    fn checked_range_rejects_overflow_and_overrun() {
        let uri = Uri::parse("mem://a").unwrap();
        assert!(matches!(
            checked_range(&uri, 4, 2, 5),
            Err(StorageError::OutOfRange { len: 5, .. })
        ));
        assert!(checked_range(&uri, u64::MAX, 2, 5).is_err());
    }
}
