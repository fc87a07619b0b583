//! In-process backend (`mem://`), for tests and ephemeral graphs.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::StorageError;
use crate::storage::{checked_range, FileStorage, ListEntry, StatBuf};
use crate::uri::Uri;
use crate::Result;

/// Scheme served by [`MemoryStorage`].
pub const MEMORY_SCHEME: &str = "mem";

/// Objects held in a map keyed by URI path.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    priority: u32,
}

impl MemoryStorage {
    /// An empty store with priority 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty store with the given routing priority.
    #[must_use]
    pub fn with_priority(priority: u32) -> Self {
        Self {
            objects: Mutex::default(),
            priority,
        }
    }

    /// Number of stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects().len()
    }

    /// Whether the store holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects().is_empty()
    }

    // A panic while holding the lock cannot leave the map half-updated:
    // every mutation is a single insert or remove.
    fn objects(&self) -> MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self, uri: &Uri, start: u64, size: u64) -> Result<Vec<u8>> {
        let objects = self.objects();
        let data = objects.get(uri.path()).ok_or_else(|| StorageError::NotFound {
            uri: uri.to_string(),
        })?;
        let range = checked_range(uri, start, size, data.len() as u64)?;
        Ok(data[range].to_vec())
    }

    fn dir_prefix(dir: &Uri) -> String {
        let mut prefix = dir.path().to_owned();
        if !prefix.is_empty() && !prefix.ends_with('/') {
            prefix.push('/');
        }
        prefix
    }
}

#[async_trait]
impl FileStorage for MemoryStorage {
    fn uri_scheme(&self) -> &str {
        MEMORY_SCHEME
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn init(&self) -> Result<()> {
        Ok(())
    }

    fn fini(&self) -> Result<()> {
        self.objects().clear();
        Ok(())
    }

    fn stat(&self, uri: &Uri) -> Result<StatBuf> {
        self.objects()
            .get(uri.path())
            .map(|data| StatBuf {
                size: data.len() as u64,
            })
            .ok_or_else(|| StorageError::NotFound {
                uri: uri.to_string(),
            })
    }

    fn get_sync(&self, uri: &Uri, start: u64, size: u64) -> Result<Vec<u8>> {
        self.read(uri, start, size)
    }

    fn put_sync(&self, uri: &Uri, data: &[u8]) -> Result<()> {
        self.objects().insert(uri.path().to_owned(), data.to_vec());
        Ok(())
    }

    async fn get_async(&self, uri: &Uri, start: u64, size: u64) -> Result<Vec<u8>> {
        self.read(uri, start, size)
    }

    async fn put_async(&self, uri: &Uri, data: Vec<u8>) -> Result<()> {
        self.objects().insert(uri.path().to_owned(), data);
        Ok(())
    }

    async fn list_async(&self, dir: &Uri) -> Result<Vec<ListEntry>> {
        let prefix = Self::dir_prefix(dir);
        let entries = self
            .objects()
            .iter()
            .filter_map(|(key, data)| {
                let name = key.strip_prefix(&prefix)?;
                (!name.is_empty() && !name.contains('/')).then(|| ListEntry {
                    name: name.to_owned(),
                    size: data.len() as u64,
                })
            })
            .collect();
        Ok(entries)
    }

    async fn delete_async(&self, dir: &Uri, files: &HashSet<String>) -> Result<()> {
        let prefix = Self::dir_prefix(dir);
        let mut objects = self.objects();
        for name in files {
            objects.remove(&format!("{prefix}{name}"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(s: &str) -> Uri {
        Uri::parse(s).unwrap()
    }

    #[test]
    fn put_then_ranged_get() {
        let store = MemoryStorage::new();
        store.put_sync(&uri("mem://g/meta"), b"abcdef").unwrap();
        assert_eq!(store.get_sync(&uri("mem://g/meta"), 1, 3).unwrap(), b"bcd");
        assert_eq!(store.stat(&uri("mem://g/meta")).unwrap().size, 6);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn missing_object_is_not_found() {
        let store = MemoryStorage::new();
        assert!(matches!(
            store.get_sync(&uri("mem://nope"), 0, 0),
            Err(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn fini_drops_objects() {
        let store = MemoryStorage::new();
        store.put_sync(&uri("mem://a"), b"x").unwrap();
        store.fini().unwrap();
        assert!(store.is_empty());
    }
}
