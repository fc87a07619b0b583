//! Local filesystem backend (`file://` and bare paths).

use std::collections::HashSet;
use std::io::{Read as _, Seek as _, SeekFrom, Write as _};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt as _, AsyncSeekExt as _};
use tracing::debug;

use crate::error::StorageError;
use crate::storage::{checked_range, FileStorage, ListEntry, StatBuf};
use crate::uri::Uri;
use crate::Result;

/// Scheme served by [`LocalStorage`].
pub const LOCAL_SCHEME: &str = "file";

/// Stores objects as plain files.
///
/// Relative paths are resolved against the optional root; absolute paths
/// are used as-is. Each put writes its own sibling temp file
/// (`.{name}.XXXXXX.partial`), fsyncs it and renames it over the target, so
/// readers never observe a half-written object and concurrent puts to one
/// object do not collide.
#[derive(Clone, Debug, Default)]
pub struct LocalStorage {
    root: Option<PathBuf>,
}

impl LocalStorage {
    /// A backend that resolves relative paths against the process CWD.
    #[must_use]
    pub const fn new() -> Self {
        Self { root: None }
    }

    /// A backend that resolves relative paths against `root`.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// The configured root, if any.
    #[must_use]
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    fn resolve(&self, uri: &Uri) -> PathBuf {
        let path = Path::new(uri.path());
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

fn map_io(uri: &Uri, err: std::io::Error) -> StorageError {
    if err.kind() == std::io::ErrorKind::NotFound {
        StorageError::NotFound {
            uri: uri.to_string(),
        }
    } else {
        StorageError::Io(err)
    }
}

/// Random characters in a temp-file name.
const TEMP_RAND_LEN: usize = 6;

const TEMP_SUFFIX: &str = ".partial";

/// Write `data` to `path` via a uniquely named temp file + fsync + rename.
fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut tmp = tempfile::Builder::new()
        .prefix(&format!(".{name}."))
        .suffix(TEMP_SUFFIX)
        .rand_bytes(TEMP_RAND_LEN)
        .tempfile_in(parent)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Whether `name` is one of our in-flight temp files: `.{target}.XXXXXX.partial`.
fn is_temp_name(name: &str) -> bool {
    let Some(stem) = name
        .strip_prefix('.')
        .and_then(|n| n.strip_suffix(TEMP_SUFFIX))
    else {
        return false;
    };
    stem.rsplit_once('.').is_some_and(|(target, rand)| {
        !target.is_empty()
            && rand.len() == TEMP_RAND_LEN
            && rand.bytes().all(|b| b.is_ascii_alphanumeric())
    })
}

#[async_trait]
impl FileStorage for LocalStorage {
    fn uri_scheme(&self) -> &str {
        LOCAL_SCHEME
    }

    fn init(&self) -> Result<()> {
        if let Some(root) = &self.root {
            std::fs::create_dir_all(root)?;
            debug!(root = %root.display(), "local storage ready");
        }
        Ok(())
    }

    fn fini(&self) -> Result<()> {
        Ok(())
    }

    fn stat(&self, uri: &Uri) -> Result<StatBuf> {
        let meta = std::fs::metadata(self.resolve(uri)).map_err(|e| map_io(uri, e))?;
        Ok(StatBuf { size: meta.len() })
    }

    fn get_sync(&self, uri: &Uri, start: u64, size: u64) -> Result<Vec<u8>> {
        let mut file = std::fs::File::open(self.resolve(uri)).map_err(|e| map_io(uri, e))?;
        let len = file.metadata()?.len();
        let range = checked_range(uri, start, size, len)?;
        let mut buf = vec![0; range.len()];
        file.seek(SeekFrom::Start(start))?;
        file.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn put_sync(&self, uri: &Uri, data: &[u8]) -> Result<()> {
        write_atomic(&self.resolve(uri), data)?;
        Ok(())
    }

    async fn get_async(&self, uri: &Uri, start: u64, size: u64) -> Result<Vec<u8>> {
        let mut file = tokio::fs::File::open(self.resolve(uri))
            .await
            .map_err(|e| map_io(uri, e))?;
        let len = file.metadata().await?.len();
        let range = checked_range(uri, start, size, len)?;
        let mut buf = vec![0; range.len()];
        file.seek(SeekFrom::Start(start)).await?;
        file.read_exact(&mut buf).await?;
        Ok(buf)
    }

    async fn put_async(&self, uri: &Uri, data: Vec<u8>) -> Result<()> {
        let path = self.resolve(uri);
        tokio::task::spawn_blocking(move || write_atomic(&path, &data))
            .await
            .map_err(std::io::Error::other)??;
        Ok(())
    }

    async fn list_async(&self, dir: &Uri) -> Result<Vec<ListEntry>> {
        let mut read_dir = match tokio::fs::read_dir(self.resolve(dir)).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::Io(e)),
        };
        let mut entries = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            let meta = entry.metadata().await?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !meta.is_file() || is_temp_name(&name) {
                continue;
            }
            entries.push(ListEntry {
                name,
                size: meta.len(),
            });
        }
        entries.sort();
        Ok(entries)
    }

    async fn delete_async(&self, dir: &Uri, files: &HashSet<String>) -> Result<()> {
        let base = self.resolve(dir);
        for name in files {
            match tokio::fs::remove_file(base.join(name)).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(name, dir = %dir, "delete of missing object ignored");
                }
                Err(e) => return Err(StorageError::Io(e)),
            }
        }
        Ok(())
    }
}
