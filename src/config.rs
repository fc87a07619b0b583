//! graphlog configuration (`graphlog.toml`).
//!
//! Selects how fatal replay errors are handled and which storage backends
//! the host registers.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use graphlog_storage::{LocalStorage, MemoryStorage, StorageError, StorageRegistry};
use serde::Deserialize;

use crate::oplog::{FatalPolicy, Replayer};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level graphlog configuration.
///
/// Missing fields use defaults. Missing file → all defaults (no error).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphlogConfig {
    /// Replay settings.
    #[serde(default)]
    pub replay: ReplayConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

// ---------------------------------------------------------------------------
// ReplayConfig
// ---------------------------------------------------------------------------

/// Replay settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplayConfig {
    /// What to do when replay hits a fatal error (default: `"propagate"`).
    #[serde(default)]
    pub on_fatal: FatalPolicy,
}

impl ReplayConfig {
    /// A [`Replayer`] honoring this configuration.
    #[must_use]
    pub const fn replayer(&self) -> Replayer {
        Replayer::new(self.on_fatal)
    }
}

// ---------------------------------------------------------------------------
// StorageConfig
// ---------------------------------------------------------------------------

/// Storage backend selection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Base directory for relative local paths. Unset → process CWD.
    #[serde(default)]
    pub local_root: Option<PathBuf>,

    /// Also register the in-memory `mem://` backend.
    #[serde(default)]
    pub memory: bool,
}

impl StorageConfig {
    /// Build and initialize a registry with the configured backends.
    ///
    /// The local backend is always registered.
    ///
    /// # Errors
    /// Returns `StorageError` if a backend fails to initialize.
    pub fn build_registry(&self) -> Result<StorageRegistry, StorageError> {
        let local = self
            .local_root
            .as_ref()
            .map_or_else(LocalStorage::new, LocalStorage::with_root);

        let mut registry = StorageRegistry::new();
        registry.register(Arc::new(local))?;
        if self.memory {
            registry.register(Arc::new(MemoryStorage::new()))?;
        }
        registry.init()?;
        Ok(registry)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Error loading a graphlog configuration file.
#[derive(Debug)]
pub struct ConfigError {
    /// The path that was being loaded (if available).
    pub path: Option<PathBuf>,
    /// Human-readable message with line-level detail when possible.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = &self.path {
            write!(f, "{}: {}", p.display(), self.message)
        } else {
            write!(f, "config error: {}", self.message)
        }
    }
}

impl std::error::Error for ConfigError {}

impl GraphlogConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields all defaults. Invalid TOML or unknown fields
    /// yield a [`ConfigError`] with line-level detail.
    ///
    /// # Errors
    /// Returns `ConfigError` on I/O errors (other than not-found) or parse errors.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError {
                    path: Some(path.to_owned()),
                    message: format!("could not read file: {e}"),
                });
            }
        };
        Self::parse(&contents).map_err(|mut e| {
            e.path = Some(path.to_owned());
            e
        })
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ConfigError` on invalid TOML or unknown fields.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| {
            let message = match e.span() {
                Some(span) => {
                    let line = toml_str[..span.start].matches('\n').count() + 1;
                    format!("line {line}: {}", e.message())
                }
                None => e.message().to_owned(),
            };
            ConfigError {
                path: None,
                message,
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
