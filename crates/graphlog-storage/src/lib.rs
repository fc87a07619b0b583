//! Object storage abstraction for graphlog.
//!
//! This crate defines the [`FileStorage`] trait, the byte-range store that
//! graph partitions and (eventually) persisted operation logs live in, and
//! the [`StorageRegistry`] that routes a [`Uri`] to the backend registered
//! for its scheme.
//!
//! # Crate layout
//!
//! - [`uri`]: the [`Uri`] location type.
//! - [`storage`]: the [`FileStorage`] trait and its value types.
//! - [`registry`]: [`StorageRegistry`], scheme routing by priority.
//! - [`error`]: the [`StorageError`] enum returned by every fallible call.
//!
//! Two backends ship: [`LocalStorage`] (the `file` scheme and the default
//! for scheme-less URIs) and [`MemoryStorage`] (the `mem` scheme).

pub mod error;
pub mod registry;
pub mod storage;
pub mod uri;

mod local;
mod memory;

pub use error::StorageError;
pub use local::LocalStorage;
pub use memory::MemoryStorage;
pub use registry::StorageRegistry;
pub use storage::{FileStorage, ListEntry, StatBuf};
pub use uri::{Uri, UriError};

/// Convenience alias for results returned by storage backends.
pub type Result<T> = std::result::Result<T, StorageError>;
