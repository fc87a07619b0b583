//! Scheme-routed registry of storage backends.
//!
//! The registry is an explicit object owned by the host and passed to
//! whatever needs storage. Hosts may hold several independent registries
//! (tests commonly do). Lifecycle:
//!
//! ```text
//! StorageRegistry::new()
//!   → register(backend)…     (only before init)
//!   → init()                 (once; second call → AlreadyInitialized)
//!   → resolve(uri)…
//!   → fini()
//! ```

use std::sync::Arc;

use tracing::{debug, error};

use crate::error::StorageError;
use crate::local::LOCAL_SCHEME;
use crate::storage::FileStorage;
use crate::uri::Uri;
use crate::Result;

/// Routes URIs to registered [`FileStorage`] backends.
#[derive(Default)]
pub struct StorageRegistry {
    backends: Vec<Arc<dyn FileStorage>>,
    initialized: bool,
}

impl std::fmt::Debug for StorageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let schemes: Vec<_> = self.backends.iter().map(|b| b.uri_scheme()).collect();
        f.debug_struct("StorageRegistry")
            .field("backends", &schemes)
            .field("initialized", &self.initialized)
            .finish()
    }
}

impl StorageRegistry {
    /// An empty, uninitialized registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a backend. Backends must be registered before [`init`](Self::init).
    ///
    /// # Errors
    /// Returns [`StorageError::RegistrationClosed`] after `init`.
    pub fn register(&mut self, backend: Arc<dyn FileStorage>) -> Result<()> {
        if self.initialized {
            return Err(StorageError::RegistrationClosed {
                scheme: backend.uri_scheme().to_owned(),
            });
        }
        debug!(
            scheme = backend.uri_scheme(),
            priority = backend.priority(),
            "registering storage backend"
        );
        self.backends.push(backend);
        Ok(())
    }

    /// Initialize every registered backend, in registration order.
    ///
    /// # Errors
    /// Returns [`StorageError::AlreadyInitialized`] on a second call (a fatal
    /// host error), or the first backend initialization failure.
    pub fn init(&mut self) -> Result<()> {
        if self.initialized {
            error!("storage registry initialized twice");
            return Err(StorageError::AlreadyInitialized);
        }
        for backend in &self.backends {
            backend.init()?;
        }
        self.initialized = true;
        Ok(())
    }

    /// Shut down every backend. The registry may be initialized again.
    ///
    /// # Errors
    /// Returns [`StorageError::NotInitialized`] if `init` has not run, or the
    /// first backend shutdown failure.
    pub fn fini(&mut self) -> Result<()> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }
        self.initialized = false;
        for backend in &self.backends {
            backend.fini()?;
        }
        Ok(())
    }

    /// Whether [`init`](Self::init) has completed.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of registered backends.
    #[must_use]
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Whether no backends are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Pick the backend for `uri`.
    ///
    /// The highest-priority backend whose scheme matches wins; ties go to the
    /// earliest registered. URIs with no scheme, or with a scheme nothing
    /// serves, fall back to the highest-priority local (`file`) backend.
    ///
    /// # Errors
    /// Returns [`StorageError::NotInitialized`] before `init`, or
    /// [`StorageError::NoBackend`] when neither a match nor a local default
    /// exists.
    pub fn resolve(&self, uri: &Uri) -> Result<Arc<dyn FileStorage>> {
        if !self.initialized {
            return Err(StorageError::NotInitialized);
        }
        let scheme = uri.scheme().unwrap_or(LOCAL_SCHEME);
        self.best_for(scheme)
            .or_else(|| {
                debug!(scheme, "no backend for scheme, using local default");
                self.best_for(LOCAL_SCHEME)
            })
            .ok_or_else(|| StorageError::NoBackend {
                scheme: uri.scheme().unwrap_or_default().to_owned(),
            })
    }

    fn best_for(&self, scheme: &str) -> Option<Arc<dyn FileStorage>> {
        // `max_by_key` keeps the last maximum; iterate in reverse so the
        // earliest registration wins ties.
        self.backends
            .iter()
            .rev()
            .filter(|b| b.uri_scheme() == scheme)
            .max_by_key(|b| b.priority())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LocalStorage, MemoryStorage};

    fn uri(s: &str) -> Uri {
        Uri::parse(s).unwrap()
    }

    #[test]
    fn resolve_before_init_fails() {
        let mut registry = StorageRegistry::new();
        registry.register(Arc::new(MemoryStorage::new())).unwrap();
        assert!(matches!(
            registry.resolve(&uri("mem://x")),
            Err(StorageError::NotInitialized)
        ));
    }

    #[test]
    fn double_init_is_rejected() {
        let mut registry = StorageRegistry::new();
        registry.init().unwrap();
        let err = registry.init().unwrap_err();
        assert!(matches!(err, StorageError::AlreadyInitialized));
        assert!(err.is_fatal());
    }

    #[test]
    fn register_after_init_is_rejected() {
        let mut registry = StorageRegistry::new();
        registry.init().unwrap();
        assert!(matches!(
            registry.register(Arc::new(MemoryStorage::new())),
            Err(StorageError::RegistrationClosed { .. })
        ));
    }

    #[test]
    fn highest_priority_wins() {
        let low = Arc::new(MemoryStorage::with_priority(1));
        let high = Arc::new(MemoryStorage::with_priority(5));
        let mut registry = StorageRegistry::new();
        registry.register(low).unwrap();
        registry.register(high.clone()).unwrap();
        registry.init().unwrap();

        let picked = registry.resolve(&uri("mem://obj")).unwrap();
        assert_eq!(picked.priority(), 5);
        picked.put_sync(&uri("mem://obj"), b"v").unwrap();
        assert_eq!(high.len(), 1);
    }

    #[test]
    fn ties_go_to_first_registered() {
        let first = Arc::new(MemoryStorage::new());
        let second = Arc::new(MemoryStorage::new());
        let mut registry = StorageRegistry::new();
        registry.register(first.clone()).unwrap();
        registry.register(second.clone()).unwrap();
        registry.init().unwrap();

        let picked = registry.resolve(&uri("mem://obj")).unwrap();
        picked.put_sync(&uri("mem://obj"), b"v").unwrap();
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }

    #[test]
    fn unmatched_scheme_falls_back_to_local() {
        let mut registry = StorageRegistry::new();
        registry.register(Arc::new(MemoryStorage::new())).unwrap();
        registry.register(Arc::new(LocalStorage::new())).unwrap();
        registry.init().unwrap();

        assert_eq!(registry.resolve(&uri("/tmp/x")).unwrap().uri_scheme(), "file");
        assert_eq!(registry.resolve(&uri("s3://b/k")).unwrap().uri_scheme(), "file");
        assert_eq!(registry.resolve(&uri("mem://k")).unwrap().uri_scheme(), "mem");
    }

    #[test]
    fn no_backend_without_local_default() {
        let mut registry = StorageRegistry::new();
        registry.register(Arc::new(MemoryStorage::new())).unwrap();
        registry.init().unwrap();
        assert!(matches!(
            registry.resolve(&uri("s3://b/k")),
            Err(StorageError::NoBackend { scheme }) if scheme == "s3"
        ));
    }

    #[test]
    fn fini_allows_reinit() {
        let mut registry = StorageRegistry::new();
        registry.init().unwrap();
        registry.fini().unwrap();
        assert!(!registry.is_initialized());
        registry.init().unwrap();
        assert!(registry.fini().is_ok());
        assert!(matches!(registry.fini(), Err(StorageError::NotInitialized)));
    }
}
