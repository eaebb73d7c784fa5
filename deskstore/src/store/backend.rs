use crate::collection::DocumentCollectionProvider;
use crate::errors::StoreResult;
use std::fmt::Display;
use std::ops::Deref;
use std::sync::Arc;

/// Which backend a store bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// The external document database.
    Live,
    /// The in-process store.
    Embedded,
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Live => write!(f, "live"),
            BackendKind::Embedded => write!(f, "embedded"),
        }
    }
}

/// Contract of a storage backend.
///
/// A backend hands out collections by name, creating them lazily, and can be
/// probed for liveness. Implementations must be `Send + Sync`; the same
/// backend serves every collection handle of a store.
pub trait StoreBackendProvider: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Returns collection `name`, creating an empty one when absent.
    fn collection(&self, name: &str) -> StoreResult<Arc<dyn DocumentCollectionProvider>>;

    /// Names of the collections created so far.
    fn collection_names(&self) -> StoreResult<Vec<String>>;

    /// Cheap round trip proving the backend answers.
    fn ping(&self) -> StoreResult<()>;

    /// Releases the backend. Closing twice is not an error.
    fn close(&self) -> StoreResult<()>;

    fn is_closed(&self) -> bool;
}

/// Shared handle on a storage backend.
#[derive(Clone)]
pub struct StoreBackend {
    inner: Arc<dyn StoreBackendProvider>,
}

impl StoreBackend {
    pub fn new<T: StoreBackendProvider + 'static>(inner: T) -> Self {
        StoreBackend {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for StoreBackend {
    type Target = Arc<dyn StoreBackendProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl std::fmt::Debug for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreBackend")
            .field("kind", &self.inner.kind())
            .field("closed", &self.inner.is_closed())
            .finish()
    }
}
