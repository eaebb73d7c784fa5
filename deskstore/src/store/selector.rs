use super::memory::InMemoryStore;
use super::{BackendKind, LiveConnector, StoreBackend, StoreBackendProvider};
use crate::errors::{ErrorKind, StoreError, StoreResult};
use crate::seed::seed_fixtures;
use crate::store_config::StoreConfig;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;

enum SelectorState {
    Unresolved,
    Bound(StoreBackend),
}

/// Chooses the backend of a store exactly once.
///
/// The first call to [BackendSelector::backend] tries the live connector,
/// waiting at most the configured connect timeout for it to connect and
/// answer a ping. Any failure binds the embedded store instead, and the
/// reason is logged once. The binding is final: later calls return the same
/// backend and the live database is never retried.
#[derive(Clone)]
pub struct BackendSelector {
    inner: Arc<BackendSelectorInner>,
}

impl BackendSelector {
    pub fn new(config: StoreConfig, connector: Option<Arc<dyn LiveConnector>>) -> Self {
        BackendSelector {
            inner: Arc::new(BackendSelectorInner {
                config,
                connector,
                state: RwLock::new(SelectorState::Unresolved),
                closed: AtomicBool::new(false),
                attempts: AtomicUsize::new(0),
            }),
        }
    }

    /// The bound backend, resolving it on first call.
    ///
    /// Concurrent first callers wait for a single resolution.
    pub fn backend(&self) -> StoreResult<StoreBackend> {
        self.inner.backend()
    }

    /// Kind of the bound backend, `None` before resolution.
    pub fn kind(&self) -> Option<BackendKind> {
        match &*self.inner.state.read() {
            SelectorState::Unresolved => None,
            SelectorState::Bound(backend) => Some(backend.kind()),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.kind().is_some()
    }

    /// Number of times a live connection was attempted.
    pub fn live_attempts(&self) -> usize {
        self.inner.attempts.load(Ordering::Relaxed)
    }

    /// Closes the bound backend. An unresolved selector will never resolve
    /// afterwards.
    pub fn close(&self) -> StoreResult<()> {
        self.inner.closed.store(true, Ordering::Relaxed);
        match &*self.inner.state.read() {
            SelectorState::Bound(backend) => backend.close(),
            SelectorState::Unresolved => Ok(()),
        }
    }
}

struct BackendSelectorInner {
    config: StoreConfig,
    connector: Option<Arc<dyn LiveConnector>>,
    state: RwLock<SelectorState>,
    closed: AtomicBool,
    attempts: AtomicUsize,
}

impl BackendSelectorInner {
    fn backend(&self) -> StoreResult<StoreBackend> {
        if let SelectorState::Bound(backend) = &*self.state.read() {
            return Ok(backend.clone());
        }

        let mut state = self.state.write();
        if let SelectorState::Bound(backend) = &*state {
            return Ok(backend.clone());
        }

        if self.closed.load(Ordering::Relaxed) {
            log::error!("Store is closed");
            return Err(StoreError::new("Store is closed", ErrorKind::StoreClosed));
        }

        let backend = self.resolve();
        *state = SelectorState::Bound(backend.clone());
        Ok(backend)
    }

    fn resolve(&self) -> StoreBackend {
        match self.connect_live() {
            Ok(Some(backend)) => {
                log::info!(
                    "Bound to live database {} ({})",
                    self.config.database_name(),
                    self.config.live_url().unwrap_or("custom connector")
                );
                backend
            }
            Ok(None) => {
                log::info!("No live database configured, using embedded store");
                self.embedded()
            }
            Err(reason) => {
                log::warn!("{}, falling back to embedded store", reason);
                self.embedded()
            }
        }
    }

    fn connect_live(&self) -> StoreResult<Option<StoreBackend>> {
        let connector = match &self.connector {
            Some(connector) => connector.clone(),
            None if self.config.live_url().is_some() => {
                return Err(StoreError::new(
                    "No live connector configured for the live database url",
                    ErrorKind::BackendUnavailable,
                ))
            }
            None => return Ok(None),
        };

        self.attempts.fetch_add(1, Ordering::Relaxed);
        let timeout = self.config.connect_timeout();
        let config = self.config.clone();
        let (tx, rx) = mpsc::channel();

        let spawned = thread::Builder::new()
            .name("deskstore-connect".to_string())
            .spawn(move || {
                let result = connector.connect(&config).and_then(|backend| {
                    if let Err(e) = backend.ping() {
                        let _ = backend.close();
                        return Err(e);
                    }
                    Ok(backend)
                });

                // the selector gave up waiting, release what arrived late
                if let Err(mpsc::SendError(Ok(backend))) = tx.send(result) {
                    let _ = backend.close();
                }
            });

        if let Err(e) = spawned {
            return Err(StoreError::new(
                &format!("Failed to start live connection worker: {}", e),
                ErrorKind::BackendUnavailable,
            ));
        }

        match rx.recv_timeout(timeout) {
            Ok(Ok(backend)) => Ok(Some(backend)),
            Ok(Err(cause)) => Err(StoreError::new_with_cause(
                &format!("Live database unavailable: {}", cause),
                ErrorKind::BackendUnavailable,
                cause,
            )),
            Err(RecvTimeoutError::Timeout) => Err(StoreError::new(
                &format!("Live database did not answer within {:?}", timeout),
                ErrorKind::BackendUnavailable,
            )),
            Err(RecvTimeoutError::Disconnected) => Err(StoreError::new(
                "Live connection worker panicked",
                ErrorKind::BackendUnavailable,
            )),
        }
    }

    fn embedded(&self) -> StoreBackend {
        let store = InMemoryStore::new();
        if self.config.seed_fixtures() {
            match seed_fixtures(&store) {
                Ok(()) => log::info!("Seeded embedded store with sample dashboard data"),
                Err(e) => log::error!("Failed to seed embedded store: {}", e),
            }
        }
        StoreBackend::new(store)
    }
}
