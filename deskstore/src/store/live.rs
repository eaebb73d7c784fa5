use super::StoreBackend;
use crate::errors::StoreResult;
use crate::store_config::StoreConfig;

/// Opens a connection to the live document database.
///
/// The connector owns the wire protocol. It receives the store configuration
/// (`live_url`, `database_name`) and returns a backend whose `kind` is
/// [super::BackendKind::Live]. A connector may block; the selector runs it on
/// a worker thread and stops waiting after the configured timeout.
///
/// Closures of the right shape are connectors:
///
/// ```rust,ignore
/// let store = DeskStore::builder()
///     .live_url("mongodb://localhost:27017")
///     .live_connector(|config: &StoreConfig| MongoBackend::connect(config))
///     .open()?;
/// ```
pub trait LiveConnector: Send + Sync {
    fn connect(&self, config: &StoreConfig) -> StoreResult<StoreBackend>;
}

impl<F> LiveConnector for F
where
    F: Fn(&StoreConfig) -> StoreResult<StoreBackend> + Send + Sync,
{
    fn connect(&self, config: &StoreConfig) -> StoreResult<StoreBackend> {
        self(config)
    }
}
