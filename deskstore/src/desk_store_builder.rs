use crate::collection::CollectionDefaults;
use crate::desk_store::DeskStore;
use crate::errors::{StoreError, StoreResult};
use crate::store::LiveConnector;
use crate::store_config::StoreConfig;
use std::sync::Arc;
use std::time::Duration;

/// Builder for a [DeskStore].
///
/// Setters never fail; the first invalid value is kept and returned by
/// [DeskStoreBuilder::open].
///
/// # Examples
///
/// ```rust,ignore
/// use deskstore::DeskStore;
///
/// // embedded only, preloaded with sample data
/// let store = DeskStore::builder().seed_fixtures(true).open()?;
///
/// // live database with a two second budget for the first connection
/// let store = DeskStore::builder()
///     .live_url("mongodb://localhost:27017")
///     .database_name("whatsapp_dashboard")
///     .connect_timeout(Duration::from_secs(2))
///     .live_connector(MongoConnector::new())
///     .open()?;
/// ```
#[derive(Default)]
pub struct DeskStoreBuilder {
    error: Option<StoreError>,
    config: StoreConfig,
    connector: Option<Arc<dyn LiveConnector>>,
}

impl DeskStoreBuilder {
    pub fn new() -> Self {
        DeskStoreBuilder {
            error: None,
            config: StoreConfig::new(),
            connector: None,
        }
    }

    fn capture(&mut self, result: StoreResult<()>) {
        if self.error.is_none() {
            if let Err(e) = result {
                self.error = Some(e);
            }
        }
    }

    /// Replaces the configuration with the one found in the environment.
    /// Settings made earlier on this builder are discarded.
    pub fn from_env(mut self) -> Self {
        match StoreConfig::from_env() {
            Ok(config) => self.config = config,
            Err(e) => self.capture(Err(e)),
        }
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the connector used to reach the live database.
    pub fn live_connector<C: LiveConnector + 'static>(mut self, connector: C) -> Self {
        self.connector = Some(Arc::new(connector));
        self
    }

    pub fn live_url(mut self, url: &str) -> Self {
        let result = self.config.set_live_url(url);
        self.capture(result);
        self
    }

    pub fn database_name(mut self, name: &str) -> Self {
        let result = self.config.set_database_name(name);
        self.capture(result);
        self
    }

    /// Longest wait for the live database on first collection access.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        let result = self.config.set_connect_timeout(timeout);
        self.capture(result);
        self
    }

    /// Preloads the embedded store with sample dashboard data when the store
    /// ends up embedded.
    pub fn seed_fixtures(mut self, seed: bool) -> Self {
        self.config.set_seed_fixtures(seed);
        self
    }

    /// Optional-field defaults applied on insert.
    pub fn collection_defaults(mut self, defaults: CollectionDefaults) -> Self {
        self.config.set_defaults(defaults);
        self
    }

    /// Creates the store. The backend is chosen on first collection access,
    /// not here.
    ///
    /// # Errors
    ///
    /// The first error captured by a setter.
    pub fn open(self) -> StoreResult<DeskStore> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(DeskStore::new(self.config, self.connector))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn default_builder_opens() {
        let store = DeskStoreBuilder::new().open().unwrap();
        assert_eq!(store.config(), &StoreConfig::new());
    }

    #[test]
    fn first_error_is_reported_at_open() {
        let result = DeskStoreBuilder::new()
            .database_name("bad name")
            .connect_timeout(Duration::ZERO)
            .live_url("mongodb://localhost")
            .open();
        let err = result.unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ConfigError);
        assert!(err.message().contains("bad name"));
    }

    #[test]
    fn setters_reach_config() {
        let store = DeskStoreBuilder::new()
            .live_url("mongodb://db:27017")
            .database_name("whatsapp_dashboard")
            .connect_timeout(Duration::from_millis(300))
            .seed_fixtures(true)
            .collection_defaults(CollectionDefaults::new())
            .open()
            .unwrap();

        let config = store.config();
        assert_eq!(config.live_url(), Some("mongodb://db:27017"));
        assert_eq!(config.database_name(), "whatsapp_dashboard");
        assert_eq!(config.connect_timeout(), Duration::from_millis(300));
        assert!(config.seed_fixtures());
        assert_eq!(config.defaults(), &CollectionDefaults::new());
    }

    #[test]
    fn seeded_embedded_store() {
        let store = DeskStoreBuilder::new().seed_fixtures(true).open().unwrap();
        let contacts = store.contacts().unwrap();
        let found = contacts
            .find(crate::filter::field("name").regex("chen").unwrap())
            .unwrap()
            .to_list();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), Some("2".to_string()));
    }
}
