use crate::collection::{validate_collection_name, DocumentCollection};
use crate::common::{CAMPAIGNS, CONTACTS, MESSAGES, TEMPLATES, USERS};
use crate::desk_store_builder::DeskStoreBuilder;
use crate::errors::StoreResult;
use crate::store::{BackendKind, BackendSelector, LiveConnector};
use crate::store_config::StoreConfig;
use std::sync::Arc;

/// Entry point of the storage layer.
///
/// A `DeskStore` owns the configuration and the backend selector. The first
/// collection request binds the store to the live database or, failing
/// that, to the embedded store; every handle handed out afterwards uses the
/// same backend.
///
/// `DeskStore` uses the PIMPL pattern: clones are cheap and share state, so
/// the application creates one store at startup and passes clones to its
/// request handlers.
///
/// # Examples
///
/// ```rust,ignore
/// use deskstore::{DeskStore, doc};
/// use deskstore::filter::field;
///
/// let store = DeskStore::builder().from_env().open()?;
///
/// let contacts = store.contacts()?;
/// contacts.insert(doc!{ name: "Sarah Johnson", phone: "+1 (555) 123-4567" })?;
/// let active = contacts.count(field("status").eq("Active"))?;
///
/// store.close()?;
/// ```
#[derive(Clone)]
pub struct DeskStore {
    inner: Arc<DeskStoreInner>,
}

impl DeskStore {
    pub fn builder() -> DeskStoreBuilder {
        DeskStoreBuilder::new()
    }

    pub(crate) fn new(config: StoreConfig, connector: Option<Arc<dyn LiveConnector>>) -> Self {
        DeskStore {
            inner: Arc::new(DeskStoreInner {
                selector: BackendSelector::new(config.clone(), connector),
                config,
            }),
        }
    }

    /// Returns a handle on collection `name`, creating the collection when
    /// it does not exist yet.
    ///
    /// # Errors
    ///
    /// `ValidationError` for an empty name or one containing whitespace,
    /// `StoreClosed` after [DeskStore::close].
    pub fn collection(&self, name: &str) -> StoreResult<DocumentCollection> {
        self.inner.collection(name)
    }

    pub fn contacts(&self) -> StoreResult<DocumentCollection> {
        self.collection(CONTACTS)
    }

    pub fn messages(&self) -> StoreResult<DocumentCollection> {
        self.collection(MESSAGES)
    }

    pub fn campaigns(&self) -> StoreResult<DocumentCollection> {
        self.collection(CAMPAIGNS)
    }

    pub fn templates(&self) -> StoreResult<DocumentCollection> {
        self.collection(TEMPLATES)
    }

    pub fn users(&self) -> StoreResult<DocumentCollection> {
        self.collection(USERS)
    }

    /// Names of the collections created so far on the bound backend.
    pub fn collection_names(&self) -> StoreResult<Vec<String>> {
        self.inner.selector.backend()?.collection_names()
    }

    /// Backend the store bound to, resolving it if needed. Meant for health
    /// reporting.
    pub fn backend_kind(&self) -> StoreResult<BackendKind> {
        Ok(self.inner.selector.backend()?.kind())
    }

    pub fn is_live(&self) -> StoreResult<bool> {
        Ok(self.backend_kind()? == BackendKind::Live)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Closes the bound backend. Handles obtained earlier fail with
    /// `StoreClosed` afterwards.
    pub fn close(&self) -> StoreResult<()> {
        log::debug!("Closing store {}", self.inner.config.database_name());
        self.inner.selector.close()
    }
}

impl std::fmt::Debug for DeskStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeskStore")
            .field("database_name", &self.inner.config.database_name())
            .field("backend", &self.inner.selector.kind())
            .finish()
    }
}

struct DeskStoreInner {
    config: StoreConfig,
    selector: BackendSelector,
}

impl DeskStoreInner {
    fn collection(&self, name: &str) -> StoreResult<DocumentCollection> {
        validate_collection_name(name)?;
        let backend = self.selector.backend()?;
        let provider = backend.collection(name)?;
        let defaults = self.config.defaults().for_collection(name);
        Ok(DocumentCollection::from_provider(provider, defaults))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;
    use crate::errors::ErrorKind;
    use crate::filter::{all, field};

    #[ctor::ctor]
    fn init() {
        colog::init();
    }

    fn store() -> DeskStore {
        DeskStore::builder().open().unwrap()
    }

    #[test]
    fn binds_embedded_without_live_database() {
        let store = store();
        assert_eq!(store.backend_kind().unwrap(), BackendKind::Embedded);
        assert!(!store.is_live().unwrap());
    }

    #[test]
    fn handles_share_collections() {
        let store = store();
        store.contacts().unwrap().insert(doc! { name: "Sarah" }).unwrap();
        let again = store.clone().collection("contacts").unwrap();
        assert_eq!(again.count(all()).unwrap(), 1);
        assert_eq!(store.collection_names().unwrap(), vec!["contacts".to_string()]);
    }

    #[test]
    fn dashboard_defaults_are_filled() {
        let store = store();
        let contacts = store.contacts().unwrap();
        let id = contacts.insert(doc! { name: "Sarah", phone: "+1" }).unwrap();
        let stored = contacts.find_one(field("id").eq(id)).unwrap().unwrap();
        assert_eq!(stored.get("status").unwrap(), crate::common::Value::from("Active"));
        assert!(stored.contains_field("createdAt"));
    }

    #[test]
    fn rejects_bad_collection_names() {
        let store = store();
        assert_eq!(
            store.collection("").unwrap_err().kind(),
            &ErrorKind::ValidationError
        );
        assert_eq!(
            store.collection("chat history").unwrap_err().kind(),
            &ErrorKind::ValidationError
        );
    }

    #[test]
    fn closed_store_rejects_access() {
        let store = store();
        let users = store.users().unwrap();
        store.close().unwrap();
        assert_eq!(users.count(all()).unwrap_err().kind(), &ErrorKind::StoreClosed);
        assert!(store.messages().is_err());
    }
}
