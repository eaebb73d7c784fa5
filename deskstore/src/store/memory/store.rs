use super::InMemoryCollection;
use crate::collection::DocumentCollectionProvider;
use crate::errors::{ErrorKind, StoreError, StoreResult};
use crate::store::{BackendKind, StoreBackendProvider};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Embedded in-memory backend.
///
/// Collections are created on first access and live until the store is
/// closed. Nothing is persisted. Clones share the same collections.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<InMemoryStoreInner>,
}

impl InMemoryStore {
    pub fn new() -> InMemoryStore {
        InMemoryStore::default()
    }

    /// Returns the embedded collection `name`, creating it when absent.
    pub fn open_collection(&self, name: &str) -> StoreResult<Arc<InMemoryCollection>> {
        self.inner.open_collection(name)
    }
}

impl StoreBackendProvider for InMemoryStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Embedded
    }

    fn collection(&self, name: &str) -> StoreResult<Arc<dyn DocumentCollectionProvider>> {
        let collection: Arc<dyn DocumentCollectionProvider> = self.inner.open_collection(name)?;
        Ok(collection)
    }

    fn collection_names(&self) -> StoreResult<Vec<String>> {
        self.inner.check_opened()?;
        let mut names: Vec<String> = self
            .inner
            .collections
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        Ok(names)
    }

    fn ping(&self) -> StoreResult<()> {
        self.inner.check_opened()
    }

    fn close(&self) -> StoreResult<()> {
        self.inner.close();
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Relaxed)
    }
}

#[derive(Default)]
struct InMemoryStoreInner {
    closed: Arc<AtomicBool>,
    collections: DashMap<String, Arc<InMemoryCollection>>,
}

impl InMemoryStoreInner {
    fn check_opened(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::Relaxed) {
            log::error!("Embedded store is closed");
            return Err(StoreError::new("Embedded store is closed", ErrorKind::StoreClosed));
        }
        Ok(())
    }

    fn open_collection(&self, name: &str) -> StoreResult<Arc<InMemoryCollection>> {
        self.check_opened()?;
        let collection = self
            .collections
            .entry(name.to_string())
            .or_insert_with(|| {
                log::debug!("Creating embedded collection {}", name);
                Arc::new(InMemoryCollection::with_closed_flag(name, self.closed.clone()))
            })
            .value()
            .clone();
        Ok(collection)
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::Relaxed) {
            return;
        }
        self.collections.clear();
        log::debug!("Embedded store closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;
    use crate::filter::all;
    use std::thread;

    #[test]
    fn same_name_same_collection() {
        let store = InMemoryStore::new();
        let a = store.collection("contacts").unwrap();
        let b = store.collection("contacts").unwrap();
        a.insert(doc! { name: "Sarah" }).unwrap();
        assert_eq!(b.count(&all()).unwrap(), 1);
        assert_eq!(store.collection_names().unwrap(), vec!["contacts".to_string()]);
    }

    #[test]
    fn concurrent_first_access_creates_one_collection() {
        let store = InMemoryStore::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || {
                    let collection = store.collection("messages").unwrap();
                    collection.insert(doc! { text: "hi" }).unwrap()
                })
            })
            .collect();

        let mut ids: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 8);
        assert_eq!(store.collection("messages").unwrap().count(&all()).unwrap(), 8);
    }

    #[test]
    fn close_is_idempotent_and_final() {
        let store = InMemoryStore::new();
        let contacts = store.collection("contacts").unwrap();
        store.close().unwrap();
        store.close().unwrap();

        assert!(store.is_closed());
        assert_eq!(store.ping().unwrap_err().kind(), &ErrorKind::StoreClosed);
        assert!(store.collection("contacts").is_err());
        assert!(contacts.find(&all()).is_err());
    }
}
