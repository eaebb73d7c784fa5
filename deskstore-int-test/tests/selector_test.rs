use deskstore::doc;
use deskstore::errors::ErrorKind;
use deskstore::filter::all;
use deskstore::store::{BackendKind, StoreBackendProvider};
use deskstore::DeskStore;
use deskstore_int_test::test_util::{
    Failure, FailingConnector, HealthyConnector, MockLiveBackend,
};
use std::time::{Duration, Instant};

#[ctor::ctor]
fn init() {
    colog::init();
}

fn store_with(connector: FailingConnector, timeout: Duration) -> DeskStore {
    DeskStore::builder()
        .live_url("mongodb://db.internal:27017")
        .connect_timeout(timeout)
        .live_connector(connector)
        .open()
        .unwrap()
}

#[test]
fn test_every_failure_falls_back_once() {
    for failure in [Failure::Unreachable, Failure::Unauthorized, Failure::PingFails] {
        let connector = FailingConnector::new(failure);
        let store = store_with(connector.clone(), Duration::from_secs(2));

        for _ in 0..5 {
            let contacts = store.contacts().unwrap();
            contacts.insert(doc! { name: "Sarah Johnson" }).unwrap();
        }
        assert_eq!(store.backend_kind().unwrap(), BackendKind::Embedded, "{:?}", failure);
        assert_eq!(store.contacts().unwrap().count(all()).unwrap(), 5);
        assert_eq!(connector.calls(), 1, "{:?} was retried", failure);
    }
}

#[test]
fn test_hanging_database_is_abandoned() {
    let connector = FailingConnector::new(Failure::Hang(Duration::from_secs(3)));
    let store = store_with(connector.clone(), Duration::from_millis(100));

    let started = Instant::now();
    assert!(!store.is_live().unwrap());
    assert!(started.elapsed() < Duration::from_secs(2));

    // later calls use the bound backend without waiting again
    let started = Instant::now();
    store.messages().unwrap().insert(doc! { text: "Hi!" }).unwrap();
    assert!(started.elapsed() < Duration::from_millis(100));
    assert_eq!(connector.calls(), 1);
}

#[test]
fn test_healthy_database_is_used() {
    let live = MockLiveBackend::new();
    let connector = HealthyConnector::new(live.clone());
    let store = DeskStore::builder()
        .live_url("mongodb://localhost:27017")
        .live_connector(connector.clone())
        .open()
        .unwrap();

    store.campaigns().unwrap().insert(doc! { name: "Summer Sale 2024" }).unwrap();
    store.templates().unwrap();

    assert!(store.is_live().unwrap());
    assert_eq!(connector.calls(), 1);
    assert_eq!(live.ping_count(), 1);
    assert_eq!(live.raw_documents("campaigns").len(), 1);
    assert_eq!(
        store.collection_names().unwrap(),
        vec!["campaigns".to_string(), "templates".to_string()]
    );
}

#[test]
fn test_no_live_url_binds_embedded() {
    let store = DeskStore::builder().open().unwrap();
    assert_eq!(store.backend_kind().unwrap(), BackendKind::Embedded);
    assert!(store.collection_names().unwrap().is_empty());
}

#[test]
fn test_live_url_without_connector_falls_back() {
    let store = DeskStore::builder()
        .live_url("mongodb://localhost:27017")
        .open()
        .unwrap();
    assert_eq!(store.backend_kind().unwrap(), BackendKind::Embedded);
}

#[test]
fn test_backend_is_chosen_lazily() {
    let connector = FailingConnector::new(Failure::Unreachable);
    let store = store_with(connector.clone(), Duration::from_secs(1));
    assert_eq!(connector.calls(), 0);

    store.users().unwrap();
    assert_eq!(connector.calls(), 1);
}

#[test]
fn test_close_releases_live_database() {
    let live = MockLiveBackend::new();
    let store = DeskStore::builder()
        .live_connector(HealthyConnector::new(live.clone()))
        .open()
        .unwrap();
    store.contacts().unwrap();

    store.close().unwrap();
    assert!(live.is_closed());
    let err = store.contacts().unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::StoreClosed);
}
