use deskstore::collection::{Document, DocumentCollection, DocumentCollectionProvider, UpdateOperators};
use deskstore::common::{Value, DOC_ID};
use deskstore::doc;
use deskstore::errors::{ErrorKind, StoreError, StoreResult};
use deskstore::filter::Filter;
use deskstore::store::{BackendKind, LiveConnector, StoreBackend, StoreBackendProvider};
use deskstore::{DeskStore, StoreConfig};
use parking_lot::Mutex;
use std::backtrace::Backtrace;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Key under which the mock live database keeps its own identifier.
pub const NATIVE_ID: &str = "_id";

/// Runs a test between `before` and `after`, reporting errors and panics
/// with the time taken. `after` runs even when the test fails.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> StoreResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> StoreResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> StoreResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    let start_time = Instant::now();

    let result = std::panic::catch_unwind(|| {
        let backtrace = Backtrace::capture();
        match before() {
            Ok(ctx) => match test(ctx.clone()) {
                Ok(_) => after(ctx)
                    .map_err(|e| (format!("After run failed: {:?}", e), backtrace.to_string())),
                Err(e) => {
                    let _ = after(ctx);
                    Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                }
            },
            Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
        }
    });

    let elapsed = start_time.elapsed();
    let (error, backtrace) = match result {
        Ok(Ok(_)) => return,
        Ok(Err((e, bt))) => (e, bt),
        Err(panic_err) => {
            let err_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_err.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            (format!("Panic: {}", err_msg), String::new())
        }
    };

    eprintln!("\n==================== TEST FAILED ====================");
    eprintln!("Failed after {:?}", elapsed);
    eprintln!("Error: {}", error);
    if !backtrace.is_empty() && !backtrace.contains("disabled") {
        eprintln!("\nBacktrace:\n{}", backtrace);
    }
    eprintln!("=====================================================\n");

    panic!("Test failed. Last error: {}", error);
}

#[derive(Clone)]
pub struct TestContext {
    store: DeskStore,
    live: Option<MockLiveBackend>,
}

impl TestContext {
    pub fn new(store: DeskStore, live: Option<MockLiveBackend>) -> Self {
        Self { store, live }
    }

    pub fn store(&self) -> DeskStore {
        self.store.clone()
    }

    /// The mock live database behind the store, when there is one.
    pub fn live(&self) -> Option<MockLiveBackend> {
        self.live.clone()
    }
}

/// Store bound to the embedded backend.
pub fn create_test_context() -> StoreResult<TestContext> {
    let store = DeskStore::builder().open()?;
    Ok(TestContext::new(store, None))
}

/// Embedded store preloaded with the sample dashboard data.
pub fn create_seeded_test_context() -> StoreResult<TestContext> {
    let store = DeskStore::builder().seed_fixtures(true).open()?;
    Ok(TestContext::new(store, None))
}

/// Store bound to a healthy mock live database.
pub fn create_live_test_context() -> StoreResult<TestContext> {
    let live = MockLiveBackend::new();
    let store = DeskStore::builder()
        .live_url("mongodb://localhost:27017")
        .database_name("whatsapp_dashboard")
        .connect_timeout(Duration::from_secs(2))
        .live_connector(HealthyConnector::new(live.clone()))
        .open()?;
    Ok(TestContext::new(store, Some(live)))
}

pub fn cleanup(ctx: TestContext) -> StoreResult<()> {
    ctx.store().close()
}

/// The three contacts of the dashboard walkthrough, without ids.
pub fn create_test_contacts() -> Vec<Document> {
    vec![
        doc! {
            name: "Sarah Johnson",
            phone: "+1 (555) 123-4567",
            email: "sarah.johnson@email.com",
            tags: ["VIP", "Customer"],
            status: "Active",
        },
        doc! {
            name: "Michael Chen",
            phone: "+1 (555) 234-5678",
            email: "michael.chen@email.com",
            tags: ["Lead", "Prospect"],
            status: "Active",
        },
        doc! {
            name: "Emily Davis",
            phone: "+1 (555) 345-6789",
            email: "emily.davis@email.com",
            tags: ["Customer", "Support"],
            status: "Inactive",
        },
    ]
}

pub fn insert_test_contacts(collection: &DocumentCollection) -> StoreResult<Vec<String>> {
    collection.insert_many(create_test_contacts())
}

/// String values of `field` in document order, skipping documents without it.
pub fn strings(documents: &[Document], field: &str) -> Vec<String> {
    documents
        .iter()
        .filter_map(|d| d.get(field).ok())
        .filter_map(|v| v.as_str().map(|s| s.to_string()))
        .collect()
}

pub fn is_sorted<T: Ord>(iterable: impl IntoIterator<Item = T>, ascending: bool) -> bool {
    let mut iter = iterable.into_iter();
    if let Some(mut prev) = iter.next() {
        for current in iter {
            if ascending {
                if prev > current {
                    return false;
                }
            } else if prev < current {
                return false;
            }
            prev = current;
        }
    }
    true
}

/// In-process stand-in for the live document database.
///
/// Documents are stored with a database-native `_id` next to the
/// application `id`, and filters are evaluated from their query document
/// form the way a server would receive them. Clones share state.
#[derive(Clone, Default)]
pub struct MockLiveBackend {
    inner: Arc<MockLiveInner>,
}

#[derive(Default)]
struct MockLiveInner {
    collections: Mutex<HashMap<String, Arc<MockLiveCollection>>>,
    closed: AtomicBool,
    pings: AtomicUsize,
    native_ids: Arc<AtomicU64>,
}

impl MockLiveBackend {
    pub fn new() -> Self {
        MockLiveBackend::default()
    }

    /// Stored documents of `name`, internal fields included.
    pub fn raw_documents(&self, name: &str) -> Vec<Document> {
        match self.inner.collections.lock().get(name) {
            Some(collection) => collection.documents.lock().clone(),
            None => Vec::new(),
        }
    }

    pub fn ping_count(&self) -> usize {
        self.inner.pings.load(Ordering::Relaxed)
    }
}

impl StoreBackendProvider for MockLiveBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Live
    }

    fn collection(&self, name: &str) -> StoreResult<Arc<dyn DocumentCollectionProvider>> {
        if self.is_closed() {
            return Err(StoreError::new("connection closed", ErrorKind::StoreClosed));
        }
        let mut collections = self.inner.collections.lock();
        let collection = collections
            .entry(name.to_string())
            .or_insert_with(|| {
                Arc::new(MockLiveCollection {
                    name: name.to_string(),
                    documents: Mutex::new(Vec::new()),
                    sequence: AtomicU64::new(0),
                    native_ids: self.inner.native_ids.clone(),
                })
            })
            .clone();
        Ok(collection)
    }

    fn collection_names(&self) -> StoreResult<Vec<String>> {
        let mut names: Vec<String> = self.inner.collections.lock().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn ping(&self) -> StoreResult<()> {
        self.inner.pings.fetch_add(1, Ordering::Relaxed);
        if self.is_closed() {
            return Err(StoreError::new("connection closed", ErrorKind::BackendError));
        }
        Ok(())
    }

    fn close(&self) -> StoreResult<()> {
        if !self.inner.closed.swap(true, Ordering::Relaxed) {
            log::debug!("Mock live database closed after {} pings", self.ping_count());
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Relaxed)
    }
}

struct MockLiveCollection {
    name: String,
    documents: Mutex<Vec<Document>>,
    sequence: AtomicU64,
    native_ids: Arc<AtomicU64>,
}

impl MockLiveCollection {
    fn server_filter(filter: &Filter) -> StoreResult<Filter> {
        Filter::parse(&filter.to_query())
    }

    fn strip(document: &Document) -> StoreResult<Document> {
        let mut document = document.clone();
        document.remove(NATIVE_ID)?;
        Ok(document)
    }
}

impl DocumentCollectionProvider for MockLiveCollection {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn insert(&self, mut document: Document) -> StoreResult<String> {
        let mut documents = self.documents.lock();
        let taken = |id: &str| documents.iter().any(|d| d.id().as_deref() == Some(id));
        let id = match document.id() {
            Some(id) => id,
            None => loop {
                let candidate = (self.sequence.fetch_add(1, Ordering::Relaxed) + 1).to_string();
                if !taken(&candidate) {
                    break candidate;
                }
            },
        };
        if taken(&id) {
            return Err(StoreError::new(
                &format!("Duplicate id {} in {}", id, self.name),
                ErrorKind::UniqueConstraintViolation,
            ));
        }
        let native = self.native_ids.fetch_add(1, Ordering::Relaxed);
        document.insert_field(DOC_ID, Value::from(id.as_str()));
        document.insert_field(NATIVE_ID, Value::from(format!("{:024x}", native)));
        documents.push(document);
        Ok(id)
    }

    fn find(&self, filter: &Filter) -> StoreResult<Vec<Document>> {
        let filter = Self::server_filter(filter)?;
        let documents = self.documents.lock();
        let mut found = Vec::new();
        for document in documents.iter() {
            if filter.apply(document)? {
                found.push(Self::strip(document)?);
            }
        }
        Ok(found)
    }

    fn update(&self, filter: &Filter, update: &UpdateOperators, just_once: bool) -> StoreResult<u64> {
        let filter = Self::server_filter(filter)?;
        let mut documents = self.documents.lock();
        let mut updated = Vec::new();
        for (position, document) in documents.iter().enumerate() {
            if filter.apply(document)? {
                updated.push((position, update.apply_to(document)?));
                if just_once {
                    break;
                }
            }
        }
        let matched = updated.len() as u64;
        for (position, document) in updated {
            documents[position] = document;
        }
        Ok(matched)
    }

    fn remove(&self, filter: &Filter, just_once: bool) -> StoreResult<u64> {
        let filter = Self::server_filter(filter)?;
        let mut documents = self.documents.lock();
        let mut removed = 0;
        let mut position = 0;
        while position < documents.len() {
            if filter.apply(&documents[position])? {
                documents.remove(position);
                removed += 1;
                if just_once {
                    break;
                }
            } else {
                position += 1;
            }
        }
        Ok(removed)
    }
}

/// Connects to a [MockLiveBackend] and counts its calls.
#[derive(Clone)]
pub struct HealthyConnector {
    backend: MockLiveBackend,
    calls: Arc<AtomicUsize>,
}

impl HealthyConnector {
    pub fn new(backend: MockLiveBackend) -> Self {
        HealthyConnector {
            backend,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl LiveConnector for HealthyConnector {
    fn connect(&self, _config: &StoreConfig) -> StoreResult<StoreBackend> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(StoreBackend::new(self.backend.clone()))
    }
}

/// Simulates a failure mode of the live database and counts attempts.
#[derive(Clone)]
pub struct FailingConnector {
    failure: Failure,
    calls: Arc<AtomicUsize>,
}

#[derive(Clone, Copy, Debug)]
pub enum Failure {
    /// Connection refused right away.
    Unreachable,
    /// Credentials rejected.
    Unauthorized,
    /// Connects, then never answers within `Duration`.
    Hang(Duration),
    /// Connects, but the first ping fails.
    PingFails,
}

impl FailingConnector {
    pub fn new(failure: Failure) -> Self {
        FailingConnector {
            failure,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl LiveConnector for FailingConnector {
    fn connect(&self, _config: &StoreConfig) -> StoreResult<StoreBackend> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        match self.failure {
            Failure::Unreachable => Err(StoreError::new(
                "connection refused",
                ErrorKind::BackendUnavailable,
            )),
            Failure::Unauthorized => Err(StoreError::new(
                "authentication failed",
                ErrorKind::BackendUnavailable,
            )),
            Failure::Hang(delay) => {
                thread::sleep(delay);
                Ok(StoreBackend::new(MockLiveBackend::new()))
            }
            Failure::PingFails => {
                let backend = MockLiveBackend::new();
                backend.close()?;
                Ok(StoreBackend::new(backend))
            }
        }
    }
}
