use super::{Document, DocumentCursor, FieldDefaults, UpdateOperators};
use crate::common::{Value, DOC_ID};
use crate::errors::{ErrorKind, StoreError, StoreResult};
use crate::filter::{all, Filter};
use indexmap::IndexSet;
use std::sync::Arc;

/// Contract every backend collection fulfils.
///
/// Implementations see documents after optional-field defaults were filled
/// and a supplied `id` was checked to be a non-empty string. They assign an
/// id when none is present, keep documents in insertion order, and never
/// expose backend-internal identifiers through returned documents.
pub trait DocumentCollectionProvider: Send + Sync {
    /// Name of the collection.
    fn name(&self) -> String;

    /// Stores `document`, assigning an `id` if it has none, and returns the
    /// id. A duplicate id is a `UniqueConstraintViolation`.
    fn insert(&self, document: Document) -> StoreResult<String>;

    /// Snapshot of every document matching `filter`, in insertion order.
    fn find(&self, filter: &Filter) -> StoreResult<Vec<Document>>;

    /// Number of documents matching `filter`.
    fn count(&self, filter: &Filter) -> StoreResult<u64> {
        Ok(self.find(filter)?.len() as u64)
    }

    /// Deduplicated values of `field` across documents matching `filter`.
    fn distinct(&self, field: &str, filter: &Filter) -> StoreResult<Vec<Value>> {
        distinct_values(&self.find(filter)?, field)
    }

    /// Applies `update` to the first match when `just_once`, to every match
    /// otherwise, and returns the number of matched documents. Either every
    /// matched document is updated or none is.
    fn update(&self, filter: &Filter, update: &UpdateOperators, just_once: bool)
        -> StoreResult<u64>;

    /// Removes the first match when `just_once`, every match otherwise, and
    /// returns the number removed.
    fn remove(&self, filter: &Filter, just_once: bool) -> StoreResult<u64>;
}

/// Collects the present values of `field` across `documents`, without
/// duplicates. Array values contribute their elements.
pub fn distinct_values(documents: &[Document], field: &str) -> StoreResult<Vec<Value>> {
    let mut values = IndexSet::new();
    for document in documents {
        if !document.contains_field(field) {
            continue;
        }
        match document.get(field)? {
            Value::Array(elements) => values.extend(elements),
            value => {
                values.insert(value);
            }
        }
    }
    Ok(values.into_iter().collect())
}

pub(crate) fn validate_collection_name(name: &str) -> StoreResult<()> {
    if name.is_empty() {
        log::error!("Collection name cannot be empty");
        return Err(StoreError::new(
            "Collection name cannot be empty",
            ErrorKind::ValidationError,
        ));
    }

    if name.chars().any(char::is_whitespace) {
        log::error!("Collection name {:?} contains whitespace", name);
        return Err(StoreError::new(
            &format!("Collection name {:?} cannot contain whitespace", name),
            ErrorKind::ValidationError,
        ));
    }
    Ok(())
}

fn validate_id(document: &Document) -> StoreResult<()> {
    if !document.has_id() {
        return Ok(());
    }

    match document.id() {
        Some(id) if !id.is_empty() => Ok(()),
        Some(_) => {
            log::error!("Document id cannot be empty");
            Err(StoreError::new("Document id cannot be empty", ErrorKind::InvalidId))
        }
        None => {
            let found = document.get(DOC_ID)?;
            log::error!("Document id must be a string, found {}", found.type_name());
            Err(StoreError::new(
                &format!("Document id must be a string, found {}", found.type_name()),
                ErrorKind::InvalidId,
            ))
        }
    }
}

/// A named collection of documents.
///
/// Handles are cheap to clone and all clones share the same backend
/// collection. Which backend that is stays hidden; embedded and live
/// collections behave the same through this handle.
///
/// ```rust,ignore
/// use deskstore::filter::field;
///
/// let contacts = store.contacts()?;
/// let id = contacts.insert(doc!{ name: "Sarah Johnson", phone: "+1 (555) 123-4567" })?;
///
/// let active = contacts
///     .find(field("status").eq("Active"))?
///     .sort("name", SortOrder::Ascending)
///     .to_list();
/// ```
#[derive(Clone)]
pub struct DocumentCollection {
    inner: Arc<dyn DocumentCollectionProvider>,
    defaults: Arc<FieldDefaults>,
}

impl DocumentCollection {
    /// Creates a handle over a provider with no optional-field defaults.
    pub fn new<T: DocumentCollectionProvider + 'static>(inner: T) -> Self {
        DocumentCollection::from_provider(Arc::new(inner), FieldDefaults::new())
    }

    pub(crate) fn from_provider(
        inner: Arc<dyn DocumentCollectionProvider>,
        defaults: FieldDefaults,
    ) -> Self {
        DocumentCollection {
            inner,
            defaults: Arc::new(defaults),
        }
    }

    pub fn name(&self) -> String {
        self.inner.name()
    }

    /// Inserts a document and returns its id.
    ///
    /// Absent optional fields are filled with the collection's defaults and
    /// an id is assigned when the document has none.
    ///
    /// # Errors
    ///
    /// `InvalidId` for a non-string or empty `id`, and
    /// `UniqueConstraintViolation` when the id is already taken.
    pub fn insert(&self, mut document: Document) -> StoreResult<String> {
        validate_id(&document)?;
        self.defaults.apply(&mut document)?;
        let id = self.inner.insert(document)?;
        log::debug!("Inserted document {} into {}", id, self.inner.name());
        Ok(id)
    }

    /// Inserts documents one by one and returns their ids in input order.
    ///
    /// Documents inserted before a failing one stay inserted.
    pub fn insert_many(&self, documents: Vec<Document>) -> StoreResult<Vec<String>> {
        let mut ids = Vec::with_capacity(documents.len());
        for document in documents {
            ids.push(self.insert(document)?);
        }
        Ok(ids)
    }

    /// Opens a cursor over the documents matching `filter` right now.
    pub fn find(&self, filter: Filter) -> StoreResult<DocumentCursor> {
        let snapshot = self.inner.find(&filter)?;
        log::debug!(
            "Found {} documents in {} for {}",
            snapshot.len(),
            self.inner.name(),
            filter
        );
        Ok(DocumentCursor::new(snapshot))
    }

    /// First match in insertion order, `None` when nothing matches.
    pub fn find_one(&self, filter: Filter) -> StoreResult<Option<Document>> {
        Ok(self.inner.find(&filter)?.into_iter().next())
    }

    pub fn count(&self, filter: Filter) -> StoreResult<u64> {
        self.inner.count(&filter)
    }

    /// Deduplicated values of `field` across matching documents, or across
    /// the whole collection when `filter` is `None`. Order is unspecified.
    pub fn distinct(&self, field: &str, filter: Option<Filter>) -> StoreResult<Vec<Value>> {
        self.inner.distinct(field, &filter.unwrap_or_else(all))
    }

    /// Updates the first match and returns how many documents matched (0 or 1).
    pub fn update_one(&self, filter: Filter, update: &UpdateOperators) -> StoreResult<u64> {
        self.update(filter, update, true)
    }

    /// Updates every match and returns how many documents matched.
    pub fn update_many(&self, filter: Filter, update: &UpdateOperators) -> StoreResult<u64> {
        self.update(filter, update, false)
    }

    fn update(&self, filter: Filter, update: &UpdateOperators, just_once: bool) -> StoreResult<u64> {
        let matched = self.inner.update(&filter, update, just_once)?;
        log::debug!(
            "Updated {} documents in {} for {} with {}",
            matched,
            self.inner.name(),
            filter,
            update
        );
        Ok(matched)
    }

    /// Removes the first match and returns how many were removed (0 or 1).
    pub fn remove_one(&self, filter: Filter) -> StoreResult<u64> {
        self.inner.remove(&filter, true)
    }

    /// Removes every match and returns how many were removed.
    pub fn remove_many(&self, filter: Filter) -> StoreResult<u64> {
        self.inner.remove(&filter, false)
    }
}

impl std::fmt::Debug for DocumentCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentCollection")
            .field("name", &self.inner.name())
            .finish()
    }
}
