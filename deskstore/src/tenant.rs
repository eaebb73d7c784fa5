//! Per-user scoping of dashboard collections.
//!
//! Dashboard records belong to the user that created them through their
//! `user_id` field. A [TenantCollection] confines every read and write of a
//! collection handle to one [Principal].

use crate::collection::{Document, DocumentCollection, DocumentCursor, UpdateOperators};
use crate::common::{Value, TENANT_FIELD};
use crate::errors::{ErrorKind, StoreError, StoreResult};
use crate::filter::{all, field, is_all_filter, Filter};
use std::sync::Arc;

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Principal {
    user_id: String,
    source: String,
}

impl Principal {
    /// `source` names what vouched for the caller, such as `"jwt"`.
    pub fn new(user_id: &str, source: &str) -> Self {
        Principal {
            user_id: user_id.to_string(),
            source: source.to_string(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Resolves a credential to the caller it identifies.
///
/// Token verification lives outside the store; implementations return
/// `None` for credentials they do not accept.
pub trait Authorizer: Send + Sync {
    fn authorize(&self, credential: &str) -> Option<Principal>;
}

impl<F> Authorizer for F
where
    F: Fn(&str) -> Option<Principal> + Send + Sync,
{
    fn authorize(&self, credential: &str) -> Option<Principal> {
        self(credential)
    }
}

/// Tries authorizers in registration order and returns the first principal.
///
/// The order is the verification policy: a development fallback, if any,
/// belongs last.
#[derive(Clone, Default)]
pub struct AuthorizerChain {
    authorizers: Vec<Arc<dyn Authorizer>>,
}

impl AuthorizerChain {
    pub fn new() -> Self {
        AuthorizerChain::default()
    }

    pub fn with<A: Authorizer + 'static>(mut self, authorizer: A) -> Self {
        self.authorizers.push(Arc::new(authorizer));
        self
    }
}

impl Authorizer for AuthorizerChain {
    fn authorize(&self, credential: &str) -> Option<Principal> {
        self.authorizers
            .iter()
            .find_map(|authorizer| authorizer.authorize(credential))
    }
}

/// A collection handle confined to the documents of one principal.
///
/// Every filter is narrowed to `user_id == principal`, and every inserted
/// document is stamped with the principal's `user_id`, replacing any value
/// the caller supplied.
///
/// ```rust,ignore
/// let principal = authorizer.authorize(token).ok_or(Unauthorized)?;
/// let contacts = TenantCollection::new(store.contacts()?, principal);
/// let total = contacts.count(all())?;
/// ```
#[derive(Clone, Debug)]
pub struct TenantCollection {
    collection: DocumentCollection,
    principal: Principal,
}

impl TenantCollection {
    pub fn new(collection: DocumentCollection, principal: Principal) -> Self {
        TenantCollection {
            collection,
            principal,
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn name(&self) -> String {
        self.collection.name()
    }

    fn scope(&self, filter: Filter) -> Filter {
        let owned = field(TENANT_FIELD).eq(self.principal.user_id.as_str());
        if is_all_filter(&filter) {
            owned
        } else {
            owned.and(filter)
        }
    }

    fn stamp(&self, mut document: Document) -> Document {
        document.insert_field(TENANT_FIELD, Value::from(self.principal.user_id.as_str()));
        document
    }

    fn check_update(&self, update: &UpdateOperators) -> StoreResult<()> {
        if update.touches(TENANT_FIELD) {
            log::error!("Update cannot change the owner of a {} document", self.name());
            return Err(StoreError::new(
                &format!("Update cannot change {}", TENANT_FIELD),
                ErrorKind::ValidationError,
            ));
        }
        Ok(())
    }

    pub fn insert(&self, document: Document) -> StoreResult<String> {
        self.collection.insert(self.stamp(document))
    }

    pub fn insert_many(&self, documents: Vec<Document>) -> StoreResult<Vec<String>> {
        let documents = documents.into_iter().map(|d| self.stamp(d)).collect();
        self.collection.insert_many(documents)
    }

    pub fn find(&self, filter: Filter) -> StoreResult<DocumentCursor> {
        self.collection.find(self.scope(filter))
    }

    pub fn find_one(&self, filter: Filter) -> StoreResult<Option<Document>> {
        self.collection.find_one(self.scope(filter))
    }

    pub fn count(&self, filter: Filter) -> StoreResult<u64> {
        self.collection.count(self.scope(filter))
    }

    pub fn distinct(&self, field: &str, filter: Option<Filter>) -> StoreResult<Vec<Value>> {
        let filter = self.scope(filter.unwrap_or_else(all));
        self.collection.distinct(field, Some(filter))
    }

    /// # Errors
    ///
    /// `ValidationError` when `update` writes `user_id`.
    pub fn update_one(&self, filter: Filter, update: &UpdateOperators) -> StoreResult<u64> {
        self.check_update(update)?;
        self.collection.update_one(self.scope(filter), update)
    }

    /// # Errors
    ///
    /// `ValidationError` when `update` writes `user_id`.
    pub fn update_many(&self, filter: Filter, update: &UpdateOperators) -> StoreResult<u64> {
        self.check_update(update)?;
        self.collection.update_many(self.scope(filter), update)
    }

    pub fn remove_one(&self, filter: Filter) -> StoreResult<u64> {
        self.collection.remove_one(self.scope(filter))
    }

    pub fn remove_many(&self, filter: Filter) -> StoreResult<u64> {
        self.collection.remove_many(self.scope(filter))
    }
}
