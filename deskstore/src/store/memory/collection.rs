use crate::collection::{Document, DocumentCollectionProvider, UpdateOperators};
use crate::errors::{ErrorKind, StoreError, StoreResult};
use crate::filter::Filter;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct CollectionState {
    documents: Vec<Document>,
    ids: HashSet<String>,
    sequence: u64,
}

impl CollectionState {
    fn next_id(&mut self) -> String {
        loop {
            self.sequence += 1;
            let candidate = self.sequence.to_string();
            if !self.ids.contains(&candidate) {
                return candidate;
            }
        }
    }

    fn matching_positions(&self, filter: &Filter, just_once: bool) -> StoreResult<Vec<usize>> {
        let mut positions = Vec::new();
        for (position, document) in self.documents.iter().enumerate() {
            if filter.apply(document)? {
                positions.push(position);
                if just_once {
                    break;
                }
            }
        }
        Ok(positions)
    }
}

/// Embedded collection held entirely in memory.
///
/// One mutex guards the documents and the id counter, and every operation
/// runs to completion while holding it.
pub struct InMemoryCollection {
    name: String,
    closed: Arc<AtomicBool>,
    state: Mutex<CollectionState>,
}

impl InMemoryCollection {
    /// Creates an empty standalone collection.
    pub fn new(name: &str) -> Self {
        InMemoryCollection::with_closed_flag(name, Arc::new(AtomicBool::new(false)))
    }

    pub(crate) fn with_closed_flag(name: &str, closed: Arc<AtomicBool>) -> Self {
        InMemoryCollection {
            name: name.to_string(),
            closed,
            state: Mutex::new(CollectionState::default()),
        }
    }

    fn check_opened(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::Relaxed) {
            log::error!("Collection {} belongs to a closed store", self.name);
            return Err(StoreError::new(
                &format!("Collection {} belongs to a closed store", self.name),
                ErrorKind::StoreClosed,
            ));
        }
        Ok(())
    }
}

impl DocumentCollectionProvider for InMemoryCollection {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn insert(&self, mut document: Document) -> StoreResult<String> {
        self.check_opened()?;
        let mut state = self.state.lock();

        let id = match document.id() {
            Some(id) => {
                if state.ids.contains(&id) {
                    log::error!("Document with id {} already exists in {}", id, self.name);
                    return Err(StoreError::new(
                        &format!("Document with id {} already exists in {}", id, self.name),
                        ErrorKind::UniqueConstraintViolation,
                    ));
                }
                id
            }
            None => {
                let id = state.next_id();
                document.set_id(&id);
                id
            }
        };

        state.ids.insert(id.clone());
        state.documents.push(document);
        Ok(id)
    }

    fn find(&self, filter: &Filter) -> StoreResult<Vec<Document>> {
        self.check_opened()?;
        let state = self.state.lock();

        let mut matched = Vec::new();
        for document in &state.documents {
            if filter.apply(document)? {
                matched.push(document.clone());
            }
        }
        Ok(matched)
    }

    fn count(&self, filter: &Filter) -> StoreResult<u64> {
        self.check_opened()?;
        let state = self.state.lock();
        Ok(state.matching_positions(filter, false)?.len() as u64)
    }

    fn update(
        &self,
        filter: &Filter,
        update: &UpdateOperators,
        just_once: bool,
    ) -> StoreResult<u64> {
        self.check_opened()?;
        let mut state = self.state.lock();

        let positions = state.matching_positions(filter, just_once)?;
        let mut updated = Vec::with_capacity(positions.len());
        for position in &positions {
            updated.push(update.apply_to(&state.documents[*position])?);
        }

        // every operator succeeded on every match, commit
        for (position, document) in positions.iter().zip(updated) {
            state.documents[*position] = document;
        }
        Ok(positions.len() as u64)
    }

    fn remove(&self, filter: &Filter, just_once: bool) -> StoreResult<u64> {
        self.check_opened()?;
        let mut state = self.state.lock();

        let positions = state.matching_positions(filter, just_once)?;
        for position in positions.iter().rev() {
            let removed = state.documents.remove(*position);
            if let Some(id) = removed.id() {
                state.ids.remove(&id);
            }
        }
        Ok(positions.len() as u64)
    }
}
