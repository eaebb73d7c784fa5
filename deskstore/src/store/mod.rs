//! Storage backends and backend selection.
//!
//! A store is served by exactly one backend for the life of the process:
//!
//! - **Live**: an external document database reached through a
//!   [LiveConnector]. The wire protocol belongs to the connector.
//! - **Embedded**: the in-process [memory::InMemoryStore], used when no live
//!   database is configured or the live database could not be reached.
//!
//! The [BackendSelector] makes that choice once, on first collection
//! access, and never revisits it. Both backends implement
//! [StoreBackendProvider] and hand out collections implementing
//! [crate::collection::DocumentCollectionProvider], so callers cannot tell
//! them apart.

mod backend;
mod live;
pub mod memory;
mod selector;

pub use backend::*;
pub use live::*;
pub use selector::*;
