//! # deskstore - document storage for the messaging dashboard
//!
//! deskstore keeps the dashboard's records (contacts, messages, campaigns,
//! templates and users) as schemaless documents in named collections. It
//! talks to a live document database when one is reachable and falls back
//! to an embedded in-memory store when it is not, with the same behavior on
//! both.
//!
//! ## Key Features
//!
//! - **Documents**: ordered maps of typed values with dotted-path access
//! - **Queries**: equality, case-insensitive regex, membership and logical
//!   groups, built fluently or parsed from query documents
//! - **Cursors**: snapshot results with sort, skip, limit and projection
//! - **Updates**: `$set`, `$inc` and `$addToSet` applied atomically per call
//! - **Backend selection**: one bounded attempt at the live database, then a
//!   permanent binding
//! - **Tenant scoping**: per-user views over shared collections
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use deskstore::{doc, DeskStore, SortOrder};
//! use deskstore::collection::UpdateOperators;
//! use deskstore::filter::field;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = DeskStore::builder().from_env().open()?;
//! let contacts = store.contacts()?;
//!
//! contacts.insert(doc!{ name: "Sarah Johnson", phone: "+1 (555) 123-4567" })?;
//! contacts.insert(doc!{ name: "Michael Chen", phone: "+1 (555) 234-5678" })?;
//!
//! let page = contacts
//!     .find(field("name").regex("chen")?)?
//!     .sort("name", SortOrder::Ascending)
//!     .limit(20)
//!     .to_list();
//!
//! contacts.update_one(
//!     field("name").eq("Michael Chen"),
//!     &UpdateOperators::new().add_to_set("tags", "Lead"),
//! )?;
//!
//! store.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Design Pattern
//!
//! Public handles (`DeskStore`, `DocumentCollection`, `Filter`,
//! `StoreBackend`) wrap an `Arc` around their implementation. Clones are
//! cheap and share state, and the implementation stays private.
//!
//! ## Module Organization
//!
//! - [`collection`] - Documents, collection handles, cursors, updates and defaults
//! - [`common`] - Values, constants and sort order
//! - [`errors`] - Error types and result definitions
//! - [`filter`] - Query filters and the query document parser
//! - [`store`] - Backends and backend selection
//! - [`desk_store`] - The store facade
//! - [`desk_store_builder`] - Store builder
//! - [`store_config`] - Store configuration
//! - [`seed`] - Sample dashboard data
//! - [`tenant`] - Per-user scoping

pub mod collection;
pub mod common;
pub mod desk_store;
pub mod desk_store_builder;
pub mod errors;
pub mod filter;
pub mod seed;
pub mod store;
pub mod store_config;
pub mod tenant;

pub use common::{SortOrder, Value};
pub use desk_store::DeskStore;
pub use desk_store_builder::DeskStoreBuilder;
pub use errors::{ErrorKind, StoreError, StoreResult};
pub use store_config::StoreConfig;
