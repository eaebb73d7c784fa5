//! Documents and collections.
//!
//! # Documents
//!
//! A `Document` is an insertion-ordered map from field names to `Value`s.
//! Dotted paths address nested documents.
//!
//! ```rust,ignore
//! use deskstore::collection::Document;
//!
//! let mut doc = Document::new();
//! doc.put("name", "Sarah Johnson")?;
//! doc.put("address.city", "Austin")?;
//! ```
//!
//! # Collections
//!
//! A `DocumentCollection` is a handle on a named collection of documents,
//! backed by whichever backend the store bound to. It supports insert,
//! find (through a `DocumentCursor`), count, distinct, update and remove.
//!
//! ```rust,ignore
//! use deskstore::filter::field;
//!
//! let contacts = store.contacts()?;
//! contacts.insert(doc!{ name: "Michael Chen", status: "Active" })?;
//!
//! let matched = contacts.update_many(
//!     field("status").eq("Active"),
//!     &UpdateOperators::new().add_to_set("tags", "Lead"),
//! )?;
//! ```
//!
//! # Document IDs
//!
//! Every stored document has a string `id`. When a document is inserted
//! without one the collection assigns the next value of its own counter
//! (`"1"`, `"2"`, ...). Ids are unique within a collection and updates never
//! change them.

mod collection;
mod defaults;
mod document;
mod document_cursor;
mod update_operators;

pub use collection::*;
pub use defaults::*;
pub use document::*;
pub use document_cursor::*;
pub use update_operators::*;
