//! Query filters for selecting documents from collections.
//!
//! Filters are built with the fluent API or parsed from a query document:
//!
//! ```rust,ignore
//! use deskstore::filter::{all, field, or, Filter};
//! use deskstore::doc;
//!
//! let active = field("status").eq("Active");
//! let search = or(vec![field("name").regex("chen")?, field("phone").regex("chen")?]);
//! let tagged = field("id").in_array(vec!["1", "2"]);
//!
//! let parsed = Filter::parse(&doc!{ "$or": [{ name: { "$regex": "chen" } }] })?;
//! ```
//!
//! # Supported Operators
//!
//! - **Equality**: `eq` / `$eq`
//! - **Pattern**: `regex` / `$regex`, always case-insensitive
//! - **Membership**: `in_array` / `$in`
//! - **Logical**: `and` / `$and`, `or` / `$or`
//! - **Special**: `all`

mod filter;
mod fluent;
mod query_parser;

mod basic_filters;
mod logical_filters;
mod pattern_filters;

pub(crate) use basic_filters::*;
pub use filter::*;
pub use fluent::*;
pub(crate) use logical_filters::*;
pub(crate) use pattern_filters::*;
