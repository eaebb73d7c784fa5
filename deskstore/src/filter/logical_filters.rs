use itertools::Itertools;
use std::{any::Any, fmt::Display};

use crate::{
    collection::Document,
    common::{Value, OP_AND, OP_OR},
    errors::StoreResult,
};

use super::{Filter, FilterProvider};

fn join_filters(filters: &[Filter], separator: &str) -> String {
    filters.iter().join(separator)
}

fn logical_query(operator: &str, filters: &[Filter]) -> Document {
    let branches = filters
        .iter()
        .map(|f| Value::Document(f.to_query()))
        .collect();
    let mut query = Document::new();
    query.insert_field(operator, Value::Array(branches));
    query
}

/// A filter that applies logical AND operation on multiple filters.
///
/// Filters are evaluated in order and evaluation stops at the first one that
/// fails. An empty AND matches every document.
pub(crate) struct AndFilter {
    filters: Vec<Filter>,
}

impl AndFilter {
    pub(crate) fn new(filters: Vec<Filter>) -> Self {
        AndFilter { filters }
    }
}

impl Display for AndFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", join_filters(&self.filters, " && "))
    }
}

impl FilterProvider for AndFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> StoreResult<bool> {
        for filter in &self.filters {
            if !filter.apply(entry)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn to_query(&self) -> Document {
        logical_query(OP_AND, &self.filters)
    }

    fn logical_filters(&self) -> Vec<Filter> {
        self.filters.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A filter that applies logical OR operation on multiple filters.
///
/// Branches are evaluated in order and evaluation stops at the first one that
/// matches. An empty OR matches nothing.
pub(crate) struct OrFilter {
    filters: Vec<Filter>,
}

impl OrFilter {
    pub(crate) fn new(filters: Vec<Filter>) -> Self {
        OrFilter { filters }
    }
}

impl Display for OrFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", join_filters(&self.filters, " || "))
    }
}

impl FilterProvider for OrFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> StoreResult<bool> {
        for filter in &self.filters {
            if filter.apply(entry)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn to_query(&self) -> Document {
        logical_query(OP_OR, &self.filters)
    }

    fn logical_filters(&self) -> Vec<Filter> {
        self.filters.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
