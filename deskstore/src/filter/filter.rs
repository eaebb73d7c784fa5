use crate::collection::Document;
use crate::errors::StoreResult;
use std::any::Any;
use std::fmt::Display;
use std::ops::Deref;
use std::sync::Arc;

use super::AllFilter;
use super::AndFilter;
use super::OrFilter;

/// Trait for implementing filters.
///
/// A `FilterProvider` decides whether a document matches, and can describe
/// itself as a query document so that a live backend can evaluate the same
/// condition on its side.
pub trait FilterProvider: Any + Send + Sync + Display {
    /// Applies the filter to a document and returns whether it matches.
    ///
    /// Evaluation is a pure function of the document and the filter.
    fn apply(&self, entry: &Document) -> StoreResult<bool>;

    /// Renders the filter as a query document, the inverse of [Filter::parse].
    fn to_query(&self) -> Document;

    /// Child filters of a logical filter, empty for field filters.
    fn logical_filters(&self) -> Vec<Filter> {
        Vec::new()
    }

    fn as_any(&self) -> &dyn Any;
}

/// A predicate over documents.
///
/// Filters are immutable and cheap to clone, so one filter can be reused
/// across many evaluations, threads and backends.
///
/// Filters are built with the fluent API ([super::field], [all], [and],
/// [or]) or parsed from a query document with [Filter::parse]. Malformed
/// conditions fail when the filter is built, never during evaluation.
#[derive(Clone)]
pub struct Filter {
    inner: Arc<dyn FilterProvider>,
}

impl Filter {
    /// Creates a new filter from a filter provider implementation.
    pub fn new<T: FilterProvider + 'static>(inner: T) -> Self {
        Filter { inner: Arc::new(inner) }
    }

    /// Combines this filter with another using logical AND.
    pub fn and(&self, filter: Filter) -> Self {
        Filter::new(AndFilter::new(vec![self.clone(), filter]))
    }

    /// Combines this filter with another using logical OR.
    pub fn or(&self, filter: Filter) -> Self {
        Filter::new(OrFilter::new(vec![self.clone(), filter]))
    }
}

impl Display for Filter {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl std::fmt::Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Filter{}", self.inner)
    }
}

impl Deref for Filter {
    type Target = Arc<dyn FilterProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Creates a filter that matches all documents.
pub fn all() -> Filter {
    Filter::new(AllFilter {})
}

/// Combines multiple filters using logical AND.
///
/// An empty list matches every document.
pub fn and(filters: Vec<Filter>) -> Filter {
    Filter::new(AndFilter::new(filters))
}

/// Combines multiple filters using logical OR.
///
/// Branches are evaluated in order and evaluation stops at the first match.
/// An empty list matches nothing.
pub fn or(filters: Vec<Filter>) -> Filter {
    Filter::new(OrFilter::new(filters))
}

pub(crate) fn is_all_filter(filter: &Filter) -> bool {
    filter.as_any().is::<AllFilter>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;
    use crate::filter::field;

    #[test]
    fn all_matches_everything() {
        let filter = all();
        assert!(filter.apply(&doc! {}).unwrap());
        assert!(filter.apply(&doc! { name: "x" }).unwrap());
        assert!(is_all_filter(&filter));
        assert!(!is_all_filter(&field("a").eq(1)));
    }

    #[test]
    fn and_or_combinators() {
        let doc = doc! { status: "Active", name: "Sarah Johnson" };
        let active = field("status").eq("Active");
        let bob = field("name").eq("Bob");

        assert!(!active.and(bob.clone()).apply(&doc).unwrap());
        assert!(active.or(bob.clone()).apply(&doc).unwrap());
        assert!(and(vec![]).apply(&doc).unwrap());
        assert!(!or(vec![]).apply(&doc).unwrap());
    }

    #[test]
    fn filter_is_shareable_across_threads() {
        let filter = field("n").eq(1);
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let filter = filter.clone();
                std::thread::spawn(move || filter.apply(&doc! { n: (i % 2) }).unwrap())
            })
            .collect();
        let matches = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|m| *m)
            .count();
        assert_eq!(matches, 2);
    }

    #[test]
    fn display_is_readable() {
        let filter = field("name").eq("Sarah").or(field("phone").eq("555"));
        assert_eq!(filter.to_string(), r#"((name == "Sarah") || (phone == "555"))"#);
    }
}
