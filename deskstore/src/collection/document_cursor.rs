use crate::collection::Document;
use crate::common::{SortOrder, Value};
use std::cmp::Ordering;

/// Result set of a `find`, bound to the documents that matched when the
/// cursor was created.
///
/// Writes made to the collection after the cursor was created are not
/// visible through it. `sort`, `skip`, `limit` and `project` only record
/// configuration and may be called in any order; the last call of each wins.
/// Materializing always applies them in the same order: stable sort, then
/// skip, then limit, then projection.
///
/// ```rust,ignore
/// let page = contacts
///     .find(field("status").eq("Active"))?
///     .limit(10)
///     .sort("name", SortOrder::Ascending)
///     .skip(20)
///     .to_list();
/// ```
#[derive(Debug, Clone)]
pub struct DocumentCursor {
    snapshot: Vec<Document>,
    sort_by: Option<(String, SortOrder)>,
    skip: usize,
    limit: Option<usize>,
    projection: Option<Vec<String>>,
}

impl DocumentCursor {
    /// Creates a cursor over already filtered documents, kept in their
    /// insertion order.
    pub fn new(snapshot: Vec<Document>) -> Self {
        DocumentCursor {
            snapshot,
            sort_by: None,
            skip: 0,
            limit: None,
            projection: None,
        }
    }

    /// Orders results by `field`. Documents missing the field sort as null,
    /// ahead of every other value when ascending. Ties keep their filtered
    /// order.
    pub fn sort(mut self, field: &str, order: SortOrder) -> Self {
        self.sort_by = Some((field.to_string(), order));
        self
    }

    /// Discards the first `n` results after sorting.
    pub fn skip(mut self, n: usize) -> Self {
        self.skip = n;
        self
    }

    /// Keeps at most `n` results after skipping.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Keeps only `id` and the listed fields in each result.
    pub fn project(mut self, fields: &[&str]) -> Self {
        self.projection = Some(fields.iter().map(|f| f.to_string()).collect());
        self
    }

    /// Number of documents that matched the filter, before skip and limit.
    pub fn matched(&self) -> usize {
        self.snapshot.len()
    }

    /// Number of documents materialization will produce.
    pub fn len(&self) -> usize {
        let remaining = self.snapshot.len().saturating_sub(self.skip);
        match self.limit {
            Some(limit) => remaining.min(limit),
            None => remaining,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First result of the configured cursor.
    pub fn first(&self) -> Option<Document> {
        self.clone().limit(1).to_list().into_iter().next()
    }

    /// Materializes the cursor.
    pub fn to_list(self) -> Vec<Document> {
        let DocumentCursor {
            mut snapshot,
            sort_by,
            skip,
            limit,
            projection,
        } = self;

        if let Some((field, order)) = sort_by {
            sort_documents(&mut snapshot, &field, order);
        }

        let window = snapshot
            .into_iter()
            .skip(skip)
            .take(limit.unwrap_or(usize::MAX));

        match projection {
            Some(fields) => window.map(|doc| doc.project(&fields)).collect(),
            None => window.collect(),
        }
    }
}

fn sort_documents(documents: &mut Vec<Document>, field: &str, order: SortOrder) {
    // keys are read once per document, not once per comparison
    let mut keyed: Vec<(Value, Document)> = documents
        .drain(..)
        .map(|doc| (doc.get(field).unwrap_or(Value::Null), doc))
        .collect();

    // sort_by is stable, so equal keys keep their filtered order in both
    // directions
    keyed.sort_by(|(a, _), (b, _)| {
        let ord: Ordering = a.sort_cmp(b);
        match order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    });
    documents.extend(keyed.into_iter().map(|(_, doc)| doc));
}

impl IntoIterator for DocumentCursor {
    type Item = Document;
    type IntoIter = std::vec::IntoIter<Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.to_list().into_iter()
    }
}
