use indexmap::IndexMap;

use crate::common::{Value, DOC_ID, FIELD_SEPARATOR};
use crate::errors::{ErrorKind, StoreError, StoreResult};
use std::cmp::Ordering;
use std::fmt::{Debug, Display};
use std::hash::{Hash, Hasher};

/// A record stored in a collection.
///
/// A document is an insertion-ordered mapping of field names to [Value]s.
/// Nested documents are addressed with dotted paths, so for a document
/// `{"address": {"city": "Austin"}}` the call `document.get("address.city")`
/// returns `"Austin"`. Array elements can be read with a numeric segment
/// (`"tags.0"`).
///
/// Every stored document carries a string `id` field. The store assigns one
/// on insert when it is missing; after that it never changes.
///
/// Two documents are equal when they hold the same fields with the same
/// values, regardless of field order.
#[derive(Clone, Default)]
pub struct Document {
    data: IndexMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Document {
            data: IndexMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of top level fields.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Associates `value` with `key`.
    ///
    /// A dotted key writes into nested documents, creating them when they
    /// are missing or hold a non-document value.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the key or one of its segments is empty.
    ///
    /// ```ignore
    /// let mut doc = Document::new();
    /// doc.put("name", "Sarah Johnson")?;
    /// doc.put("address.city", "Austin")?;
    /// assert_eq!(doc.get("address.city")?, Value::from("Austin"));
    /// ```
    pub fn put<T: Into<Value>>(&mut self, key: &str, value: T) -> StoreResult<()> {
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(StoreError::new(
                "Document does not support empty key",
                ErrorKind::ValidationError,
            ));
        }

        let value = value.into();
        if key.contains(FIELD_SEPARATOR) {
            let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
            self.deep_put(&splits, value)
        } else {
            self.data.insert(key.to_string(), value);
            Ok(())
        }
    }

    /// Inserts a top level field verbatim, without interpreting separators.
    pub fn insert_field<T: Into<Value>>(&mut self, key: impl Into<String>, value: T) {
        self.data.insert(key.into(), value.into());
    }

    /// Returns the value at `key`, or [Value::Null] when there is none.
    ///
    /// Dotted keys descend into nested documents and index into arrays. When a
    /// non-numeric segment meets an array, the remaining path is resolved
    /// against every element and the results are collected into an array.
    ///
    /// ```ignore
    /// let doc = doc!{ name: "Sarah", tags: ["VIP", "Customer"] };
    /// assert_eq!(doc.get("tags.1")?, Value::from("Customer"));
    /// assert_eq!(doc.get("missing")?, Value::Null);
    /// ```
    pub fn get(&self, key: &str) -> StoreResult<Value> {
        match self.data.get(key) {
            Some(value) => Ok(value.clone()),
            None => {
                if key.contains(FIELD_SEPARATOR) {
                    self.deep_get(key)
                } else {
                    Ok(Value::Null)
                }
            }
        }
    }

    /// Returns the document id, if one has been assigned.
    pub fn id(&self) -> Option<String> {
        match self.data.get(DOC_ID) {
            Some(Value::String(id)) => Some(id.clone()),
            _ => None,
        }
    }

    /// Checks whether the document carries an `id` field of any type.
    pub fn has_id(&self) -> bool {
        self.data.contains_key(DOC_ID)
    }

    pub(crate) fn set_id(&mut self, id: &str) {
        self.data.insert(DOC_ID.to_string(), Value::String(id.to_string()));
    }

    /// Top level field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    /// All leaf field paths, nested documents expanded with the separator.
    pub fn fields(&self) -> Vec<String> {
        self.fields_with_prefix("")
    }

    fn fields_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut fields = Vec::with_capacity(self.data.len());
        for (key, value) in &self.data {
            let field = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}{}{}", prefix, FIELD_SEPARATOR, key)
            };

            match value {
                Value::Document(doc) if !doc.is_empty() => {
                    fields.extend(doc.fields_with_prefix(&field))
                }
                _ => fields.push(field),
            }
        }
        fields
    }

    /// Removes the field at `key`. Removing a missing field is a no-op.
    ///
    /// A nested document left empty by the removal is removed as well.
    pub fn remove(&mut self, key: &str) -> StoreResult<()> {
        if self.data.shift_remove(key).is_some() || !key.contains(FIELD_SEPARATOR) {
            return Ok(());
        }
        let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
        self.deep_remove(&splits)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Checks whether the path resolves to a present field, including one
    /// explicitly set to null.
    pub fn contains_field(&self, field: &str) -> bool {
        if self.data.contains_key(field) {
            return true;
        }

        let mut current = self;
        let splits: Vec<&str> = field.split(FIELD_SEPARATOR).collect();
        for (i, segment) in splits.iter().enumerate() {
            match current.data.get(*segment) {
                Some(Value::Document(doc)) if i + 1 < splits.len() => current = doc,
                Some(_) => return i + 1 == splits.len(),
                None => return false,
            }
        }
        false
    }

    /// Copies every field of `other` into this document. Nested documents are
    /// merged recursively, everything else is overwritten.
    pub fn merge(&mut self, other: &Document) {
        for (key, value) in &other.data {
            match (self.data.get_mut(key), value) {
                (Some(Value::Document(mine)), Value::Document(theirs)) => mine.merge(theirs),
                _ => {
                    self.data.insert(key.clone(), value.clone());
                }
            }
        }
    }

    /// Keeps `id` and the listed fields, dropping the rest.
    pub fn project(&self, fields: &[String]) -> Document {
        let mut projected = Document::new();
        if let Some(id) = self.data.get(DOC_ID) {
            projected.insert_field(DOC_ID, id.clone());
        }
        for field in fields {
            if self.contains_field(field) {
                if let Ok(value) = self.get(field) {
                    let _ = projected.put(field, value);
                }
            }
        }
        projected
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    /// Field-by-field comparison in insertion order, used when documents are
    /// sort keys.
    pub(crate) fn sort_cmp(&self, other: &Document) -> Ordering {
        for ((k1, v1), (k2, v2)) in self.data.iter().zip(other.data.iter()) {
            let ord = k1.cmp(k2).then_with(|| v1.sort_cmp(v2));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        self.data.len().cmp(&other.data.len())
    }

    /// Parses a JSON object into a document.
    pub fn from_json(json: &str) -> StoreResult<Document> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Document::try_from(value)
    }

    /// Renders the document as a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        self.clone().into()
    }

    fn deep_get(&self, key: &str) -> StoreResult<Value> {
        let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
        if splits.iter().any(|s| s.is_empty()) {
            log::error!("Document does not support empty key segment in {}", key);
            return Err(StoreError::new(
                "Document does not support empty key",
                ErrorKind::ValidationError,
            ));
        }
        Ok(Self::recursive_get(self.data.get(splits[0]), &splits[1..]))
    }

    fn recursive_get(value: Option<&Value>, splits: &[&str]) -> Value {
        let value = match value {
            None => return Value::Null,
            Some(v) => v,
        };

        if splits.is_empty() {
            return value.clone();
        }

        let key = splits[0];
        match value {
            Value::Document(obj) => Self::recursive_get(obj.data.get(key), &splits[1..]),
            Value::Array(arr) => match key.parse::<usize>() {
                Ok(index) => Self::recursive_get(arr.get(index), &splits[1..]),
                // non numeric segment, resolve the rest against every element
                Err(_) => Self::decompose(arr, splits),
            },
            _ => Value::Null,
        }
    }

    fn decompose(arr: &[Value], splits: &[&str]) -> Value {
        let mut items: Vec<Value> = Vec::with_capacity(arr.len());
        for item in arr {
            match Self::recursive_get(Some(item), splits) {
                Value::Array(values) => items.extend(values),
                Value::Null => {}
                value => items.push(value),
            }
        }
        Value::Array(items)
    }

    fn deep_put(&mut self, splits: &[&str], value: Value) -> StoreResult<()> {
        let key = splits[0];
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(StoreError::new(
                "Document does not support empty key",
                ErrorKind::ValidationError,
            ));
        }

        if splits.len() == 1 {
            self.data.insert(key.to_string(), value);
            return Ok(());
        }

        let entry = self
            .data
            .entry(key.to_string())
            .or_insert_with(|| Value::Document(Document::new()));
        if !entry.is_document() {
            *entry = Value::Document(Document::new());
        }
        match entry.as_document_mut() {
            Some(nested) => nested.deep_put(&splits[1..], value),
            None => Err(StoreError::new(
                "Failed to create nested document",
                ErrorKind::InternalError,
            )),
        }
    }

    fn deep_remove(&mut self, splits: &[&str]) -> StoreResult<()> {
        let key = splits[0];
        if splits.len() == 1 {
            self.data.shift_remove(key);
            return Ok(());
        }

        let mut now_empty = false;
        if let Some(Value::Document(nested)) = self.data.get_mut(key) {
            nested.deep_remove(&splits[1..])?;
            now_empty = nested.is_empty();
        }
        if now_empty {
            self.data.shift_remove(key);
        }
        Ok(())
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        // IndexMap equality ignores insertion order
        self.data == other.data
    }
}

impl Eq for Document {}

impl Hash for Document {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut entries: Vec<(&String, &Value)> = self.data.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.len().hash(state);
        for (key, value) in entries {
            key.hash(state);
            value.hash(state);
        }
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.data.iter()).finish()
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Document {
            data: iter.into_iter().collect(),
        }
    }
}

impl From<Document> for serde_json::Value {
    fn from(doc: Document) -> Self {
        let map: serde_json::Map<String, serde_json::Value> = doc
            .data
            .into_iter()
            .map(|(k, v)| (k, serde_json::Value::from(v)))
            .collect();
        serde_json::Value::Object(map)
    }
}

impl TryFrom<serde_json::Value> for Document {
    type Error = StoreError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match Value::from(value) {
            Value::Document(doc) => Ok(doc),
            other => {
                log::error!("Expected a JSON object, found {}", other.type_name());
                Err(StoreError::new(
                    &format!("Expected a JSON object, found {}", other.type_name()),
                    ErrorKind::EncodingError,
                ))
            }
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Document {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.data.len()))?;
        for (key, value) in &self.data {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Document {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = <serde_json::Value as serde::Deserialize>::deserialize(deserializer)?;
        Document::try_from(json).map_err(|e| serde::de::Error::custom(e.message()))
    }
}

pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a [Document] with JSON-like syntax.
///
/// ```rust
/// use deskstore::doc;
///
/// let empty = doc!{};
///
/// let contact = doc!{
///     name: "Sarah Johnson",
///     phone: "+1 (555) 123-4567",
///     tags: ["VIP", "Customer"],
///     address: {
///         city: "Austin"
///     }
/// };
///
/// let base = 100;
/// let campaign = doc!{ "name": "Summer Sale", "recipients": (base * 2) };
/// ```
#[macro_export]
macro_rules! doc {
    ({}) => {
        $crate::collection::Document::new()
    };

    () => {
        $crate::collection::Document::new()
    };

    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::doc!($($key : $value),*)
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let mut doc = $crate::collection::Document::new();
            $(
                doc.insert_field($crate::collection::normalize(stringify!($key)), $crate::doc_value!($value));
            )*
            doc
        }
    };
}

/// Helper macro converting values for the doc! macro.
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        {
            $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
        }
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    fn set_up() -> Document {
        doc! {
            id: "1",
            name: "Sarah Johnson",
            score: 1034,
            location: {
                state: "NY",
                address: {
                    line1: "40",
                    zip: 10001,
                },
            },
            tags: ["VIP", "Customer"],
            orders: [
                { total: 10 },
                { total: 20 },
            ],
        }
    }

    #[test]
    fn get_top_level_and_nested() {
        let doc = set_up();
        assert_eq!(doc.get("name").unwrap(), Value::from("Sarah Johnson"));
        assert_eq!(doc.get("location.state").unwrap(), Value::from("NY"));
        assert_eq!(doc.get("location.address.zip").unwrap(), Value::I64(10001));
    }

    #[test]
    fn get_missing_is_null() {
        let doc = set_up();
        assert_eq!(doc.get("email").unwrap(), Value::Null);
        assert_eq!(doc.get("location.country").unwrap(), Value::Null);
        assert_eq!(doc.get("name.first").unwrap(), Value::Null);
    }

    #[test]
    fn get_array_index_and_decompose() {
        let doc = set_up();
        assert_eq!(doc.get("tags.1").unwrap(), Value::from("Customer"));
        assert_eq!(doc.get("tags.9").unwrap(), Value::Null);
        assert_eq!(doc.get("orders.total").unwrap(), Value::from(vec![10, 20]));
    }

    #[test]
    fn get_with_empty_segment_fails() {
        let doc = set_up();
        let err = doc.get("location..state").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ValidationError);
    }

    #[test]
    fn put_creates_nested_documents() {
        let mut doc = Document::new();
        doc.put("address.city", "Austin").unwrap();
        doc.put("address.zip", "73301").unwrap();
        assert_eq!(doc.get("address.city").unwrap(), Value::from("Austin"));
        assert_eq!(doc.size(), 1);
        assert!(doc.get("address").unwrap().is_document());
    }

    #[test]
    fn put_replaces_scalar_with_nested() {
        let mut doc = doc! { address: "unknown" };
        doc.put("address.city", "Austin").unwrap();
        assert_eq!(doc.get("address.city").unwrap(), Value::from("Austin"));
    }

    #[test]
    fn put_empty_key_fails() {
        let mut doc = Document::new();
        assert!(doc.put("", 1).is_err());
        assert!(doc.put("a.", 1).is_err());
    }

    #[test]
    fn id_requires_string() {
        let doc = set_up();
        assert_eq!(doc.id(), Some("1".to_string()));

        let numeric = doc! { id: 1 };
        assert!(numeric.has_id());
        assert_eq!(numeric.id(), None);
    }

    #[test]
    fn remove_nested_field_drops_empty_parent() {
        let mut doc = doc! { a: { b: 1 }, c: 2 };
        doc.remove("a.b").unwrap();
        assert!(!doc.contains_key("a"));
        doc.remove("missing").unwrap();
        assert_eq!(doc.size(), 1);
    }

    #[test]
    fn contains_field_distinguishes_null() {
        let doc = doc! { email: (Value::Null), address: { city: "Austin" } };
        assert!(doc.contains_field("email"));
        assert!(doc.contains_field("address.city"));
        assert!(!doc.contains_field("phone"));
        assert!(!doc.contains_field("address.zip"));
    }

    #[test]
    fn equality_ignores_field_order() {
        let a = doc! { x: 1, y: 2 };
        let b = doc! { y: 2, x: 1 };
        assert_eq!(a, b);

        use std::collections::HashSet;
        let set: HashSet<Document> = vec![a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn fields_are_flattened() {
        let doc = doc! { a: 1, b: { c: 2, d: { e: 3 } } };
        assert_eq!(doc.fields(), vec!["a", "b.c", "b.d.e"]);
    }

    #[test]
    fn merge_is_recursive() {
        let mut doc = doc! { a: { b: 1, c: 2 }, d: 1 };
        doc.merge(&doc! { a: { c: 3 }, d: "x" });
        assert_eq!(doc.get("a.b").unwrap(), Value::I64(1));
        assert_eq!(doc.get("a.c").unwrap(), Value::I64(3));
        assert_eq!(doc.get("d").unwrap(), Value::from("x"));
    }

    #[test]
    fn project_keeps_id_and_fields() {
        let doc = set_up();
        let projected = doc.project(&["name".to_string(), "location.state".to_string()]);
        assert_eq!(projected.id(), Some("1".to_string()));
        assert_eq!(projected.get("name").unwrap(), Value::from("Sarah Johnson"));
        assert_eq!(projected.get("location.state").unwrap(), Value::from("NY"));
        assert!(!projected.contains_key("score"));
    }

    #[test]
    fn json_round_trip_preserves_order() {
        let doc = Document::from_json(r#"{"name":"Michael Chen","id":"2","tags":["Lead"]}"#).unwrap();
        let keys: Vec<&String> = doc.keys().collect();
        assert_eq!(keys, vec!["name", "id", "tags"]);
        assert_eq!(doc.to_string(), r#"{"name":"Michael Chen","id":"2","tags":["Lead"]}"#);
    }

    #[test]
    fn from_json_rejects_non_object() {
        let err = Document::from_json("[1, 2]").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::EncodingError);
    }

    #[test]
    fn doc_macro_with_expressions() {
        let base = 100;
        let doc = doc! { "name": "Summer Sale", "recipients": (base * 2) };
        assert_eq!(doc.get("recipients").unwrap(), Value::I64(200));
        assert_eq!(doc.get("name").unwrap(), Value::from("Summer Sale"));
    }
}
