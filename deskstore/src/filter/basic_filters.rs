use std::{any::Any, collections::HashSet, fmt::Display};

use crate::{
    collection::Document,
    common::{Value, OP_EQ, OP_IN},
    errors::StoreResult,
};

use super::FilterProvider;

/// A filter that matches all documents.
pub(crate) struct AllFilter;

impl FilterProvider for AllFilter {
    fn apply(&self, _entry: &Document) -> StoreResult<bool> {
        Ok(true)
    }

    fn to_query(&self) -> Document {
        Document::new()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Display for AllFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AllFilter")
    }
}

/// A filter that matches documents where a field equals a specific value.
///
/// Equality is exact: values of different types never match, and a missing
/// field reads as null, so it only matches a null target.
pub(crate) struct EqualsFilter {
    field_name: String,
    field_value: Value,
}

impl EqualsFilter {
    #[inline]
    pub(crate) fn new(field_name: String, field_value: Value) -> Self {
        EqualsFilter {
            field_name,
            field_value,
        }
    }
}

impl Display for EqualsFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} == {})", self.field_name, self.field_value)
    }
}

impl FilterProvider for EqualsFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> StoreResult<bool> {
        let value = entry.get(&self.field_name)?;
        Ok(value == self.field_value)
    }

    fn to_query(&self) -> Document {
        let mut query = Document::new();
        // a bare document value would be read back as an operator document
        let condition = match &self.field_value {
            Value::Document(_) => {
                let mut condition = Document::new();
                condition.insert_field(OP_EQ, self.field_value.clone());
                Value::Document(condition)
            }
            other => other.clone(),
        };
        query.insert_field(self.field_name.clone(), condition);
        query
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A filter that matches documents whose field value is an element of a set.
///
/// Membership uses the same exact equality as [EqualsFilter]; a missing
/// field reads as null.
pub(crate) struct InFilter {
    field_name: String,
    field_values: Vec<Value>,
    lookup: HashSet<Value>,
}

impl InFilter {
    #[inline]
    pub(crate) fn new(field_name: String, field_values: Vec<Value>) -> Self {
        let lookup = field_values.iter().cloned().collect();
        InFilter {
            field_name,
            field_values,
            lookup,
        }
    }
}

impl Display for InFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({} in {})",
            self.field_name,
            Value::Array(self.field_values.clone())
        )
    }
}

impl FilterProvider for InFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> StoreResult<bool> {
        let value = entry.get(&self.field_name)?;
        Ok(self.lookup.contains(&value))
    }

    fn to_query(&self) -> Document {
        let mut condition = Document::new();
        condition.insert_field(OP_IN, Value::Array(self.field_values.clone()));

        let mut query = Document::new();
        query.insert_field(self.field_name.clone(), Value::Document(condition));
        query
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
