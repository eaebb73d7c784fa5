use crate::collection::Document;
use crate::common::{Value, CAMPAIGNS, CONTACTS, MESSAGES, TEMPLATES, USERS};
use crate::errors::StoreResult;
use chrono::{SecondsFormat, Utc};
use std::collections::HashMap;

/// Value written into an absent optional field on insert.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// A fixed value.
    Value(Value),
    /// The insertion time as an RFC 3339 UTC timestamp.
    Now,
}

impl DefaultValue {
    fn resolve(&self) -> Value {
        match self {
            DefaultValue::Value(value) => value.clone(),
            DefaultValue::Now => Value::String(now_timestamp()),
        }
    }
}

pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Default fields of one collection, applied in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldDefaults {
    fields: Vec<(String, DefaultValue)>,
}

impl FieldDefaults {
    pub fn new() -> Self {
        FieldDefaults::default()
    }

    /// Adds a fixed default for `field`.
    pub fn with<T: Into<Value>>(self, field: &str, value: T) -> Self {
        self.with_default(field, DefaultValue::Value(value.into()))
    }

    /// Adds a default for `field`. A later default for the same field
    /// replaces the earlier one.
    pub fn with_default(mut self, field: &str, value: DefaultValue) -> Self {
        match self.fields.iter_mut().find(|(f, _)| f == field) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((field.to_string(), value)),
        }
        self
    }

    /// Shorthand for a field defaulting to the insertion time.
    pub fn with_now(self, field: &str) -> Self {
        self.with_default(field, DefaultValue::Now)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fills every absent field. Present fields, including explicit nulls,
    /// are left alone.
    pub fn apply(&self, document: &mut Document) -> StoreResult<()> {
        for (field, value) in &self.fields {
            if !document.contains_field(field) {
                document.put(field, value.resolve())?;
            }
        }
        Ok(())
    }
}

/// Optional-field defaults keyed by collection name.
///
/// ```rust,ignore
/// let defaults = CollectionDefaults::dashboard()
///     .with("notes", FieldDefaults::new().with("pinned", false).with_now("createdAt"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionDefaults {
    collections: HashMap<String, FieldDefaults>,
}

impl CollectionDefaults {
    /// No defaults for any collection.
    pub fn new() -> Self {
        CollectionDefaults::default()
    }

    /// Sets the defaults of `collection`, replacing any previous ones.
    pub fn with(mut self, collection: &str, defaults: FieldDefaults) -> Self {
        self.collections.insert(collection.to_string(), defaults);
        self
    }

    /// Defaults of `collection`; empty when none are registered.
    pub fn for_collection(&self, collection: &str) -> FieldDefaults {
        self.collections.get(collection).cloned().unwrap_or_default()
    }

    /// Defaults of the dashboard record types.
    pub fn dashboard() -> Self {
        CollectionDefaults::new()
            .with(
                CONTACTS,
                FieldDefaults::new()
                    .with("email", Value::Null)
                    .with("tags", Value::Array(vec![]))
                    .with("status", "Active")
                    .with("lastMessage", Value::Null)
                    .with("lastMessageTime", Value::Null)
                    .with_now("createdAt"),
            )
            .with(
                MESSAGES,
                FieldDefaults::new()
                    .with_now("timestamp")
                    .with("status", "sent")
                    .with("mediaUrl", Value::Null)
                    .with("mediaType", Value::Null),
            )
            .with(
                CAMPAIGNS,
                FieldDefaults::new()
                    .with("sent", 0)
                    .with("delivered", 0)
                    .with("read", 0)
                    .with("readRate", "0%")
                    .with("deliveryRate", "0%")
                    .with_now("createdAt")
                    .with("scheduledAt", Value::Null),
            )
            .with(
                TEMPLATES,
                FieldDefaults::new()
                    .with("parameters", Value::Array(vec![]))
                    .with("usageCount", 0)
                    .with_now("createdAt"),
            )
            .with(
                USERS,
                FieldDefaults::new().with("role", "user").with_now("createdAt"),
            )
    }
}
