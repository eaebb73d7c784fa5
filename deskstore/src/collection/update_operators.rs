use crate::collection::Document;
use crate::common::{Value, DOC_ID, OP_ADD_TO_SET, OP_EACH, OP_INC, OP_SET};
use crate::errors::{ErrorKind, StoreError, StoreResult};
use std::fmt::Display;

/// Amount added by an increment. Integer deltas keep integer fields
/// integral; a float on either side produces a float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Delta {
    Int(i64),
    Float(f64),
}

impl From<i32> for Delta {
    fn from(value: i32) -> Self {
        Delta::Int(value as i64)
    }
}

impl From<i64> for Delta {
    fn from(value: i64) -> Self {
        Delta::Int(value)
    }
}

impl From<u32> for Delta {
    fn from(value: u32) -> Self {
        Delta::Int(value as i64)
    }
}

impl From<f64> for Delta {
    fn from(value: f64) -> Self {
        Delta::Float(value)
    }
}

impl From<Delta> for Value {
    fn from(delta: Delta) -> Self {
        match delta {
            Delta::Int(v) => Value::I64(v),
            Delta::Float(v) => Value::F64(v),
        }
    }
}

fn update_error(message: String) -> StoreError {
    log::error!("{}", message);
    StoreError::new(&message, ErrorKind::UpdateError)
}

fn data_type_error(message: String) -> StoreError {
    log::error!("{}", message);
    StoreError::new(&message, ErrorKind::InvalidDataType)
}

/// A set of field update operators.
///
/// Operators always apply in the same order regardless of how they were
/// added: every `set`, then every `inc`, then every `add_to_set`. Operators
/// that target `id` are dropped when added, so an update can never change a
/// document's identity.
///
/// ```rust,ignore
/// let update = UpdateOperators::new()
///     .set("status", "read")
///     .inc("usageCount", 1)
///     .add_to_set("tags", "VIP");
///
/// let parsed = UpdateOperators::parse(&doc!{ "$set": { status: "read" } })?;
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateOperators {
    set: Vec<(String, Value)>,
    inc: Vec<(String, Delta)>,
    add_to_set: Vec<(String, Vec<Value>)>,
}

impl UpdateOperators {
    pub fn new() -> Self {
        UpdateOperators::default()
    }

    fn keep(field: &str, operator: &str) -> bool {
        let below_id = field
            .strip_prefix(DOC_ID)
            .is_some_and(|rest| rest.starts_with('.'));
        if field == DOC_ID || below_id {
            log::warn!("Ignoring {} on {}, {} is immutable", operator, field, DOC_ID);
            return false;
        }
        true
    }

    /// Sets `field` to `value`, creating it when absent.
    pub fn set<T: Into<Value>>(mut self, field: &str, value: T) -> Self {
        if Self::keep(field, OP_SET) {
            self.set.push((field.to_string(), value.into()));
        }
        self
    }

    /// Adds `delta` to the numeric `field`, creating it with `delta` when
    /// absent.
    pub fn inc<D: Into<Delta>>(mut self, field: &str, delta: D) -> Self {
        if Self::keep(field, OP_INC) {
            self.inc.push((field.to_string(), delta.into()));
        }
        self
    }

    /// Appends `value` to the list `field` unless an equal element is already
    /// present, creating the list when absent.
    pub fn add_to_set<T: Into<Value>>(self, field: &str, value: T) -> Self {
        self.add_each_to_set(field, vec![value.into()])
    }

    /// Appends every value of `values` not already present in the list.
    pub fn add_each_to_set<T: Into<Value>>(mut self, field: &str, values: Vec<T>) -> Self {
        if Self::keep(field, OP_ADD_TO_SET) {
            let values = values.into_iter().map(Into::into).collect();
            self.add_to_set.push((field.to_string(), values));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.inc.is_empty() && self.add_to_set.is_empty()
    }

    /// Checks whether any operator writes `field` or a path below it.
    pub fn touches(&self, field: &str) -> bool {
        let nested = format!("{}.", field);
        self.set
            .iter()
            .map(|(f, _)| f)
            .chain(self.inc.iter().map(|(f, _)| f))
            .chain(self.add_to_set.iter().map(|(f, _)| f))
            .any(|f| f == field || f.starts_with(&nested))
    }

    /// Parses an update document of `$set`, `$inc` and `$addToSet`
    /// operators.
    ///
    /// `$addToSet` accepts a single value or `{"$each": [..]}`.
    ///
    /// # Errors
    ///
    /// Returns an `UpdateError` for an empty update, an unknown operator, a
    /// plain (non-operator) key, a non-document operator body, an empty
    /// field name, a non-numeric increment or a non-array `$each`.
    pub fn parse(update: &Document) -> StoreResult<UpdateOperators> {
        if update.is_empty() {
            return Err(update_error("Update document is empty".to_string()));
        }

        let mut operators = UpdateOperators::new();
        for (operator, body) in update.iter() {
            let body = match body {
                Value::Document(body) => body,
                other => {
                    return Err(update_error(format!(
                        "{} expects a document of fields, found {}",
                        operator,
                        other.type_name()
                    )))
                }
            };

            for (field, operand) in body.iter() {
                if field.is_empty() || field.split('.').any(str::is_empty) {
                    return Err(update_error(format!("{} has an empty field name", operator)));
                }

                operators = match operator.as_str() {
                    OP_SET => operators.set(field, operand.clone()),
                    OP_INC => {
                        let delta = match operand {
                            Value::I64(v) => Delta::Int(*v),
                            Value::F64(v) => Delta::Float(*v),
                            other => {
                                return Err(update_error(format!(
                                    "$inc on {} expects a number, found {}",
                                    field,
                                    other.type_name()
                                )))
                            }
                        };
                        operators.inc(field, delta)
                    }
                    OP_ADD_TO_SET => {
                        let values = match operand {
                            Value::Document(each) if each.contains_key(OP_EACH) => {
                                if each.size() != 1 {
                                    return Err(update_error(format!(
                                        "$addToSet on {} mixes $each with other keys",
                                        field
                                    )));
                                }
                                match each.get(OP_EACH)? {
                                    Value::Array(values) => values,
                                    other => {
                                        return Err(update_error(format!(
                                            "$each on {} expects an array, found {}",
                                            field,
                                            other.type_name()
                                        )))
                                    }
                                }
                            }
                            single => vec![single.clone()],
                        };
                        operators.add_each_to_set(field, values)
                    }
                    unknown => {
                        return Err(update_error(format!("Unknown update operator {}", unknown)))
                    }
                };
            }
        }
        Ok(operators)
    }

    /// Renders the operators as an update document, the inverse of
    /// [UpdateOperators::parse].
    pub fn to_document(&self) -> Document {
        let mut update = Document::new();

        if !self.set.is_empty() {
            let body: Document = self.set.iter().cloned().collect();
            update.insert_field(OP_SET, body);
        }

        if !self.inc.is_empty() {
            let body: Document = self
                .inc
                .iter()
                .map(|(f, d)| (f.clone(), Value::from(*d)))
                .collect();
            update.insert_field(OP_INC, body);
        }

        if !self.add_to_set.is_empty() {
            let body: Document = self
                .add_to_set
                .iter()
                .map(|(f, values)| {
                    let mut each = Document::new();
                    each.insert_field(OP_EACH, Value::Array(values.clone()));
                    (f.clone(), Value::Document(each))
                })
                .collect();
            update.insert_field(OP_ADD_TO_SET, body);
        }
        update
    }

    /// Applies the operators to a copy of `document` and returns the copy.
    ///
    /// The input is left untouched, so a failing operator leaves nothing
    /// half applied.
    pub fn apply_to(&self, document: &Document) -> StoreResult<Document> {
        let mut updated = document.clone();

        for (field, value) in &self.set {
            updated.put(field, value.clone())?;
        }

        for (field, delta) in &self.inc {
            let next = if updated.contains_field(field) {
                increment(field, &updated.get(field)?, *delta)?
            } else {
                Value::from(*delta)
            };
            updated.put(field, next)?;
        }

        for (field, values) in &self.add_to_set {
            let mut list = if updated.contains_field(field) {
                match updated.get(field)? {
                    Value::Array(list) => list,
                    other => {
                        return Err(data_type_error(format!(
                            "Cannot apply $addToSet to {} of type {}",
                            field,
                            other.type_name()
                        )))
                    }
                }
            } else {
                Vec::new()
            };

            for value in values {
                if !list.contains(value) {
                    list.push(value.clone());
                }
            }
            updated.put(field, Value::Array(list))?;
        }

        Ok(updated)
    }
}

fn increment(field: &str, current: &Value, delta: Delta) -> StoreResult<Value> {
    match (current, delta) {
        (Value::I64(a), Delta::Int(b)) => a.checked_add(b).map(Value::I64).ok_or_else(|| {
            data_type_error(format!("Integer overflow applying $inc to {}", field))
        }),
        (Value::I64(a), Delta::Float(b)) => Ok(Value::F64(*a as f64 + b)),
        (Value::F64(a), Delta::Int(b)) => Ok(Value::F64(a + b as f64)),
        (Value::F64(a), Delta::Float(b)) => Ok(Value::F64(a + b)),
        (other, _) => Err(data_type_error(format!(
            "Cannot apply $inc to {} of type {}",
            field,
            other.type_name()
        ))),
    }
}

impl Display for UpdateOperators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_document())
    }
}
