use crate::collection::Document;
use crate::common::{Value, OP_AND, OP_EQ, OP_IN, OP_OPTIONS, OP_OR, OP_REGEX};
use crate::errors::{ErrorKind, StoreError, StoreResult};

use super::{all, and, field, or, Filter};

fn filter_error(message: String) -> StoreError {
    log::error!("{}", message);
    StoreError::new(&message, ErrorKind::FilterError)
}

impl Filter {
    /// Builds a filter from a query document.
    ///
    /// Supported shapes:
    ///
    /// * `{"status": "Active"}` - equality
    /// * `{"status": {"$eq": "Active"}}` - explicit equality
    /// * `{"name": {"$regex": "chen", "$options": "i"}}` - case-insensitive regex
    /// * `{"status": {"$in": ["Active", "Pending"]}}` - membership
    /// * `{"$or": [{..}, {..}]}` - any branch matches; the conditions inside
    ///   one branch are alternatives as well
    /// * `{"$and": [{..}, {..}]}` - every branch matches
    ///
    /// Top level conditions are combined with AND, and an empty query matches
    /// everything.
    ///
    /// # Errors
    ///
    /// Any other `$` operator, a malformed operand, or a condition mixing
    /// operators with plain keys is rejected with a `FilterError`.
    pub fn parse(query: &Document) -> StoreResult<Filter> {
        let conditions = parse_conditions(query)?;
        Ok(match conditions.len() {
            0 => all(),
            1 => conditions.into_iter().next().unwrap_or_else(all),
            _ => and(conditions),
        })
    }
}

fn parse_conditions(query: &Document) -> StoreResult<Vec<Filter>> {
    let mut conditions = Vec::with_capacity(query.size());
    for (key, value) in query.iter() {
        if key.starts_with('$') {
            conditions.push(parse_logical(key, value)?);
        } else {
            conditions.extend(parse_field(key, value)?);
        }
    }
    Ok(conditions)
}

fn parse_logical(operator: &str, operand: &Value) -> StoreResult<Filter> {
    if operator != OP_OR && operator != OP_AND {
        return Err(filter_error(format!("Unknown query operator {}", operator)));
    }

    let branches = match operand {
        Value::Array(branches) if !branches.is_empty() => branches,
        _ => {
            return Err(filter_error(format!(
                "{} expects a non-empty array of query documents",
                operator
            )))
        }
    };

    let mut filters = Vec::with_capacity(branches.len());
    for branch in branches {
        let branch = branch.as_document().ok_or_else(|| {
            filter_error(format!(
                "{} branch must be a query document, found {}",
                operator,
                branch.type_name()
            ))
        })?;
        let conditions = parse_conditions(branch)?;
        filters.push(match operator {
            // an empty branch places no condition
            _ if conditions.is_empty() => all(),
            OP_OR => or(conditions),
            _ => and(conditions),
        });
    }

    Ok(match operator {
        OP_OR => or(filters),
        _ => and(filters),
    })
}

fn parse_field(name: &str, condition: &Value) -> StoreResult<Vec<Filter>> {
    let operators = match condition {
        Value::Document(doc) if doc.keys().any(|k| k.starts_with('$')) => doc,
        // plain value, including a document compared as a whole
        other => return Ok(vec![field(name).eq(other.clone())]),
    };

    if operators.keys().any(|k| !k.starts_with('$')) {
        return Err(filter_error(format!(
            "Condition on {} mixes operators and plain fields",
            name
        )));
    }

    let mut filters = Vec::with_capacity(operators.size());
    let options = match operators.get(OP_OPTIONS)? {
        Value::Null if !operators.contains_key(OP_OPTIONS) => None,
        Value::String(options) => Some(options),
        other => {
            return Err(filter_error(format!(
                "$options on {} must be a string, found {}",
                name,
                other.type_name()
            )))
        }
    };

    for (operator, operand) in operators.iter() {
        match operator.as_str() {
            OP_EQ => filters.push(field(name).eq(operand.clone())),
            OP_REGEX => {
                let pattern = operand.as_str().ok_or_else(|| {
                    filter_error(format!(
                        "$regex on {} must be a string, found {}",
                        name,
                        operand.type_name()
                    ))
                })?;
                let options = options.as_deref().unwrap_or("i");
                filters.push(field(name).regex_with_options(pattern, options)?);
            }
            OP_OPTIONS => {
                if !operators.contains_key(OP_REGEX) {
                    return Err(filter_error(format!("$options on {} without $regex", name)));
                }
            }
            OP_IN => {
                let values = operand.as_array().ok_or_else(|| {
                    filter_error(format!(
                        "$in on {} must be an array, found {}",
                        name,
                        operand.type_name()
                    ))
                })?;
                filters.push(field(name).in_array(values.clone()));
            }
            unknown => {
                return Err(filter_error(format!(
                    "Unknown query operator {} on {}",
                    unknown, name
                )))
            }
        }
    }
    Ok(filters)
}
