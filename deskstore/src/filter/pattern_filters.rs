use regex::{Regex, RegexBuilder};
use std::{any::Any, fmt::Display};

use crate::{
    collection::Document,
    common::{Value, OP_OPTIONS, OP_REGEX},
    errors::{ErrorKind, StoreError, StoreResult},
};

use super::FilterProvider;

/// A filter that matches a field against a case-insensitive regular
/// expression.
///
/// The pattern is searched for anywhere in the field's text, the way a
/// document database evaluates `$regex`. Strings are matched directly,
/// numbers and booleans through their display form, and an array matches
/// when any of its elements does. Missing, null and document values never
/// match.
///
/// The pattern is compiled once at construction; an invalid pattern is
/// rejected there with a `FilterError`.
pub(crate) struct RegexFilter {
    field_name: String,
    field_value: String,
    options: String,
    pattern: Regex,
}

impl RegexFilter {
    /// Compiles `field_value` with the given option flags.
    ///
    /// Matching is always case-insensitive. The extra flags `m` (multi-line),
    /// `s` (dot matches newline) and `x` (ignore whitespace) are honoured;
    /// `i` is accepted and redundant. Any other flag is a `FilterError`.
    pub(crate) fn new(field_name: String, field_value: String, options: &str) -> StoreResult<Self> {
        let mut builder = RegexBuilder::new(&field_value);
        builder.case_insensitive(true);

        for flag in options.chars() {
            match flag {
                'i' => {}
                'm' => {
                    builder.multi_line(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                'x' => {
                    builder.ignore_whitespace(true);
                }
                other => {
                    log::error!("Unsupported regex option '{}' for field {}", other, field_name);
                    return Err(StoreError::new(
                        &format!("Unsupported regex option '{}'", other),
                        ErrorKind::FilterError,
                    ));
                }
            }
        }

        let pattern = builder.build().map_err(|e| {
            log::error!("Invalid regex pattern '{}': {}", field_value, e);
            StoreError::from(e)
        })?;

        Ok(RegexFilter {
            field_name,
            field_value,
            options: options.to_string(),
            pattern,
        })
    }

    fn is_match(&self, value: &Value) -> bool {
        match value {
            Value::Array(items) => items.iter().any(|item| self.is_match(item)),
            other => match other.match_text() {
                Some(text) => self.pattern.is_match(&text),
                None => false,
            },
        }
    }
}

impl Display for RegexFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} =~ /{}/i)", self.field_name, self.field_value)
    }
}

impl FilterProvider for RegexFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> StoreResult<bool> {
        let value = entry.get(&self.field_name)?;
        Ok(self.is_match(&value))
    }

    fn to_query(&self) -> Document {
        let mut options = self.options.clone();
        if !options.contains('i') {
            options.insert(0, 'i');
        }

        let mut condition = Document::new();
        condition.insert_field(OP_REGEX, self.field_value.clone());
        condition.insert_field(OP_OPTIONS, options);

        let mut query = Document::new();
        query.insert_field(self.field_name.clone(), Value::Document(condition));
        query
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;
    use crate::filter::field;

    #[test]
    fn regex_is_case_insensitive_substring() {
        let filter = field("name").regex("chen").unwrap();
        assert!(filter.apply(&doc! { name: "Michael Chen" }).unwrap());
        assert!(filter.apply(&doc! { name: "CHENG" }).unwrap());
        assert!(!filter.apply(&doc! { name: "Sarah Johnson" }).unwrap());
    }

    #[test]
    fn regex_honours_anchors() {
        let filter = field("name").regex("^sarah").unwrap();
        assert!(filter.apply(&doc! { name: "Sarah Johnson" }).unwrap());
        assert!(!filter.apply(&doc! { name: "Emily Sarah" }).unwrap());
    }

    #[test]
    fn regex_on_missing_or_null_never_matches() {
        let filter = field("email").regex(".*").unwrap();
        assert!(!filter.apply(&doc! { name: "x" }).unwrap());
        assert!(!filter.apply(&doc! { email: (Value::Null) }).unwrap());
    }

    #[test]
    fn regex_on_document_never_matches() {
        let filter = field("address").regex("austin").unwrap();
        assert!(!filter.apply(&doc! { address: { city: "Austin" } }).unwrap());
    }

    #[test]
    fn regex_matches_scalar_text_forms() {
        let filter = field("phone").regex("555").unwrap();
        assert!(filter.apply(&doc! { phone: "+1 (555) 123-4567" }).unwrap());
        assert!(filter.apply(&doc! { phone: 5551234 }).unwrap());

        let flag = field("sent").regex("^true$").unwrap();
        assert!(flag.apply(&doc! { sent: true }).unwrap());
    }

    #[test]
    fn regex_matches_any_array_element() {
        let filter = field("tags").regex("^vip$").unwrap();
        assert!(filter.apply(&doc! { tags: ["VIP", "Customer"] }).unwrap());
        assert!(!filter.apply(&doc! { tags: ["Lead"] }).unwrap());
    }

    #[test]
    fn invalid_pattern_fails_at_construction() {
        let err = field("name").regex("(unclosed").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::FilterError);
    }

    #[test]
    fn unsupported_option_fails_at_construction() {
        let err = RegexFilter::new("name".into(), "a".into(), "q").err().unwrap();
        assert_eq!(err.kind(), &ErrorKind::FilterError);
    }

    #[test]
    fn multi_line_option() {
        let filter = RegexFilter::new("text".into(), "^second".into(), "m").unwrap();
        assert!(filter.apply(&doc! { text: "first\nsecond" }).unwrap());

        let plain = RegexFilter::new("text".into(), "^second".into(), "").unwrap();
        assert!(!plain.apply(&doc! { text: "first\nsecond" }).unwrap());
    }

    #[test]
    fn regex_renders_query() {
        let filter = field("name").regex("chen").unwrap();
        assert_eq!(
            filter.to_query(),
            doc! { name: { "$regex": "chen", "$options": "i" } }
        );
    }
}
