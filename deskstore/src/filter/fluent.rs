use crate::common::Value;
use crate::errors::StoreResult;

use super::{EqualsFilter, Filter, InFilter, RegexFilter};

/// Creates a fluent filter builder for the specified field name.
///
/// Dotted names address nested fields (`"address.city"`).
pub fn field(field_name: &str) -> FluentFilter {
    FluentFilter {
        field_name: field_name.to_string(),
    }
}

/// A fluent builder for constructing filters on a specific field.
///
/// ```rust,ignore
/// use deskstore::filter::{field, or};
///
/// let active = field("status").eq("Active");
/// let search = or(vec![
///     field("name").regex("chen")?,
///     field("phone").regex("chen")?,
/// ]);
/// let tagged = field("status").in_array(vec!["Active", "Pending"]);
/// ```
pub struct FluentFilter {
    field_name: String,
}

impl FluentFilter {
    /// Matches documents where the field equals `value` exactly.
    #[inline]
    pub fn eq<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(EqualsFilter::new(self.field_name, value.into()))
    }

    /// Matches documents where the field contains a case-insensitive match of
    /// `pattern`.
    ///
    /// # Errors
    ///
    /// Returns a `FilterError` if the pattern does not compile.
    #[inline]
    pub fn regex(self, pattern: &str) -> StoreResult<Filter> {
        self.regex_with_options(pattern, "i")
    }

    /// Like [FluentFilter::regex] with extra option flags (`m`, `s`, `x`).
    pub fn regex_with_options(self, pattern: &str, options: &str) -> StoreResult<Filter> {
        let filter = RegexFilter::new(self.field_name, pattern.to_string(), options)?;
        Ok(Filter::new(filter))
    }

    /// Matches documents where the field value is one of `values`.
    #[inline]
    pub fn in_array<T: Into<Value>>(self, values: Vec<T>) -> Filter {
        let values = values.into_iter().map(Into::into).collect();
        Filter::new(InFilter::new(self.field_name, values))
    }
}
