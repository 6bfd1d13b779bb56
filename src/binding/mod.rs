//! # Data Binding
//!
//! Resolves an element's `dataMapping` against the data context and coerces
//! the result into the form its target property expects.
//!
//! - [`path`]: path grammar and resolution
//! - [`Binding`]: outcome of resolving one element's mapping

pub mod path;

pub use path::{DataPath, Missing, PathSegment, resolve, resolve_traced};

use serde_json::Value;

use crate::error::{FolioError, Result};
use path::value_kind;

/// Result of resolving an element's data mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Binding<'a> {
    /// Element has no mapping; literal properties apply.
    Unmapped,
    /// Mapping resolved to a non-null value.
    Bound(&'a Value),
    /// Mapping resolved to nothing (or null); literal properties apply.
    Missing,
}

impl<'a> Binding<'a> {
    /// Resolve an optional mapping against the data context.
    ///
    /// A `null` result counts as missing so that it falls back to the literal.
    pub fn resolve(data: &'a Value, mapping: Option<&str>) -> Self {
        let Some(path) = mapping else {
            return Binding::Unmapped;
        };
        match resolve_traced(data, path) {
            Ok(Value::Null) => {
                log::debug!("mapping '{}' resolved to null", path);
                Binding::Missing
            }
            Ok(value) => Binding::Bound(value),
            Err(miss) => {
                log::debug!("mapping '{}' missing at {}", path, miss);
                Binding::Missing
            }
        }
    }

    pub fn value(&self) -> Option<&'a Value> {
        match self {
            Binding::Bound(v) => Some(v),
            _ => None,
        }
    }
}

/// Coerce a bound scalar to the text it displays as.
///
/// Numbers use their plain decimal form (`12.0` displays as `12`, never in
/// exponent notation), booleans `true`/`false`. Objects and arrays are not
/// valid text bindings.
pub fn display_string(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(match n.as_f64() {
            // `+ 0.0` folds negative zero.
            Some(f) if n.is_f64() => format!("{}", f + 0.0),
            _ => n.to_string(),
        }),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(FolioError::BindingType(format!(
            "cannot display {} as text",
            value_kind(other)
        ))),
    }
}

/// Coerce a bound value to an image source reference. Only strings qualify.
pub fn source_reference(value: &Value) -> Result<String> {
    match value {
        Value::String(s) if !s.is_empty() => Ok(s.clone()),
        Value::String(_) => Err(FolioError::BindingType("empty image source".into())),
        other => Err(FolioError::BindingType(format!(
            "cannot use {} as an image source",
            value_kind(other)
        ))),
    }
}
