//! Data paths: `customer.address.city`, `invoice.items[0].total`.
//!
//! A path is a sequence of segments separated by `.`. Each segment is a key,
//! optionally followed by one or more bracketed non-negative integer indexes.
//! A leading index with no key (`[0].name`) indexes the root.
//!
//! Resolution never fails: any dead end is [`Missing`]. Malformed paths
//! (empty segments, bracket content that is not a non-negative integer,
//! unterminated brackets) are Missing too, without being reinterpreted as
//! string keys.

use serde_json::Value;
use std::fmt;

/// One lookup step of a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object key.
    Key(String),
    /// Array index.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, "{}", k),
            PathSegment::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// Where and why a path stopped resolving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Missing {
    /// Index of the first segment that failed (0 for malformed paths).
    pub segment: usize,
    pub reason: String,
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "segment {}: {}", self.segment, self.reason)
    }
}

/// A parsed data path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPath {
    segments: Vec<PathSegment>,
}

impl DataPath {
    /// Parse a path string. Malformed input is reported as [`Missing`].
    pub fn parse(path: &str) -> Result<Self, Missing> {
        let malformed = |reason: String| Missing { segment: 0, reason };

        if path.is_empty() {
            return Err(malformed("empty path".into()));
        }

        let mut segments = Vec::new();
        for part in path.split('.') {
            let (key, mut rest) = match part.find('[') {
                Some(i) => (&part[..i], &part[i..]),
                None => (part, ""),
            };

            if key.is_empty() && rest.is_empty() {
                return Err(malformed(format!("empty segment in '{}'", path)));
            }
            // A bare index is only allowed at the root.
            if key.is_empty() && !segments.is_empty() {
                return Err(malformed(format!("index without key in '{}'", part)));
            }
            if !key.is_empty() {
                if key.contains(']') {
                    return Err(malformed(format!("stray ']' in '{}'", part)));
                }
                segments.push(PathSegment::Key(key.to_string()));
            }

            while !rest.is_empty() {
                let Some(inner) = rest.strip_prefix('[') else {
                    return Err(malformed(format!("unexpected text after index in '{}'", part)));
                };
                let Some(close) = inner.find(']') else {
                    return Err(malformed(format!("unterminated '[' in '{}'", part)));
                };
                let digits = &inner[..close];
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(malformed(format!("invalid index '[{}]'", digits)));
                }
                let index = digits
                    .parse::<usize>()
                    .map_err(|_| malformed(format!("index out of range '[{}]'", digits)))?;
                segments.push(PathSegment::Index(index));
                rest = &inner[close + 1..];
            }
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Walk `data` segment by segment, reporting the first segment that fails.
    pub fn resolve_traced<'a>(&self, data: &'a Value) -> Result<&'a Value, Missing> {
        let mut current = data;
        for (i, segment) in self.segments.iter().enumerate() {
            let next = match (segment, current) {
                (PathSegment::Key(k), Value::Object(map)) => map.get(k),
                (PathSegment::Index(idx), Value::Array(items)) => items.get(*idx),
                _ => None,
            };
            current = next.ok_or_else(|| Missing {
                segment: i,
                reason: match (segment, current) {
                    (PathSegment::Key(k), Value::Object(_)) => format!("no key '{}'", k),
                    (PathSegment::Index(idx), Value::Array(items)) => {
                        format!("index {} out of range (len {})", idx, items.len())
                    }
                    (PathSegment::Key(k), other) => {
                        format!("cannot look up '{}' in {}", k, value_kind(other))
                    }
                    (PathSegment::Index(idx), other) => {
                        format!("cannot index [{}] into {}", idx, value_kind(other))
                    }
                },
            })?;
        }
        Ok(current)
    }

    /// Walk `data`, returning `None` at the first dead end.
    pub fn resolve<'a>(&self, data: &'a Value) -> Option<&'a Value> {
        self.resolve_traced(data).ok()
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 && matches!(seg, PathSegment::Key(_)) {
                write!(f, ".")?;
            }
            write!(f, "{}", seg)?;
        }
        Ok(())
    }
}

/// JSON type name, for Missing reasons and binding errors.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Resolve a path string against a data tree. `None` means Missing.
pub fn resolve<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    DataPath::parse(path).ok()?.resolve(data)
}

/// Resolve a path string, keeping the reason for a miss.
pub fn resolve_traced<'a>(data: &'a Value, path: &str) -> Result<&'a Value, Missing> {
    DataPath::parse(path)?.resolve_traced(data)
}
