//! Query criteria
//!
//! A criteria is an ordered mapping from field path to expected value. Paths
//! are dot-separated and descend through nested objects; when a path meets an
//! array of sub-documents, any element may satisfy the remaining path.

use serde_json::Value;

use crate::document::Document;

/// Field-path-to-value filter, matched conjunctively
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    terms: Vec<(String, Value)>,
}

impl Criteria {
    /// Empty criteria, matching every document
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality term for a (possibly dot-separated) field path
    pub fn field(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.terms.push((path.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[(String, Value)] {
        &self.terms
    }

    /// Check whether every term matches the document.
    ///
    /// The paths `id` and `_id` compare against the store-assigned identifier
    /// when the body carries no field of that name.
    pub fn matches(&self, doc: &Document) -> bool {
        self.terms.iter().all(|(path, expected)| {
            if (path == "id" || path == "_id") && !doc.fields.contains_key(path.as_str()) {
                return match (&doc.id, expected) {
                    (Some(id), Value::String(s)) => id.as_str() == s,
                    _ => false,
                };
            }

            let segments: Vec<&str> = path.split('.').collect();
            let (first, rest) = match segments.split_first() {
                Some(split) => split,
                None => return false,
            };
            match doc.fields.get(*first) {
                Some(value) => path_matches(value, rest, expected),
                None => false,
            }
        })
    }
}

impl std::fmt::Display for Criteria {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (path, value)) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{path}: {value}")?;
        }
        write!(f, "}}")
    }
}

/// Resolve the remaining path segments against a value and compare the leaf.
///
/// At the leaf, an array also matches when it contains the expected value.
fn path_matches(value: &Value, segments: &[&str], expected: &Value) -> bool {
    if segments.is_empty() {
        return match value {
            Value::Array(items) => value == expected || items.contains(expected),
            _ => value == expected,
        };
    }

    match value {
        Value::Object(map) => map
            .get(segments[0])
            .is_some_and(|v| path_matches(v, &segments[1..], expected)),
        Value::Array(items) => {
            if let Ok(index) = segments[0].parse::<usize>() {
                items
                    .get(index)
                    .is_some_and(|v| path_matches(v, &segments[1..], expected))
            } else {
                items.iter().any(|v| path_matches(v, segments, expected))
            }
        }
        _ => false,
    }
}
