//! Document and entity types
//!
//! A `Document` is a schemaless JSON field map plus an optional store-assigned
//! identifier. Typed structs convert to and from documents through serde; the
//! deserialization path doubles as the hydration bypass: no constructor or
//! validating setter runs when a struct is rebuilt from a raw field map.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::Error;

/// Field map backing a document body
pub type FieldMap = serde_json::Map<String, Value>;

/// Store-assigned document identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A document held in (or destined for) a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier, `None` until the store assigns one
    pub id: Option<DocumentId>,
    /// JSON body
    pub fields: FieldMap,
}

impl Document {
    /// Create an empty document with no identifier
    pub fn new() -> Self {
        Self {
            id: None,
            fields: FieldMap::new(),
        }
    }

    /// Create a document directly from a raw field map
    pub fn from_fields(fields: FieldMap) -> Self {
        Self { id: None, fields }
    }

    /// Serialize an entity into a document body.
    ///
    /// Fails with [`Error::NotADocument`] if the value serializes to anything
    /// other than a JSON object.
    pub fn from_entity<T: Serialize>(entity: &T) -> Result<Self, Error> {
        match serde_json::to_value(entity)? {
            Value::Object(fields) => Ok(Self::from_fields(fields)),
            _ => Err(Error::NotADocument),
        }
    }

    /// Rebuild a typed entity from the document body.
    ///
    /// This bypasses any constructor the entity type may have: fields are
    /// injected straight from the stored map via serde.
    pub fn to_entity<T: DeserializeOwned>(&self) -> Result<T, Error> {
        Ok(serde_json::from_value(Value::Object(self.fields.clone()))?)
    }

    /// Read a value at a dot-separated path.
    ///
    /// Path segments descend into nested objects; a numeric segment indexes
    /// into an array. Returns `None` if any segment is missing.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.fields.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Assign a value at a dot-separated path, creating intermediate objects
    /// as needed.
    ///
    /// Fails with [`Error::InvalidPath`] if an intermediate segment lands on
    /// a scalar or an array.
    pub fn set_path(&mut self, path: &str, value: Value) -> Result<(), Error> {
        let segments: Vec<&str> = path.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(Error::InvalidPath(path.to_string()));
        }

        let (last, intermediate) = match segments.split_last() {
            Some(split) => split,
            None => return Err(Error::InvalidPath(path.to_string())),
        };

        let mut current = &mut self.fields;
        for segment in intermediate {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(FieldMap::new()));
            current = match entry {
                Value::Object(map) => map,
                _ => return Err(Error::InvalidPath(path.to_string())),
            };
        }
        current.insert(last.to_string(), value);

        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a JSON value into a field map, rejecting non-objects
pub fn field_map(value: Value) -> Result<FieldMap, Error> {
    match value {
        Value::Object(fields) => Ok(fields),
        _ => Err(Error::NotADocument),
    }
}

/// A typed entity persisted into a fixed collection.
///
/// Implementors pick the collection their values live in; serialization is
/// handled entirely by serde.
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use dockit::Entity;
///
/// #[derive(Serialize, Deserialize)]
/// struct User {
///     name: String,
/// }
///
/// impl Entity for User {
///     const COLLECTION: &'static str = "users";
/// }
/// ```
pub trait Entity: Serialize + DeserializeOwned {
    /// Collection this entity type is stored in
    const COLLECTION: &'static str;
}
