//! Repository test façade
//!
//! Assertion-oriented and mutation-oriented helpers over a `DocumentStore`
//! handle, for use inside acceptance-test scenarios. Every operation is a
//! direct, unbuffered delegation to the handle: nothing is cached between
//! calls, and mutating or asserting operations flush pending writes so
//! assertions observe durable state.
//!
//! `assert_exists` and `assert_absent` panic on a failed expectation, which
//! fails the surrounding test like any other Rust assertion. Store-level
//! failures propagate through `Result` instead.

use serde_json::Value;
use tracing::debug;

use crate::criteria::Criteria;
use crate::document::{Document, DocumentId, Entity, FieldMap};
use crate::error::Error;
use crate::store::DocumentStore;

/// Test façade over a document store handle.
///
/// Holds the handle for the duration of a test case; acquire one through
/// [`Harness`](crate::Harness) or wrap a store directly with [`Facade::new`].
pub struct Facade<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> Facade<S> {
    /// Wrap an already-connected store handle
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying store handle
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the underlying store handle
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Release the façade, returning the handle
    pub fn into_store(self) -> S {
        self.store
    }

    // ==================== Mutation Operations ====================

    /// Persist a fresh document built from path/value overrides and flush
    /// immediately.
    ///
    /// Override keys may be dot-separated paths; intermediate objects are
    /// created as needed. Fails with [`Error::InvalidPath`] if a path
    /// traverses a scalar.
    pub fn persist(&mut self, collection: &str, overrides: FieldMap) -> Result<(), Error> {
        self.persist_document(collection, Document::new(), overrides)
    }

    /// Apply overrides to an existing document, persist it, and flush
    pub fn persist_document(
        &mut self,
        collection: &str,
        mut doc: Document,
        overrides: FieldMap,
    ) -> Result<(), Error> {
        for (path, value) in overrides {
            doc.set_path(&path, value)?;
        }
        self.store.persist(collection, doc)?;
        self.store.flush()
    }

    /// Persist a typed entity into its collection and flush
    pub fn persist_entity<T: Entity>(&mut self, entity: &T) -> Result<(), Error> {
        let doc = Document::from_entity(entity)?;
        self.store.persist(T::COLLECTION, doc)?;
        self.store.flush()
    }

    /// Build a document straight from a raw field map, persist it, and flush.
    ///
    /// Keys are taken literally (no path interpretation), so any shape the
    /// store accepts can be injected without going through assignment
    /// validation. Returns the generated identifier when the store assigns
    /// one.
    pub fn hydrate_and_persist(
        &mut self,
        collection: &str,
        fields: FieldMap,
    ) -> Result<Option<DocumentId>, Error> {
        let id = self.store.persist(collection, Document::from_fields(fields))?;
        self.store.flush()?;
        if let Some(id) = &id {
            debug!(collection, %id, "document created");
        }

        Ok(id)
    }

    /// Hydrate a typed entity from a raw field map, persist it, and flush.
    ///
    /// The entity is rebuilt through serde, bypassing its constructors.
    /// Returns the generated identifier together with the hydrated value.
    pub fn hydrate_entity<T: Entity>(
        &mut self,
        fields: FieldMap,
    ) -> Result<(Option<DocumentId>, T), Error> {
        let entity: T = serde_json::from_value(Value::Object(fields.clone()))?;
        let id = self.hydrate_and_persist(T::COLLECTION, fields)?;

        Ok((id, entity))
    }

    /// Query all matches, mark each for removal, and flush. A no-op when
    /// nothing matches; calling it twice is safe.
    pub fn delete_matching(&mut self, collection: &str, criteria: &Criteria) -> Result<(), Error> {
        let docs = self.store.find_all(collection, criteria)?;
        for doc in docs {
            if let Some(id) = doc.id {
                self.store.remove(collection, &id)?;
            }
        }
        self.store.flush()
    }

    /// Irreversibly delete the entire collection
    pub fn drop_collection(&mut self, collection: &str) -> Result<(), Error> {
        self.store.drop_collection(collection)
    }

    /// Flush pending writes to the store
    pub fn flush(&mut self) -> Result<(), Error> {
        self.store.flush()
    }

    // ==================== Assertion Operations ====================

    /// Flush pending writes, then panic unless a document in the collection
    /// matches the criteria.
    ///
    /// # Panics
    ///
    /// Panics (fails the test) when no match is found.
    pub fn assert_exists(&mut self, collection: &str, criteria: &Criteria) -> Result<(), Error> {
        self.store.flush()?;
        if self.store.find_one(collection, criteria)?.is_none() {
            panic!("expected a document in '{collection}' matching {criteria}, found none");
        }

        Ok(())
    }

    /// Flush pending writes, then panic if any document in the collection
    /// matches the criteria.
    ///
    /// # Panics
    ///
    /// Panics (fails the test) when a match is found.
    pub fn assert_absent(&mut self, collection: &str, criteria: &Criteria) -> Result<(), Error> {
        self.store.flush()?;
        if let Some(doc) = self.store.find_one(collection, criteria)? {
            let id = doc.id.map(|id| id.to_string()).unwrap_or_default();
            panic!(
                "expected no document in '{collection}' matching {criteria}, found one (id: {id})"
            );
        }

        Ok(())
    }

    // ==================== Fetch Operations ====================

    /// Flush, fetch one match, and read a field straight from the stored
    /// body. The field may be a dot-separated path.
    pub fn fetch_field(
        &mut self,
        collection: &str,
        field: &str,
        criteria: &Criteria,
    ) -> Result<Value, Error> {
        let doc = self
            .fetch_one(collection, criteria)?
            .ok_or_else(|| Error::NoMatch {
                collection: collection.to_string(),
                criteria: criteria.to_string(),
            })?;

        doc.get_path(field)
            .cloned()
            .ok_or_else(|| Error::MissingField(field.to_string()))
    }

    /// Flush, then return all matches. An empty result is not an error.
    pub fn fetch_all(
        &mut self,
        collection: &str,
        criteria: &Criteria,
    ) -> Result<Vec<Document>, Error> {
        self.store.flush()?;
        self.store.find_all(collection, criteria)
    }

    /// Flush, then return the first match, if any
    pub fn fetch_one(
        &mut self,
        collection: &str,
        criteria: &Criteria,
    ) -> Result<Option<Document>, Error> {
        self.store.flush()?;
        self.store.find_one(collection, criteria)
    }

    /// Flush, then fetch the first match rebuilt as a typed entity
    pub fn fetch_entity<T: Entity>(&mut self, criteria: &Criteria) -> Result<Option<T>, Error> {
        match self.fetch_one(T::COLLECTION, criteria)? {
            Some(doc) => Ok(Some(doc.to_entity()?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::field_map;
    use crate::store::SqliteStore;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    fn facade() -> Facade<SqliteStore> {
        Facade::new(SqliteStore::open_in_memory().expect("in-memory store"))
    }

    fn fields(value: Value) -> FieldMap {
        field_map(value).unwrap()
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct User {
        name: String,
        age: u32,
    }

    impl Entity for User {
        const COLLECTION: &'static str = "users";
    }

    // ==================== Persist Tests ====================

    #[test]
    fn test_persist_applies_path_overrides() -> Result<(), Error> {
        let mut f = facade();

        f.persist(
            "users",
            fields(json!({"name": "Miles", "profile.city": "Paris"})),
        )?;

        let doc = f
            .fetch_one("users", &Criteria::new().field("name", "Miles"))?
            .unwrap();
        assert_eq!(doc.get_path("profile.city"), Some(&json!("Paris")));

        Ok(())
    }

    #[test]
    fn test_persist_invalid_path_fails() -> Result<(), Error> {
        let mut f = facade();

        let result = f.persist(
            "users",
            fields(json!({"name": "Miles", "name.first": "M"})),
        );
        assert!(matches!(result, Err(Error::InvalidPath(_))));

        Ok(())
    }

    #[test]
    fn test_persist_document_keeps_existing_fields() -> Result<(), Error> {
        let mut f = facade();

        let doc = Document::from_fields(fields(json!({"name": "Miles", "age": 30})));
        f.persist_document("users", doc, fields(json!({"age": 31})))?;

        let stored = f.fetch_one("users", &Criteria::new())?.unwrap();
        assert_eq!(stored.get_path("name"), Some(&json!("Miles")));
        assert_eq!(stored.get_path("age"), Some(&json!(31)));

        Ok(())
    }

    #[test]
    fn test_hydrate_and_persist_returns_id() -> Result<(), Error> {
        let mut f = facade();

        let id = f.hydrate_and_persist("users", fields(json!({"name": "Miles"})))?;
        assert!(id.is_some());
        assert!(!id.unwrap().as_str().is_empty());

        Ok(())
    }

    #[test]
    fn test_hydrate_keys_are_literal_not_paths() -> Result<(), Error> {
        let mut f = facade();

        // a dotted key stays a single field under hydration
        f.hydrate_and_persist("items", fields(json!({"a.b": 1})))?;

        let doc = f.fetch_one("items", &Criteria::new())?.unwrap();
        assert_eq!(doc.fields.get("a.b"), Some(&json!(1)));
        assert!(doc.fields.get("a").is_none());

        Ok(())
    }

    // ==================== Typed Entity Tests ====================

    #[test]
    fn test_entity_roundtrip_through_store() -> Result<(), Error> {
        let mut f = facade();

        let user = User {
            name: "Miles".to_string(),
            age: 30,
        };
        f.persist_entity(&user)?;

        let fetched: User = f
            .fetch_entity(&Criteria::new().field("name", "Miles"))?
            .unwrap();
        assert_eq!(fetched, user);

        Ok(())
    }

    #[test]
    fn test_hydrate_entity_bypasses_construction() -> Result<(), Error> {
        let mut f = facade();

        let (id, user) = f.hydrate_entity::<User>(fields(json!({"name": "Miles", "age": 30})))?;
        assert!(id.is_some());
        assert_eq!(user.name, "Miles");

        f.assert_exists("users", &Criteria::new().field("age", 30))?;
        Ok(())
    }

    // ==================== Assertion Tests ====================

    #[test]
    fn test_assert_exists_flushes_pending_writes() -> Result<(), Error> {
        let mut f = facade();

        // queue without flushing, straight on the handle
        f.store_mut()
            .persist("users", Document::from_fields(fields(json!({"name": "A"}))))?;

        f.assert_exists("users", &Criteria::new().field("name", "A"))?;
        Ok(())
    }

    #[test]
    #[should_panic(expected = "expected a document in 'users'")]
    fn test_assert_exists_panics_on_miss() {
        let mut f = facade();
        f.assert_exists("users", &Criteria::new().field("name", "Nobody"))
            .unwrap();
    }

    #[test]
    #[should_panic(expected = "expected no document in 'users'")]
    fn test_assert_absent_panics_on_match() {
        let mut f = facade();
        f.persist("users", fields(json!({"name": "Miles"}))).unwrap();
        f.assert_absent("users", &Criteria::new().field("name", "Miles"))
            .unwrap();
    }

    // ==================== Fetch Tests ====================

    #[test]
    fn test_fetch_field_reads_nested_path() -> Result<(), Error> {
        let mut f = facade();

        f.hydrate_and_persist(
            "users",
            fields(json!({"name": "A", "profile": {"city": "Paris"}})),
        )?;

        let city = f.fetch_field("users", "profile.city", &Criteria::new().field("name", "A"))?;
        assert_eq!(city, json!("Paris"));

        Ok(())
    }

    #[test]
    fn test_fetch_field_no_match_is_an_error() {
        let mut f = facade();
        let result = f.fetch_field("users", "name", &Criteria::new().field("name", "X"));
        assert!(matches!(result, Err(Error::NoMatch { .. })));
    }

    #[test]
    fn test_fetch_field_missing_field_is_an_error() -> Result<(), Error> {
        let mut f = facade();
        f.persist("users", fields(json!({"name": "A"})))?;

        let result = f.fetch_field("users", "email", &Criteria::new().field("name", "A"));
        assert!(matches!(result, Err(Error::MissingField(_))));

        Ok(())
    }

    #[test]
    fn test_fetch_one_miss_is_none() -> Result<(), Error> {
        let mut f = facade();
        assert!(f.fetch_one("users", &Criteria::new())?.is_none());
        Ok(())
    }

    #[test]
    fn test_fetch_all_empty_is_not_an_error() -> Result<(), Error> {
        let mut f = facade();
        assert!(f.fetch_all("users", &Criteria::new())?.is_empty());
        Ok(())
    }

    // ==================== Delete Tests ====================

    #[test]
    fn test_delete_matching_then_absent() -> Result<(), Error> {
        let mut f = facade();

        f.persist("users", fields(json!({"name": "A", "role": "tmp"})))?;
        f.persist("users", fields(json!({"name": "B", "role": "tmp"})))?;
        f.persist("users", fields(json!({"name": "C", "role": "keep"})))?;

        let criteria = Criteria::new().field("role", "tmp");
        f.delete_matching("users", &criteria)?;
        f.assert_absent("users", &criteria)?;

        // idempotent
        f.delete_matching("users", &criteria)?;

        f.assert_exists("users", &Criteria::new().field("role", "keep"))?;
        Ok(())
    }

    #[test]
    fn test_drop_collection_then_fetch_all_empty() -> Result<(), Error> {
        let mut f = facade();

        f.persist("users", fields(json!({"name": "A"})))?;
        f.drop_collection("users")?;

        assert!(f.fetch_all("users", &Criteria::new())?.is_empty());
        Ok(())
    }
}
