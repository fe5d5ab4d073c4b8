//! Document store handle contract and backends
//!
//! `DocumentStore` is the outbound interface the test façade delegates to:
//! deferred persist/remove queues, an explicit flush, criteria-filtered reads,
//! and connection lifecycle. `sqlite` provides the embedded reference backend.

mod sqlite;

pub use sqlite::SqliteStore;

use crate::criteria::Criteria;
use crate::document::{Document, DocumentId};
use crate::error::Error;

/// Handle to a live document store session.
///
/// Writes are queued by `persist`/`remove` and only become durable on
/// `flush`; reads observe flushed state only. Implementations are synchronous
/// and exclusively owned by one test case at a time.
pub trait DocumentStore {
    /// Ensure the session is open. Reopening a closed session is
    /// backend-specific; backends that cannot reconnect return a
    /// configuration error.
    fn connect(&mut self) -> Result<(), Error>;

    /// Discard queued state and drop the connection. Idempotent.
    fn close(&mut self);

    /// Whether the session is currently usable
    fn is_connected(&self) -> bool;

    /// Queue a document write into a collection, assigning an identifier if
    /// the document has none. Returns the identifier the write will carry,
    /// or `None` for backends that do not expose one.
    fn persist(&mut self, collection: &str, doc: Document) -> Result<Option<DocumentId>, Error>;

    /// Queue a removal by identifier
    fn remove(&mut self, collection: &str, id: &DocumentId) -> Result<(), Error>;

    /// Apply all queued writes and removals durably
    fn flush(&mut self) -> Result<(), Error>;

    /// Discard queued, unflushed state
    fn clear(&mut self);

    /// Find the first flushed document matching the criteria
    fn find_one(&self, collection: &str, criteria: &Criteria) -> Result<Option<Document>, Error>;

    /// Find all flushed documents matching the criteria
    fn find_all(&self, collection: &str, criteria: &Criteria) -> Result<Vec<Document>, Error>;

    /// Irreversibly delete every flushed document in the collection
    fn drop_collection(&mut self, collection: &str) -> Result<(), Error>;

    /// Borrowed repository view over one collection
    fn repository<'a>(&'a self, collection: &'a str) -> Repository<'a, Self>
    where
        Self: Sized,
    {
        Repository {
            store: self,
            collection,
        }
    }
}

/// Read-only view of one collection on a borrowed store
pub struct Repository<'a, S: DocumentStore> {
    store: &'a S,
    collection: &'a str,
}

impl<'a, S: DocumentStore> Repository<'a, S> {
    pub fn name(&self) -> &str {
        self.collection
    }

    pub fn find_one(&self, criteria: &Criteria) -> Result<Option<Document>, Error> {
        self.store.find_one(self.collection, criteria)
    }

    pub fn find_all(&self, criteria: &Criteria) -> Result<Vec<Document>, Error> {
        self.store.find_all(self.collection, criteria)
    }
}
