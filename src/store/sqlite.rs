//! Embedded document store over SQLite
//!
//! Documents are stored as JSON bodies in a single `documents` table, grouped
//! by collection name. Writes queue in memory until `flush` applies them in
//! one transaction, which keeps the deferred-write semantics of the
//! `DocumentStore` contract observable in tests.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{Connection, params};
use serde_json::Value;
use tracing::debug;

use super::DocumentStore;
use crate::criteria::Criteria;
use crate::document::{Document, DocumentId, FieldMap};
use crate::error::Error;

/// Reference `DocumentStore` backend, embedded and dependency-free
pub struct SqliteStore {
    conn: Option<Connection>,
    path: Option<PathBuf>,
    pending: Vec<Pending>,
}

enum Pending {
    Persist {
        collection: String,
        id: DocumentId,
        fields: FieldMap,
    },
    Remove {
        collection: String,
        id: DocumentId,
    },
}

/// Initialize the document table
fn init_schema(conn: &Connection) -> Result<(), Error> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            body TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (collection, id)
        );

        CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection);
        "#,
    )?;

    Ok(())
}

impl SqliteStore {
    /// Open or create a file-backed store
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path)?;
        init_schema(&conn)?;
        debug!(path = %path.display(), "opened document store");

        Ok(Self {
            conn: Some(conn),
            path: Some(path),
            pending: Vec::new(),
        })
    }

    /// Open an in-memory store. Once closed it cannot be reconnected.
    pub fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Some(conn),
            path: None,
            pending: Vec::new(),
        })
    }

    fn conn(&self) -> Result<&Connection, Error> {
        self.conn.as_ref().ok_or(Error::Disconnected)
    }
}

impl DocumentStore for SqliteStore {
    fn connect(&mut self) -> Result<(), Error> {
        if self.conn.is_some() {
            return Ok(());
        }
        match &self.path {
            Some(path) => {
                let conn = Connection::open(path)?;
                init_schema(&conn)?;
                debug!(path = %path.display(), "reconnected document store");
                self.conn = Some(conn);
                Ok(())
            }
            None => Err(Error::Config(
                "an in-memory store cannot be reconnected once closed".to_string(),
            )),
        }
    }

    fn close(&mut self) {
        self.pending.clear();
        if self.conn.take().is_some() {
            debug!("closed document store");
        }
    }

    fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    fn persist(&mut self, collection: &str, doc: Document) -> Result<Option<DocumentId>, Error> {
        self.conn()?;

        let id = doc.id.unwrap_or_else(DocumentId::generate);
        self.pending.push(Pending::Persist {
            collection: collection.to_string(),
            id: id.clone(),
            fields: doc.fields,
        });

        Ok(Some(id))
    }

    fn remove(&mut self, collection: &str, id: &DocumentId) -> Result<(), Error> {
        self.conn()?;

        self.pending.push(Pending::Remove {
            collection: collection.to_string(),
            id: id.clone(),
        });

        Ok(())
    }

    fn flush(&mut self) -> Result<(), Error> {
        let conn = self.conn.as_ref().ok_or(Error::Disconnected)?;
        if self.pending.is_empty() {
            return Ok(());
        }

        let now = Utc::now().to_rfc3339();
        let tx = conn.unchecked_transaction()?;
        for op in self.pending.drain(..) {
            match op {
                Pending::Persist {
                    collection,
                    id,
                    fields,
                } => {
                    let body = serde_json::to_string(&Value::Object(fields))?;
                    tx.execute(
                        r#"
                        INSERT INTO documents (collection, id, body, created_at, updated_at)
                        VALUES (?1, ?2, ?3, ?4, ?4)
                        ON CONFLICT(collection, id) DO UPDATE SET
                            body = excluded.body,
                            updated_at = excluded.updated_at
                        "#,
                        params![collection, id.as_str(), body, now],
                    )?;
                }
                Pending::Remove { collection, id } => {
                    tx.execute(
                        "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                        params![collection, id.as_str()],
                    )?;
                }
            }
        }
        tx.commit()?;

        Ok(())
    }

    fn clear(&mut self) {
        self.pending.clear();
    }

    fn find_one(&self, collection: &str, criteria: &Criteria) -> Result<Option<Document>, Error> {
        Ok(self.find_all(collection, criteria)?.into_iter().next())
    }

    fn find_all(&self, collection: &str, criteria: &Criteria) -> Result<Vec<Document>, Error> {
        let mut stmt = self
            .conn()?
            .prepare("SELECT id, body FROM documents WHERE collection = ?1 ORDER BY rowid")?;
        let rows = stmt.query_map([collection], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut documents = Vec::new();
        for row in rows {
            let (id, body) = row?;
            let fields: FieldMap = serde_json::from_str(&body)?;
            let doc = Document {
                id: Some(DocumentId::from(id)),
                fields,
            };
            if criteria.matches(&doc) {
                documents.push(doc);
            }
        }

        Ok(documents)
    }

    fn drop_collection(&mut self, collection: &str) -> Result<(), Error> {
        let rows = self.conn()?.execute(
            "DELETE FROM documents WHERE collection = ?1",
            [collection],
        )?;
        debug!(collection, rows, "dropped collection");

        Ok(())
    }
}
