pub mod config;
pub mod criteria;
pub mod document;
pub mod error;
pub mod facade;
pub mod harness;
pub mod store;

pub use config::{Config, SqliteConfig};
pub use criteria::Criteria;
pub use document::{Document, DocumentId, Entity, FieldMap, field_map};
pub use error::Error;
pub use facade::Facade;
pub use harness::Harness;
pub use store::{DocumentStore, Repository, SqliteStore};
