//! Error taxonomy for store access and test helpers

use thiserror::Error;

/// Errors surfaced by the store handle and the test façade.
///
/// Assertion failures are deliberately *not* represented here: `assert_exists`
/// and `assert_absent` panic on a failed expectation so the surrounding test
/// fails the way any other Rust assertion does. Everything else propagates
/// synchronously through `Result`.
#[derive(Debug, Error)]
pub enum Error {
    /// A store handle could not be obtained, or the obtained handle failed
    /// the contract check. Fatal at harness setup.
    #[error("store configuration error: {0}")]
    Config(String),

    /// Operation attempted on a closed store.
    #[error("document store is not connected")]
    Disconnected,

    /// A fetch that required a match found none.
    #[error("no document in '{collection}' matches {criteria}")]
    NoMatch { collection: String, criteria: String },

    /// A property path traversed a scalar or otherwise cannot be assigned.
    #[error("invalid property path '{0}'")]
    InvalidPath(String),

    /// A matched document does not carry the requested field.
    #[error("document has no field '{0}'")]
    MissingField(String),

    /// An entity value did not serialize to a JSON object.
    #[error("entity did not serialize to a JSON object")]
    NotADocument,

    /// Entity (de)serialization failed.
    #[error("hydration failed: {0}")]
    Hydration(#[from] serde_json::Error),

    /// Underlying storage engine error.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}
