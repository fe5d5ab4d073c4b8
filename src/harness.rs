//! Suite and test-case lifecycle
//!
//! The harness acquires the store handle described by a [`Config`] before a
//! test case, hands out the façade while the case runs, and releases the
//! handle (clear queued state, close the connection) on teardown. Failing to
//! obtain a working handle is a configuration error and aborts setup.

use tracing::debug;

use crate::config::{Config, DEPENDS_EXAMPLE};
use crate::error::Error;
use crate::facade::Facade;
use crate::store::{DocumentStore, SqliteStore};

/// Scoped store access for one test case
pub struct Harness {
    facade: Facade<SqliteStore>,
}

impl Harness {
    /// Acquire a store handle per the config and wrap it in a façade.
    ///
    /// Fails with [`Error::Config`] when `depends` names an unknown backend,
    /// the store cannot be opened, or the obtained handle does not pass the
    /// connection check.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let mut store = match config.depends.as_str() {
            "sqlite" => match &config.sqlite.path {
                Some(path) => SqliteStore::open(path).map_err(|e| {
                    Error::Config(format!("cannot open store at {}: {e}", path.display()))
                })?,
                None => SqliteStore::open_in_memory()
                    .map_err(|e| Error::Config(format!("cannot open in-memory store: {e}")))?,
            },
            other => {
                return Err(Error::Config(format!(
                    "unknown depends '{other}' (example config: {DEPENDS_EXAMPLE})"
                )));
            }
        };

        store.connect()?;
        if !store.is_connected() {
            return Err(Error::Config(
                "store handle failed the connection check".to_string(),
            ));
        }
        debug!(depends = %config.depends, "store handle acquired");

        Ok(Self {
            facade: Facade::new(store),
        })
    }

    /// Shortcut for the common case: a fresh in-memory store
    pub fn in_memory() -> Result<Self, Error> {
        Self::from_config(&Config::default())
    }

    /// The façade for the current test case
    pub fn facade(&mut self) -> &mut Facade<SqliteStore> {
        &mut self.facade
    }

    /// Clear queued in-memory state and close the connection. Idempotent;
    /// also runs on drop.
    pub fn teardown(&mut self) {
        let store = self.facade.store_mut();
        store.clear();
        store.close();
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.teardown();
    }
}
