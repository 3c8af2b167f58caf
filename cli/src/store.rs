//! Snapshot file persistence for the ledger
//!
//! The whole ledger lives in one Borsh snapshot. Every mutating command loads
//! it, runs one engine call, and writes it back only when the call succeeded.

use std::{
    fs,
    path::{Path, PathBuf},
};

use leadfive_program::{events::LedgerEvent, Engine};
use tracing::{debug, info};

use crate::error::{CliError, Result};

/// Ledger snapshot on disk
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

/// Result of a successful mutation, with the events it emitted
#[derive(Debug)]
pub struct Applied<T> {
    pub value: T,
    pub events: Vec<LedgerEvent>,
}

impl StateStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads and restores the engine
    ///
    /// # Errors
    /// Returns `StateNotFound` when the file is missing, or the engine error for a
    /// malformed snapshot.
    pub fn load(&self) -> Result<Engine> {
        if !self.exists() {
            return Err(CliError::StateNotFound(self.path.clone()));
        }
        let bytes = fs::read(&self.path).map_err(|e| CliError::io(&self.path, e))?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "Loaded ledger snapshot");
        Ok(Engine::restore(&bytes)?)
    }

    /// Writes the engine's snapshot, replacing the file atomically
    ///
    /// # Errors
    /// Returns an error if serialization or any file operation fails.
    pub fn save(&self, engine: &Engine) -> Result<()> {
        let bytes = engine.snapshot()?;
        let staging = self.path.with_extension("tmp");
        fs::write(&staging, &bytes).map_err(|e| CliError::io(&staging, e))?;
        fs::rename(&staging, &self.path).map_err(|e| CliError::io(&self.path, e))?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "Saved ledger snapshot");
        Ok(())
    }

    /// Persists a freshly initialized engine
    ///
    /// # Errors
    /// Returns `StateExists` if a snapshot is present and `force` is false.
    pub fn create(&self, engine: &Engine, force: bool) -> Result<()> {
        if self.exists() && !force {
            return Err(CliError::StateExists(self.path.clone()));
        }
        self.save(engine)?;
        info!(path = %self.path.display(), "Created ledger snapshot");
        Ok(())
    }

    /// Loads the engine, applies `op`, and saves the result
    ///
    /// Nothing is written when `op` fails; the engine has already rolled back
    /// and the file still holds the previous state.
    ///
    /// # Errors
    /// Returns the load, engine, or save error.
    pub fn mutate<T, F>(&self, op: F) -> Result<Applied<T>>
    where
        F: FnOnce(&mut Engine) -> anchor_lang::Result<T>,
    {
        let mut engine = self.load()?;
        let value = op(&mut engine)?;
        self.save(&engine)?;
        Ok(Applied {
            value,
            events: engine.take_events(),
        })
    }
}
