//! Transactional record store
//!
//! A single set of [`Tables`] behind a lock, optionally persisted to a JSON
//! snapshot. Writers run inside [`Store::transaction`]: the closure works on
//! a copy of the tables, and the copy only replaces the live tables after the
//! closure returned `Ok` and the snapshot (if any) was written. Any error
//! leaves the store exactly as it was.

mod tables;

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::errors::{Result, SchedulerError};
use crate::fs;

pub use tables::{Snapshot, Tables};

#[derive(Debug)]
pub struct Store {
    tables: RwLock<Tables>,
    snapshot_path: Option<PathBuf>,
}

impl Store {
    /// A store that lives only in memory
    pub fn in_memory() -> Self {
        Store {
            tables: RwLock::new(Tables::default()),
            snapshot_path: None,
        }
    }

    /// Open a snapshot-backed store. A missing file starts an empty store;
    /// an unreadable or inconsistent file is an error.
    pub fn open(path: &Path) -> Result<Self> {
        let tables = if path.exists() {
            let snapshot: Snapshot = fs::read_json(path)?;
            Tables::from_snapshot(snapshot)?
        } else {
            Tables::default()
        };

        tracing::info!(
            path = %path.display(),
            users = tables.users().count(),
            shifts = tables.shifts().count(),
            substitutions = tables.requests().count(),
            "store opened"
        );

        Ok(Store {
            tables: RwLock::new(tables),
            snapshot_path: Some(path.to_path_buf()),
        })
    }

    /// Build an in-memory store from existing tables
    pub fn from_tables(tables: Tables) -> Self {
        Store {
            tables: RwLock::new(tables),
            snapshot_path: None,
        }
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    /// Run a read-only closure against the current tables
    pub fn read<T>(&self, f: impl FnOnce(&Tables) -> Result<T>) -> Result<T> {
        let guard = self
            .tables
            .read()
            .map_err(|_| SchedulerError::Storage("Store lock poisoned".to_string()))?;
        f(&guard)
    }

    /// Run a unit of work that commits fully or not at all.
    ///
    /// Blocks: it clones the tables and writes the snapshot while holding
    /// the write lock. Async callers go through `spawn_blocking`.
    pub fn transaction<T>(&self, f: impl FnOnce(&mut Tables) -> Result<T>) -> Result<T> {
        let mut guard = self
            .tables
            .write()
            .map_err(|_| SchedulerError::Storage("Store lock poisoned".to_string()))?;

        let mut working = guard.clone();
        let value = f(&mut working)?;

        if let Some(path) = &self.snapshot_path {
            fs::write_json(path, &working.to_snapshot()).map_err(|e| {
                tracing::error!(path = %path.display(), error = %e, "snapshot write failed, rolling back");
                SchedulerError::Storage(format!("Failed to persist store: {}", e))
            })?;
        }

        *guard = working;
        Ok(value)
    }
}
