//! Database module
//!
//! This module provides the data access layer:
//! - Model definitions for titles, chapters, log entries and the snapshot
//! - Repository layer for read-modify-write operations against the store

pub mod models;
pub mod repository;

pub use models::*;
pub use repository::{generate_id, Repository};

use crate::storage::{Latency, SnapshotStore};
use std::path::Path;

/// Open the repository backed by the snapshot file in `data_dir`
pub fn open_repository(data_dir: &Path, latency: Latency) -> Repository {
    tracing::info!("Opening snapshot store in: {:?}", data_dir);
    Repository::new(SnapshotStore::in_dir(data_dir, latency))
}
