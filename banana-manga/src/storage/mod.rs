//! Storage module
//!
//! Provides the simulated remote store holding the serialized snapshot.

pub mod snapshot_store;

pub use snapshot_store::{Latency, SnapshotStore};
