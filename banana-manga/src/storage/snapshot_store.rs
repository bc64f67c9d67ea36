//! Simulated remote snapshot storage
//!
//! The whole application state lives in one JSON file, read and written
//! as a single unit. Every access sleeps for a configurable delay so the
//! layers above behave as if they were talking to a remote server.
//!
//! Reads never fail: a missing, unreadable or corrupt file yields the
//! default empty snapshot.

use crate::config::{DEFAULT_READ_LATENCY_MS, DEFAULT_WRITE_LATENCY_MS, STORAGE_FILE_NAME};
use crate::database::Snapshot;
use crate::error::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Artificial delays applied to store access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    pub read: Duration,
    pub write: Duration,
}

impl Latency {
    pub fn from_millis(read_ms: u64, write_ms: u64) -> Self {
        Self {
            read: Duration::from_millis(read_ms),
            write: Duration::from_millis(write_ms),
        }
    }

    /// No simulated delay at all
    pub fn none() -> Self {
        Self::from_millis(0, 0)
    }
}

impl Default for Latency {
    fn default() -> Self {
        Self::from_millis(DEFAULT_READ_LATENCY_MS, DEFAULT_WRITE_LATENCY_MS)
    }
}

/// Single-file snapshot store
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
    latency: Latency,
}

impl SnapshotStore {
    pub fn new(path: PathBuf, latency: Latency) -> Self {
        Self { path, latency }
    }

    /// Store using the standard file name inside `data_dir`
    pub fn in_dir(data_dir: &Path, latency: Latency) -> Self {
        Self::new(data_dir.join(STORAGE_FILE_NAME), latency)
    }

    /// Read the current snapshot, falling back to the default on any failure
    pub async fn read(&self) -> Snapshot {
        simulate(self.latency.read).await;

        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No stored snapshot at {:?}, using defaults", self.path);
                return Snapshot::default();
            }
            Err(e) => {
                tracing::error!("Failed to read snapshot {:?}, resetting: {}", self.path, e);
                return Snapshot::default();
            }
        };

        if content.trim().is_empty() {
            return Snapshot::default();
        }

        match serde_json::from_str::<Snapshot>(&content) {
            Ok(snapshot) => {
                tracing::debug!(
                    "Read snapshot: {} titles, {} chapters, {} logs",
                    snapshot.titles.len(),
                    snapshot.chapters.len(),
                    snapshot.logs.len()
                );
                snapshot
            }
            Err(e) => {
                tracing::error!("Corrupted database found, resetting: {}", e);
                Snapshot::default()
            }
        }
    }

    /// Replace the stored snapshot with `snapshot`
    pub async fn write(&self, snapshot: &Snapshot) -> Result<()> {
        simulate(self.latency.write).await;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let data = serde_json::to_vec(snapshot)?;

        // Write to temp file first (atomic write)
        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&data).await?;
        file.sync_all().await?;

        fs::rename(&temp_path, &self.path).await?;

        tracing::debug!("Wrote snapshot: {:?} ({} bytes)", self.path, data.len());

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn simulate(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Title;
    use chrono::Utc;
    use tempfile::TempDir;

    fn create_test_store() -> (SnapshotStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = SnapshotStore::in_dir(temp_dir.path(), Latency::none());
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_empty_store_reads_default() {
        let (store, _temp) = create_test_store();

        let snapshot = store.read().await;

        assert!(snapshot.titles.is_empty());
        assert!(snapshot.chapters.is_empty());
        assert!(snapshot.logs.is_empty());
        assert!(snapshot.dark_mode);
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let (store, _temp) = create_test_store();

        let mut snapshot = Snapshot::default();
        snapshot.dark_mode = false;
        snapshot.titles.push(Title {
            id: "a".to_string(),
            name: "Monster".to_string(),
            cover_image_url: "m.png".to_string(),
            created_at: Utc::now(),
        });

        store.write(&snapshot).await.unwrap();

        let read = store.read().await;
        assert_eq!(read.titles.len(), 1);
        assert_eq!(read.titles[0].name, "Monster");
        assert!(!read.dark_mode);
    }

    #[tokio::test]
    async fn test_corrupt_data_resets_to_default() {
        let (store, _temp) = create_test_store();

        fs::write(store.path(), b"{not json").await.unwrap();

        assert_eq!(store.read().await, Snapshot::default());
    }

    #[tokio::test]
    async fn test_session_flag_never_written_back() {
        let (store, _temp) = create_test_store();

        fs::write(store.path(), br#"{"titles": [], "chapters": [], "isAdmin": true}"#)
            .await
            .unwrap();

        let snapshot = store.read().await;
        store.write(&snapshot).await.unwrap();

        let raw = fs::read_to_string(store.path()).await.unwrap();
        assert!(!raw.contains("isAdmin"));
    }

    #[tokio::test]
    async fn test_write_leaves_no_temp_file() {
        let (store, temp) = create_test_store();

        store.write(&Snapshot::default()).await.unwrap();

        let mut entries = std::fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect::<Vec<_>>();
        entries.sort();
        assert_eq!(entries, vec![STORAGE_FILE_NAME.to_string()]);
    }

    #[tokio::test]
    async fn test_read_latency_applied() {
        let temp_dir = TempDir::new().unwrap();
        let store = SnapshotStore::in_dir(temp_dir.path(), Latency::from_millis(30, 0));

        let start = std::time::Instant::now();
        store.read().await;

        assert!(start.elapsed() >= Duration::from_millis(30));
    }
}
