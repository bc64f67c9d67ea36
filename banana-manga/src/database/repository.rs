//! Repository layer for snapshot operations
//!
//! Every mutating operation is one read-modify-write cycle against the
//! full snapshot: read, compute the new collections, prepend a log entry,
//! write once. Nothing is persisted until that single write succeeds.

use super::models::*;
use crate::config::{ID_SUFFIX_LENGTH, MAX_LOG_ENTRIES};
use crate::error::{AppError, Result};
use crate::storage::SnapshotStore;
use chrono::{DateTime, SubsecRound, Utc};
use rand::Rng;
use std::sync::Arc;
use tokio::sync::Mutex;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Repository for snapshot operations
#[derive(Clone)]
pub struct Repository {
    store: SnapshotStore,
    /// Serializes read-modify-write cycles issued through this repository
    write_lock: Arc<Mutex<()>>,
}

impl Repository {
    pub fn new(store: SnapshotStore) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Read the whole persisted state
    pub async fn get_full_state(&self) -> Snapshot {
        self.store.read().await
    }

    /// Merge a partial update into the stored snapshot
    pub async fn save_state(&self, update: StateUpdate) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut snapshot = self.store.read().await;
        update.apply_to(&mut snapshot);
        snapshot.logs.truncate(MAX_LOG_ENTRIES);

        self.store.write(&snapshot).await
    }

    /// Append a standalone log entry
    pub async fn add_log(&self, action: LogAction, details: impl Into<String>) -> Result<LogEntry> {
        let _guard = self.write_lock.lock().await;

        let mut snapshot = self.store.read().await;
        let entry = push_log(&mut snapshot.logs, action, details.into());

        self.store.write(&snapshot).await?;
        Ok(entry)
    }

    /// Create a new title
    pub async fn create_title(&self, req: CreateTitleRequest) -> Result<Title> {
        req.validate()?;
        let _guard = self.write_lock.lock().await;

        let mut snapshot = self.store.read().await;

        let title = Title {
            id: unique_id(|id| snapshot.find_title(id).is_some()),
            name: req.name,
            cover_image_url: req.cover_image_url,
            created_at: now_millis(),
        };

        push_log(
            &mut snapshot.logs,
            LogAction::CreateManga,
            format!("Database: New Manga Created - {}", title.name),
        );
        snapshot.titles.push(title.clone());

        self.store.write(&snapshot).await?;

        tracing::debug!("Created title: {}", title.id);
        Ok(title)
    }

    /// Delete a title together with every chapter that belongs to it
    pub async fn delete_title(&self, id: &str) -> Result<Title> {
        let _guard = self.write_lock.lock().await;

        let mut snapshot = self.store.read().await;

        let position = snapshot
            .titles
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| AppError::TitleNotFound(id.to_string()))?;
        let title = snapshot.titles.remove(position);

        let before = snapshot.chapters.len();
        snapshot.chapters.retain(|c| c.title_id != id);
        let removed_chapters = before - snapshot.chapters.len();

        push_log(
            &mut snapshot.logs,
            LogAction::DeleteManga,
            format!("Database: Removed Manga - {}", title.name),
        );

        self.store.write(&snapshot).await?;

        tracing::debug!(
            "Deleted title: {} ({} chapters removed)",
            id,
            removed_chapters
        );
        Ok(title)
    }

    /// Create a chapter under an existing title
    pub async fn create_chapter(&self, req: CreateChapterRequest) -> Result<Chapter> {
        req.validate()?;
        let _guard = self.write_lock.lock().await;

        let mut snapshot = self.store.read().await;

        let title_name = snapshot
            .find_title(&req.title_id)
            .map(|t| t.name.clone())
            .ok_or_else(|| AppError::TitleNotFound(req.title_id.clone()))?;

        let chapter = Chapter {
            id: unique_id(|id| snapshot.find_chapter(id).is_some()),
            title_id: req.title_id,
            chapter_label: req.chapter_label,
            image_url_list: req.image_url_list,
            created_at: now_millis(),
        };

        push_log(
            &mut snapshot.logs,
            LogAction::CreateChapter,
            format!(
                "Database: Added Chapter {} to {}",
                chapter.chapter_label, title_name
            ),
        );
        snapshot.chapters.push(chapter.clone());

        self.store.write(&snapshot).await?;

        tracing::debug!("Created chapter: {} for title: {}", chapter.id, chapter.title_id);
        Ok(chapter)
    }

    /// Delete a single chapter
    pub async fn delete_chapter(&self, id: &str) -> Result<Chapter> {
        let _guard = self.write_lock.lock().await;

        let mut snapshot = self.store.read().await;

        let position = snapshot
            .chapters
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| AppError::ChapterNotFound(id.to_string()))?;
        let chapter = snapshot.chapters.remove(position);

        let title_name = snapshot
            .find_title(&chapter.title_id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| "Unknown".to_string());

        push_log(
            &mut snapshot.logs,
            LogAction::DeleteChapter,
            format!(
                "Database: Removed Chapter {} from {}",
                chapter.chapter_label, title_name
            ),
        );

        self.store.write(&snapshot).await?;

        tracing::debug!("Deleted chapter: {}", id);
        Ok(chapter)
    }

    /// Replace the stored collections with restored ones and record the restore
    pub async fn restore(&self, update: StateUpdate) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut snapshot = self.store.read().await;
        update.apply_to(&mut snapshot);
        push_log(
            &mut snapshot.logs,
            LogAction::DbRestore,
            "Full database restore from backup file".to_string(),
        );

        self.store.write(&snapshot).await?;

        tracing::debug!(
            "Restored snapshot: {} titles, {} chapters",
            snapshot.titles.len(),
            snapshot.chapters.len()
        );
        Ok(())
    }
}

/// Prepend a log entry and evict the oldest beyond the cap
fn push_log(logs: &mut Vec<LogEntry>, action: LogAction, details: String) -> LogEntry {
    let entry = LogEntry {
        id: unique_id(|id| logs.iter().any(|l| l.id == id)),
        action_kind: action,
        details,
        timestamp: now_millis(),
    };

    logs.insert(0, entry.clone());
    logs.truncate(MAX_LOG_ENTRIES);

    entry
}

/// Current time at the millisecond precision the store persists
fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Generate an identifier: epoch milliseconds plus a random base-36 suffix
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LENGTH)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();

    format!("{}-{}", Utc::now().timestamp_millis(), suffix)
}

/// Generate an identifier not already taken in the target collection
fn unique_id(taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = generate_id();
        if !taken(&id) {
            return id;
        }
    }
}
