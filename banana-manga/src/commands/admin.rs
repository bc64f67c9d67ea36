//! Admin commands
//!
//! Title and chapter CRUD plus the activity log. All of these require an
//! unlocked admin session.

use crate::app::AppState;
use crate::database::{Chapter, LogEntry, Title};
use crate::error::Result;

/// Create a new title
pub async fn add_title(state: &AppState, name: String, cover_image_url: String) -> Result<Title> {
    tracing::info!("Creating title: {}", name);
    state.admin().await?.add_title(name, cover_image_url).await
}

/// Delete a title and all of its chapters
pub async fn delete_title(state: &AppState, id: &str) -> Result<Title> {
    state.admin().await?.delete_title(id).await
}

/// Add a chapter to an existing title
pub async fn add_chapter(
    state: &AppState,
    title_id: String,
    chapter_label: String,
    image_url_list: String,
) -> Result<Chapter> {
    tracing::info!("Adding chapter {} to title {}", chapter_label, title_id);
    state
        .admin()
        .await?
        .add_chapter(title_id, chapter_label, image_url_list)
        .await
}

/// Delete a single chapter
pub async fn delete_chapter(state: &AppState, id: &str) -> Result<Chapter> {
    state.admin().await?.delete_chapter(id).await
}

/// Activity log, newest first
pub async fn list_logs(state: &AppState) -> Result<Vec<LogEntry>> {
    state.admin().await?;
    Ok(state.snapshot().await.logs)
}

/// Remove every activity log entry
pub async fn clear_logs(state: &AppState) -> Result<()> {
    state.admin().await?.clear_logs().await
}
