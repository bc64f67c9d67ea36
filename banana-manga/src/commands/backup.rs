//! Backup-related commands
//!
//! Commands for exporting the database to JSON and restoring it.

use crate::app::AppState;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Export the database; defaults to the `backups` directory under the data dir
pub async fn export_database(state: &AppState, out_dir: Option<PathBuf>) -> Result<String> {
    let dir = out_dir.unwrap_or_else(|| state.backups_dir());
    let path = state.admin().await?.export_to_dir(&dir).await?;
    Ok(path.to_string_lossy().to_string())
}

/// Restore the database from an exported JSON file
pub async fn import_database(state: &AppState, file: &Path) -> Result<()> {
    let admin = state.admin().await?;

    tracing::info!("Importing database from {:?}", file);
    let payload = tokio::fs::read_to_string(file).await?;

    admin.import_database(&payload).await
}
