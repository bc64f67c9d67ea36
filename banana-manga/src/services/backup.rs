//! Backup service
//!
//! Exports the whole catalog as one pretty-printed JSON document and
//! restores it again. Import payloads are validated against the snapshot
//! schema before anything is written; a rejected payload leaves the store
//! untouched.

use crate::config::BACKUP_FILE_PREFIX;
use crate::database::{Chapter, LogEntry, Repository, Snapshot, StateUpdate, Title};
use crate::error::{ImportError, Result};
use chrono::{NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Exported document: the snapshot plus the session fields as rendered
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument<'a> {
    #[serde(flatten)]
    pub snapshot: &'a Snapshot,
    pub is_admin: bool,
    pub syncing: bool,
}

/// Backup service
#[derive(Clone)]
pub struct BackupService {
    repo: Repository,
}

impl BackupService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Write `document` into `dir` as `banana_manga_backup_<date>.json`
    pub async fn export_to_dir(&self, dir: &Path, document: &ExportDocument<'_>) -> Result<PathBuf> {
        fs::create_dir_all(dir).await?;

        let path = dir.join(backup_file_name(Utc::now().date_naive()));
        let content = serde_json::to_string_pretty(document)?;
        fs::write(&path, content).await?;

        tracing::info!(
            "Exported backup to {:?} ({} titles, {} chapters)",
            path,
            document.snapshot.titles.len(),
            document.snapshot.chapters.len()
        );

        Ok(path)
    }

    /// Validate `payload` and, if accepted, replace the stored catalog with it
    pub async fn import(&self, payload: &str) -> Result<()> {
        let update = validate_import(payload).map_err(|e| {
            tracing::warn!("Import rejected: {}", e);
            e
        })?;

        tracing::info!(
            "Restoring database: {} titles, {} chapters",
            update.titles.as_ref().map_or(0, Vec::len),
            update.chapters.as_ref().map_or(0, Vec::len)
        );

        self.repo.restore(update).await
    }
}

/// File name used for an export made on `date`
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("{}{}.json", BACKUP_FILE_PREFIX, date.format("%Y-%m-%d"))
}

/// Check an import payload against the snapshot schema
///
/// `titles` and `chapters` are required arrays; `logs` and the dark mode
/// flag are optional and only replace stored values when present.
pub fn validate_import(payload: &str) -> std::result::Result<StateUpdate, ImportError> {
    let value: Value =
        serde_json::from_str(payload).map_err(|e| ImportError::Malformed(e.to_string()))?;
    let object = value.as_object().ok_or(ImportError::NotAnObject)?;

    let titles: Vec<Title> = required_records(object, "titles", &["mangas"])?;
    let chapters: Vec<Chapter> = required_records(object, "chapters", &[])?;
    let logs: Option<Vec<LogEntry>> = optional_records(object, "logs", &[])?;

    let dark_mode = match lookup(object, "darkModeFlag", &["isDarkMode"]) {
        None => None,
        Some(Value::Bool(flag)) => Some(*flag),
        Some(_) => {
            return Err(ImportError::WrongType {
                field: "darkModeFlag",
                expected: "a boolean",
            })
        }
    };

    check_unique_ids("titles", titles.iter().map(|t| t.id.as_str()))?;
    check_unique_ids("chapters", chapters.iter().map(|c| c.id.as_str()))?;

    let title_ids: HashSet<&str> = titles.iter().map(|t| t.id.as_str()).collect();
    if let Some(index) = chapters
        .iter()
        .position(|c| !title_ids.contains(c.title_id.as_str()))
    {
        return Err(ImportError::InvalidRecord {
            collection: "chapters",
            index,
            reason: format!("references unknown title `{}`", chapters[index].title_id),
        });
    }

    Ok(StateUpdate {
        titles: Some(titles),
        chapters: Some(chapters),
        logs,
        dark_mode,
    })
}

fn lookup<'v>(object: &'v Map<String, Value>, field: &str, aliases: &[&str]) -> Option<&'v Value> {
    object
        .get(field)
        .or_else(|| aliases.iter().find_map(|alias| object.get(*alias)))
}

fn required_records<T: DeserializeOwned>(
    object: &Map<String, Value>,
    field: &'static str,
    aliases: &[&str],
) -> std::result::Result<Vec<T>, ImportError> {
    optional_records(object, field, aliases)?.ok_or(ImportError::MissingField { field })
}

fn optional_records<T: DeserializeOwned>(
    object: &Map<String, Value>,
    field: &'static str,
    aliases: &[&str],
) -> std::result::Result<Option<Vec<T>>, ImportError> {
    let Some(value) = lookup(object, field, aliases) else {
        return Ok(None);
    };

    let items = value.as_array().ok_or(ImportError::WrongType {
        field,
        expected: "an array",
    })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            T::deserialize(item).map_err(|e| ImportError::InvalidRecord {
                collection: field,
                index,
                reason: e.to_string(),
            })
        })
        .collect::<std::result::Result<Vec<T>, _>>()
        .map(Some)
}

fn check_unique_ids<'a>(
    collection: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> std::result::Result<(), ImportError> {
    let mut seen = HashSet::new();
    for (index, id) in ids.enumerate() {
        if !seen.insert(id) {
            return Err(ImportError::InvalidRecord {
                collection,
                index,
                reason: format!("duplicate id `{}`", id),
            });
        }
    }
    Ok(())
}
