//! Database models
//!
//! Rust structs representing the entities stored in the snapshot.
//! Field names follow the persisted JSON layout; the names written by the
//! original browser build are accepted as aliases so old backups still load.

use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog entry representing one manga series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Title {
    pub id: String,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(rename = "coverImageURL", alias = "coverUrl")]
    pub cover_image_url: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// One readable unit belonging to a title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    #[serde(alias = "mangaId")]
    pub title_id: String,
    #[serde(alias = "chapterNumber")]
    pub chapter_label: String,
    /// Comma-separated page image URLs, in reading order
    #[serde(rename = "imageURLList", alias = "imageUrls")]
    pub image_url_list: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Chapter {
    /// Page image URLs in reading order, trimmed, blanks dropped
    pub fn pages(&self) -> Vec<&str> {
        self.image_url_list
            .split(',')
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .collect()
    }

    /// Numeric value of the chapter label, if it has one ("12", "12.5")
    pub fn label_number(&self) -> Option<f64> {
        self.chapter_label
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
    }
}

/// Kind of mutating action recorded in the activity log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogAction {
    CreateManga,
    DeleteManga,
    CreateChapter,
    DeleteChapter,
    DbRestore,
}

impl LogAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogAction::CreateManga => "CREATE_MANGA",
            LogAction::DeleteManga => "DELETE_MANGA",
            LogAction::CreateChapter => "CREATE_CHAPTER",
            LogAction::DeleteChapter => "DELETE_CHAPTER",
            LogAction::DbRestore => "DB_RESTORE",
        }
    }
}

impl std::fmt::Display for LogAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    #[serde(alias = "action")]
    pub action_kind: LogAction,
    pub details: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

fn default_dark_mode() -> bool {
    true
}

/// The complete persisted application state
///
/// Session state (admin flag, sync indicator) deliberately has no place here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default, alias = "mangas")]
    pub titles: Vec<Title>,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
    /// Newest first, never longer than `MAX_LOG_ENTRIES`
    #[serde(default)]
    pub logs: Vec<LogEntry>,
    #[serde(
        default = "default_dark_mode",
        rename = "darkModeFlag",
        alias = "isDarkMode"
    )]
    pub dark_mode: bool,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            titles: Vec::new(),
            chapters: Vec::new(),
            logs: Vec::new(),
            dark_mode: default_dark_mode(),
        }
    }
}

impl Snapshot {
    pub fn find_title(&self, id: &str) -> Option<&Title> {
        self.titles.iter().find(|t| t.id == id)
    }

    pub fn find_chapter(&self, id: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == id)
    }
}

/// Partial update merged into the stored snapshot
#[derive(Debug, Default, Clone)]
pub struct StateUpdate {
    pub titles: Option<Vec<Title>>,
    pub chapters: Option<Vec<Chapter>>,
    pub logs: Option<Vec<LogEntry>>,
    pub dark_mode: Option<bool>,
}

impl StateUpdate {
    /// Merge the present fields over `snapshot`
    pub fn apply_to(self, snapshot: &mut Snapshot) {
        if let Some(titles) = self.titles {
            snapshot.titles = titles;
        }
        if let Some(chapters) = self.chapters {
            snapshot.chapters = chapters;
        }
        if let Some(logs) = self.logs {
            snapshot.logs = logs;
        }
        if let Some(dark_mode) = self.dark_mode {
            snapshot.dark_mode = dark_mode;
        }
    }
}

/// Create title request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTitleRequest {
    pub name: String,
    pub cover_image_url: String,
}

impl CreateTitleRequest {
    pub fn validate(&self) -> Result<()> {
        require_non_empty("name", &self.name)?;
        require_non_empty("cover image URL", &self.cover_image_url)
    }
}

/// Create chapter request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateChapterRequest {
    pub title_id: String,
    pub chapter_label: String,
    pub image_url_list: String,
}

impl CreateChapterRequest {
    pub fn validate(&self) -> Result<()> {
        require_non_empty("title id", &self.title_id)?;
        require_non_empty("chapter label", &self.chapter_label)?;
        require_non_empty("image URL list", &self.image_url_list)
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(label: &str, urls: &str) -> Chapter {
        Chapter {
            id: "c".to_string(),
            title_id: "t".to_string(),
            chapter_label: label.to_string(),
            image_url_list: urls.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_pages_split_and_trimmed() {
        let c = chapter("1", " https://a/1.png ,https://a/2.png,, https://a/3.png ");
        assert_eq!(
            c.pages(),
            vec!["https://a/1.png", "https://a/2.png", "https://a/3.png"]
        );
    }

    #[test]
    fn test_label_number() {
        assert_eq!(chapter("12", "").label_number(), Some(12.0));
        assert_eq!(chapter(" 4.5 ", "").label_number(), Some(4.5));
        assert_eq!(chapter("Extra", "").label_number(), None);
    }

    #[test]
    fn test_default_snapshot_is_empty_dark() {
        let snapshot = Snapshot::default();
        assert!(snapshot.titles.is_empty());
        assert!(snapshot.chapters.is_empty());
        assert!(snapshot.logs.is_empty());
        assert!(snapshot.dark_mode);
    }

    #[test]
    fn test_snapshot_wire_names() {
        let snapshot = Snapshot {
            titles: vec![Title {
                id: "a".to_string(),
                name: "One Piece".to_string(),
                cover_image_url: "https://img/op.png".to_string(),
                created_at: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
            }],
            dark_mode: false,
            ..Snapshot::default()
        };

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["darkModeFlag"], false);
        assert_eq!(value["titles"][0]["coverImageURL"], "https://img/op.png");
        assert_eq!(value["titles"][0]["createdAt"], 1_700_000_000_000i64);
        assert!(value.get("isAdmin").is_none());
    }

    #[test]
    fn test_legacy_field_names_accepted() {
        let json = r#"{
            "mangas": [{"id": "m1", "title": "Berserk", "coverUrl": "c.png", "createdAt": 1}],
            "chapters": [{"id": "c1", "mangaId": "m1", "chapterNumber": "1",
                          "imageUrls": "a.png,b.png", "createdAt": 2}],
            "logs": [{"id": "l1", "action": "CREATE_MANGA", "details": "x", "timestamp": 3}],
            "isDarkMode": false,
            "isAdmin": true
        }"#;

        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.titles[0].name, "Berserk");
        assert_eq!(snapshot.chapters[0].title_id, "m1");
        assert_eq!(snapshot.chapters[0].pages(), vec!["a.png", "b.png"]);
        assert_eq!(snapshot.logs[0].action_kind, LogAction::CreateManga);
        assert!(!snapshot.dark_mode);
    }

    #[test]
    fn test_missing_fields_default() {
        let snapshot: Snapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(snapshot, Snapshot::default());
    }

    #[test]
    fn test_state_update_merges_only_present_fields() {
        let mut snapshot = Snapshot::default();
        StateUpdate {
            dark_mode: Some(false),
            ..StateUpdate::default()
        }
        .apply_to(&mut snapshot);

        assert!(!snapshot.dark_mode);
        assert!(snapshot.titles.is_empty());
    }

    #[test]
    fn test_request_validation() {
        let ok = CreateTitleRequest {
            name: "Vagabond".to_string(),
            cover_image_url: "v.png".to_string(),
        };
        assert!(ok.validate().is_ok());

        let blank = CreateChapterRequest {
            title_id: "t".to_string(),
            chapter_label: "  ".to_string(),
            image_url_list: "a.png".to_string(),
        };
        assert!(matches!(blank.validate(), Err(AppError::InvalidInput(_))));
    }
}
