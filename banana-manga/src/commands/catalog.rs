//! Catalog commands
//!
//! Read-only views of the public catalog and the chapter reader.

use crate::app::AppState;
use crate::config::LATEST_RELEASES_LIMIT;
use crate::database::{Chapter, Title};
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One row of the title listing
#[derive(Debug, Serialize)]
pub struct TitleSummary {
    pub id: String,
    pub name: String,
    pub cover_image_url: String,
    pub created_at: DateTime<Utc>,
    pub chapter_count: usize,
}

/// One row of the "Latest Releases" listing
#[derive(Debug, Serialize)]
pub struct ReleaseSummary {
    pub chapter_id: String,
    pub chapter_label: String,
    pub title_id: String,
    pub title_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Title detail page: the title and its chapters, newest first
#[derive(Debug, Serialize)]
pub struct TitleDetail {
    pub title: Title,
    pub chapters: Vec<Chapter>,
}

/// A chapter opened in the reader
#[derive(Debug, Serialize)]
pub struct ChapterReading {
    pub title_name: String,
    pub chapter_label: String,
    pub pages: Vec<String>,
    pub previous_chapter_id: Option<String>,
    pub next_chapter_id: Option<String>,
}

/// List all titles, newest first
pub async fn list_titles(state: &AppState) -> Result<Vec<TitleSummary>> {
    let titles: Vec<TitleSummary> = state
        .with_catalog(|catalog| {
            catalog
                .titles_newest_first()
                .into_iter()
                .map(|t| TitleSummary {
                    id: t.id.clone(),
                    name: t.name.clone(),
                    cover_image_url: t.cover_image_url.clone(),
                    created_at: t.created_at,
                    chapter_count: catalog.chapters_for_title(&t.id).len(),
                })
                .collect()
        })
        .await;

    Ok(titles)
}

/// Most recently added chapters across the catalog
pub async fn latest_releases(state: &AppState) -> Result<Vec<ReleaseSummary>> {
    let releases: Vec<ReleaseSummary> = state
        .with_catalog(|catalog| {
            catalog
                .latest_releases(LATEST_RELEASES_LIMIT)
                .into_iter()
                .map(|r| ReleaseSummary {
                    chapter_id: r.chapter.id.clone(),
                    chapter_label: r.chapter.chapter_label.clone(),
                    title_id: r.chapter.title_id.clone(),
                    title_name: r.title.map(|t| t.name.clone()),
                    created_at: r.chapter.created_at,
                })
                .collect()
        })
        .await;

    Ok(releases)
}

/// Show a title with its chapter list
pub async fn show_title(state: &AppState, id: &str) -> Result<TitleDetail> {
    state
        .with_catalog(|catalog| -> Result<TitleDetail> {
            let title = catalog
                .find_title(id)
                .ok_or_else(|| AppError::TitleNotFound(id.to_string()))?;

            Ok(TitleDetail {
                title: title.clone(),
                chapters: catalog
                    .chapters_for_title(id)
                    .into_iter()
                    .cloned()
                    .collect(),
            })
        })
        .await
}

/// Open a chapter in the reader
pub async fn read_chapter(
    state: &AppState,
    title_id: &str,
    chapter_id: &str,
) -> Result<ChapterReading> {
    state
        .with_catalog(|catalog| -> Result<ChapterReading> {
            let page = catalog.reader(title_id, chapter_id)?;

            Ok(ChapterReading {
                title_name: page.title.name.clone(),
                chapter_label: page.chapter.chapter_label.clone(),
                pages: page.pages.iter().map(|p| p.to_string()).collect(),
                previous_chapter_id: page.previous.map(|c| c.id.clone()),
                next_chapter_id: page.next.map(|c| c.id.clone()),
            })
        })
        .await
}
