//! Catalog queries
//!
//! Read-side views over a snapshot used by the catalog, detail and reader
//! screens. Nothing here touches the store.

use crate::database::{Chapter, Snapshot, Title};
use crate::error::{AppError, Result};
use serde::Serialize;
use std::cmp::Ordering;

/// A recently added chapter together with its title
#[derive(Debug, Clone, Serialize)]
pub struct Release<'a> {
    pub chapter: &'a Chapter,
    pub title: Option<&'a Title>,
}

/// Everything the reader needs to show one chapter
#[derive(Debug, Clone, Serialize)]
pub struct ReaderPage<'a> {
    pub title: &'a Title,
    pub chapter: &'a Chapter,
    pub pages: Vec<&'a str>,
    pub previous: Option<&'a Chapter>,
    pub next: Option<&'a Chapter>,
}

/// Borrowed read-only view of the catalog
#[derive(Debug, Clone, Copy)]
pub struct CatalogView<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> CatalogView<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    pub fn find_title(&self, id: &str) -> Option<&'a Title> {
        self.snapshot.find_title(id)
    }

    /// All titles, most recently added first
    pub fn titles_newest_first(&self) -> Vec<&'a Title> {
        let mut titles: Vec<&Title> = self.snapshot.titles.iter().collect();
        titles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        titles
    }

    /// Chapters of one title, most recently added first
    pub fn chapters_for_title(&self, title_id: &str) -> Vec<&'a Chapter> {
        let mut chapters: Vec<&Chapter> = self
            .snapshot
            .chapters
            .iter()
            .filter(|c| c.title_id == title_id)
            .collect();
        chapters.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        chapters
    }

    /// The `limit` most recently added chapters across the catalog
    pub fn latest_releases(&self, limit: usize) -> Vec<Release<'a>> {
        let mut chapters: Vec<&Chapter> = self.snapshot.chapters.iter().collect();
        chapters.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        chapters
            .into_iter()
            .take(limit)
            .map(|chapter| Release {
                chapter,
                title: self.snapshot.find_title(&chapter.title_id),
            })
            .collect()
    }

    /// Chapters of one title in reading order
    ///
    /// Numeric labels sort by value; non-numeric labels follow, lexically.
    pub fn reading_order(&self, title_id: &str) -> Vec<&'a Chapter> {
        let mut chapters: Vec<&Chapter> = self
            .snapshot
            .chapters
            .iter()
            .filter(|c| c.title_id == title_id)
            .collect();
        chapters.sort_by(|a, b| compare_labels(a, b).then(a.created_at.cmp(&b.created_at)));
        chapters
    }

    /// Resolve a chapter for reading, with its neighbours in reading order
    pub fn reader(&self, title_id: &str, chapter_id: &str) -> Result<ReaderPage<'a>> {
        let title = self
            .find_title(title_id)
            .ok_or_else(|| AppError::TitleNotFound(title_id.to_string()))?;

        let ordered = self.reading_order(title_id);
        let index = ordered
            .iter()
            .position(|c| c.id == chapter_id)
            .ok_or_else(|| AppError::ChapterNotFound(chapter_id.to_string()))?;

        let chapter = ordered[index];

        Ok(ReaderPage {
            title,
            chapter,
            pages: chapter.pages(),
            previous: index.checked_sub(1).map(|i| ordered[i]),
            next: ordered.get(index + 1).copied(),
        })
    }
}

fn compare_labels(a: &Chapter, b: &Chapter) -> Ordering {
    match (a.label_number(), b.label_number()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.chapter_label.cmp(&b.chapter_label),
    }
}
