//! Error types for Banana Manga
//!
//! All errors use thiserror for structured error handling.
//! These errors can be serialized to any front end as a plain message.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Title not found: {0}")]
    TitleNotFound(String),

    #[error("Chapter not found: {0}")]
    ChapterNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Admin session required")]
    Unauthorized,

    #[error("Invalid password. Access denied.")]
    InvalidPassword,

    #[error("Import rejected: {0}")]
    Import(#[from] ImportError),

    #[error("Settings error: {0}")]
    Settings(String),
}

/// Reasons an import payload is refused before it reaches the store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("payload is not valid JSON: {0}")]
    Malformed(String),

    #[error("payload must be a JSON object")]
    NotAnObject,

    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("field `{field}` must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("{collection}[{index}] is invalid: {reason}")]
    InvalidRecord {
        collection: &'static str,
        index: usize,
        reason: String,
    },
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
