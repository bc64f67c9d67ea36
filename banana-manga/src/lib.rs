//! Banana Manga library
//!
//! This library exposes the snapshot store, data access layer and
//! application state controller for the CLI and for testing.

pub mod app;
pub mod commands;
pub mod config;
pub mod database;
pub mod error;
pub mod services;
pub mod storage;
