//! Commands exposed to the command-line front end
//!
//! This module organizes commands into logical submodules:
//! - `catalog`: Public catalog browsing and the reader
//! - `admin`: Title/chapter CRUD and the activity log
//! - `backup`: JSON export and import
//! - `settings`: Dark mode and runtime settings

pub mod admin;
pub mod backup;
pub mod catalog;
pub mod settings;

use crate::app::AppState;
use crate::error::Result;

pub use admin::*;
pub use backup::*;
pub use catalog::*;
pub use settings::*;

/// Get application information
pub async fn get_app_info(state: &AppState) -> Result<AppInfo> {
    Ok(AppInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        data_dir: state.data_dir.to_string_lossy().to_string(),
        syncing: state.is_syncing(),
        dark_mode: state.snapshot().await.dark_mode,
    })
}

/// Application information structure
#[derive(serde::Serialize)]
pub struct AppInfo {
    pub version: String,
    pub data_dir: String,
    pub syncing: bool,
    pub dark_mode: bool,
}
