//! Services module
//!
//! Business logic that sits between the application state and the repository.

pub mod backup;
pub mod catalog;
pub mod session;
pub mod settings;

pub use backup::{BackupService, ExportDocument};
pub use catalog::{CatalogView, ReaderPage, Release};
pub use session::AdminSession;
pub use settings::{AdminSettings, AppSettings, LatencySettings, SettingsService};
