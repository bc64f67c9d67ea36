//! Application configuration constants
//!
//! Central location for storage names, simulated latency defaults,
//! collection limits, and validation boundaries used throughout the application.

// ===== Storage =====

/// File holding the serialized snapshot inside the data directory
pub const STORAGE_FILE_NAME: &str = "banana_manga_server_db.json";

/// File holding runtime settings inside the data directory
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Directory name used under the platform data directory
pub const DATA_DIR_NAME: &str = "banana-manga";

// ===== Simulated Latency =====

/// Default delay applied to every snapshot read, in milliseconds
pub const DEFAULT_READ_LATENCY_MS: u64 = 200;

/// Default delay applied to every snapshot write, in milliseconds
pub const DEFAULT_WRITE_LATENCY_MS: u64 = 100;

/// Upper bound accepted for either simulated delay (10 seconds)
pub const MAX_SIMULATED_LATENCY_MS: u64 = 10_000;

// ===== Collection Limits =====

/// Maximum number of activity log entries kept; oldest are evicted first
pub const MAX_LOG_ENTRIES: usize = 100;

/// Number of chapters shown in the "Latest Releases" listing
pub const LATEST_RELEASES_LIMIT: usize = 6;

/// Length of the random base-36 suffix in generated identifiers
pub const ID_SUFFIX_LENGTH: usize = 9;

// ===== Admin =====

/// Passcode used when settings.json does not override it
pub const DEFAULT_ADMIN_PASSWORD: &str = "143897";

/// Maximum accepted passcode length in settings
pub const MAX_ADMIN_PASSWORD_LENGTH: usize = 128;

// ===== Backup =====

/// Prefix of exported backup files, followed by the ISO date
pub const BACKUP_FILE_PREFIX: &str = "banana_manga_backup_";
