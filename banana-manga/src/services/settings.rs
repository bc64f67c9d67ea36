//! Settings service
//!
//! Manages runtime settings persistence using JSON file storage.

use crate::config::{
    DEFAULT_ADMIN_PASSWORD, DEFAULT_READ_LATENCY_MS, DEFAULT_WRITE_LATENCY_MS,
    MAX_ADMIN_PASSWORD_LENGTH, MAX_SIMULATED_LATENCY_MS, SETTINGS_FILE_NAME,
};
use crate::error::{AppError, Result};
use crate::storage::Latency;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

/// Simulated network delay configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencySettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_read_ms")]
    pub read_ms: u64,
    #[serde(default = "default_write_ms")]
    pub write_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_read_ms() -> u64 {
    DEFAULT_READ_LATENCY_MS
}

fn default_write_ms() -> u64 {
    DEFAULT_WRITE_LATENCY_MS
}

impl Default for LatencySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            read_ms: default_read_ms(),
            write_ms: default_write_ms(),
        }
    }
}

impl LatencySettings {
    pub fn to_latency(&self) -> Latency {
        if self.enabled {
            Latency::from_millis(self.read_ms, self.write_ms)
        } else {
            Latency::none()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.read_ms > MAX_SIMULATED_LATENCY_MS || self.write_ms > MAX_SIMULATED_LATENCY_MS {
            return Err(AppError::Settings(format!(
                "Simulated latency must not exceed {}ms",
                MAX_SIMULATED_LATENCY_MS
            )));
        }
        Ok(())
    }
}

/// Admin dashboard access
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSettings {
    #[serde(default = "default_admin_password")]
    pub password: String,
}

fn default_admin_password() -> String {
    DEFAULT_ADMIN_PASSWORD.to_string()
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            password: default_admin_password(),
        }
    }
}

impl AdminSettings {
    pub fn validate(&self) -> Result<()> {
        if self.password.is_empty() {
            return Err(AppError::Settings("Admin password must not be empty".to_string()));
        }
        if self.password.len() > MAX_ADMIN_PASSWORD_LENGTH {
            return Err(AppError::Settings(format!(
                "Admin password exceeds {} characters",
                MAX_ADMIN_PASSWORD_LENGTH
            )));
        }
        Ok(())
    }
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AppSettings {
    #[serde(default)]
    pub latency: LatencySettings,
    #[serde(default)]
    pub admin: AdminSettings,
}

/// Service for managing application settings
#[derive(Clone)]
pub struct SettingsService {
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            settings_path: data_dir.join(SETTINGS_FILE_NAME),
        }
    }

    /// Load settings from disk or create default if not exists
    pub async fn load(&self) -> Result<AppSettings> {
        if !self.settings_path.exists() {
            tracing::info!("Settings file not found, creating default settings");
            let default = AppSettings::default();
            self.save(&default).await?;
            return Ok(default);
        }

        let content = fs::read_to_string(&self.settings_path).await?;
        let settings: AppSettings = serde_json::from_str(&content)
            .map_err(|e| AppError::Settings(format!("Failed to parse settings: {}", e)))?;
        settings.latency.validate()?;
        settings.admin.validate()?;

        Ok(settings)
    }

    /// Save settings to disk
    pub async fn save(&self, settings: &AppSettings) -> Result<()> {
        let content = serde_json::to_string_pretty(settings)
            .map_err(|e| AppError::Settings(format!("Failed to serialize settings: {}", e)))?;

        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&self.settings_path, content).await?;
        tracing::info!("Settings saved to {:?}", self.settings_path);

        Ok(())
    }

    pub async fn get_latency(&self) -> Result<LatencySettings> {
        Ok(self.load().await?.latency)
    }

    pub async fn update_latency(&self, latency: LatencySettings) -> Result<()> {
        latency.validate()?;
        let mut settings = self.load().await?;
        settings.latency = latency;
        self.save(&settings).await
    }

    /// Change the admin passcode; takes effect for the next session
    pub async fn update_admin(&self, admin: AdminSettings) -> Result<()> {
        admin.validate()?;
        let mut settings = self.load().await?;
        settings.admin = admin;
        self.save(&settings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn create_test_service() -> (SettingsService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let service = SettingsService::new(temp_dir.path().to_path_buf());
        (service, temp_dir)
    }

    #[tokio::test]
    async fn test_default_settings_created_on_load() {
        let (service, temp) = create_test_service();

        let settings = service.load().await.unwrap();

        assert!(settings.latency.enabled);
        assert_eq!(settings.latency.read_ms, 200);
        assert_eq!(settings.latency.write_ms, 100);
        assert_eq!(settings.admin.password, DEFAULT_ADMIN_PASSWORD);
        assert!(temp.path().join(SETTINGS_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn test_partial_file_uses_field_defaults() {
        let (service, temp) = create_test_service();

        std::fs::write(
            temp.path().join(SETTINGS_FILE_NAME),
            r#"{"latency": {"enabled": false}}"#,
        )
        .unwrap();

        let settings = service.load().await.unwrap();
        assert!(!settings.latency.enabled);
        assert_eq!(settings.latency.read_ms, DEFAULT_READ_LATENCY_MS);
        assert_eq!(settings.admin, AdminSettings::default());
        assert_eq!(settings.latency.to_latency(), Latency::none());
    }

    #[tokio::test]
    async fn test_latency_update_validated() {
        let (service, _temp) = create_test_service();

        let too_slow = LatencySettings {
            read_ms: MAX_SIMULATED_LATENCY_MS + 1,
            ..LatencySettings::default()
        };
        assert!(service.update_latency(too_slow).await.is_err());

        let fast = LatencySettings {
            enabled: true,
            read_ms: 5,
            write_ms: 3,
        };
        service.update_latency(fast).await.unwrap();

        let loaded = service.get_latency().await.unwrap();
        assert_eq!(loaded.to_latency().read, Duration::from_millis(5));
        assert_eq!(loaded.to_latency().write, Duration::from_millis(3));
    }

    #[tokio::test]
    async fn test_admin_password_persisted() {
        let temp_dir = TempDir::new().unwrap();

        {
            let service = SettingsService::new(temp_dir.path().to_path_buf());
            service
                .update_admin(AdminSettings {
                    password: "banana".to_string(),
                })
                .await
                .unwrap();
        }

        {
            let service = SettingsService::new(temp_dir.path().to_path_buf());
            assert_eq!(service.load().await.unwrap().admin.password, "banana");
        }
    }

    #[tokio::test]
    async fn test_empty_admin_password_rejected() {
        let (service, _temp) = create_test_service();

        let result = service
            .update_admin(AdminSettings {
                password: String::new(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Settings(_))));
    }

    #[tokio::test]
    async fn test_out_of_range_settings_file_rejected() {
        let (service, temp) = create_test_service();

        std::fs::write(
            temp.path().join(SETTINGS_FILE_NAME),
            r#"{"latency": {"read_ms": 999999}}"#,
        )
        .unwrap();
        assert!(matches!(service.load().await, Err(AppError::Settings(_))));

        std::fs::write(
            temp.path().join(SETTINGS_FILE_NAME),
            r#"{"admin": {"password": ""}}"#,
        )
        .unwrap();
        assert!(matches!(service.load().await, Err(AppError::Settings(_))));
    }

    #[tokio::test]
    async fn test_corrupt_settings_reported() {
        let (service, temp) = create_test_service();

        std::fs::write(temp.path().join(SETTINGS_FILE_NAME), "not json").unwrap();

        assert!(matches!(service.load().await, Err(AppError::Settings(_))));
    }
}
