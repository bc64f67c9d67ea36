//! Settings-related commands

use crate::app::AppState;
use crate::error::Result;
use crate::services::{AdminSettings, LatencySettings};
use serde::Serialize;

/// Settings safe to display; the admin password is never echoed
#[derive(Debug, Serialize)]
pub struct SettingsSummary {
    pub latency: LatencySettings,
    pub dark_mode: bool,
}

/// Flip dark mode and return the new value
pub async fn toggle_dark_mode(state: &AppState) -> Result<bool> {
    state.toggle_dark_mode().await
}

/// Get current settings
pub async fn get_settings(state: &AppState) -> Result<SettingsSummary> {
    Ok(SettingsSummary {
        latency: state.settings_service.get_latency().await?,
        dark_mode: state.snapshot().await.dark_mode,
    })
}

/// Update simulated latency; applies from the next start
pub async fn update_latency_settings(state: &AppState, latency: LatencySettings) -> Result<()> {
    state.settings_service.update_latency(latency).await?;
    tracing::warn!("Latency settings updated. Restart required for changes to take effect.");
    Ok(())
}

/// Change the admin passcode; requires an unlocked session and applies from the next start
pub async fn change_admin_password(state: &AppState, password: String) -> Result<()> {
    state.admin().await?;
    state
        .settings_service
        .update_admin(AdminSettings { password })
        .await?;
    tracing::info!("Admin password changed");
    Ok(())
}
