//! Application state and initialization
//!
//! `AppState` is the single owner of the live snapshot. Views read through
//! `snapshot()` / `with_catalog()`; every mutation goes through the store
//! and is followed by a full re-read, so the in-memory copy always reflects
//! a round trip. Dark mode is the one optimistic update.
//!
//! Mutations are only reachable through `AdminActions`, which `admin()`
//! hands out while the admin session is unlocked.

use crate::config::DATA_DIR_NAME;
use crate::database::{
    open_repository, Chapter, CreateChapterRequest, CreateTitleRequest, Repository, Snapshot,
    StateUpdate, Title,
};
use crate::error::{AppError, Result};
use crate::services::{AdminSession, BackupService, CatalogView, ExportDocument, SettingsService};
use crate::storage::Latency;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, RwLock};

/// Central application state holding all services
pub struct AppState {
    pub data_dir: PathBuf,
    pub settings_service: SettingsService,
    repo: Repository,
    backup_service: BackupService,
    snapshot: RwLock<Snapshot>,
    session: Mutex<AdminSession>,
    syncing: AtomicBool,
}

/// Clears the syncing flag when the operation ends, successfully or not
struct SyncGuard<'a>(&'a AtomicBool);

impl<'a> SyncGuard<'a> {
    fn begin(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl AppState {
    pub fn new(
        data_dir: PathBuf,
        repo: Repository,
        settings_service: SettingsService,
        admin_password: String,
    ) -> Self {
        Self {
            data_dir,
            settings_service,
            backup_service: BackupService::new(repo.clone()),
            repo,
            snapshot: RwLock::new(Snapshot::default()),
            session: Mutex::new(AdminSession::new(admin_password)),
            // Nothing has been loaded yet
            syncing: AtomicBool::new(true),
        }
    }

    /// Default location for exported backups
    pub fn backups_dir(&self) -> PathBuf {
        self.data_dir.join("backups")
    }

    /// Copy of the in-memory snapshot
    pub async fn snapshot(&self) -> Snapshot {
        self.snapshot.read().await.clone()
    }

    /// Run a read-only catalog query against the in-memory snapshot
    pub async fn with_catalog<R>(&self, query: impl FnOnce(CatalogView<'_>) -> R) -> R {
        let snapshot = self.snapshot.read().await;
        query(CatalogView::new(&snapshot))
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::SeqCst)
    }

    pub async fn is_admin(&self) -> bool {
        self.session.lock().await.is_admin()
    }

    pub async fn login(&self, password: &str) -> Result<()> {
        self.session.lock().await.login(password)
    }

    pub async fn logout(&self) {
        self.session.lock().await.logout();
    }

    /// Re-read the full state from the store
    pub async fn refresh(&self) {
        let _sync = SyncGuard::begin(&self.syncing);
        self.reload().await;
    }

    async fn reload(&self) {
        let fresh = self.repo.get_full_state().await;
        *self.snapshot.write().await = fresh;
    }

    /// Flip dark mode in memory, then persist it; returns the new value
    pub async fn toggle_dark_mode(&self) -> Result<bool> {
        let dark_mode = {
            let mut snapshot = self.snapshot.write().await;
            snapshot.dark_mode = !snapshot.dark_mode;
            snapshot.dark_mode
        };

        self.repo
            .save_state(StateUpdate {
                dark_mode: Some(dark_mode),
                ..StateUpdate::default()
            })
            .await
            .map_err(|e| {
                tracing::warn!("Failed to persist dark mode: {}", e);
                e
            })?;

        Ok(dark_mode)
    }

    /// Admin capability, available only while the session is unlocked
    pub async fn admin(&self) -> Result<AdminActions<'_>> {
        if !self.is_admin().await {
            return Err(AppError::Unauthorized);
        }
        Ok(AdminActions { state: self })
    }
}

/// Mutating actions of the admin dashboard
pub struct AdminActions<'a> {
    state: &'a AppState,
}

impl AdminActions<'_> {
    pub async fn add_title(&self, name: String, cover_image_url: String) -> Result<Title> {
        let _sync = SyncGuard::begin(&self.state.syncing);

        let title = self
            .state
            .repo
            .create_title(CreateTitleRequest {
                name,
                cover_image_url,
            })
            .await?;
        tracing::info!("Title created: {} ({})", title.name, title.id);

        self.state.reload().await;
        Ok(title)
    }

    pub async fn delete_title(&self, id: &str) -> Result<Title> {
        let _sync = SyncGuard::begin(&self.state.syncing);

        let title = self.state.repo.delete_title(id).await?;
        tracing::info!("Title deleted: {} ({})", title.name, title.id);

        self.state.reload().await;
        Ok(title)
    }

    pub async fn add_chapter(
        &self,
        title_id: String,
        chapter_label: String,
        image_url_list: String,
    ) -> Result<Chapter> {
        let _sync = SyncGuard::begin(&self.state.syncing);

        let chapter = self
            .state
            .repo
            .create_chapter(CreateChapterRequest {
                title_id,
                chapter_label,
                image_url_list,
            })
            .await?;
        tracing::info!("Chapter {} added to title {}", chapter.chapter_label, chapter.title_id);

        self.state.reload().await;
        Ok(chapter)
    }

    pub async fn delete_chapter(&self, id: &str) -> Result<Chapter> {
        let _sync = SyncGuard::begin(&self.state.syncing);

        let chapter = self.state.repo.delete_chapter(id).await?;
        tracing::info!("Chapter deleted: {}", chapter.id);

        self.state.reload().await;
        Ok(chapter)
    }

    /// Replace the catalog with a backup payload; rejected payloads change nothing
    pub async fn import_database(&self, payload: &str) -> Result<()> {
        let _sync = SyncGuard::begin(&self.state.syncing);

        self.state.backup_service.import(payload).await?;
        tracing::info!("Database restored from backup");

        self.state.reload().await;
        Ok(())
    }

    pub async fn clear_logs(&self) -> Result<()> {
        let _sync = SyncGuard::begin(&self.state.syncing);

        self.state
            .repo
            .save_state(StateUpdate {
                logs: Some(Vec::new()),
                ..StateUpdate::default()
            })
            .await?;
        tracing::info!("Activity log cleared");

        self.state.reload().await;
        Ok(())
    }

    /// Export the in-memory state as a dated JSON file inside `dir`
    pub async fn export_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        let snapshot = self.state.snapshot.read().await;
        let document = ExportDocument {
            snapshot: &*snapshot,
            is_admin: self.state.is_admin().await,
            syncing: self.state.is_syncing(),
        };

        self.state.backup_service.export_to_dir(dir, &document).await
    }
}

/// Pick the data directory: explicit path, else the platform data directory
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }

    dirs::data_dir()
        .map(|dir| dir.join(DATA_DIR_NAME))
        .ok_or_else(|| AppError::Settings("Failed to determine data directory".to_string()))
}

/// Application setup - called once on startup
///
/// `latency_override` replaces the configured simulated latency.
pub async fn setup(data_dir: PathBuf, latency_override: Option<Latency>) -> Result<AppState> {
    tracing::info!("Initializing application");
    tracing::info!("Data directory: {:?}", data_dir);

    tokio::fs::create_dir_all(&data_dir).await?;
    tokio::fs::create_dir_all(data_dir.join("backups")).await?;

    let settings_service = SettingsService::new(data_dir.clone());
    let settings = settings_service.load().await?;

    let latency = latency_override.unwrap_or_else(|| settings.latency.to_latency());
    let repo = open_repository(&data_dir, latency);

    let state = AppState::new(data_dir, repo, settings_service, settings.admin.password);
    state.refresh().await;

    tracing::info!("Application initialized successfully");

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_ADMIN_PASSWORD;
    use crate::database::LogAction;
    use tempfile::TempDir;

    async fn create_test_state() -> (AppState, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let state = setup(temp_dir.path().to_path_buf(), Some(Latency::none()))
            .await
            .unwrap();
        (state, temp_dir)
    }

    #[tokio::test]
    async fn test_initial_state_after_setup() {
        let (state, _temp) = create_test_state().await;

        let snapshot = state.snapshot().await;
        assert!(snapshot.titles.is_empty());
        assert!(snapshot.dark_mode);
        assert!(!state.is_syncing());
        assert!(!state.is_admin().await);
    }

    #[tokio::test]
    async fn test_mutations_require_admin() {
        let (state, _temp) = create_test_state().await;

        assert!(matches!(state.admin().await, Err(AppError::Unauthorized)));
        assert!(matches!(
            state.login("wrong").await,
            Err(AppError::InvalidPassword)
        ));

        state.login(DEFAULT_ADMIN_PASSWORD).await.unwrap();
        assert!(state.admin().await.is_ok());

        state.logout().await;
        assert!(state.admin().await.is_err());
    }

    #[tokio::test]
    async fn test_mutation_refreshes_snapshot() {
        let (state, _temp) = create_test_state().await;
        state.login(DEFAULT_ADMIN_PASSWORD).await.unwrap();
        let admin = state.admin().await.unwrap();

        let title = admin
            .add_title("Chainsaw Man".to_string(), "csm.png".to_string())
            .await
            .unwrap();
        admin
            .add_chapter(title.id.clone(), "1".to_string(), "a.png,b.png".to_string())
            .await
            .unwrap();

        let snapshot = state.snapshot().await;
        assert_eq!(snapshot.titles.len(), 1);
        assert_eq!(snapshot.chapters.len(), 1);
        assert_eq!(snapshot.logs.len(), 2);
        assert!(!state.is_syncing());

        admin.delete_title(&title.id).await.unwrap();
        let snapshot = state.snapshot().await;
        assert!(snapshot.titles.is_empty());
        assert!(snapshot.chapters.is_empty());
    }

    #[tokio::test]
    async fn test_syncing_set_while_mutation_runs() {
        let temp_dir = TempDir::new().unwrap();
        let state = std::sync::Arc::new(
            setup(temp_dir.path().to_path_buf(), Some(Latency::from_millis(50, 50)))
                .await
                .unwrap(),
        );
        state.login(DEFAULT_ADMIN_PASSWORD).await.unwrap();
        assert!(!state.is_syncing());

        let task = tokio::spawn({
            let state = state.clone();
            async move {
                state
                    .admin()
                    .await
                    .unwrap()
                    .add_title("Berserk".to_string(), "b.png".to_string())
                    .await
            }
        });

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(state.is_syncing());

        task.await.unwrap().unwrap();
        assert!(!state.is_syncing());
        assert_eq!(state.snapshot().await.titles.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_mutation_clears_syncing() {
        let (state, _temp) = create_test_state().await;
        state.login(DEFAULT_ADMIN_PASSWORD).await.unwrap();
        let admin = state.admin().await.unwrap();

        assert!(admin.delete_chapter("missing").await.is_err());
        assert!(!state.is_syncing());
    }

    #[tokio::test]
    async fn test_dark_mode_toggle_persists() {
        let (state, temp) = create_test_state().await;

        assert!(!state.toggle_dark_mode().await.unwrap());
        assert!(!state.snapshot().await.dark_mode);

        let reopened = setup(temp.path().to_path_buf(), Some(Latency::none()))
            .await
            .unwrap();
        assert!(!reopened.snapshot().await.dark_mode);
    }

    #[tokio::test]
    async fn test_admin_flag_not_persisted() {
        let (state, temp) = create_test_state().await;
        state.login(DEFAULT_ADMIN_PASSWORD).await.unwrap();
        state.toggle_dark_mode().await.unwrap();

        let reopened = setup(temp.path().to_path_buf(), Some(Latency::none()))
            .await
            .unwrap();
        assert!(!reopened.is_admin().await);
    }

    #[tokio::test]
    async fn test_import_and_clear_logs() {
        let (state, _temp) = create_test_state().await;
        state.login(DEFAULT_ADMIN_PASSWORD).await.unwrap();
        let admin = state.admin().await.unwrap();

        let payload = r#"{
            "titles": [{"id": "a", "name": "Imported", "coverImageURL": "i.png", "createdAt": 1}],
            "chapters": []
        }"#;
        admin.import_database(payload).await.unwrap();

        let snapshot = state.snapshot().await;
        assert_eq!(snapshot.titles[0].name, "Imported");
        assert_eq!(snapshot.logs[0].action_kind, LogAction::DbRestore);

        assert!(admin.import_database(r#"{"titles": 3}"#).await.is_err());
        assert_eq!(state.snapshot().await.titles.len(), 1);

        admin.clear_logs().await.unwrap();
        assert!(state.snapshot().await.logs.is_empty());
    }

    #[tokio::test]
    async fn test_export_includes_session_fields() {
        let (state, temp) = create_test_state().await;
        state.login(DEFAULT_ADMIN_PASSWORD).await.unwrap();
        let admin = state.admin().await.unwrap();

        let path = admin.export_to_dir(&temp.path().join("out")).await.unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["isAdmin"], true);
        assert_eq!(value["syncing"], false);
        assert!(value["titles"].is_array());
        assert_eq!(value["darkModeFlag"], true);
    }

    #[test]
    fn test_resolve_explicit_data_dir() {
        let dir = PathBuf::from("/tmp/banana");
        assert_eq!(resolve_data_dir(Some(dir.clone())).unwrap(), dir);
    }
}
