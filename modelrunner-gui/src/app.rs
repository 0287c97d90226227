//! Main application state and update loop.

use std::path::PathBuf;

use eframe::egui;
use tokio::runtime::{Handle, Runtime};
use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::{debug, error, info, warn};

use modelrunner_core::editor::DEFAULT_NOTIFICATION_DURATION;
use modelrunner_core::{
    scan_local_models, ConfigEditor, ConfigStore, Database, EditorEventReceiver, EditorOptions,
    FieldEdit, Notification, Services, Settings, StoreEventReceiver, Theme,
};

use crate::ui;

// =============================================================================
// Notifications
// =============================================================================

/// A notification currently on screen.
#[derive(Debug, Clone)]
pub struct ActiveNotification {
    pub notification: Notification,
    pub shown_at: chrono::DateTime<chrono::Utc>,
}

impl ActiveNotification {
    fn is_expired(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        let lifetime = chrono::Duration::from_std(self.notification.duration)
            .or_else(|_| chrono::Duration::from_std(DEFAULT_NOTIFICATION_DURATION))
            .unwrap_or_else(|_| chrono::Duration::seconds(5));
        now - self.shown_at > lifetime
    }
}

// =============================================================================
// Local Model Scan
// =============================================================================

/// Background scan of the local model directory.
///
/// Only the most recent scan is tracked; starting a new one drops the
/// receiver of the previous scan, so its result is never applied.
#[derive(Default)]
struct LocalModelScan {
    rx: Option<oneshot::Receiver<std::io::Result<Vec<String>>>>,
}

impl LocalModelScan {
    fn start(&mut self, runtime: &Handle, dir: PathBuf) {
        let (tx, rx) = oneshot::channel();
        self.rx = Some(rx);
        runtime.spawn(async move {
            let _ = tx.send(scan_local_models(&dir).await);
        });
    }

    fn is_pending(&self) -> bool {
        self.rx.is_some()
    }

    /// Take the result of the latest scan once it has finished.
    fn poll(&mut self) -> Option<std::io::Result<Vec<String>>> {
        let mut rx = self.rx.take()?;
        match rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => {
                self.rx = Some(rx);
                None
            }
            Err(TryRecvError::Closed) => {
                warn!("Scan channel closed unexpectedly");
                None
            }
        }
    }
}

// =============================================================================
// Application State
// =============================================================================

/// Main application state.
pub struct ModelRunnerApp {
    /// Tokio runtime for async operations.
    pub runtime: Runtime,

    /// Database connection.
    pub db: Database,

    /// User settings.
    pub settings: Settings,

    // -------------------------------------------------------------------------
    // Presets
    // -------------------------------------------------------------------------
    /// Shared preset list.
    pub store: ConfigStore,

    /// Draft editor over `store`.
    pub editor: ConfigEditor,

    /// Events from the editor's background tasks.
    editor_rx: EditorEventReceiver,

    /// Store change notifications, used to persist the store.
    store_rx: StoreEventReceiver,

    // -------------------------------------------------------------------------
    // UI State
    // -------------------------------------------------------------------------
    /// Notifications on screen, oldest first.
    pub notifications: Vec<ActiveNotification>,

    /// Show settings dialog.
    pub show_settings: bool,

    /// Pending folder selection result receiver.
    folder_result_rx: Option<oneshot::Receiver<Option<PathBuf>>>,

    /// Pending local model scan.
    local_scan: LocalModelScan,
}

impl ModelRunnerApp {
    /// Create a new application instance.
    pub fn new(cc: &eframe::CreationContext<'_>, runtime: Runtime) -> Self {
        info!("Initializing ModelRunnerApp");

        // Open database
        let db = match Database::open() {
            Ok(db) => db,
            Err(e) => {
                error!("Failed to open database: {}", e);
                Database::open_in_memory().expect("Failed to create in-memory database")
            }
        };
        if let Err(e) = db.migrate() {
            error!("Failed to migrate database: {}", e);
        }

        // Load settings and presets
        let settings = Settings::load(&db);
        debug!(?settings, "Loaded settings");

        let mut store = ConfigStore::load(&db);
        let store_rx = store.subscribe();
        info!(configs = store.len(), current = store.current_index(), "Loaded configs");

        let (editor, editor_rx) = ConfigEditor::new(
            &store,
            Services::from_settings(&settings),
            EditorOptions::from_settings(&settings),
            runtime.handle().clone(),
        );

        apply_theme(&cc.egui_ctx, settings.theme);

        let mut style = (*cc.egui_ctx.style()).clone();
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        cc.egui_ctx.set_style(style);

        let mut app = Self {
            runtime,
            db,
            settings,
            store,
            editor,
            editor_rx,
            store_rx,
            notifications: Vec::new(),
            show_settings: false,
            folder_result_rx: None,
            local_scan: LocalModelScan::default(),
        };
        app.refresh_local_models();
        app
    }

    // =========================================================================
    // Preset Actions
    // =========================================================================

    pub fn select_config(&mut self, index: usize) {
        if let Err(e) = self.editor.select(&mut self.store, index) {
            warn!("Failed to select config: {}", e);
            self.notify(Notification::error(e.to_string()));
        }
    }

    pub fn create_config(&mut self) {
        if let Err(e) = self.editor.create(&mut self.store) {
            warn!("Failed to create config: {}", e);
            self.notify(Notification::error(e.to_string()));
        }
    }

    pub fn delete_config(&mut self) {
        if let Err(e) = self.editor.delete(&mut self.store) {
            warn!("Failed to delete config: {}", e);
            self.notify(Notification::error(e.to_string()));
        }
    }

    pub fn save_config(&mut self) {
        if let Err(e) = self.editor.save(&mut self.store) {
            warn!("Failed to save config: {}", e);
            self.notify(Notification::error(e.to_string()));
        }
    }

    pub fn edit(&mut self, edits: Vec<FieldEdit>) {
        for edit in edits {
            self.editor.edit(edit);
        }
    }

    pub fn convert_model(&mut self) {
        self.editor.convert_model();
    }

    pub fn cancel_conversion(&mut self) {
        self.editor.cancel_conversion();
    }

    /// Rescan the local model directory in the background, superseding any
    /// scan still in flight.
    pub fn refresh_local_models(&mut self) {
        self.local_scan.start(self.runtime.handle(), self.settings.local_model_dir());
    }

    /// Check for local model scan completion.
    fn check_scan_completion(&mut self) {
        match self.local_scan.poll() {
            Some(Ok(names)) => {
                debug!(count = names.len(), "Scanned local models");
                self.store.apply_local_scan(&names);
            }
            Some(Err(e)) => {
                warn!("Failed to scan local models: {}", e);
            }
            None => {}
        }
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Drain editor and store events.
    pub fn process_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.editor_rx.try_recv() {
            if let Some(notification) = self.editor.handle_event(&mut self.store, event) {
                self.notify(notification);
            }
            ctx.request_repaint();
        }

        let mut store_changed = false;
        while let Ok(event) = self.store_rx.try_recv() {
            debug!(?event, "Store changed");
            store_changed = true;
        }
        if store_changed {
            self.persist_store();
        }
    }

    fn persist_store(&mut self) {
        if let Err(e) = self.store.save(&self.db) {
            error!("Failed to persist configs: {}", e);
            self.notify(Notification::error(format!("Failed to persist configs: {e}")));
        }
    }

    /// Show a notification.
    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push(ActiveNotification {
            notification,
            shown_at: chrono::Utc::now(),
        });
    }

    /// Drop notifications whose time is up.
    pub fn clear_expired_notifications(&mut self) {
        let now = chrono::Utc::now();
        self.notifications.retain(|n| !n.is_expired(now));
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// Save settings and reconfigure the editor.
    pub fn save_settings(&mut self) {
        self.settings.validate();
        if let Err(e) = self.settings.save(&self.db) {
            error!("Failed to save settings: {}", e);
            self.notify(Notification::error("Failed to save settings"));
            return;
        }

        self.editor
            .set_options(EditorOptions::from_settings(&self.settings));
        self.editor
            .set_services(Services::from_settings(&self.settings));
        self.notify(Notification::info("Settings saved"));
        self.refresh_local_models();
    }

    /// Discard unsaved settings changes.
    pub fn reload_settings(&mut self, ctx: &egui::Context) {
        self.settings = Settings::load(&self.db);
        apply_theme(ctx, self.settings.theme);
    }

    /// Open a folder selection dialog for the model directory.
    pub fn open_model_dir_dialog(&mut self) {
        // Don't open another dialog if one is pending
        if self.folder_result_rx.is_some() {
            return;
        }

        let (tx, rx) = oneshot::channel();
        self.folder_result_rx = Some(rx);

        self.runtime.spawn(async move {
            let folder = rfd::AsyncFileDialog::new()
                .pick_folder()
                .await
                .map(|f| f.path().to_path_buf());
            let _ = tx.send(folder);
        });
    }

    /// Check for folder selection completion.
    fn check_folder_selection(&mut self) {
        if let Some(mut rx) = self.folder_result_rx.take() {
            match rx.try_recv() {
                Ok(Some(folder)) => {
                    info!("Selected model directory: {}", folder.display());
                    self.settings.local_model_dir = folder.to_string_lossy().to_string();
                }
                Ok(None) => {
                    debug!("Folder selection cancelled");
                }
                Err(TryRecvError::Empty) => {
                    self.folder_result_rx = Some(rx);
                }
                Err(TryRecvError::Closed) => {
                    warn!("Folder selection channel closed unexpectedly");
                }
            }
        }
    }
}

/// Apply the theme's visuals to the context.
pub fn apply_theme(ctx: &egui::Context, theme: Theme) {
    let visuals = match theme {
        Theme::Dark => egui::Visuals::dark(),
        Theme::Light => egui::Visuals::light(),
    };
    ctx.set_visuals(visuals);
}

impl eframe::App for ModelRunnerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for async completions
        self.check_folder_selection();
        self.check_scan_completion();

        self.process_events(ctx);
        self.clear_expired_notifications();

        // Top panel with menu
        egui::TopBottomPanel::top("menu_panel").show(ctx, |ui| {
            ui::menu::render(self, ui, ctx);
        });

        // Status bar at bottom
        egui::TopBottomPanel::bottom("status_panel")
            .max_height(24.0)
            .show(ctx, |ui| {
                ui::status::render(self, ui);
            });

        // Settings modal if open
        if self.show_settings {
            ui::settings::render(self, ctx);
        }

        // Config editor
        egui::CentralPanel::default().show(ctx, |ui| {
            ui::configs::render(self, ui);
        });

        ui::notifications::render(self, ctx);

        // Keep polling while background work is outstanding
        if self.editor.is_converting()
            || self.editor.pending_pushes() > 0
            || !self.notifications.is_empty()
            || self.folder_result_rx.is_some()
            || self.local_scan.is_pending()
        {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn notifications_expire_after_their_duration() {
        let shown_at = chrono::Utc::now();
        let active = ActiveNotification {
            notification: Notification::success("Config Saved")
                .with_duration(Duration::from_millis(300)),
            shown_at,
        };

        assert!(!active.is_expired(shown_at + chrono::Duration::milliseconds(200)));
        assert!(active.is_expired(shown_at + chrono::Duration::milliseconds(400)));
    }

    #[test]
    fn notifications_default_to_five_seconds() {
        let shown_at = chrono::Utc::now();
        let active = ActiveNotification {
            notification: Notification::error("Convert Failed - boom"),
            shown_at,
        };

        assert!(!active.is_expired(shown_at + chrono::Duration::seconds(4)));
        assert!(active.is_expired(shown_at + chrono::Duration::seconds(6)));
    }

    fn wait_for_scan(scan: &mut LocalModelScan) -> Vec<String> {
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(result) = scan.poll() {
                return result.unwrap();
            }
            assert!(std::time::Instant::now() < deadline, "scan did not finish");
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn restarted_scan_applies_only_the_latest_directory() {
        let runtime = Runtime::new().unwrap();
        let old_dir = tempfile::TempDir::new().unwrap();
        let new_dir = tempfile::TempDir::new().unwrap();
        std::fs::write(old_dir.path().join("old.pth"), b"").unwrap();
        std::fs::write(new_dir.path().join("new.pth"), b"").unwrap();

        let mut scan = LocalModelScan::default();
        scan.start(runtime.handle(), old_dir.path().to_path_buf());
        scan.start(runtime.handle(), new_dir.path().to_path_buf());

        assert_eq!(wait_for_scan(&mut scan), vec!["new.pth".to_string()]);
        assert!(!scan.is_pending());
        assert!(scan.poll().is_none());
    }
}
