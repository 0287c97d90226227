//! Configuration editor.
//!
//! Holds one uncommitted draft of the preset at the selected index. Edits only
//! touch the draft; `save` writes it back into the [`ConfigStore`] and pushes
//! the sampling parameters to the running server. Background work (config
//! pushes, model conversion, catalog refresh) runs on the tokio runtime and
//! reports back through an [`EditorEvent`] channel that the host drains on its
//! own thread.

mod events;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::catalog::scan_local_models;
use crate::config::Settings;
use crate::presets::{
    converted_model_path, strategy, ConfigStore, FieldEdit, ModelConfig, PresetError,
};
use crate::services::{Services, UpdateConfigBody};

pub use events::{
    editor_channel, EditorEvent, EditorEventReceiver, EditorEventSender, Notification,
    NotificationLevel, DEFAULT_NOTIFICATION_DURATION,
};

const SAVED_NOTIFICATION_DURATION: Duration = Duration::from_millis(300);
const START_CONVERTING_DURATION: Duration = Duration::from_secs(1);

/// Editor behavior taken from the app settings.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorOptions {
    /// Directory that model names are resolved against.
    pub local_model_dir: PathBuf,
    /// `select` also makes the selection the startup preset.
    pub apply_selection_immediately: bool,
}

impl EditorOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            local_model_dir: settings.local_model_dir(),
            apply_selection_immediately: settings.apply_selection_immediately,
        }
    }
}

/// Clears an in-flight flag when dropped, including on task abort.
struct FlagGuard(Arc<AtomicBool>);

impl Drop for FlagGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Decrements an in-flight counter when dropped.
struct CountGuard(Arc<AtomicUsize>);

impl CountGuard {
    fn acquire(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter.clone())
    }
}

impl Drop for CountGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Draft-based editor for the presets in a [`ConfigStore`].
pub struct ConfigEditor {
    selected_index: usize,
    draft: ModelConfig,
    options: EditorOptions,
    services: Services,
    runtime: Handle,
    events: EditorEventSender,
    pending_pushes: Arc<AtomicUsize>,
    converting: Arc<AtomicBool>,
    conversion: Option<JoinHandle<()>>,
}

impl ConfigEditor {
    /// Create an editor positioned on the store's current preset.
    pub fn new(
        store: &ConfigStore,
        services: Services,
        options: EditorOptions,
        runtime: Handle,
    ) -> (Self, EditorEventReceiver) {
        let (events, rx) = editor_channel();
        let editor = Self {
            selected_index: store.current_index(),
            draft: store.current().clone(),
            options,
            services,
            runtime,
            events,
            pending_pushes: Arc::new(AtomicUsize::new(0)),
            converting: Arc::new(AtomicBool::new(false)),
            conversion: None,
        };
        (editor, rx)
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn draft(&self) -> &ModelConfig {
        &self.draft
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// Whether the draft differs from the record it shadows.
    pub fn is_dirty(&self, store: &ConfigStore) -> bool {
        store.get(self.selected_index) != Some(&self.draft)
    }

    pub fn set_options(&mut self, options: EditorOptions) {
        self.options = options;
    }

    pub fn set_services(&mut self, services: Services) {
        self.services = services;
    }

    fn notify(&self, notification: Notification) {
        let _ = self.events.send(EditorEvent::Notify(notification));
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Load the record at `index` into the draft without touching the store.
    ///
    /// Unsaved edits are discarded.
    pub fn preview_select(&mut self, store: &ConfigStore, index: usize) -> Result<(), PresetError> {
        let config = store.get(index).ok_or(PresetError::IndexOutOfRange {
            index,
            len: store.len(),
        })?;
        debug!(index, name = %config.name, "Selected config");
        self.selected_index = index;
        self.draft = config.clone();
        Ok(())
    }

    /// Make the selected record the store's startup preset.
    pub fn commit_as_active(&self, store: &mut ConfigStore) -> Result<(), PresetError> {
        store.set_current_index(self.selected_index)
    }

    /// Select `index`, applying it as the startup preset when configured to.
    pub fn select(&mut self, store: &mut ConfigStore, index: usize) -> Result<(), PresetError> {
        self.preview_select(store, index)?;
        if self.options.apply_selection_immediately {
            self.commit_as_active(store)?;
        }
        Ok(())
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Apply an edit to the draft only.
    pub fn edit(&mut self, edit: FieldEdit) {
        self.draft.apply(edit);
    }

    /// Commit the draft at the selected index and push the sampling
    /// parameters to the running server.
    ///
    /// The local commit stands even if the push fails. Returns the push task.
    pub fn save(&mut self, store: &mut ConfigStore) -> Result<JoinHandle<()>, PresetError> {
        store.set_config(self.selected_index, self.draft.clone())?;
        info!(index = self.selected_index, name = %self.draft.name, "Config saved");
        self.notify(
            Notification::success("Config Saved").with_duration(SAVED_NOTIFICATION_DURATION),
        );

        let port = store.current().api_parameters.api_port;
        let body = UpdateConfigBody::from(&self.draft.api_parameters);
        let updater = self.services.updater.clone();
        let events = self.events.clone();
        let pending = CountGuard::acquire(&self.pending_pushes);

        Ok(self.runtime.spawn(async move {
            let _pending = pending;
            match updater.update_config(port, &body).await {
                Ok(()) => {
                    let _ = events.send(EditorEvent::ConfigPushed { port });
                }
                Err(e) => {
                    warn!(port, error = %e, "Config update failed");
                    let _ = events.send(EditorEvent::Notify(Notification::error(format!(
                        "Config Update Failed - {e}"
                    ))));
                }
            }
        }))
    }

    /// Number of config pushes still in flight.
    pub fn pending_pushes(&self) -> usize {
        self.pending_pushes.load(Ordering::SeqCst)
    }

    /// Append a default preset and select it.
    pub fn create(&mut self, store: &mut ConfigStore) -> Result<(), PresetError> {
        store.create_config();
        self.select(store, store.len() - 1)
    }

    /// Delete the selected preset and select its neighbour.
    pub fn delete(&mut self, store: &mut ConfigStore) -> Result<(), PresetError> {
        store.delete_config(self.selected_index)?;
        let index = self.selected_index.min(store.len() - 1);
        self.select(store, index)
    }

    // =========================================================================
    // Model Conversion
    // =========================================================================

    pub fn is_converting(&self) -> bool {
        self.converting.load(Ordering::SeqCst)
    }

    /// Convert the draft's model for the draft's strategy.
    ///
    /// Returns false if a conversion is already running.
    pub fn convert_model(&mut self) -> bool {
        self.reap_conversion();
        if self.converting.swap(true, Ordering::SeqCst) {
            self.notify(Notification::info("Conversion Already Running"));
            return false;
        }
        let guard = FlagGuard(self.converting.clone());

        let model_dir = self.options.local_model_dir.clone();
        let model_path = model_dir.join(&self.draft.model_parameters.model_name);
        let params = self.draft.model_parameters.clone();
        let files = self.services.files.clone();
        let converter = self.services.converter.clone();
        let events = self.events.clone();

        let handle = self.runtime.spawn(async move {
            let _guard = guard;
            let send = |event: EditorEvent| {
                let _ = events.send(event);
            };

            if !files.file_exists(&model_path).await {
                warn!(path = %model_path.display(), "Model not found");
                send(EditorEvent::Notify(Notification::error(format!(
                    "Model Not Found - {}",
                    model_path.display()
                ))));
                return;
            }

            let strategy = strategy(&params);
            let output = converted_model_path(&model_path, &strategy);
            send(EditorEvent::Notify(
                Notification::info("Start Converting").with_duration(START_CONVERTING_DURATION),
            ));

            match converter.convert(&model_path, &strategy, &output).await {
                Ok(()) => {
                    info!(output = %output.display(), "Model converted");
                    send(EditorEvent::Notify(Notification::success(format!(
                        "Convert Success - {}",
                        output.display()
                    ))));
                    send(EditorEvent::ConversionFinished { output });
                    match scan_local_models(&model_dir).await {
                        Ok(names) => send(EditorEvent::LocalModelsScanned(names)),
                        Err(e) => warn!(error = %e, "Failed to refresh local models"),
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Model conversion failed");
                    send(EditorEvent::Notify(Notification::error(format!(
                        "Convert Failed - {e}"
                    ))));
                }
            }
        });

        self.conversion = Some(handle);
        true
    }

    /// Abort the running conversion, if any.
    pub fn cancel_conversion(&mut self) -> bool {
        self.reap_conversion();
        match self.conversion.take() {
            Some(handle) => {
                info!("Cancelling model conversion");
                handle.abort();
                self.notify(Notification::info("Convert Cancelled"));
                true
            }
            None => false,
        }
    }

    /// Drop the conversion handle once its task has ended.
    fn reap_conversion(&mut self) {
        if self.conversion.as_ref().is_some_and(JoinHandle::is_finished) {
            self.conversion = None;
        }
    }

    // =========================================================================
    // Event Handling
    // =========================================================================

    /// Apply an event on the host thread.
    ///
    /// Returns the notification to display, if the event carries one.
    pub fn handle_event(
        &mut self,
        store: &mut ConfigStore,
        event: EditorEvent,
    ) -> Option<Notification> {
        match event {
            EditorEvent::Notify(notification) => Some(notification),
            EditorEvent::ConfigPushed { port } => {
                debug!(port, "Config push acknowledged");
                None
            }
            EditorEvent::ConversionFinished { output } => {
                debug!(output = %output.display(), "Conversion finished");
                None
            }
            EditorEvent::LocalModelsScanned(names) => {
                store.apply_local_scan(&names);
                None
            }
        }
    }
}
