//! Model Runner Core Library
//!
//! This crate provides the core functionality for Model Runner, a desktop
//! manager for local language-model server presets. It includes:
//!
//! - Configuration presets (API and model-loading parameters)
//! - The shared preset store with change notifications
//! - Strategy descriptors and converted-model naming
//! - The local model catalog
//! - A draft-based config editor that pushes updates to a running server
//!   and drives model conversion
//! - Settings and the SQLite database they live in

pub mod catalog;
pub mod config;
pub mod db;
pub mod editor;
pub mod presets;
pub mod services;

// Re-exports for convenience
pub use config::{Settings, Theme};
pub use db::Database;

// Re-export presets
pub use presets::{
    converted_model_path, strategy, ApiParameters, ConfigStore, Device, FieldEdit, ModelConfig,
    ModelParameters, Precision, PresetError, StoreEvent, StoreEventReceiver,
};

// Re-export catalog
pub use catalog::{scan_local_models, ModelCatalog, ModelSource};

// Re-export editor
pub use editor::{
    ConfigEditor, EditorEvent, EditorEventReceiver, EditorOptions, Notification,
    NotificationLevel,
};

// Re-export services
pub use services::{ServiceError, Services};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn exports_are_accessible() {
        fn _check_types(
            _db: &Database,
            _settings: &Settings,
            _theme: Theme,
            _store: &ConfigStore,
            _editor: &ConfigEditor,
            _catalog: &ModelCatalog,
            _services: &Services,
        ) {
        }
    }

    #[test]
    fn default_store_round_trips_through_database() {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();

        let mut store = ConfigStore::load(&db);
        store.create_config();
        store.save(&db).unwrap();

        let reloaded = ConfigStore::load(&db);
        assert_eq!(reloaded.configs(), store.configs());
        assert_eq!(reloaded.configs()[0].name, "Default");
    }
}
