//! Shared configuration store.
//!
//! Owns the ordered preset list, the index of the preset used at startup and
//! the local model catalog. Every mutation is broadcast to subscribers as a
//! [`StoreEvent`].

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::catalog::ModelCatalog;
use crate::db::Database;

use super::config::ModelConfig;
use super::types::PresetError;

/// Change notifications emitted by [`ConfigStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    ConfigReplaced { index: usize },
    ConfigAppended { index: usize },
    ConfigRemoved { index: usize },
    CurrentIndexChanged { index: usize },
    CatalogChanged,
}

/// Settings key holding the last preset document that failed to parse.
pub const CONFIG_BACKUP_KEY: &str = "config_store_backup";

pub type StoreEventSender = mpsc::UnboundedSender<StoreEvent>;
pub type StoreEventReceiver = mpsc::UnboundedReceiver<StoreEvent>;

/// Persisted form of the store.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreDocument {
    #[serde(default)]
    current_model_config_index: usize,
    #[serde(default)]
    model_configs: Vec<ModelConfig>,
    #[serde(default)]
    model_source_list: ModelCatalog,
}

/// Ordered list of configuration presets plus the active index.
///
/// The list is never empty and `current_index` is always valid.
#[derive(Debug)]
pub struct ConfigStore {
    configs: Vec<ModelConfig>,
    current_index: usize,
    catalog: ModelCatalog,
    subscribers: Vec<StoreEventSender>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(vec![ModelConfig::default()], 0, ModelCatalog::builtin())
    }
}

impl ConfigStore {
    /// Build a store, repairing an empty list or out-of-range index.
    pub fn new(configs: Vec<ModelConfig>, current_index: usize, catalog: ModelCatalog) -> Self {
        let mut store = Self {
            configs,
            current_index,
            catalog,
            subscribers: Vec::new(),
        };
        store.normalize();
        store
    }

    /// Load the store from the database.
    ///
    /// Records missing fields are completed with defaults. A document that
    /// still does not parse is copied to [`CONFIG_BACKUP_KEY`] in the settings
    /// table before the default store is returned, so a later save cannot
    /// lose it.
    pub fn load(db: &Database) -> Self {
        let json = match db.read_config_document() {
            Ok(Some(json)) => json,
            Ok(None) => return Self::default(),
            Err(e) => {
                warn!(error = %e, "Failed to read config store, using defaults");
                return Self::default();
            }
        };

        let doc = match serde_json::from_str::<StoreDocument>(&json) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(error = %e, "Failed to parse config store, using defaults");
                if let Err(e) = db.set_setting(CONFIG_BACKUP_KEY, &json) {
                    warn!(error = %e, "Failed to back up unreadable config store");
                }
                return Self::default();
            }
        };

        let catalog = if doc.model_source_list.is_empty() {
            ModelCatalog::builtin()
        } else {
            doc.model_source_list
        };
        let store = Self::new(doc.model_configs, doc.current_model_config_index, catalog);
        debug!(
            configs = store.len(),
            current = store.current_index,
            "Loaded config store"
        );
        store
    }

    /// Save the store to the database.
    pub fn save(&self, db: &Database) -> anyhow::Result<()> {
        let doc = StoreDocument {
            current_model_config_index: self.current_index,
            model_configs: self.configs.clone(),
            model_source_list: self.catalog.clone(),
        };
        let json = serde_json::to_string(&doc)?;
        db.write_config_document(&json)?;
        Ok(())
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&mut self) -> StoreEventReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    fn emit(&mut self, event: StoreEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn normalize(&mut self) {
        if self.configs.is_empty() {
            self.configs.push(ModelConfig::default());
        }
        if self.current_index >= self.configs.len() {
            self.current_index = self.configs.len() - 1;
        }
    }

    fn check_index(&self, index: usize) -> Result<(), PresetError> {
        if index < self.configs.len() {
            Ok(())
        } else {
            Err(PresetError::IndexOutOfRange {
                index,
                len: self.configs.len(),
            })
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn configs(&self) -> &[ModelConfig] {
        &self.configs
    }

    pub fn get(&self, index: usize) -> Option<&ModelConfig> {
        self.configs.get(index)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    /// Always false; the store refills itself when emptied.
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The preset used at startup.
    pub fn current(&self) -> &ModelConfig {
        &self.configs[self.current_index]
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub fn set_current_index(&mut self, index: usize) -> Result<(), PresetError> {
        self.check_index(index)?;
        if self.current_index != index {
            debug!(index, "Current config changed");
            self.current_index = index;
            self.emit(StoreEvent::CurrentIndexChanged { index });
        }
        Ok(())
    }

    /// Replace the record at `index`.
    pub fn set_config(&mut self, index: usize, config: ModelConfig) -> Result<(), PresetError> {
        self.check_index(index)?;
        self.configs[index] = config;
        self.emit(StoreEvent::ConfigReplaced { index });
        Ok(())
    }

    /// Append a record and return its index.
    pub fn push_config(&mut self, config: ModelConfig) -> usize {
        self.configs.push(config);
        let index = self.configs.len() - 1;
        self.emit(StoreEvent::ConfigAppended { index });
        index
    }

    /// Append a default record named after the current time.
    pub fn create_config(&mut self) -> usize {
        let config = ModelConfig::timestamped();
        info!(name = %config.name, "Creating config");
        self.push_config(config)
    }

    /// Remove the record at `index`.
    ///
    /// Keeps `current_index` on the same record when an earlier one is
    /// removed, refills an emptied list with a default record and clamps
    /// `current_index` into the new list.
    pub fn delete_config(&mut self, index: usize) -> Result<ModelConfig, PresetError> {
        self.check_index(index)?;
        let removed = self.configs.remove(index);
        info!(name = %removed.name, index, "Deleted config");
        self.emit(StoreEvent::ConfigRemoved { index });

        if index < self.current_index {
            self.current_index -= 1;
            self.emit(StoreEvent::CurrentIndexChanged {
                index: self.current_index,
            });
        }
        if self.configs.is_empty() {
            self.create_config();
        }
        if self.current_index >= self.configs.len() {
            self.current_index = self.configs.len() - 1;
            self.emit(StoreEvent::CurrentIndexChanged {
                index: self.current_index,
            });
        }

        Ok(removed)
    }

    /// Reconcile the catalog with a scan of the local model directory.
    pub fn apply_local_scan(&mut self, local_files: &[String]) {
        if self.catalog.apply_local_scan(local_files) {
            self.emit(StoreEvent::CatalogChanged);
        }
    }
}
