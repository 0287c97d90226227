//! Model configuration presets.
//!
//! This module provides:
//! - `ModelConfig` - A named preset of API and model-loading parameters
//! - `ConfigStore` - The shared, observable preset list
//! - Strategy descriptors derived from model parameters

mod config;
mod store;
mod strategy;
mod types;

pub use config::{
    ApiParameters, FieldEdit, ModelConfig, ModelParameters, DEFAULT_CONFIG_NAME,
    DEFAULT_MODEL_NAME,
};
pub use store::{ConfigStore, StoreEvent, StoreEventReceiver, StoreEventSender, CONFIG_BACKUP_KEY};
pub use strategy::{converted_model_path, sanitize_strategy, strategy};
pub use types::{
    Device, ParamRange, Precision, PresetError, API_PORT_RANGE, MAX_RESPONSE_TOKEN_RANGE,
    PENALTY_RANGE, TEMPERATURE_RANGE, TOP_P_RANGE,
};
