//! Configuration module for Model Runner.
//!
//! Manages application settings stored in SQLite.

mod settings;

pub use settings::{
    Settings, Theme, DEFAULT_API_HOST, DEFAULT_CONVERT_SCRIPT, DEFAULT_LOCAL_MODEL_DIR,
};
