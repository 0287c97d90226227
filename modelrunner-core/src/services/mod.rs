//! External services used by the configuration editor.
//!
//! Each service sits behind an async trait so the editor can be driven
//! against in-process fakes:
//! - `ConfigUpdater` - pushes sampling parameters to a running API server
//! - `FileChecker` - checks whether a model file exists
//! - `ModelConverter` - converts a model for a given strategy

mod convert;
mod files;
mod update;

use std::sync::Arc;

use thiserror::Error;

use crate::config::Settings;

pub use convert::{ModelConverter, PythonConverter};
pub use files::{FileChecker, LocalFiles};
pub use update::{ConfigUpdater, HttpConfigUpdater, UpdateConfigBody};

/// Errors reported by external services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    ConversionFailed(String),
}

/// The set of services an editor talks to.
#[derive(Clone)]
pub struct Services {
    pub updater: Arc<dyn ConfigUpdater>,
    pub files: Arc<dyn FileChecker>,
    pub converter: Arc<dyn ModelConverter>,
}

impl Services {
    /// Production services configured from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            updater: Arc::new(HttpConfigUpdater::new(
                settings.api_host.clone(),
                settings.update_timeout(),
            )),
            files: Arc::new(LocalFiles),
            converter: Arc::new(PythonConverter::new(
                &settings.python_path,
                &settings.convert_script,
            )),
        }
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}
