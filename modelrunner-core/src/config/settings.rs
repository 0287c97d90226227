//! User settings, stored as one JSON value in the `settings` table.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::db::Database;

const SETTINGS_KEY: &str = "settings";

pub const DEFAULT_LOCAL_MODEL_DIR: &str = "models";
pub const DEFAULT_CONVERT_SCRIPT: &str = "./backend-python/convert_model.py";
pub const DEFAULT_API_HOST: &str = "127.0.0.1";
const DEFAULT_UPDATE_TIMEOUT_SECS: u64 = 30;
const MAX_UPDATE_TIMEOUT_SECS: u64 = 300;

/// Color scheme of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn all() -> &'static [Theme] {
        &[Self::Dark, Self::Light]
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        })
    }
}

/// Application settings.
///
/// Unknown or missing fields fall back to their defaults when loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,

    /// Directory holding model files. Relative paths resolve against the
    /// working directory.
    pub local_model_dir: String,

    /// Interpreter that runs the conversion script.
    pub python_path: String,

    pub convert_script: String,

    /// Host of the API server that receives config updates.
    pub api_host: String,

    /// Timeout for a config update request, in seconds.
    pub update_timeout_secs: u64,

    /// Selecting a preset also makes it the startup preset.
    pub apply_selection_immediately: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            local_model_dir: DEFAULT_LOCAL_MODEL_DIR.to_string(),
            python_path: default_python().to_string(),
            convert_script: DEFAULT_CONVERT_SCRIPT.to_string(),
            api_host: DEFAULT_API_HOST.to_string(),
            update_timeout_secs: DEFAULT_UPDATE_TIMEOUT_SECS,
            apply_selection_immediately: true,
        }
    }
}

fn default_python() -> &'static str {
    if cfg!(windows) {
        "python.exe"
    } else {
        "python3"
    }
}

/// Replace a blank string with `default`.
fn or_default(value: &mut String, default: &str) {
    if value.trim().is_empty() {
        *value = default.to_string();
    }
}

impl Settings {
    /// Read settings from `db`.
    ///
    /// Falls back to defaults when nothing is stored or the stored value does
    /// not parse; the result is always validated.
    pub fn load(db: &Database) -> Self {
        let stored = match db.get_setting(SETTINGS_KEY) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "Failed to read settings, using defaults");
                None
            }
        };

        let mut settings = stored
            .and_then(|json| {
                serde_json::from_str::<Settings>(&json)
                    .map_err(|e| warn!(error = %e, "Failed to parse settings, using defaults"))
                    .ok()
            })
            .unwrap_or_default();
        settings.validate();
        settings
    }

    pub fn save(&self, db: &Database) -> anyhow::Result<()> {
        db.set_setting(SETTINGS_KEY, &serde_json::to_string(self)?)?;
        Ok(())
    }

    /// Clamp the timeout and restore blank paths and host to their defaults.
    pub fn validate(&mut self) {
        self.update_timeout_secs = self.update_timeout_secs.clamp(1, MAX_UPDATE_TIMEOUT_SECS);
        or_default(&mut self.local_model_dir, DEFAULT_LOCAL_MODEL_DIR);
        or_default(&mut self.python_path, default_python());
        or_default(&mut self.convert_script, DEFAULT_CONVERT_SCRIPT);
        or_default(&mut self.api_host, DEFAULT_API_HOST);
    }

    pub fn local_model_dir(&self) -> PathBuf {
        PathBuf::from(&self.local_model_dir)
    }

    pub fn update_timeout(&self) -> Duration {
        Duration::from_secs(self.update_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.local_model_dir(), PathBuf::from("models"));
        assert_eq!(settings.api_host, "127.0.0.1");
        assert_eq!(settings.update_timeout(), Duration::from_secs(30));
        assert!(settings.apply_selection_immediately);
    }

    #[test]
    fn test_round_trip_through_database() {
        let db = db();
        let settings = Settings {
            theme: Theme::Light,
            local_model_dir: "/srv/models".to_string(),
            apply_selection_immediately: false,
            ..Settings::default()
        };

        settings.save(&db).unwrap();

        assert_eq!(Settings::load(&db), settings);
    }

    #[test]
    fn test_load_without_stored_value() {
        assert_eq!(Settings::load(&db()), Settings::default());
    }

    #[test]
    fn test_load_ignores_unparseable_value() {
        let db = db();
        db.set_setting(SETTINGS_KEY, "not valid json {{").unwrap();
        assert_eq!(Settings::load(&db), Settings::default());
    }

    #[test]
    fn test_load_fills_missing_fields() {
        let db = db();
        db.set_setting(SETTINGS_KEY, r#"{"theme":"Light","update_timeout_secs":0}"#)
            .unwrap();

        let settings = Settings::load(&db);

        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.local_model_dir, DEFAULT_LOCAL_MODEL_DIR);
        // Loaded values are validated
        assert_eq!(settings.update_timeout_secs, 1);
    }

    #[test]
    fn test_validate_restores_blank_fields() {
        let mut settings = Settings {
            local_model_dir: "  ".to_string(),
            python_path: String::new(),
            api_host: String::new(),
            update_timeout_secs: 10_000,
            ..Settings::default()
        };

        settings.validate();

        assert_eq!(settings.local_model_dir, DEFAULT_LOCAL_MODEL_DIR);
        assert_eq!(settings.python_path, default_python());
        assert_eq!(settings.api_host, DEFAULT_API_HOST);
        assert_eq!(settings.update_timeout_secs, MAX_UPDATE_TIMEOUT_SECS);
    }
}
