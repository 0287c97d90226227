//! SQLite persistence for Model Runner.
//!
//! Two things live here:
//! - app settings, as key/value rows in `settings`
//! - the preset document, as the single row of `config_store`

mod migrations;

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension};

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
    path: PathBuf,
}

impl Database {
    /// Open the database at the default location.
    pub fn open() -> anyhow::Result<Self> {
        Self::open_at(Self::default_path()?)
    }

    /// Open (or create) the database file at `path`, creating parent
    /// directories as needed.
    pub fn open_at(path: PathBuf) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&path)?;
        tracing::debug!(path = %path.display(), "Opened database");
        Ok(Self { conn, path })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> anyhow::Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
            path: PathBuf::from(":memory:"),
        })
    }

    /// `<data dir>/modelrunner/modelrunner.db`, e.g.
    /// `~/.local/share/modelrunner/modelrunner.db` on Linux.
    pub fn default_path() -> anyhow::Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".local/share")))
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(data_dir.join("modelrunner").join("modelrunner.db"))
    }

    /// Bring the schema up to date. Safe to call repeatedly.
    pub fn migrate(&self) -> anyhow::Result<()> {
        migrations::run_migrations(&self.conn)
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// Insert or replace the value stored under `key`.
    pub fn set_setting(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = unixepoch()",
            [key, value],
        )?;
        Ok(())
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        self.conn
            .query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()
    }

    // =========================================================================
    // Preset Document
    // =========================================================================

    /// Replace the stored preset document.
    pub fn write_config_document(&self, document: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO config_store (id, document) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET document = excluded.document, updated_at = unixepoch()",
            [document],
        )?;
        Ok(())
    }

    /// The stored preset document, if one was ever written.
    pub fn read_config_document(&self) -> Result<Option<String>, rusqlite::Error> {
        self.conn
            .query_row("SELECT document FROM config_store WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn migrated() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    #[test]
    fn test_open_at_creates_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a").join("b").join("modelrunner.db");

        let _db = Database::open_at(path.clone()).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_data_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("modelrunner.db");

        {
            let db = Database::open_at(path.clone()).unwrap();
            db.migrate().unwrap();
            db.set_setting("settings", "{}").unwrap();
            db.write_config_document(r#"{"modelConfigs":[]}"#).unwrap();
        }

        let db = Database::open_at(path).unwrap();
        db.migrate().unwrap();
        assert_eq!(db.get_setting("settings").unwrap().as_deref(), Some("{}"));
        assert_eq!(
            db.read_config_document().unwrap().as_deref(),
            Some(r#"{"modelConfigs":[]}"#)
        );
    }

    #[test]
    fn test_default_path_is_under_modelrunner() {
        if let Ok(path) = Database::default_path() {
            assert!(path.ends_with("modelrunner/modelrunner.db"));
        }
    }

    #[test]
    fn test_set_setting_overwrites() {
        let db = migrated();

        db.set_setting("settings", "old").unwrap();
        db.set_setting("settings", "new").unwrap();

        assert_eq!(db.get_setting("settings").unwrap().as_deref(), Some("new"));
        assert!(db.get_setting("missing").unwrap().is_none());
    }

    #[test]
    fn test_config_document_starts_empty_and_is_replaced() {
        let db = migrated();
        assert!(db.read_config_document().unwrap().is_none());

        db.write_config_document("first").unwrap();
        db.write_config_document("second").unwrap();

        assert_eq!(db.read_config_document().unwrap().as_deref(), Some("second"));
        let rows: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM config_store", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_reads_fail_before_migration() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.read_config_document().is_err());
    }
}
