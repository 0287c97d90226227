//! Local model catalog.
//!
//! The catalog starts from a built-in list of known models and is reconciled
//! against the files that actually exist in the local model directory.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One entry in the model catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSource {
    /// File name inside the local model directory.
    pub name: String,
    /// Download size in bytes, if known.
    #[serde(default)]
    pub size: Option<u64>,
    /// Download URL, if known.
    #[serde(default)]
    pub url: Option<String>,
    /// Whether the file exists in the local model directory.
    #[serde(default)]
    pub is_local: bool,
}

impl ModelSource {
    fn remote(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            size: None,
            url: Some(url.to_string()),
            is_local: false,
        }
    }

    fn local_only(name: &str) -> Self {
        Self {
            name: name.to_string(),
            size: None,
            url: None,
            is_local: true,
        }
    }
}

/// Known models with download locations.
const BUILTIN_MODELS: &[(&str, &str)] = &[
    (
        "RWKV-4-Raven-1B5-v11-Eng99%-Other1%-20230425-ctx4096.pth",
        "https://huggingface.co/BlinkDL/rwkv-4-raven/resolve/main/RWKV-4-Raven-1B5-v11-Eng99%25-Other1%25-20230425-ctx4096.pth",
    ),
    (
        "RWKV-4-Raven-3B-v11-Eng99%-Other1%-20230425-ctx4096.pth",
        "https://huggingface.co/BlinkDL/rwkv-4-raven/resolve/main/RWKV-4-Raven-3B-v11-Eng99%25-Other1%25-20230425-ctx4096.pth",
    ),
    (
        "RWKV-4-Raven-7B-v11-Eng99%-Other1%-20230427-ctx8192.pth",
        "https://huggingface.co/BlinkDL/rwkv-4-raven/resolve/main/RWKV-4-Raven-7B-v11-Eng99%25-Other1%25-20230427-ctx8192.pth",
    ),
];

/// Ordered list of model sources.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelCatalog {
    sources: Vec<ModelSource>,
}

impl ModelCatalog {
    /// Catalog seeded with the built-in model list, nothing marked local.
    pub fn builtin() -> Self {
        Self {
            sources: BUILTIN_MODELS
                .iter()
                .map(|(name, url)| ModelSource::remote(name, url))
                .collect(),
        }
    }

    pub fn from_sources(sources: Vec<ModelSource>) -> Self {
        Self { sources }
    }

    pub fn sources(&self) -> &[ModelSource] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Names of models present in the local model directory.
    pub fn local_models(&self) -> Vec<&str> {
        self.sources
            .iter()
            .filter(|source| source.is_local)
            .map(|source| source.name.as_str())
            .collect()
    }

    /// Check if a model is present locally.
    pub fn is_local(&self, name: &str) -> bool {
        self.sources.iter().any(|s| s.is_local && s.name == name)
    }

    /// Reconcile the catalog with the file names found on disk.
    ///
    /// Known entries are marked local or not; unknown files are appended as
    /// local-only entries. Returns whether anything changed.
    pub fn apply_local_scan(&mut self, local_files: &[String]) -> bool {
        let mut changed = false;

        for source in &mut self.sources {
            let present = local_files.iter().any(|f| f == &source.name);
            if source.is_local != present {
                source.is_local = present;
                changed = true;
            }
        }

        for file in local_files {
            if !self.sources.iter().any(|s| &s.name == file) {
                debug!(model = %file, "Adding unlisted local model");
                self.sources.push(ModelSource::local_only(file));
                changed = true;
            }
        }

        changed
    }
}

/// List the regular files directly inside the local model directory.
///
/// A missing directory yields an empty list.
pub async fn scan_local_models(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "Model directory does not exist");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();

    info!(dir = %dir.display(), count = names.len(), "Scanned local models");
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_catalog_has_no_local_models() {
        let catalog = ModelCatalog::builtin();
        assert!(!catalog.is_empty());
        assert!(catalog.local_models().is_empty());
        assert!(catalog
            .sources()
            .iter()
            .any(|s| s.name == crate::presets::DEFAULT_MODEL_NAME));
    }

    #[test]
    fn test_apply_local_scan_marks_known_and_appends_unknown() {
        let mut catalog = ModelCatalog::builtin();
        let known = catalog.sources()[0].name.clone();

        let changed = catalog.apply_local_scan(&[known.clone(), "custom.pth".to_string()]);

        assert!(changed);
        assert!(catalog.is_local(&known));
        assert!(catalog.is_local("custom.pth"));
        assert_eq!(catalog.local_models(), vec![known.as_str(), "custom.pth"]);
    }

    #[test]
    fn test_apply_local_scan_unmarks_removed_files() {
        let mut catalog = ModelCatalog::builtin();
        let known = catalog.sources()[1].name.clone();
        catalog.apply_local_scan(&[known.clone()]);

        let changed = catalog.apply_local_scan(&[]);

        assert!(changed);
        assert!(!catalog.is_local(&known));
    }

    #[test]
    fn test_apply_local_scan_is_stable() {
        let mut catalog = ModelCatalog::builtin();
        let files = vec!["a.pth".to_string()];
        assert!(catalog.apply_local_scan(&files));
        assert!(!catalog.apply_local_scan(&files));
        assert_eq!(catalog.sources().iter().filter(|s| s.name == "a.pth").count(), 1);
    }

    #[tokio::test]
    async fn test_scan_local_models_lists_files_only() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("b.pth"), b"x").unwrap();
        std::fs::write(tmp.path().join("a.pth"), b"x").unwrap();
        std::fs::create_dir(tmp.path().join("subdir")).unwrap();

        let names = scan_local_models(tmp.path()).await.unwrap();
        assert_eq!(names, vec!["a.pth", "b.pth"]);
    }

    #[tokio::test]
    async fn test_scan_local_models_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        let names = scan_local_models(&tmp.path().join("nope")).await.unwrap();
        assert!(names.is_empty());
    }
}
