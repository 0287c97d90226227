//! File existence checks.

use std::path::Path;

use async_trait::async_trait;

#[async_trait]
pub trait FileChecker: Send + Sync {
    /// Whether `path` names an existing regular file.
    async fn file_exists(&self, path: &Path) -> bool;
}

/// Checks the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFiles;

#[async_trait]
impl FileChecker for LocalFiles {
    async fn file_exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_files() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("m.bin");
        std::fs::write(&file, b"weights").unwrap();

        assert!(LocalFiles.file_exists(&file).await);
        assert!(!LocalFiles.file_exists(&tmp.path().join("missing.bin")).await);
        // Directories are not model files
        assert!(!LocalFiles.file_exists(tmp.path()).await);
    }
}
