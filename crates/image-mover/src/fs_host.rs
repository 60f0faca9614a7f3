use anyhow::Context;
use async_trait::async_trait;
use image_mover_core::{DataStore, Notifier, Vault, VaultFile};
use serde_json::Value;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

pub const DATA_FILE_NAME: &str = "data.json";

/// Host over a plain directory tree. Notices go to the `notice` tracing target
/// and plugin data lives in `<plugin_dir>/data.json`.
pub struct FsHost {
    base: PathBuf,
    data_file: PathBuf,
}

impl FsHost {
    pub fn new(base: PathBuf, plugin_dir: &Path) -> Self {
        Self {
            base,
            data_file: plugin_dir.join(DATA_FILE_NAME),
        }
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    /// Absolute path of a vault-relative path.
    pub fn absolute(&self, vault_path: &str) -> PathBuf {
        let mut path = self.base.clone();
        for segment in vault_path.split('/').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        path
    }
}

/// Slash-separated path of `path` relative to `base`, or `None` when `path`
/// lies outside the vault.
pub fn to_vault_path(base: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => segments.push(segment.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}

#[async_trait]
impl Vault for FsHost {
    fn base_path(&self) -> &Path {
        &self.base
    }

    async fn read(&self, file: &VaultFile) -> anyhow::Result<String> {
        let path = self.absolute(&file.path);
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading {}", path.display()))
    }
}

impl Notifier for FsHost {
    fn notice(&self, message: &str, duration: Duration) {
        tracing::info!(target: "notice", duration_ms = duration.as_millis() as u64, "{}", message);
    }
}

#[async_trait]
impl DataStore for FsHost {
    async fn load_data(&self) -> anyhow::Result<Option<Value>> {
        if !tokio::fs::try_exists(&self.data_file).await.unwrap_or(false) {
            return Ok(None);
        }
        let raw = tokio::fs::read_to_string(&self.data_file)
            .await
            .with_context(|| format!("reading {}", self.data_file.display()))?;
        let data = serde_json::from_str(&raw)
            .with_context(|| format!("parsing {}", self.data_file.display()))?;
        Ok(Some(data))
    }

    async fn save_data(&self, data: &Value) -> anyhow::Result<()> {
        if let Some(dir) = self.data_file.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let raw = serde_json::to_string_pretty(data)?;
        tokio::fs::write(&self.data_file, raw)
            .await
            .with_context(|| format!("writing {}", self.data_file.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn vault_path_is_slash_separated() {
        let base = Path::new("/vault");
        assert_eq!(
            to_vault_path(base, Path::new("/vault/B/A/A.md")).as_deref(),
            Some("B/A/A.md")
        );
    }

    #[test]
    fn paths_outside_vault_are_rejected() {
        let base = Path::new("/vault");
        assert_eq!(to_vault_path(base, Path::new("/elsewhere/A.md")), None);
        assert_eq!(to_vault_path(base, Path::new("/vault")), None);
    }

    #[test]
    fn absolute_joins_segments() {
        let host = FsHost::new(PathBuf::from("/vault"), Path::new("/vault/.image-mover"));
        assert_eq!(host.absolute("C/A.md"), PathBuf::from("/vault/C/A.md"));
        assert_eq!(host.data_file(), Path::new("/vault/.image-mover/data.json"));
    }

    #[tokio::test]
    async fn reads_documents_from_disk() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("C")).unwrap();
        std::fs::write(tmp.path().join("C/A.md"), "![x](images/x.png)").unwrap();
        let host = FsHost::new(tmp.path().to_path_buf(), &tmp.path().join(".image-mover"));

        let content = host.read(&VaultFile::new("C/A.md")).await.unwrap();
        assert_eq!(content, "![x](images/x.png)");
        assert!(host.read(&VaultFile::new("C/missing.md")).await.is_err());
    }

    #[tokio::test]
    async fn data_round_trips_through_file() {
        let tmp = TempDir::new().unwrap();
        let host = FsHost::new(tmp.path().to_path_buf(), &tmp.path().join(".image-mover"));

        assert!(host.load_data().await.unwrap().is_none());
        host.save_data(&json!({"logPath": "./logs"})).await.unwrap();
        assert_eq!(
            host.load_data().await.unwrap(),
            Some(json!({"logPath": "./logs"}))
        );
    }
}
