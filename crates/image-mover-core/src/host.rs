use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

/// A file inside the vault, addressed by its vault-relative path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VaultFile {
    /// Slash-separated path relative to the vault root, e.g. "Notes/Ideas.md"
    pub path: String,
    /// Extension without the dot, empty when the file name has none
    pub extension: String,
}

impl VaultFile {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = path.rsplit('/').next().unwrap_or(&path);
        let extension = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext.to_string(),
            _ => String::new(),
        };
        Self { path, extension }
    }
}

/// A rename notification: `file` is where the file lives now, `old_path` is
/// where it lived before.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenameEvent {
    pub file: VaultFile,
    pub old_path: String,
}

impl RenameEvent {
    pub fn new(old_path: impl Into<String>, new_path: impl Into<String>) -> Self {
        Self {
            file: VaultFile::new(new_path),
            old_path: old_path.into(),
        }
    }
}

/// Read access to the vault's documents.
#[async_trait]
pub trait Vault: Send + Sync {
    /// Absolute filesystem path of the vault root.
    fn base_path(&self) -> &Path;

    /// Full text of a document. Fails when the file is gone.
    async fn read(&self, file: &VaultFile) -> anyhow::Result<String>;
}

/// Transient user-visible messages. Fire-and-forget.
pub trait Notifier: Send + Sync {
    fn notice(&self, message: &str, duration: Duration);
}

/// The host's per-plugin data persistence.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Previously saved data, `None` when nothing was saved yet.
    async fn load_data(&self) -> anyhow::Result<Option<Value>>;

    async fn save_data(&self, data: &Value) -> anyhow::Result<()>;
}

/// Everything the plugin needs from its host.
pub trait Host: Vault + Notifier + DataStore {}

impl<T: Vault + Notifier + DataStore> Host for T {}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vault_file_takes_extension_from_name() {
        let file = VaultFile::new("B/A/A.md");
        assert_eq!(file.path, "B/A/A.md");
        assert_eq!(file.extension, "md");
    }

    #[test]
    fn vault_file_without_extension() {
        assert_eq!(VaultFile::new("Notes/README").extension, "");
        assert_eq!(VaultFile::new(".hidden").extension, "");
    }

    #[test]
    fn dotted_directory_does_not_leak_into_extension() {
        assert_eq!(VaultFile::new("v1.2/notes").extension, "");
        assert_eq!(VaultFile::new("v1.2/archive.tar.gz").extension, "gz");
    }

    #[test]
    fn rename_event_orders_old_then_new() {
        let event = RenameEvent::new("B/A/A.md", "C/A.md");
        assert_eq!(event.old_path, "B/A/A.md");
        assert_eq!(event.file.path, "C/A.md");
    }
}
